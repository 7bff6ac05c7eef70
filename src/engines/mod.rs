//! Recognition engine implementations
//!
//! This module contains implementations of the Recognizer trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-leptess")]
pub mod leptess;

#[cfg(any(feature = "engine-ocrs", feature = "engine-leptess"))]
mod download;

pub mod fixed;
pub mod tsv;

use crate::config::Config;
use crate::engine::Recognizer;
use crate::error::OcrError;
use serde::Serialize;
use std::sync::Arc;

/// Information about an available engine
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub supported_languages: Vec<String>,
}

/// Registry of available recognition engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn Recognizer>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Create a new engine registry with all compiled-in engines initialized
    #[allow(unused_variables, unused_mut)]
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        let mode = config.extraction_config()?.engine_mode;
        let mut engines: Vec<Arc<dyn Recognizer>> = Vec::new();

        #[cfg(feature = "engine-ocrs")]
        {
            tracing::info!("Initializing ocrs engine...");
            engines.push(Arc::new(ocrs::OcrsRecognizer::new(&mode)?));
        }

        #[cfg(feature = "engine-leptess")]
        {
            tracing::info!("Initializing leptess engine...");
            engines.push(Arc::new(leptess::LeptessRecognizer::new(config, &mode)?));
        }

        if engines.is_empty() {
            return Err(OcrError::InitializationError(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-leptess".to_string()
            ));
        }

        Self::from_engines(engines)
    }

    /// Build a registry from already-constructed engines; the first is the default
    pub fn from_engines(engines: Vec<Arc<dyn Recognizer>>) -> Result<Self, OcrError> {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .ok_or_else(|| OcrError::InitializationError("Engine registry is empty".to_string()))?;

        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Recognizer>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default(&self) -> Option<Arc<dyn Recognizer>> {
        self.get(&self.default_engine)
    }

    /// Get the default engine name
    pub fn default_name(&self) -> &str {
        &self.default_engine
    }

    /// List all available engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Get info about all available engines
    pub fn info(&self) -> Vec<EngineInfo> {
        self.engines
            .iter()
            .map(|e| EngineInfo {
                name: e.name(),
                description: e.description(),
                supported_languages: e.supported_languages(),
            })
            .collect()
    }
}
