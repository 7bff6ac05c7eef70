use crate::engine::Token;
use serde::Serialize;
use std::collections::HashMap;

/// Tokens sharing one line id, joined in recognition order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub line_id: u32,
    pub text: String,
    pub mean_confidence: f32,
}

/// Group tokens into lines.
///
/// Whitespace-only tokens are dropped. Lines come out in the order their id
/// was first seen, since engines do not always number lines monotonically.
pub fn aggregate(tokens: &[Token]) -> Vec<Line> {
    let mut order: Vec<u32> = Vec::new();
    let mut grouped: HashMap<u32, Vec<&Token>> = HashMap::new();

    for token in tokens.iter().filter(|t| !t.text.trim().is_empty()) {
        grouped
            .entry(token.line_id)
            .or_insert_with(|| {
                order.push(token.line_id);
                Vec::new()
            })
            .push(token);
    }

    order
        .into_iter()
        .map(|line_id| {
            let members = grouped.remove(&line_id).unwrap_or_default();
            let text = members
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let mean_confidence = mean(members.iter().map(|t| t.confidence));
            Line {
                line_id,
                text,
                mean_confidence,
            }
        })
        .collect()
}

/// Arithmetic mean, 0 for an empty sequence
pub(crate) fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0f64, 0usize), |(sum, count), v| {
        (sum + f64::from(v), count + 1)
    });
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}
