//! Parser for Tesseract's TSV output
//!
//! Columns: level, page_num, block_num, par_num, line_num, word_num, left,
//! top, width, height, conf, text. Word rows have level 5.

use crate::engine::Token;
use std::collections::HashMap;

const WORD_LEVEL: &str = "5";
const COLUMNS: usize = 12;

/// Turn TSV rows into tokens.
///
/// Tesseract numbers lines per paragraph, so the `(page, block, paragraph,
/// line)` tuple is mapped to a sequential id in first-seen order. Confidence
/// is reported on a 0-100 scale with -1 meaning "none"; unparsable values are
/// treated as 0.
pub fn parse(tsv: &str) -> Vec<Token> {
    let mut line_ids: HashMap<(&str, &str, &str, &str), u32> = HashMap::new();
    let mut tokens = Vec::new();

    for row in tsv.lines() {
        let fields: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
        if fields.len() < COLUMNS || fields[0] != WORD_LEVEL {
            continue;
        }

        let key = (fields[1], fields[2], fields[3], fields[4]);
        let next_id = line_ids.len() as u32;
        let line_id = *line_ids.entry(key).or_insert(next_id);

        let confidence = match fields[10].trim().parse::<f32>() {
            Ok(conf) => conf / 100.0,
            Err(_) => {
                tracing::warn!("Unparsable token confidence {:?}, using 0", fields[10]);
                0.0
            }
        };

        tokens.push(Token::new(fields[11], line_id, confidence));
    }

    tokens
}
