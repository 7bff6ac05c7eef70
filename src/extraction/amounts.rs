use super::lines::Line;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Optional currency marker (code, symbol or word) followed by an amount,
/// either comma-grouped in threes or plain, with at most two decimals.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:NGN|₦|N\s?|naira\s?)?\s*([0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]{1,2})?|[0-9]+(?:\.[0-9]{1,2})?)",
    )
    .expect("failed to compile amount regex")
});

/// A monetary amount found on a line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedAmount {
    pub line_id: u32,
    /// Full text of the line the amount was found on
    pub source_text: String,
    pub amount: f64,
    /// Mean confidence of the owning line
    pub confidence: f32,
}

/// Extract every amount from every line, in line order then match order
pub fn extract(lines: &[Line]) -> Vec<ExtractedAmount> {
    lines
        .iter()
        .flat_map(|line| {
            find_amounts(&line.text)
                .into_iter()
                .map(move |amount| ExtractedAmount {
                    line_id: line.line_id,
                    source_text: line.text.clone(),
                    amount,
                    confidence: line.mean_confidence,
                })
        })
        .collect()
}

/// Scan `text` left to right for non-overlapping amounts.
///
/// A match immediately followed by another digit is a number the pattern
/// cannot represent (three or more decimals, broken grouping); the whole
/// numeric run is skipped rather than split into pieces.
pub fn find_amounts(text: &str) -> Vec<f64> {
    let mut amounts = Vec::new();
    let mut pos = 0;

    while let Some(caps) = AMOUNT_PATTERN.captures_at(text, pos) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            break;
        };

        let rest = &text[whole.end()..];
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            let run = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
                .unwrap_or(rest.len());
            tracing::debug!(
                "Skipping unsupported number {:?}",
                &text[number.start()..whole.end() + run]
            );
            pos = whole.end() + run;
            continue;
        }
        pos = whole.end();

        let normalized = number.as_str().replace(',', "");
        match normalized.parse::<f64>() {
            Ok(amount) => amounts.push(amount),
            Err(e) => tracing::warn!("Unparsable amount {:?}: {}", number.as_str(), e),
        }
    }

    amounts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_id: u32, text: &str, mean_confidence: f32) -> Line {
        Line {
            line_id,
            text: text.to_string(),
            mean_confidence,
        }
    }

    #[test]
    fn test_grouped_amount_with_currency_code() {
        assert_eq!(find_amounts("Total NGN 12,345.67"), vec![12345.67]);
    }

    #[test]
    fn test_currency_markers() {
        assert_eq!(find_amounts("Total: ₦50,000.00"), vec![50000.0]);
        assert_eq!(find_amounts("Amount: NGN 100,000"), vec![100000.0]);
        assert_eq!(find_amounts("Price: N 25,500.50"), vec![25500.5]);
        assert_eq!(find_amounts("paid naira 750"), vec![750.0]);
        assert_eq!(find_amounts("Amount Due N 1,000.50"), vec![1000.5]);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(find_amounts("total: 500"), find_amounts("TOTAL: 500"));
        assert_eq!(find_amounts("ngn 1,200"), find_amounts("NGN 1,200"));
        assert_eq!(find_amounts("Naira 20"), vec![20.0]);
    }

    #[test]
    fn test_multiple_amounts_in_order() {
        assert_eq!(
            find_amounts("Subtotal: 45000 Tax: 5000 Total: 50000"),
            vec![45000.0, 5000.0, 50000.0]
        );
    }

    #[test]
    fn test_plain_amount_with_decimals() {
        assert_eq!(find_amounts("12345.67"), vec![12345.67]);
        assert_eq!(find_amounts("3.5"), vec![3.5]);
    }

    #[test]
    fn test_bare_marker_does_not_match() {
        assert!(find_amounts("NGN").is_empty());
        assert!(find_amounts("₦ naira N").is_empty());
        assert!(find_amounts("").is_empty());
    }

    #[test]
    fn test_three_decimals_not_matched() {
        assert!(find_amounts("rate 1.234").is_empty());
        assert_eq!(find_amounts("1.2345 then 7"), vec![7.0]);
    }

    #[test]
    fn test_extract_inherits_line_confidence_and_order() {
        let lines = vec![
            line(3, "Item 200 x 2", 0.9),
            line(1, "no digits here", 0.99),
            line(2, "Total N 400", 0.5),
        ];

        let amounts = extract(&lines);

        let values: Vec<f64> = amounts.iter().map(|a| a.amount).collect();
        assert_eq!(values, vec![200.0, 2.0, 400.0]);
        assert_eq!(amounts[0].line_id, 3);
        assert_eq!(amounts[0].confidence, 0.9);
        assert_eq!(amounts[0].source_text, "Item 200 x 2");
        assert_eq!(amounts[2].line_id, 2);
        assert_eq!(amounts[2].confidence, 0.5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let amount = ExtractedAmount {
            line_id: 4,
            source_text: "Total 5".to_string(),
            amount: 5.0,
            confidence: 0.5,
        };
        let json = serde_json::to_value(&amount).unwrap();
        assert_eq!(json["lineId"], 4);
        assert_eq!(json["sourceText"], "Total 5");
        assert_eq!(json["amount"], 5.0);
    }
}
