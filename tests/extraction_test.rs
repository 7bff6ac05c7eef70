//! End-to-end extraction through the library API with a preset engine

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use receipt_ocr::engines::fixed::FixedRecognizer;
use receipt_ocr::{extract_amounts, ExtractionConfig, OcrError, OcrProcessor, Recognizer, Token};
use std::io::Cursor;
use std::sync::Arc;

fn receipt_png() -> Vec<u8> {
    let mut img = GrayImage::from_pixel(160, 120, Luma([240]));
    for y in [30u32, 31, 60, 61, 90, 91] {
        for x in 20..140 {
            img.put_pixel(x, y, Luma([20]));
        }
    }
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn engine(lines: &[(&str, f32)]) -> Arc<dyn Recognizer> {
    Arc::new(FixedRecognizer::from_lines(lines))
}

#[test]
fn test_receipt_amounts_are_triaged() {
    let recognizer = engine(&[
        ("SHOPRITE LEKKI", 0.97),
        ("Rice 5kg NGN 12,500.00", 0.91),
        ("Amount Due N 1,000.50", 0.92),
        ("Change naira 450", 0.55),
    ]);

    let result = extract_amounts(&receipt_png(), recognizer, &ExtractionConfig::default()).unwrap();

    let amounts: Vec<f64> = result.all.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![5.0, 12500.0, 1000.5, 450.0]);

    let auto: Vec<f64> = result.auto_import.iter().map(|a| a.amount).collect();
    let manual: Vec<f64> = result.needs_confirm.iter().map(|a| a.amount).collect();
    assert_eq!(auto, vec![5.0, 12500.0, 1000.5]);
    assert_eq!(manual, vec![450.0]);

    assert_eq!(result.meta.count, 4);
    let expected_avg = (0.91 + 0.91 + 0.92 + 0.55) / 4.0;
    assert!((result.meta.avg_confidence - expected_avg).abs() < 1e-5);
}

#[test]
fn test_amount_keeps_line_text_and_confidence() {
    let recognizer = engine(&[("Total ₦ 7,250", 0.88)]);
    let result = extract_amounts(&receipt_png(), recognizer, &ExtractionConfig::default()).unwrap();

    assert_eq!(result.all.len(), 1);
    let amount = &result.all[0];
    assert_eq!(amount.line_id, 0);
    assert_eq!(amount.source_text, "Total ₦ 7,250");
    assert_eq!(amount.amount, 7250.0);
    assert_eq!(amount.confidence, 0.88);
}

#[test]
fn test_currency_markers_are_case_insensitive() {
    let recognizer = engine(&[("ngn 300", 0.9), ("NAIRA 40.5", 0.9)]);
    let result = extract_amounts(&receipt_png(), recognizer, &ExtractionConfig::default()).unwrap();

    let amounts: Vec<f64> = result.all.iter().map(|a| a.amount).collect();
    assert_eq!(amounts, vec![300.0, 40.5]);
}

#[test]
fn test_per_call_threshold_changes_partition() {
    let processor = OcrProcessor::new(
        engine(&[("Subtotal 900", 0.70), ("Total 1,200", 0.95)]),
        ExtractionConfig::default(),
    )
    .unwrap();

    let strict = processor
        .extract_amounts_with_threshold(&receipt_png(), 1.0)
        .unwrap();
    assert!(strict.auto_import.is_empty());
    assert_eq!(strict.needs_confirm.len(), 2);

    let lenient = processor
        .extract_amounts_with_threshold(&receipt_png(), 0.0)
        .unwrap();
    assert_eq!(lenient.auto_import.len(), 2);
    assert!(lenient.needs_confirm.is_empty());
}

#[test]
fn test_blank_receipt_yields_empty_result() {
    let result = extract_amounts(
        &receipt_png(),
        Arc::new(FixedRecognizer::new(Vec::new())),
        &ExtractionConfig::default(),
    )
    .unwrap();

    assert!(result.all.is_empty());
    assert!(result.auto_import.is_empty());
    assert!(result.needs_confirm.is_empty());
    assert_eq!(result.meta.count, 0);
    assert_eq!(result.meta.avg_confidence, 0.0);
}

#[test]
fn test_tokens_on_one_line_share_mean_confidence() {
    let recognizer = Arc::new(FixedRecognizer::new(vec![
        Token::new("Total", 3, 0.9),
        Token::new("N500", 3, 0.7),
        Token::new("Thanks", 4, 0.99),
    ]));

    let result = extract_amounts(&receipt_png(), recognizer, &ExtractionConfig::default()).unwrap();

    assert_eq!(result.all.len(), 1);
    assert_eq!(result.all[0].line_id, 3);
    assert_eq!(result.all[0].source_text, "Total N500");
    assert!((result.all[0].confidence - 0.8).abs() < 1e-6);
}

#[test]
fn test_undecodable_bytes_fail_at_decode_stage() {
    let err = extract_amounts(b"not an image", engine(&[]), &ExtractionConfig::default())
        .unwrap_err();

    assert!(matches!(err, OcrError::Decode(_)));
    assert_eq!(err.stage(), "decode");
}

#[test]
fn test_out_of_range_threshold_is_config_error() {
    let config = ExtractionConfig {
        confidence_threshold: 1.5,
        ..Default::default()
    };
    let err = extract_amounts(&receipt_png(), engine(&[]), &config).unwrap_err();
    assert!(matches!(err, OcrError::Config(_)));
}
