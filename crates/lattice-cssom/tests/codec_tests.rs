//! Tests for stylesheet persistence.

use std::fs;

use lattice_cssom::codec;
use lattice_cssom::prelude::*;

const HTML40: &str = include_str!("fixtures/html40.css");

#[test]
fn test_default_html_sheet_parses_cleanly() {
    let mut handler = CollectingErrorHandler::new();
    let sheet = CssParser::new()
        .parse_style_sheet(&InputSource::new(HTML40), None, None, &mut handler)
        .unwrap();

    assert!(handler.is_clean(), "{:?}", handler.errors);
    assert_eq!(sheet.css_rules().len(), 47);

    let media: Vec<_> = sheet
        .css_rules()
        .iter()
        .filter_map(CssRule::as_media)
        .map(|rule| rule.media.media_text())
        .collect();
    assert_eq!(media, ["print", "aural"]);
}

#[test]
fn test_default_html_sheet_round_trip() {
    let sheet = StyleSheet::from_css(HTML40);
    let decoded = decode(&encode(&sheet).unwrap()).unwrap();

    assert_eq!(decoded, sheet);
    assert_eq!(decoded.to_string(), sheet.to_string());
    for rule in decoded.css_rules() {
        assert_eq!(rule.parent_style_sheet(), Some(decoded.id()));
    }
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheet.json");

    let mut sheet = StyleSheet::from_css("@media print { h1 { page-break-before: always } }");
    sheet.set_href(Some("file:///print.css".into()));

    codec::encode_to_writer(&sheet, fs::File::create(&path).unwrap()).unwrap();
    let decoded = codec::decode_from_reader(fs::File::open(&path).unwrap()).unwrap();

    assert_eq!(decoded, sheet);
    assert_eq!(decoded.href(), Some("file:///print.css"));
}

#[test]
fn test_reparsed_text_matches() {
    let sheet = StyleSheet::from_css(HTML40);
    let reparsed = StyleSheet::from_css(&sheet.to_string());
    assert_eq!(reparsed, sheet);
}
