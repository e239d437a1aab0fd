use std::collections::BTreeMap;

use taqyim_core::parser::{parse_legacy_delimited, parse_upload};
use taqyim_core::{CoreError, IngestConfig};

fn config() -> IngestConfig {
    IngestConfig::default()
}

#[test]
fn bilingual_csv_row_parses() {
    let csv = "Paragraph,Ideological_EN,Ideological_AR\nhello,Bad,سيء\n";
    let records = parse_upload(csv.as_bytes(), "upload.csv", "csv", &config()).unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.text, "hello");
    assert_eq!(record.tag_en, "Bad");
    assert_eq!(record.tag_ar, "سيء");
}

#[test]
fn original_tags_round_trip() {
    let csv = "Paragraph,Ideological_EN,Ideological_AR,Functional_EN\nhello,Bad,سيء,\n";
    let records = parse_upload(csv.as_bytes(), "upload.csv", "csv", &config()).unwrap();

    let tags: BTreeMap<String, String> =
        serde_json::from_str(&records[0].original_tags).unwrap();
    let expected: BTreeMap<String, String> = [
        ("ideological_en".to_string(), "Bad".to_string()),
        ("ideological_ar".to_string(), "سيء".to_string()),
    ]
    .into_iter()
    .collect();

    // Blank cells are dropped, not stored as empty strings.
    assert_eq!(tags, expected);
}

#[test]
fn rows_without_text_are_skipped_silently() {
    let csv = "Paragraph,Ideological_EN\nfirst,Bad\n,Orphan\nsecond,Good\n";
    let records = parse_upload(csv.as_bytes(), "upload.csv", "csv", &config()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "first");
    assert_eq!(records[1].text, "second");
}

#[test]
fn text_column_discovered_by_length_heuristic() {
    let csv = "case_no,content,Ideological_EN\n\
               17,this paragraph is easily long enough to be the text column,Bad\n\
               18,and this one keeps the mean length comfortably high too,Good\n";
    let records = parse_upload(csv.as_bytes(), "upload.csv", "csv", &config()).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].text.starts_with("this paragraph"));
    assert_eq!(records[0].tag_en, "Bad");
}

#[test]
fn schema_error_when_no_text_candidate() {
    let csv = "a,b\n1,2\n3,4\n";
    let err = parse_upload(csv.as_bytes(), "upload.csv", "csv", &config()).unwrap_err();
    assert!(matches!(err, CoreError::Schema));
}

#[test]
fn unsupported_extension_is_rejected() {
    let err = parse_upload(b"whatever", "upload.pdf", "pdf", &config()).unwrap_err();
    assert!(matches!(err, CoreError::UnsupportedFileType { .. }));
}

#[test]
fn garbage_workbook_bytes_surface_spreadsheet_error() {
    let err = parse_upload(b"not a workbook", "upload.xlsx", "xlsx", &config()).unwrap_err();
    assert!(matches!(err, CoreError::Spreadsheet(_)));
}

#[test]
fn legacy_semicolon_lines_parse() {
    let text = "النص الأول;Neutral\nالنص الثاني;Question\n";
    let records = parse_legacy_delimited(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "النص الأول");
    assert_eq!(records[0].tag_en, "Neutral");
    assert_eq!(records[0].tag_ar, "محايد");
    assert_eq!(records[1].original_tags, "Question");
}

#[test]
fn legacy_payload_wraps_across_lines() {
    let text = "first text;{\"Neutral\":\n\"evidence\"}\nsecond text;Plain\n";
    let records = parse_legacy_delimited(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "first text");
    assert_eq!(records[0].tag_en, "Neutral");
    assert_eq!(records[1].tag_en, "Plain");
}

#[test]
fn legacy_semicolon_inside_quotes_is_not_a_delimiter() {
    let text = "\"quoted; not a split\" more;Neutral\n";
    let records = parse_legacy_delimited(text);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "\"quoted; not a split\" more".trim_matches('"'));
    assert_eq!(records[0].tag_en, "Neutral");
}

#[test]
fn csv_extension_with_semicolon_content_takes_legacy_path() {
    let text = "نص طويل بما يكفي;Neutral\n";
    let records = parse_upload(text.as_bytes(), "legacy.csv", "csv", &config()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag_en, "Neutral");
}

#[test]
fn windows_1256_bytes_are_recovered() {
    let line = "النص العربي;Neutral\n";
    let (encoded, _, _) = encoding_rs::WINDOWS_1256.encode(line);
    assert!(std::str::from_utf8(&encoded).is_err());

    let records = parse_upload(&encoded, "legacy.csv", "csv", &config()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text, "النص العربي");
}
