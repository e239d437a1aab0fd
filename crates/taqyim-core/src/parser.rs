//! Record parsing for every upload shape the platform has historically
//! accepted: bilingual-template spreadsheets (xlsx/xls), structured CSV, and
//! the legacy semicolon-delimited text dumps. One entry point decides which
//! parser applies, keyed on the declared extension plus a content probe.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::columns::{self, TEXT_FIELD};
use crate::config::IngestConfig;
use crate::encoding::decode_text;
use crate::error::{CoreError, Result};
use crate::tags;

/// One normalized record, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub text: String,
    /// Lossless serialization of the tag set found on this row: a JSON
    /// object for structured inputs, the raw payload for legacy text.
    pub original_tags: String,
    pub tag_en: String,
    pub tag_ar: String,
}

/// Parse one uploaded file into records. Spreadsheet extensions go straight
/// to the workbook reader; csv/txt is decoded first, then a header probe
/// decides between structured CSV and the legacy semicolon format.
pub fn parse_upload(
    bytes: &[u8],
    filename: &str,
    extension: &str,
    config: &IngestConfig,
) -> Result<Vec<ParsedRecord>> {
    let extension = extension.trim_start_matches('.').to_lowercase();
    match extension.as_str() {
        "xlsx" | "xls" => parse_workbook(bytes, config),
        "csv" | "txt" => {
            let text = decode_text(bytes, filename)?;
            if probe_structured_header(&text) {
                parse_structured_csv(&text, config)
            } else if text.lines().any(has_unquoted_semicolon) {
                Ok(parse_legacy_delimited(&text))
            } else {
                parse_structured_csv(&text, config)
            }
        }
        other => Err(CoreError::UnsupportedFileType {
            extension: other.to_string(),
        }),
    }
}

/// True when the first non-blank line looks like a header row of the
/// structured shape, i.e. any comma-separated field normalizes to a
/// canonical column name.
fn probe_structured_header(text: &str) -> bool {
    let Some(line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return false;
    };
    let headers: Vec<String> = line.split(',').map(|h| h.trim().to_string()).collect();
    columns::normalize_headers(&headers)
        .iter()
        .any(|(_, canonical)| columns::is_canonical(canonical))
}

fn parse_workbook(bytes: &[u8], config: &IngestConfig) -> Result<Vec<ParsedRecord>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CoreError::Spreadsheet("workbook contains no sheets".to_string()))?
        .map_err(|e| CoreError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => return Err(CoreError::Schema),
    };
    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    build_records(&headers, &data, config)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn parse_structured_csv(text: &str, config: &IngestConfig) -> Result<Vec<ParsedRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut data = Vec::new();
    for record in reader.records() {
        let record = record?;
        data.push(record.iter().map(|c| c.trim().to_string()).collect());
    }

    build_records(&headers, &data, config)
}

/// Shared row assembly for the structured shapes: normalize headers, resolve
/// the text column (table match first, length heuristic second), collect the
/// non-empty tag cells per row and resolve the primary pair.
fn build_records(
    headers: &[String],
    data: &[Vec<String>],
    config: &IngestConfig,
) -> Result<Vec<ParsedRecord>> {
    let mapping = columns::normalize_headers(headers);
    let mut names: Vec<String> = mapping.into_iter().map(|(_, canonical)| canonical).collect();

    let text_idx = match names.iter().position(|n| n == TEXT_FIELD) {
        Some(idx) => idx,
        None => {
            // Only columns outside the canonical tag schema are candidates.
            let candidates: Vec<usize> = (0..names.len())
                .filter(|&i| !columns::is_canonical(&names[i]))
                .collect();
            let candidate_names: Vec<String> =
                candidates.iter().map(|&i| names[i].clone()).collect();
            let candidate_rows: Vec<Vec<String>> = data
                .iter()
                .map(|row| {
                    candidates
                        .iter()
                        .map(|&i| row.get(i).cloned().unwrap_or_default())
                        .collect()
                })
                .collect();
            let picked = columns::discover_text_column(
                &candidate_names,
                &candidate_rows,
                config.text_length_threshold,
            )
            .ok_or(CoreError::Schema)?;
            candidates[picked]
        }
    };
    names[text_idx] = TEXT_FIELD.to_string();

    let mut records = Vec::new();
    for row in data {
        let text = row.get(text_idx).map(|c| c.trim()).unwrap_or_default();
        if text.is_empty() {
            // Not an error: rows without text are excluded entirely.
            continue;
        }

        let mut row_tags: BTreeMap<String, String> = BTreeMap::new();
        for (idx, name) in names.iter().enumerate() {
            if idx == text_idx {
                continue;
            }
            if let Some(value) = row.get(idx).map(|c| c.trim()).filter(|v| !v.is_empty()) {
                row_tags.insert(name.clone(), value.to_string());
            }
        }

        let resolved = tags::resolve_from_columns(&row_tags);
        records.push(ParsedRecord {
            text: text.to_string(),
            original_tags: serde_json::to_string(&row_tags)?,
            tag_en: resolved.en,
            tag_ar: resolved.ar,
        });
    }

    Ok(records)
}

/// Legacy dump format: `text;tag-payload` per record, where the payload may
/// wrap across physical lines. A line with an unquoted semicolon starts a
/// new record; anything else continues the previous record's payload.
pub fn parse_legacy_delimited(text: &str) -> Vec<ParsedRecord> {
    let mut records = Vec::new();
    let mut current_text = String::new();
    let mut current_payload = String::new();

    fn flush(text: &str, payload: &str, out: &mut Vec<ParsedRecord>) {
        let text = text.trim_matches('"').trim();
        let payload = payload.trim();
        if text.is_empty() || payload.is_empty() {
            return;
        }
        let resolved = tags::resolve_from_payload(payload);
        out.push(ParsedRecord {
            text: text.to_string(),
            original_tags: payload.to_string(),
            tag_en: resolved.en,
            tag_ar: resolved.ar,
        });
    }

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(split) = unquoted_semicolon(line) {
            flush(&current_text, &current_payload, &mut records);
            current_text = line[..split].trim().to_string();
            current_payload = line[split + 1..].trim().to_string();
        } else {
            current_payload.push(' ');
            current_payload.push_str(line);
        }
    }
    flush(&current_text, &current_payload, &mut records);

    records
}

fn has_unquoted_semicolon(line: &str) -> bool {
    unquoted_semicolon(line).is_some()
}

/// Byte index of the first semicolon outside double quotes, if any.
fn unquoted_semicolon(line: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return Some(idx),
            _ => {}
        }
    }
    None
}
