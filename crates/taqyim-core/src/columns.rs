//! Header normalization for uploaded spreadsheets.
//!
//! Several generations of annotation templates are in circulation; this
//! module maps whatever headers a file carries onto one canonical schema so
//! the rest of the pipeline never sees the historical spellings.

use tracing::warn;

/// Canonical name of the free-text column.
pub const TEXT_FIELD: &str = "text";

/// The full canonical schema, text first, then the four bilingual tag
/// category pairs.
pub const CANONICAL_FIELDS: [&str; 9] = [
    "text",
    "ideological_en",
    "ideological_ar",
    "syntactic_en",
    "syntactic_ar",
    "functional_en",
    "functional_ar",
    "discourse_en",
    "discourse_ar",
];

/// Exact headers of the bilingual template, matched before any folding.
const EXPECTED_HEADERS: [(&str, &str); 9] = [
    ("Paragraph", "text"),
    ("Ideological_EN", "ideological_en"),
    ("Ideological_AR", "ideological_ar"),
    ("Syntactic_EN", "syntactic_en"),
    ("Syntactic_AR", "syntactic_ar"),
    ("Functional_EN", "functional_en"),
    ("Functional_AR", "functional_ar"),
    ("Discourse_EN", "discourse_en"),
    ("Discourse_AR", "discourse_ar"),
];

/// Broader synonym table over case-folded, underscore-normalized names.
/// Arabic category names alias the Arabic-value columns.
const CANONICAL_MAP: [(&str, &str); 22] = [
    ("paragraph", "text"),
    ("النص", "text"),
    ("text", "text"),
    ("ideological_en", "ideological_en"),
    ("ideological_ar", "ideological_ar"),
    ("ideology_en", "ideological_en"),
    ("ideology_ar", "ideological_ar"),
    ("الأيديولوجي", "ideological_ar"),
    ("syntactic_en", "syntactic_en"),
    ("syntactic_ar", "syntactic_ar"),
    ("syntax_en", "syntactic_en"),
    ("syntax_ar", "syntactic_ar"),
    ("التركيبي", "syntactic_ar"),
    ("functional_en", "functional_en"),
    ("functional_ar", "functional_ar"),
    ("function_en", "functional_en"),
    ("function_ar", "functional_ar"),
    ("الوظيفي", "functional_ar"),
    ("discourse_en", "discourse_en"),
    ("discourse_ar", "discourse_ar"),
    ("الخطابي", "discourse_ar"),
    ("خطابي", "discourse_ar"),
];

pub fn is_canonical(name: &str) -> bool {
    CANONICAL_FIELDS.contains(&name)
}

/// Case-fold and whitespace/underscore-normalize a header.
fn fold(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn lookup(header: &str) -> Option<&'static str> {
    if let Some((_, canonical)) = EXPECTED_HEADERS.iter().find(|(h, _)| *h == header.trim()) {
        return Some(canonical);
    }
    let folded = fold(header);
    CANONICAL_MAP
        .iter()
        .find(|(alias, _)| *alias == folded)
        .map(|(_, canonical)| *canonical)
}

/// Map each original header to its canonical field name. Headers that match
/// neither table pass through folded, as extra ungrouped columns. When two
/// headers resolve to the same canonical field the first wins; the rest pass
/// through folded so no canonical name appears twice.
pub fn normalize_headers(headers: &[String]) -> Vec<(String, String)> {
    let mut assigned: Vec<&'static str> = Vec::new();
    headers
        .iter()
        .map(|header| {
            match lookup(header) {
                Some(canonical) if !assigned.contains(&canonical) => {
                    assigned.push(canonical);
                    (header.clone(), canonical.to_string())
                }
                _ => (header.clone(), fold(header)),
            }
        })
        .collect()
}

/// Fallback text-column discovery: among the given columns, pick the one
/// whose values have the greatest mean string length, provided it exceeds
/// `threshold`. Returns the column index.
///
/// This is inherently fuzzy, so its use is logged rather than silent.
pub fn discover_text_column(
    names: &[String],
    rows: &[Vec<String>],
    threshold: f64,
) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for idx in 0..names.len() {
        let (mut total, mut count) = (0usize, 0usize);
        for row in rows {
            if let Some(cell) = row.get(idx) {
                total += cell.chars().count();
                count += 1;
            }
        }
        if count == 0 {
            continue;
        }
        let mean = total as f64 / count as f64;
        if best.map_or(true, |(_, m)| mean > m) {
            best = Some((idx, mean));
        }
    }

    match best {
        Some((idx, mean)) if mean > threshold => {
            warn!(
                column = %names[idx],
                mean_length = mean,
                "no header resolved to the text column; falling back to longest-valued column"
            );
            Some(idx)
        }
        _ => None,
    }
}
