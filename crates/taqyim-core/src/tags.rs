//! Primary-tag resolution.
//!
//! Every record keeps its full tag set in `original_tags`; what is shown to
//! reviewers is a single (English, Arabic) pair picked here.

use std::collections::BTreeMap;

use serde_json::Value;

/// Display cap for resolved tags; `original_tags` keeps the full values.
pub const MAX_TAG_LEN: usize = 100;

/// Sentinel pair assigned when no category carries a value.
pub const UNKNOWN_TAG: (&str, &str) = ("Unknown", "<no-tag-found>");

/// Arabic sentinel recorded when a legacy tag payload fails to parse.
pub const PARSE_ERROR_AR: &str = "خطأ في التحليل";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagCategory {
    Ideological,
    Syntactic,
    Functional,
    Discourse,
}

impl TagCategory {
    /// Probe order; the first category with a value wins.
    pub const PRIORITY: [TagCategory; 4] = [
        TagCategory::Ideological,
        TagCategory::Syntactic,
        TagCategory::Functional,
        TagCategory::Discourse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TagCategory::Ideological => "ideological",
            TagCategory::Syntactic => "syntactic",
            TagCategory::Functional => "functional",
            TagCategory::Discourse => "discourse",
        }
    }

    pub fn en_field(&self) -> &'static str {
        match self {
            TagCategory::Ideological => "ideological_en",
            TagCategory::Syntactic => "syntactic_en",
            TagCategory::Functional => "functional_en",
            TagCategory::Discourse => "discourse_en",
        }
    }

    pub fn ar_field(&self) -> &'static str {
        match self {
            TagCategory::Ideological => "ideological_ar",
            TagCategory::Syntactic => "syntactic_ar",
            TagCategory::Functional => "functional_ar",
            TagCategory::Discourse => "discourse_ar",
        }
    }
}

/// English-to-Arabic tag glossary carried over from the annotation manual.
const TAG_TRANSLATIONS: [(&str, &str); 13] = [
    ("ReligiousReference", "مرجع ديني"),
    ("SelfRepresentation", "تمثيل الذات"),
    ("Negative_Other", "تشويه الآخر"),
    ("Call_to_Action", "دعوة للفعل"),
    ("Positive_Self", "تمجيد الذات"),
    ("Negative_Self", "انتقاد الذات"),
    ("Positive_Other", "مدح الآخر"),
    ("Neutral", "محايد"),
    ("Question", "سؤال"),
    ("Statement", "بيان"),
    ("Emotional", "عاطفي"),
    ("Factual", "حقائقي"),
    ("Opinion", "رأي"),
];

/// Arabic translation of an English tag, or the tag unchanged when the
/// glossary has no entry.
pub fn arabic_for(tag_en: &str) -> String {
    TAG_TRANSLATIONS
        .iter()
        .find(|(en, _)| *en == tag_en)
        .map(|(_, ar)| ar.to_string())
        .unwrap_or_else(|| tag_en.to_string())
}

fn english_for(tag_ar: &str) -> String {
    TAG_TRANSLATIONS
        .iter()
        .find(|(_, ar)| *ar == tag_ar)
        .map(|(en, _)| en.to_string())
        .unwrap_or_else(|| tag_ar.to_string())
}

/// Truncate on a character boundary to the display cap. Silent: the full
/// value survives in `original_tags`.
pub fn cap(value: &str) -> String {
    value.chars().take(MAX_TAG_LEN).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    pub en: String,
    pub ar: String,
}

impl ResolvedTag {
    fn unknown() -> Self {
        Self {
            en: UNKNOWN_TAG.0.to_string(),
            ar: UNKNOWN_TAG.1.to_string(),
        }
    }

    fn capped(en: String, ar: String) -> Self {
        Self {
            en: cap(&en),
            ar: cap(&ar),
        }
    }
}

fn non_empty<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    tags.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Pick the primary pair from normalized tag columns, probing the four
/// category pairs in priority order.
pub fn resolve_from_columns(tags: &BTreeMap<String, String>) -> ResolvedTag {
    for category in TagCategory::PRIORITY {
        let en = non_empty(tags, category.en_field());
        let ar = non_empty(tags, category.ar_field());
        match (en, ar) {
            (Some(en), Some(ar)) => {
                return ResolvedTag::capped(en.to_string(), ar.to_string());
            }
            (Some(en), None) => {
                return ResolvedTag::capped(en.to_string(), arabic_for(en));
            }
            (None, Some(ar)) => {
                return ResolvedTag::capped(english_for(ar), ar.to_string());
            }
            (None, None) => {}
        }
    }
    ResolvedTag::unknown()
}

/// Resolve the legacy semicolon-format tag payload. JSON-shaped payloads are
/// probed by category first, then by the first non-empty key (the tag name
/// itself in the oldest files). An unparseable JSON payload is a per-row
/// condition: the raw payload becomes the English tag and the Arabic side
/// records the parse failure.
pub fn resolve_from_payload(payload: &str) -> ResolvedTag {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return ResolvedTag::unknown();
    }

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(object)) => resolve_from_json(&object),
            Ok(_) | Err(_) => ResolvedTag {
                en: cap(trimmed),
                ar: PARSE_ERROR_AR.to_string(),
            },
        }
    } else {
        let en = cap(trimmed);
        let ar = arabic_for(&en);
        ResolvedTag::capped(en, ar)
    }
}

fn resolve_from_json(object: &serde_json::Map<String, Value>) -> ResolvedTag {
    let string_value = |key: &str| -> Option<&str> {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    // Newer payloads key tags by category.
    for category in TagCategory::PRIORITY {
        for key in [category.en_field(), category.name()] {
            if let Some(value) = string_value(key) {
                let ar = string_value(category.ar_field())
                    .map(str::to_string)
                    .unwrap_or_else(|| arabic_for(value));
                return ResolvedTag::capped(value.to_string(), ar);
            }
        }
    }

    // Oldest payloads use the tag name itself as the key.
    for (key, value) in object {
        if value.as_str().is_some_and(|v| !v.trim().is_empty()) {
            return ResolvedTag::capped(key.clone(), arabic_for(key));
        }
    }

    ResolvedTag::unknown()
}
