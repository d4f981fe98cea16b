//! Code systems and the translation / search payloads returned by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

const ICD11_BROWSER_BASE: &str = "https://icd.who.int/browse11/l-m/en#/http://id.who.int/icd/entity";

/// Coding system a terminology code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeSystem {
    #[default]
    #[serde(rename = "NAMASTE")]
    Namaste,
    #[serde(rename = "ICD-11-TM2")]
    Icd11Tm2,
}

impl CodeSystem {
    /// Identifier used on the wire and in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeSystem::Namaste => "NAMASTE",
            CodeSystem::Icd11Tm2 => "ICD-11-TM2",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CodeSystem::Namaste => "NAMASTE (Traditional Medicine)",
            CodeSystem::Icd11Tm2 => "ICD-11 TM2 (International)",
        }
    }

    /// Example code shown while the input is empty.
    pub fn placeholder(&self) -> &'static str {
        match self {
            CodeSystem::Namaste => "e.g., AY001",
            CodeSystem::Icd11Tm2 => "e.g., TM2-AY134",
        }
    }

    /// The system codes are translated into; always the other one.
    pub fn target(&self) -> CodeSystem {
        match self {
            CodeSystem::Namaste => CodeSystem::Icd11Tm2,
            CodeSystem::Icd11Tm2 => CodeSystem::Namaste,
        }
    }
}

impl std::fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CodeSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "NAMASTE" => Ok(CodeSystem::Namaste),
            "ICD-11-TM2" | "ICD11-TM2" | "TM2" | "ICD" => Ok(CodeSystem::Icd11Tm2),
            other => Err(format!(
                "Unknown code system: {other} (expected NAMASTE or ICD-11-TM2)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub code: String,
    pub system: CodeSystem,
    pub display: String,
}

impl TranslationResult {
    /// Link to the WHO ICD-11 browser; only ICD-11 TM2 codes have one.
    pub fn browser_url(&self) -> Option<String> {
        match self.system {
            CodeSystem::Icd11Tm2 => Some(format!("{ICD11_BROWSER_BASE}/{}", self.code)),
            CodeSystem::Namaste => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationSource {
    pub code: String,
    pub system: CodeSystem,
}

/// Response of the translate endpoint.
///
/// `total` is reported by the backend and is not checked against
/// `translations.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub source: TranslationSource,
    #[serde(default)]
    pub translations: Vec<TranslationResult>,
    #[serde(default)]
    pub total: u64,
    pub timestamp: String,
}

impl TranslationResponse {
    /// System of the first translation, or "Unknown" when there is none.
    pub fn target_label(&self) -> &'static str {
        self.translations
            .first()
            .map(|t| t.system.as_str())
            .unwrap_or("Unknown")
    }

    pub fn completed_at(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// A term returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    pub term_id: String,
    pub term_label: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub icd11_tm2_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl SearchTerm {
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description available.")
    }

    /// ICD-11 TM2 mapping, ignoring empty strings the CSV importer may leave.
    pub fn tm2_code(&self) -> Option<&str> {
        self.icd11_tm2_code.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchTerm>,
}

/// Trim a search query, rejecting it when nothing is left.
pub fn prepare_search_query(input: &str) -> Result<String, Error> {
    let query = input.trim();
    if query.is_empty() {
        return Err(Error::validation("Please enter a search term."));
    }
    Ok(query.to_string())
}

/// Format an ISO-8601 timestamp for display, returning the input unchanged
/// when it does not parse.
pub fn format_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| timestamp.to_string())
}
