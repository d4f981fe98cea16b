//! Admin page: CSV selection and upload state, sample template, preview.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Name of the downloadable sample file.
pub const SAMPLE_CSV_FILE_NAME: &str = "sample-namaste.csv";

/// Media type accepted for CSV ingestion.
pub const CSV_MEDIA_TYPE: &str = "text/csv";

/// Number of lines shown in the content preview.
pub const PREVIEW_LINES: usize = 5;

/// Sample NAMASTE CSV offered for download. Three rows, no trailing newline.
pub const SAMPLE_CSV: &str = concat!(
    "id,term,category,synonyms,icd11_tm2_code,references,description\n",
    "AY001,\"Amlapitta\",\"Ayurvedic Disease\",\"Dyspepsia,Sour indigestion\",\"TM2-AY134\",\"Charaka Samhita\",\"Acid dyspepsia characterized by sour belching and heartburn\"\n",
    "AY002,\"Vata Dosha Imbalance\",\"Ayurvedic Constitutional Disorder\",\"Wind disorder,Nervous system imbalance\",\"\",\"Sushruta Samhita\",\"Imbalance of Vata dosha affecting movement and nervous functions\"\n",
    "UN001,\"Mizaj-e-Har\",\"Unani Temperament\",\"Hot temperament,Warm constitution\",\"TM2-UN045\",\"Canon of Medicine\",\"Hot temperament in Unani medicine system\"",
);

/// Status of the CSV upload panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Error,
}

impl UploadStatus {
    /// Banner text; `None` while idle since no banner is shown.
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            UploadStatus::Idle => None,
            UploadStatus::Uploading => Some("Uploading..."),
            UploadStatus::Success => Some("Upload successful!"),
            UploadStatus::Error => Some("Upload failed!"),
        }
    }
}

/// Acknowledgement returned by mutating endpoints, and the body of non-2xx
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Declared media type of a file, inferred from its extension.
pub fn media_type_for(file_name: &str) -> &'static str {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };

    match ext.as_str() {
        "csv" => CSV_MEDIA_TYPE,
        "json" => "application/json",
        "txt" => "text/plain",
        "tsv" => "text/tab-separated-values",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Only `text/csv` is accepted for ingestion.
pub fn ensure_csv_media_type(media_type: &str) -> Result<(), Error> {
    if media_type == CSV_MEDIA_TYPE {
        Ok(())
    } else {
        Err(Error::UnsupportedMediaType(media_type.to_string()))
    }
}

pub fn ensure_csv_content(content: &str) -> Result<(), Error> {
    if content.trim().is_empty() {
        return Err(Error::validation(
            "Please select a CSV file or enter CSV content",
        ));
    }
    Ok(())
}

/// First lines of the selected content and how many were left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvPreview {
    pub lines: Vec<String>,
    pub remaining: usize,
}

impl CsvPreview {
    pub fn footer(&self) -> Option<String> {
        (self.remaining > 0).then(|| format!("... and {} more lines", self.remaining))
    }
}

/// Split on `\n` and keep the first `max_lines` entries.
pub fn csv_preview(content: &str, max_lines: usize) -> CsvPreview {
    let all: Vec<&str> = content.split('\n').collect();
    let remaining = all.len().saturating_sub(max_lines);

    CsvPreview {
        lines: all
            .into_iter()
            .take(max_lines)
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect(),
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // sample template tests
    // ============================================================================

    #[test]
    fn test_sample_csv_has_header_and_three_rows() {
        let lines: Vec<&str> = SAMPLE_CSV.split('\n').collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "id,term,category,synonyms,icd11_tm2_code,references,description"
        );
        assert!(lines[1].starts_with("AY001,\"Amlapitta\""));
        assert!(lines[2].starts_with("AY002,\"Vata Dosha Imbalance\""));
        assert!(lines[3].starts_with("UN001,\"Mizaj-e-Har\""));
        assert!(!SAMPLE_CSV.ends_with('\n'));
    }

    #[test]
    fn test_sample_csv_keeps_empty_tm2_column() {
        assert!(SAMPLE_CSV.contains("\"Wind disorder,Nervous system imbalance\",\"\","));
    }

    // ============================================================================
    // media type tests
    // ============================================================================

    #[test]
    fn test_media_type_for_csv_is_case_insensitive() {
        assert_eq!(media_type_for("terms.csv"), "text/csv");
        assert_eq!(media_type_for("TERMS.CSV"), "text/csv");
    }

    #[test]
    fn test_media_type_for_other_files() {
        assert_eq!(media_type_for("bundle.json"), "application/json");
        assert_eq!(media_type_for("notes"), "application/octet-stream");
        assert_eq!(media_type_for("terms.csv.bak"), "application/octet-stream");
    }

    #[test]
    fn test_ensure_csv_media_type() {
        assert!(ensure_csv_media_type("text/csv").is_ok());

        let err = ensure_csv_media_type("application/json").unwrap_err();
        assert_eq!(err.to_string(), "Please select a CSV file");
    }

    #[test]
    fn test_ensure_csv_content_rejects_whitespace() {
        assert!(ensure_csv_content("id,term\n").is_ok());
        assert_eq!(
            ensure_csv_content(" \n ").unwrap_err().to_string(),
            "Please select a CSV file or enter CSV content"
        );
    }

    // ============================================================================
    // preview tests
    // ============================================================================

    #[test]
    fn test_preview_of_sample_fits() {
        let preview = csv_preview(SAMPLE_CSV, PREVIEW_LINES);
        assert_eq!(preview.lines.len(), 4);
        assert_eq!(preview.remaining, 0);
        assert_eq!(preview.footer(), None);
    }

    #[test]
    fn test_preview_truncates_and_counts_rest() {
        let content = (1..=8).map(|i| format!("row{i}")).collect::<Vec<_>>().join("\n");
        let preview = csv_preview(&content, PREVIEW_LINES);

        assert_eq!(preview.lines, vec!["row1", "row2", "row3", "row4", "row5"]);
        assert_eq!(preview.remaining, 3);
        assert_eq!(preview.footer().unwrap(), "... and 3 more lines");
    }

    #[test]
    fn test_message_response_tolerates_missing_message() {
        let ack: MessageResponse = serde_json::from_str(r#"{"inserted": 3}"#).unwrap();
        assert_eq!(ack.message, None);

        let ack: MessageResponse =
            serde_json::from_str(r#"{"message": "Ingested 3 terms"}"#).unwrap();
        assert_eq!(ack.message.as_deref(), Some("Ingested 3 terms"));
    }

    #[test]
    fn test_upload_status_banners() {
        assert_eq!(UploadStatus::Idle.banner(), None);
        assert_eq!(UploadStatus::Uploading.banner(), Some("Uploading..."));
        assert_eq!(UploadStatus::Success.banner(), Some("Upload successful!"));
        assert_eq!(UploadStatus::Error.banner(), Some("Upload failed!"));
    }
}
