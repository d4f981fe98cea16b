//! FHIR page: CodeSystem / ConceptMap panels and bundle parsing.

use serde::Serialize;
use serde_json::Value;

use crate::query::RequestStatus;
use crate::Error;

/// FHIR resources the backend can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FhirResourceKind {
    CodeSystem,
    ConceptMap,
}

impl FhirResourceKind {
    pub const ALL: [FhirResourceKind; 2] = [FhirResourceKind::CodeSystem, FhirResourceKind::ConceptMap];

    pub fn label(&self) -> &'static str {
        match self {
            FhirResourceKind::CodeSystem => "CodeSystem",
            FhirResourceKind::ConceptMap => "ConceptMap",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            FhirResourceKind::CodeSystem => "codesystem",
            FhirResourceKind::ConceptMap => "conceptmap",
        }
    }

    /// File name used when the resource is downloaded.
    pub fn file_name(&self) -> String {
        format!("namaste-{}.json", self.slug())
    }

    /// One-line size summary of a generated resource.
    pub fn summary(&self, resource: &Value) -> String {
        match self {
            FhirResourceKind::CodeSystem => format!("{} concepts", concept_count(resource)),
            FhirResourceKind::ConceptMap => format!("{} mappings", mapping_count(resource)),
        }
    }
}

impl std::fmt::Display for FhirResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of entries in a CodeSystem's `concept` array.
pub fn concept_count(resource: &Value) -> usize {
    resource
        .get("concept")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

/// Number of elements in the first group of a ConceptMap.
pub fn mapping_count(resource: &Value) -> usize {
    resource
        .get("group")
        .and_then(|g| g.get(0))
        .and_then(|g| g.get("element"))
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

/// Pretty-print with two-space indentation, as used for copy and download.
pub fn pretty_json(resource: &Value) -> String {
    serde_json::to_string_pretty(resource).unwrap_or_else(|_| resource.to_string())
}

/// Parse a FHIR bundle file locally before it is sent anywhere.
pub fn parse_bundle(content: &str) -> Result<Value, Error> {
    serde_json::from_str(content).map_err(|e| Error::MalformedJson(e.to_string()))
}

/// State of one resource panel: last payload, visibility and request status.
#[derive(Debug, Clone, Default)]
pub struct ResourcePanel {
    status: RequestStatus,
    visible: bool,
    payload: Option<Value>,
}

impl ResourcePanel {
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn begin(&mut self) {
        self.status = RequestStatus::Loading;
    }

    /// Store a freshly generated resource and show it.
    pub fn complete(&mut self, resource: Value) {
        self.status = RequestStatus::Success;
        self.payload = Some(resource);
        self.visible = true;
    }

    /// A failed generation keeps the previous payload and visibility.
    pub fn fail(&mut self) {
        self.status = RequestStatus::Error;
    }

    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Payload to render, only when the panel is shown.
    pub fn visible_payload(&self) -> Option<&Value> {
        self.payload.as_ref().filter(|_| self.visible)
    }
}
