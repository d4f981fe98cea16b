//! HTTP client for the terminology backend.
//!
//! Every backend operation is one method on [`TerminologyApi`]. Pages hold the
//! trait object, so the production [`HttpApi`] can be swapped for a recording
//! double in tests. Calls are never retried; failures are returned as-is.

use async_trait::async_trait;
use namaste_core::admin::{MessageResponse, CSV_MEDIA_TYPE};
use namaste_core::fhir::FhirResourceKind;
use namaste_core::statistics::{Health, StatisticsResponse};
use namaste_core::terminology::{CodeSystem, SearchResponse, TranslationResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::prelude::Error;

const SEARCH_PATH: &str = "/api/terminology/search";
const TRANSLATE_PATH: &str = "/api/terminology/translate";
const STATISTICS_PATH: &str = "/api/terminology/statistics";
const LOAD_SAMPLE_PATH: &str = "/api/terminology/load-sample";
const CLEAR_PATH: &str = "/api/terminology/clear";
const CODE_SYSTEM_PATH: &str = "/api/fhir/codesystem";
const CONCEPT_MAP_PATH: &str = "/api/fhir/conceptmap";
const BUNDLE_PATH: &str = "/api/fhir/bundle";
const INGEST_CSV_PATH: &str = "/admin/ingest-csv";
const HEALTH_PATH: &str = "/health";

/// Multipart field carrying the uploaded CSV.
pub const CSV_FORM_FIELD: &str = "csvFile";

#[async_trait]
pub trait TerminologyApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, Error>;

    /// Translate a code without naming its system; the backend guesses.
    async fn translate(&self, code: &str) -> Result<TranslationResponse, Error>;

    async fn translate_code(
        &self,
        code: &str,
        system: CodeSystem,
    ) -> Result<TranslationResponse, Error>;

    async fn statistics(&self) -> Result<StatisticsResponse, Error>;

    async fn code_system(&self) -> Result<Value, Error>;

    async fn concept_map(&self) -> Result<Value, Error>;

    async fn ingest_csv(&self, content: String) -> Result<MessageResponse, Error>;

    async fn ingest_bundle(&self, bundle: Value) -> Result<MessageResponse, Error>;

    async fn load_sample_data(&self) -> Result<MessageResponse, Error>;

    async fn clear_data(&self) -> Result<MessageResponse, Error>;

    async fn health(&self) -> Result<Health, Error>;

    async fn fhir_resource(&self, kind: FhirResourceKind) -> Result<Value, Error> {
        match kind {
            FhirResourceKind::CodeSystem => self.code_system().await,
            FhirResourceKind::ConceptMap => self.concept_map().await,
        }
    }
}

/// Backend location, read from the environment and overridable from the CLI.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:3000";

    /// Uses NAMASTE_API_URL with default fallback
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("NAMASTE_API_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }
}

/// [`TerminologyApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, Error> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("namaste/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[cfg(test)]
    fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, Error> {
        let response = request.send().await.map_err(|e| {
            log::debug!("request failed before a response arrived: {e:?}");
            Error::Network(e.to_string())
        })?;

        let response = check_response(response).await?;

        response.json::<T>().await.map_err(|e| {
            log::debug!("failed to decode backend response: {e:?}");
            Error::Decode(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, Error> {
        log::debug!("GET {path} {query:?}");
        self.send(self.client.get(self.url(path)).query(query)).await
    }
}

/// Check that an HTTP response was successful, turning non-2xx replies into
/// [`Error::Http`] with the backend's `message` when the body carries one.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::debug!("backend error [{status}]: {body}");

    let message = serde_json::from_str::<MessageResponse>(&body)
        .ok()
        .and_then(|b| b.message);

    Err(Error::Http {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TerminologyApi for HttpApi {
    async fn search(&self, query: &str) -> Result<SearchResponse, Error> {
        self.get(SEARCH_PATH, &[("q", query)]).await
    }

    async fn translate(&self, code: &str) -> Result<TranslationResponse, Error> {
        self.get(TRANSLATE_PATH, &[("code", code)]).await
    }

    async fn translate_code(
        &self,
        code: &str,
        system: CodeSystem,
    ) -> Result<TranslationResponse, Error> {
        self.get(TRANSLATE_PATH, &[("code", code), ("system", system.as_str())])
            .await
    }

    async fn statistics(&self) -> Result<StatisticsResponse, Error> {
        self.get(STATISTICS_PATH, &[]).await
    }

    async fn code_system(&self) -> Result<Value, Error> {
        self.get(CODE_SYSTEM_PATH, &[]).await
    }

    async fn concept_map(&self) -> Result<Value, Error> {
        self.get(CONCEPT_MAP_PATH, &[]).await
    }

    async fn ingest_csv(&self, content: String) -> Result<MessageResponse, Error> {
        log::debug!("POST {INGEST_CSV_PATH} ({} bytes)", content.len());

        let part = reqwest::multipart::Part::text(content)
            .file_name("upload.csv")
            .mime_str(CSV_MEDIA_TYPE)
            .map_err(|e| Error::Network(format!("Invalid MIME type: {e}")))?;
        let form = reqwest::multipart::Form::new().part(CSV_FORM_FIELD, part);

        self.send(self.client.post(self.url(INGEST_CSV_PATH)).multipart(form))
            .await
    }

    async fn ingest_bundle(&self, bundle: Value) -> Result<MessageResponse, Error> {
        log::debug!("POST {BUNDLE_PATH}");
        self.send(self.client.post(self.url(BUNDLE_PATH)).json(&bundle))
            .await
    }

    async fn load_sample_data(&self) -> Result<MessageResponse, Error> {
        log::debug!("POST {LOAD_SAMPLE_PATH}");
        self.send(self.client.post(self.url(LOAD_SAMPLE_PATH))).await
    }

    async fn clear_data(&self) -> Result<MessageResponse, Error> {
        log::debug!("DELETE {CLEAR_PATH}");
        self.send(self.client.delete(self.url(CLEAR_PATH))).await
    }

    async fn health(&self) -> Result<Health, Error> {
        self.get(HEALTH_PATH, &[]).await
    }
}
