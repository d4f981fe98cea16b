//! Test doubles for the page controllers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use namaste_core::admin::MessageResponse;
use namaste_core::notification::Notification;
use namaste_core::statistics::{Health, Statistics, StatisticsResponse};
use namaste_core::terminology::{
    CodeSystem, SearchResponse, SearchTerm, TranslationResponse, TranslationResult,
    TranslationSource,
};
use serde_json::{json, Map, Value};

use crate::api::TerminologyApi;
use crate::cache::QueryCache;
use crate::clipboard::Clipboard;
use crate::notify::Notifier;
use crate::pages::PageContext;
use crate::prelude::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(String),
    Translate(String),
    TranslateCode(String, CodeSystem),
    Statistics,
    CodeSystem,
    ConceptMap,
    IngestCsv(String),
    IngestBundle(Value),
    LoadSample,
    ClearData,
    Health,
}

/// Records every call and answers from canned data, or fails when told to.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<Error>>,
    translations: Mutex<Vec<TranslationResult>>,
    search_results: Mutex<Vec<SearchTerm>>,
    statistics: Mutex<Statistics>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, err: Error) {
        *self.failure.lock().unwrap() = Some(err);
    }

    pub fn set_translations(&self, translations: Vec<TranslationResult>) {
        *self.translations.lock().unwrap() = translations;
    }

    pub fn set_search_results(&self, results: Vec<SearchTerm>) {
        *self.search_results.lock().unwrap() = results;
    }

    pub fn set_total_terms(&self, total: u64) {
        self.statistics.lock().unwrap().total_terms = total;
    }

    /// Make every call take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn respond<T>(&self, call: Call, ok: impl FnOnce() -> T) -> Result<T, Error> {
        self.calls.lock().unwrap().push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(err) => Err(err),
            None => Ok(ok()),
        }
    }

    fn translation_response(&self, code: &str, system: CodeSystem) -> TranslationResponse {
        let translations = self.translations.lock().unwrap().clone();
        TranslationResponse {
            source: TranslationSource {
                code: code.to_string(),
                system,
            },
            total: translations.len() as u64,
            translations,
            timestamp: "2024-03-01T10:15:30Z".to_string(),
        }
    }
}

fn ack(message: &str) -> MessageResponse {
    MessageResponse {
        message: Some(message.to_string()),
    }
}

#[async_trait]
impl TerminologyApi for FakeApi {
    async fn search(&self, query: &str) -> Result<SearchResponse, Error> {
        let results = self.search_results.lock().unwrap().clone();
        self.respond(Call::Search(query.to_string()), || SearchResponse { results })
            .await
    }

    async fn translate(&self, code: &str) -> Result<TranslationResponse, Error> {
        let response = self.translation_response(code, CodeSystem::Namaste);
        self.respond(Call::Translate(code.to_string()), || response)
            .await
    }

    async fn translate_code(
        &self,
        code: &str,
        system: CodeSystem,
    ) -> Result<TranslationResponse, Error> {
        let response = self.translation_response(code, system);
        self.respond(Call::TranslateCode(code.to_string(), system), || response)
            .await
    }

    async fn statistics(&self) -> Result<StatisticsResponse, Error> {
        let statistics = *self.statistics.lock().unwrap();
        self.respond(Call::Statistics, || StatisticsResponse {
            statistics: Some(statistics),
        })
        .await
    }

    async fn code_system(&self) -> Result<Value, Error> {
        self.respond(Call::CodeSystem, code_system_fixture).await
    }

    async fn concept_map(&self) -> Result<Value, Error> {
        self.respond(Call::ConceptMap, concept_map_fixture).await
    }

    async fn ingest_csv(&self, content: String) -> Result<MessageResponse, Error> {
        self.respond(Call::IngestCsv(content), || ack("Ingested 3 terms"))
            .await
    }

    async fn ingest_bundle(&self, bundle: Value) -> Result<MessageResponse, Error> {
        self.respond(Call::IngestBundle(bundle), || ack("Bundle stored"))
            .await
    }

    async fn load_sample_data(&self) -> Result<MessageResponse, Error> {
        self.respond(Call::LoadSample, || ack("Sample data loaded"))
            .await
    }

    async fn clear_data(&self) -> Result<MessageResponse, Error> {
        self.respond(Call::ClearData, || ack("Cleared")).await
    }

    async fn health(&self) -> Result<Health, Error> {
        self.respond(Call::Health, || Health {
            status: "OK".to_string(),
            details: Map::new(),
        })
        .await
    }
}

pub fn code_system_fixture() -> Value {
    json!({
        "resourceType": "CodeSystem",
        "url": "http://example.org/fhir/CodeSystem/namaste",
        "concept": [
            {"code": "AY001", "display": "Amlapitta"},
            {"code": "AY002", "display": "Vata Dosha Imbalance"},
            {"code": "UN001", "display": "Mizaj-e-Har"}
        ]
    })
}

pub fn concept_map_fixture() -> Value {
    json!({
        "resourceType": "ConceptMap",
        "group": [{
            "source": "NAMASTE",
            "target": "ICD-11-TM2",
            "element": [
                {"code": "AY001", "target": [{"code": "TM2-AY134"}]},
                {"code": "UN001", "target": [{"code": "TM2-UN045"}]}
            ]
        }]
    })
}

pub fn tm2(code: &str, display: &str) -> TranslationResult {
    TranslationResult {
        code: code.to_string(),
        system: CodeSystem::Icd11Tm2,
        display: display.to_string(),
    }
}

pub fn http_error(status: u16, message: Option<&str>) -> Error {
    Error::Http {
        status,
        message: message.map(str::to_string),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.notifications.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<(), Error> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Everything a page test needs, with handles to inspect afterwards.
pub struct Harness {
    pub ctx: PageContext,
    pub api: Arc<FakeApi>,
    pub notifier: Arc<RecordingNotifier>,
    pub clipboard: Arc<RecordingClipboard>,
}

impl Harness {
    pub fn new() -> Self {
        let api = Arc::new(FakeApi::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let ctx = PageContext::new(api.clone(), QueryCache::new(), notifier.clone());

        Self {
            ctx,
            api,
            notifier,
            clipboard,
        }
    }
}
