//! Page controllers.
//!
//! Each page owns its local state and talks to the backend through the
//! injected [`PageContext`]. The only state shared between pages is the
//! [`QueryCache`](crate::cache::QueryCache) inside that context.

pub mod admin;
pub mod dashboard;
pub mod fhir;
pub mod search;
pub mod translation;

use std::sync::Arc;

use namaste_core::notification::{failure_message, Notification};

use crate::api::{ApiConfig, HttpApi, TerminologyApi};
use crate::cache::QueryCache;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::prelude::{println, *};

/// Dependencies handed to every page.
#[derive(Clone)]
pub struct PageContext {
    pub api: Arc<dyn TerminologyApi>,
    pub cache: QueryCache,
    pub notifier: Arc<dyn Notifier>,
}

impl PageContext {
    pub fn new(api: Arc<dyn TerminologyApi>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    /// Production wiring: HTTP client, fresh cache, stderr notifications.
    pub fn from_global(global: &crate::Global) -> Result<Self> {
        let config = ApiConfig::from_env().with_overrides(global.api_url.clone());

        if global.verbose {
            println!("Terminology API: {}", config.base_url);
        }

        let api = HttpApi::new(&config)?;
        Ok(Self::new(
            Arc::new(api),
            QueryCache::new(),
            Arc::new(ConsoleNotifier),
        ))
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notifier.notify(Notification::error(message));
    }

    /// Report a failed backend call: generic text for the user, detail to the log.
    pub fn report_failure(&self, generic: &str, err: &Error) {
        log::debug!("{generic}: {err:?}");
        self.error(failure_message(generic, err.backend_message()));
    }
}
