//! Translation page state machine.
//!
//! The page holds one input, one selected source system and at most one
//! displayed result. Only one request may be outstanding; a new result
//! replaces the previous one once it resolves, while a failure keeps whatever
//! was shown before.

use crate::query::RequestStatus;
use crate::terminology::{CodeSystem, TranslationResponse};
use crate::Error;

/// What the shell should send after a successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub code: String,
    pub system: CodeSystem,
}

/// A result that reached the screen, with the code and system it was asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedTranslation {
    pub code: String,
    pub system: CodeSystem,
    pub response: TranslationResponse,
}

/// Result area of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView<'a> {
    /// Nothing has been translated yet, or the result was discarded.
    Nothing,
    Matches(&'a DisplayedTranslation),
    /// The backend answered but found no mapping.
    Empty(&'a DisplayedTranslation),
}

#[derive(Debug, Clone, Default)]
pub struct TranslationState {
    input: String,
    source: CodeSystem,
    status: RequestStatus,
    pending: Option<TranslationRequest>,
    displayed: Option<DisplayedTranslation>,
}

impl TranslationState {
    pub fn new(source: CodeSystem) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn source(&self) -> CodeSystem {
        self.source
    }

    pub fn target(&self) -> CodeSystem {
        self.source.target()
    }

    /// Pick a source system explicitly. Unlike [`swap_systems`](Self::swap_systems)
    /// this keeps the input and the displayed result.
    pub fn select_source(&mut self, system: CodeSystem) {
        self.source = system;
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Whether the translate action is currently enabled.
    pub fn can_submit(&self) -> bool {
        !self.status.is_loading() && !self.input.trim().is_empty()
    }

    /// Validate the input and move to `Loading`.
    ///
    /// Returns the request to send. Nothing changes when the trimmed input is
    /// empty or another request is still outstanding.
    pub fn begin_submit(&mut self) -> Result<TranslationRequest, Error> {
        if self.status.is_loading() {
            return Err(Error::Busy);
        }

        let code = self.input.trim();
        if code.is_empty() {
            return Err(Error::validation("Please enter a code to translate"));
        }

        let request = TranslationRequest {
            code: code.to_string(),
            system: self.source,
        };
        self.status = RequestStatus::Loading;
        self.pending = Some(request.clone());
        Ok(request)
    }

    /// Record a successful response for the outstanding request.
    ///
    /// Ignored when the request was discarded in the meantime (for example by
    /// swapping systems).
    pub fn complete(&mut self, response: TranslationResponse) {
        let Some(request) = self.pending.take() else {
            return;
        };

        self.status = RequestStatus::Success;
        self.displayed = Some(DisplayedTranslation {
            code: request.code,
            system: request.system,
            response,
        });
    }

    /// Record a failure; the previously displayed result, if any, stays.
    pub fn fail(&mut self) {
        if self.pending.take().is_some() {
            self.status = RequestStatus::Error;
        }
    }

    /// Swap source and target systems, clearing the input and the result.
    pub fn swap_systems(&mut self) {
        self.source = self.source.target();
        self.input.clear();
        self.pending = None;
        self.displayed = None;
        self.status = RequestStatus::Idle;
    }

    pub fn displayed(&self) -> Option<&DisplayedTranslation> {
        self.displayed.as_ref()
    }

    pub fn result_view(&self) -> ResultView<'_> {
        match &self.displayed {
            None => ResultView::Nothing,
            Some(d) if d.response.translations.is_empty() => ResultView::Empty(d),
            Some(d) => ResultView::Matches(d),
        }
    }
}

/// Body of the empty-state panel.
pub fn empty_state_message(code: &str, system: CodeSystem) -> String {
    format!("The code \"{code}\" doesn't have any mappings in the {system} system.")
}
