//! Copy-to-clipboard and the short-lived "copied" indicator.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use tokio::task::JoinHandle;

use crate::prelude::Error;

/// How long the copied indicator stays on.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(2000);

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), Error>;
}

/// Sets the terminal's clipboard through the OSC 52 escape sequence, which
/// also works over SSH and inside tmux with `set-clipboard on`.
///
/// The sequence goes to stderr so stdout stays clean for `--json` output.
pub struct TerminalClipboard {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Default for TerminalClipboard {
    fn default() -> Self {
        Self::with_writer(std::io::stderr())
    }
}

impl TerminalClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
        }
    }

    fn sequence(text: &str) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(text);
        format!("\x1b]52;c;{encoded}\x07")
    }
}

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), Error> {
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| Error::Clipboard("clipboard writer poisoned".to_string()))?;
        sink.write_all(Self::sequence(text).as_bytes())
            .and_then(|_| sink.flush())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

/// Remembers what was copied last and forgets it after [`COPY_FEEDBACK`].
///
/// A newer copy restarts the timer.
#[derive(Debug, Default)]
pub struct CopyIndicator {
    copied: Arc<Mutex<Option<String>>>,
    revert: Mutex<Option<JoinHandle<()>>>,
}

impl CopyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as copied. Must be called from within a tokio runtime.
    pub fn mark(&self, id: impl Into<String>) {
        if let Ok(mut copied) = self.copied.lock() {
            *copied = Some(id.into());
        }

        let copied = self.copied.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(COPY_FEEDBACK).await;
            if let Ok(mut copied) = copied.lock() {
                *copied = None;
            }
        });

        if let Ok(mut revert) = self.revert.lock() {
            if let Some(previous) = revert.replace(timer) {
                previous.abort();
            }
        }
    }

    pub fn current(&self) -> Option<String> {
        self.copied.lock().ok().and_then(|c| c.clone())
    }

    pub fn is_copied(&self, id: &str) -> bool {
        self.current().as_deref() == Some(id)
    }
}

impl Drop for CopyIndicator {
    fn drop(&mut self) {
        if let Ok(mut revert) = self.revert.lock() {
            if let Some(timer) = revert.take() {
                timer.abort();
            }
        }
    }
}
