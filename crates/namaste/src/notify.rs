use colored::Colorize;
use namaste_core::notification::{Notification, NotificationLevel};

use crate::prelude::eprintln;

/// Sink for transient notifications raised by pages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to stderr so they never mix with `--json` output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                eprintln!("{} {}", "✓".green().bold(), notification.message.green())
            }
            NotificationLevel::Error => {
                eprintln!("{} {}", "✗".red().bold(), notification.message.red())
            }
        }
    }
}
