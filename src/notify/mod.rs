//! Progress notification for backup runs.
//!
//! The backup pipeline reports progress through a fire-and-forget sink.
//! Both events default to no-ops so the core stays testable without a
//! live observer.

use colored::Colorize;

/// A fire-and-forget sink for backup progress events.
///
/// Implementations must not block; delivery is best-effort and no
/// acknowledgment is expected.
pub trait Notifier: Send + Sync {
    /// Reports a step description; `done` marks the terminal event of a run.
    fn status(&self, _description: &str, _done: bool) {}

    /// Delivers free-form content to the observer.
    fn message(&self, _content: &str) {}
}

/// A notifier that discards all events.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {}

/// A notifier that prints progress to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn status(&self, description: &str, done: bool) {
        if done {
            eprintln!("{} {}", "==>".green(), description);
        } else {
            eprintln!("{} {}", "-->".dimmed(), description.dimmed());
        }
    }

    fn message(&self, content: &str) {
        println!("{content}");
    }
}
