//! User-facing warning sink.

use log::warn;

/// Receives warnings meant for the person using the index, such as a
/// reference to a notebook that does not exist.
pub trait WarningSink {
    fn warn(&self, message: &str);
}

impl<T: WarningSink + ?Sized> WarningSink for &T {
    fn warn(&self, message: &str) {
        (**self).warn(message);
    }
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWarningSink;

impl WarningSink for LogWarningSink {
    fn warn(&self, message: &str) {
        warn!("event=user_warning module=service message={message}");
    }
}
