//! Transient user-facing notifications ("toasts").
//!
//! Errors from remote calls stop at the controller and editor boundary and
//! come out here instead of bubbling up and tearing down the view.

use crate::logger::Logger;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, level: Level, message: &str);

    fn success(&self, message: &str) {
        self.notify(Level::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(Level::Error, message);
    }
}

/// Prints through [`Logger`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: Level, message: &str) {
        log::debug!("notify {:?}: {}", level, message);
        match level {
            Level::Success => Logger::success(message),
            Level::Error => Logger::error(message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(Level, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(Level, String)> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn last(&self) -> Option<(Level, String)> {
        match self.seen.lock() {
            Ok(seen) => seen.last().cloned(),
            Err(poisoned) => poisoned.into_inner().last().cloned(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: Level, message: &str) {
        let mut seen = match self.seen.lock() {
            Ok(seen) => seen,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.push((level, message.to_string()));
    }
}
