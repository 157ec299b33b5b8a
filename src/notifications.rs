//! Toast notifications raised by stores and services.
//!
//! The [`Notifier`] is the queue a front end drains to show toasts. Cloning it
//! shares the same queue.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const MAX_PENDING_TOASTS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Toast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
            ToastKind::Info => "i",
        };
        write!(f, "{} {}", prefix, self.message)
    }
}

/// Shared toast queue
#[derive(Clone, Default)]
pub struct Notifier {
    toasts: Arc<Mutex<VecDeque<Toast>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => log::warn!("toast: {}", toast.message),
            _ => log::debug!("toast: {}", toast.message),
        }
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push_back(toast);
            while toasts.len() > MAX_PENDING_TOASTS {
                toasts.pop_front();
            }
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Toast::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Toast::error(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Toast::info(message));
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.drain(..).collect()
        } else {
            Vec::new()
        }
    }

    /// Pending toasts without removing them, oldest first.
    pub fn pending(&self) -> Vec<Toast> {
        if let Ok(toasts) = self.toasts.lock() {
            toasts.iter().cloned().collect()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let notifier = Notifier::new();
        notifier.success("saved");
        notifier.error("failed");

        let shared = notifier.clone();
        assert_eq!(shared.pending().len(), 2);

        let toasts = notifier.drain();
        assert_eq!(toasts, vec![Toast::success("saved"), Toast::error("failed")]);
        assert!(shared.drain().is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let notifier = Notifier::new();
        for i in 0..(MAX_PENDING_TOASTS + 5) {
            notifier.info(format!("toast {}", i));
        }
        let toasts = notifier.drain();
        assert_eq!(toasts.len(), MAX_PENDING_TOASTS);
        assert_eq!(toasts[0].message, "toast 5");
    }
}
