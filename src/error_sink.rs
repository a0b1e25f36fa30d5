//! # error_sink
//!
//! Ordered log of user-visible API failures.  Components only append; the
//! presentation layer reads and may clear everything at once.

use std::sync::{Mutex, PoisonError};

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct ErrorSink {
    entries: Mutex<Vec<ApiError>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, error: ApiError) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(error);
    }

    /// Snapshot in insertion order.
    pub fn entries(&self) -> Vec<ApiError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<ApiError> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;

    #[test]
    fn test_keeps_insertion_order() {
        let sink = ErrorSink::new();
        sink.push(ApiError::new(ApiErrorKind::NotFound, "first"));
        sink.push(ApiError::network_unavailable());

        let kinds: Vec<_> = sink.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ApiErrorKind::NotFound, ApiErrorKind::NetworkUnavailable]);
        assert_eq!(sink.last().map(|e| e.kind), Some(ApiErrorKind::NetworkUnavailable));
    }

    #[test]
    fn test_clear_empties_everything() {
        let sink = ErrorSink::new();
        sink.push(ApiError::network_unavailable());
        sink.clear();
        assert!(sink.is_empty());
        sink.clear();
        assert_eq!(sink.len(), 0);
    }
}
