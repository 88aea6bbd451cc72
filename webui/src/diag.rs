//! Diagnostic reporting for contained errors.
//!
//! The dispatcher never logs directly; it reports through an injected
//! sink so the core stays testable without a logging backend.

use crate::error::UiError;

/// Receiver for contained warnings and errors.
pub trait DiagnosticSink {
    /// A per-message or per-entry problem that was skipped over.
    fn warning(&self, err: &UiError);

    /// A transport-level problem surfaced by the collaborator.
    fn error(&self, detail: &str);
}

/// Default sink forwarding to `tracing`.
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warning(&self, err: &UiError) {
        tracing::warn!("[UI] {}", err);
    }

    fn error(&self, detail: &str) {
        tracing::error!("[UI] {}", detail);
    }
}
