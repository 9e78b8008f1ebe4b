use thiserror::Error;

/// Errors raised by the capture core.
///
/// `InvalidArgument` is an API-misuse failure surfaced to the caller.
/// `Backend` covers a single malformed event or a failing backend call; the
/// adapter swallows the per-event kind, the task turns a failing pump into
/// a shutdown. `BackendTerminated` means the session is over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("key code {code} is outside [0, {max})")]
    InvalidArgument { code: i32, max: usize },
    #[error("input backend terminated: {reason}")]
    BackendTerminated { reason: String },
    #[error("{kind} event rejected: {detail}")]
    Backend { kind: &'static str, detail: String },
}

impl InputError {
    pub(crate) fn malformed(kind: &'static str, detail: impl Into<String>) -> Self {
        Self::Backend {
            kind,
            detail: detail.into(),
        }
    }
}
