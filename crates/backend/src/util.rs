//! Shared helpers for the HTTP edge.

use hm_domain::error::Error;

/// Classify a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Connection refused / unreachable maps to the fixed [`Error::Unreachable`]
/// message (the raw socket error is logged, not surfaced); timeouts map to
/// [`Error::Timeout`]; everything else keeps its original detail as
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_connect() {
        tracing::debug!(error = %e, "agent server connection failed");
        Error::Unreachable
    } else if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}
