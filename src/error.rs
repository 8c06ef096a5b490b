use thiserror::Error;

/// Failure modes of a completion dispatch. Handlers map every variant to the
/// endpoint's canned fallback text; the underlying message is for logs only.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The provider credential is empty. Checked before any network call.
    #[error("provider credential is not configured")]
    MissingCredential,

    /// Anything the provider side surfaced: connect failure, non-2xx status,
    /// undecodable body, or a response with no usable choice.
    #[error("provider request failed: {0}")]
    Provider(String),
}
