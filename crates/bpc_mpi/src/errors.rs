use crate::types::HackStatus;

/// A custom datatype that wraps the error variant `<E>` into a report,
/// allowing `error_stack::Report<E>` specific extendability.
///
/// Effectively, equivalent to `Result<T, error_stack::Report<E>>`.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Transport-level failure of a single sub-request.
///
/// These accompany non-`ok` outcomes for diagnostics; the protocol-level
/// outcome itself travels as a [`HackStatus`] on the success channel. Use
/// [`HackError::status`] to classify a report without matching on strings.
#[derive(Debug, thiserror::Error)]
pub enum HackError {
    #[error("failed to construct http client")]
    ClientConstructionFailed,
    #[error("error making http request")]
    Network,
    #[error("invalid http status code: {0}")]
    InvalidHttpStatus(u16),
    #[error("request url is not a valid url")]
    RequestUrlInvalid,
    #[error("error parsing payment url")]
    PaymentUrlParsingFailed,
    #[error("error parsing json response")]
    ResponseDeserializationFailed,
    #[error("invalid processform.do response")]
    InvalidProcessFormResponse,
    #[error("'{0}' was not found in response")]
    LandmarkNotFound(&'static str),
    #[error("error parsing {0}")]
    IntegerParsingFailed(&'static str),
}

impl HackError {
    /// Protocol-level classification of a failed sub-request: transport
    /// failures are retriable at the caller's discretion, everything else is
    /// not.
    pub fn status(&self) -> HackStatus {
        match self {
            Self::Network => HackStatus::NetworkError,
            _ => HackStatus::OtherError,
        }
    }
}
