//! Step request and response records, and the status taxonomy.
//!
//! A logical payment attempt is identified by the `(application, identity,
//! md_order)` tuple. The first two are free-form labels carried for logging;
//! `md_order` is the MPI's opaque order identifier. After step 2 the caller
//! additionally round-trips the ACS handle (`acs_request_id` +
//! `acs_session_url`) and the terminate URL into steps 3 and 4.

use masking::Secret;
use serde::{Deserialize, Serialize};

/// Protocol-level outcome of a step. The serialized forms are stable wire
/// strings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HackStatus {
    /// Step succeeded; continue with the flow.
    Ok,
    /// Transport failure reaching the MPI or ACS; retrying is the caller's
    /// decision.
    NetworkError,
    /// The MPI session is stale, expired, or already paid (step 1 only).
    AlreadyProcessed,
    /// The MPI rejected the card and wants a CVC (step 2 only).
    SpecifyCvc,
    /// The OTP was rejected but attempts remain (step 4 only).
    WrongOtp,
    /// The OTP was rejected terminally; the flow is dead (step 4 only).
    OperationCancelled,
    /// Any other parse, HTTP, or semantic failure.
    #[default]
    OtherError,
}

#[derive(Clone, Debug)]
pub struct StartHackRequest {
    /// Application using the driver, for information purpose only.
    pub application: String,
    /// Identifies one user's flow from another.
    pub identity: String,
    /// The payment URL the MPI handed out for a browser redirect.
    pub payment_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StartHackResponse {
    pub status: HackStatus,
    /// Extracted from the payment URL; present even when the session turns
    /// out to be stale so the caller can display it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md_order: Option<String>,
    /// Absolute UNIX timestamp at which the session expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_ts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_cvc_required: Option<bool>,
    /// Amount and currency as one display string, verbatim from the MPI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_info: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SubmitCardRequest {
    pub application: String,
    pub identity: String,
    pub md_order: String,
    pub card_number: Secret<String>,
    /// Card expiry as six digits, `MMYYYY`.
    pub expiry: Secret<String>,
    pub name_on_card: String,
    pub cvc_code: Option<Secret<String>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmitCardResponse {
    pub status: HackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acs_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acs_session_url: Option<String>,
    /// Masked phone number tail shown on the ACS form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_d_secure_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resend_attempts_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminate_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResendCodeRequest {
    pub application: String,
    pub identity: String,
    pub acs_request_id: String,
    pub acs_session_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResendCodeResponse {
    pub status: HackStatus,
    pub resend_attempts_left: u32,
}

#[derive(Clone, Debug)]
pub struct ConfirmPaymentRequest {
    pub application: String,
    pub identity: String,
    pub md_order: String,
    pub acs_request_id: String,
    pub acs_session_url: String,
    pub one_time_password: Secret<String>,
    pub terminate_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub status: HackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_attempt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_attempts: Option<u32>,
    /// Where the terminate URL post finally landed, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
}
