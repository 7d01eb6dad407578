//! Upstream payload shapes and the pure parsers over response bodies.
//!
//! The JSON structs mirror the full MPI payloads, including fields the driver
//! never consumes, so that an upstream template change shows up in debug logs
//! instead of a decode error. The HTML extractions are exact substring
//! searches around the landmark constants in [`crate::consts`].

use error_stack::{report, ResultExt};
use masking::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    consts,
    errors::{CustomResult, HackError},
};

/// `getSessionStatus.do` JSON payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    #[serde(default)]
    pub remaining_secs: i64,
    #[serde(default)]
    pub redirect: String,
    /// Only zero has ever been observed here.
    #[serde(default)]
    pub session_status: i64,
    #[serde(default)]
    pub order_number: String,
    /// Amount and currency in one display string.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub bonus_amount: i64,
    #[serde(default)]
    pub ssl_only: bool,
    #[serde(default)]
    pub cvc_not_required: bool,
    #[serde(default)]
    pub epin_allowed: bool,
    #[serde(default)]
    pub fee_allowed: bool,
}

impl SessionStatusResponse {
    /// A session is live iff the countdown is running and the order fields
    /// came back populated. Anything else means the order was already
    /// processed or has expired.
    pub fn is_valid(&self) -> bool {
        self.remaining_secs != 0
            && !self.order_number.is_empty()
            && !self.amount.is_empty()
            && !self.description.is_empty()
    }
}

/// `processform.do` JSON payload.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFormResponse {
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub acs_url: String,
    #[serde(default)]
    pub pa_req: String,
    #[serde(default)]
    pub term_url: String,
    #[serde(default)]
    pub error_code: i64,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub redirect: String,
}

impl ProcessFormResponse {
    /// The card was accepted iff no error was signalled and the full ACS
    /// hand-off triple came back.
    pub fn is_valid(&self) -> bool {
        self.error_code == 0
            && !self.acs_url.is_empty()
            && !self.pa_req.is_empty()
            && !self.term_url.is_empty()
    }
}

/// What step 2 part 2 observes after the MPI → ACS redirect chain settles.
#[derive(Clone, Debug)]
pub struct AcsLanding {
    /// The URL the redirect chain landed on; all later ACS posts go here.
    pub acs_session_url: String,
    /// `request_id` query parameter of the landed URL.
    pub acs_request_id: String,
    /// Masked phone number tail from the landing page body.
    pub three_d_secure_number: String,
}

/// Outcome of the step 4 part 1 body, evaluated in priority order: a
/// cancellation marker wins over a `PaRes` input, which wins over a
/// wrong-password counter. `Cancelled` is the terminal sentinel, so no higher
/// layer ever string-matches for it.
#[derive(Clone, Debug)]
pub enum OtpSubmitOutcome {
    Cancelled,
    PaResponse(Secret<String>),
    WrongPassword {
        current_attempt: u32,
        total_attempts: u32,
    },
}

// Outbound form bodies. Field names are bit-exact parts of the MPI/ACS wire
// contract.

#[derive(Debug, Serialize)]
pub struct SessionStatusForm<'a> {
    #[serde(rename = "MDORDER")]
    pub md_order: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ProcessCardForm<'a> {
    #[serde(rename = "MDORDER")]
    pub md_order: &'a str,
    #[serde(rename = "$PAN")]
    pub pan: &'a Secret<String>,
    #[serde(rename = "$EXPIRY")]
    pub expiry: &'a Secret<String>,
    #[serde(rename = "TEXT")]
    pub name_on_card: &'a str,
    #[serde(rename = "$CVC", skip_serializing_if = "Option::is_none")]
    pub cvc: Option<&'a Secret<String>>,
}

#[derive(Debug, Serialize)]
pub struct AcsEntryForm<'a> {
    #[serde(rename = "MD")]
    pub md_order: &'a str,
    #[serde(rename = "PaReq")]
    pub pa_req: &'a str,
    #[serde(rename = "TermUrl")]
    pub term_url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SendPasswordForm<'a> {
    #[serde(rename = "authForm")]
    pub auth_form: &'a str,
    pub request_id: &'a str,
    #[serde(rename = "sendPasswordButton")]
    pub send_password_button: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResendPasswordForm<'a> {
    #[serde(rename = "authForm")]
    pub auth_form: &'a str,
    pub request_id: &'a str,
    #[serde(rename = "pwdInputVisible")]
    pub pwd_input_visible: &'a str,
    #[serde(rename = "resendPasswordLink")]
    pub resend_password_link: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SubmitPasswordForm<'a> {
    pub request_id: &'a str,
    #[serde(rename = "authForm")]
    pub auth_form: &'a str,
    #[serde(rename = "pwdInputVisible")]
    pub pwd_input_visible: &'a Secret<String>,
    #[serde(rename = "submitPasswordButton")]
    pub submit_password_button: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TerminateForm<'a> {
    #[serde(rename = "MD")]
    pub md_order: &'a str,
    #[serde(rename = "PaRes")]
    pub pa_res: &'a Secret<String>,
}

/// The slice strictly between the first occurrence of `begin` and the next
/// occurrence of `end` after it.
fn substring_between<'a>(body: &'a str, begin: &str, end: &str) -> Option<&'a str> {
    let start = body.find(begin)? + begin.len();
    let rest = &body[start..];
    rest.find(end).map(|stop| &rest[..stop])
}

/// Masked phone tail from the ACS landing page.
pub fn parse_three_d_secure_number(body: &str) -> CustomResult<String, HackError> {
    substring_between(body, consts::PHONE_TIP_BEGIN, consts::PHONE_TIP_END)
        .map(str::to_owned)
        .ok_or_else(|| report!(HackError::LandmarkNotFound("one-time password phone tip")))
}

/// Resend-attempts counter from an ACS form body. An absent opening landmark
/// is the ACS's way of saying no attempts remain, not a parse failure.
pub fn parse_resend_attempts_left(body: &str) -> CustomResult<u32, HackError> {
    let Some(raw) =
        substring_between(body, consts::RESEND_ATTEMPTS_BEGIN, consts::RESEND_ATTEMPTS_END)
    else {
        return Ok(0);
    };
    raw.parse::<u32>()
        .change_context(HackError::IntegerParsingFailed("attempts left"))
        .attach_printable_lazy(|| format!("raw value: {raw}"))
}

/// Step 4 part 1 body, in the documented priority order.
pub fn parse_otp_submit(body: &str) -> CustomResult<OtpSubmitOutcome, HackError> {
    if body.contains(consts::OPERATION_CANCELLED_MARKER) {
        return Ok(OtpSubmitOutcome::Cancelled);
    }
    if let Some(pa_res) =
        substring_between(body, consts::PARES_INPUT_BEGIN, consts::PARES_INPUT_END)
    {
        return Ok(OtpSubmitOutcome::PaResponse(Secret::new(pa_res.to_owned())));
    }
    let counters =
        substring_between(body, consts::WRONG_PASSWORD_BEGIN, consts::WRONG_PASSWORD_END)
            .ok_or_else(|| report!(HackError::LandmarkNotFound("wrong password attempt")))?;
    let (current, total) = counters
        .split_once(consts::WRONG_PASSWORD_MIDDLE)
        .ok_or_else(|| report!(HackError::LandmarkNotFound("wrong password attempt separator")))?;
    Ok(OtpSubmitOutcome::WrongPassword {
        current_attempt: current
            .parse()
            .change_context(HackError::IntegerParsingFailed("wrong password current attempt"))
            .attach_printable_lazy(|| format!("raw value: {current}"))?,
        total_attempts: total
            .parse()
            .change_context(HackError::IntegerParsingFailed("wrong password total attempts"))
            .attach_printable_lazy(|| format!("raw value: {total}"))?,
    })
}
