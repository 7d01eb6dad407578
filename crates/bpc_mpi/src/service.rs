//! The four step orchestrators of the MPI/ACS flow.
//!
//! Each step is 1–3 sequential sub-requests ("parts"), every one of them a
//! form-encoded POST followed by a dedicated parse. Protocol outcomes travel
//! as [`HackStatus`] values on the success channel; transport and parse
//! failures travel as [`HackError`] reports.

use std::time::Duration;

use error_stack::{report, ResultExt};
use masking::Secret;
use time::OffsetDateTime;
use tracing::instrument;
use url::Url;

use crate::{
    client, consts,
    errors::{CustomResult, HackError},
    transformers::{
        self, AcsEntryForm, AcsLanding, OtpSubmitOutcome, ProcessCardForm, ProcessFormResponse,
        ResendPasswordForm, SendPasswordForm, SessionStatusForm, SessionStatusResponse,
        SubmitPasswordForm, TerminateForm,
    },
    types::{
        ConfirmPaymentRequest, ConfirmPaymentResponse, HackStatus, ResendCodeRequest,
        ResendCodeResponse, StartHackRequest, StartHackResponse, SubmitCardRequest,
        SubmitCardResponse,
    },
};

/// Stateless driver for the four-step flow.
///
/// Holds only construction-time configuration; a single instance may serve
/// any number of concurrent flows. Callers carry the flow identity (MDOrder,
/// then the ACS handle) between steps themselves.
#[derive(Clone, Debug)]
pub struct MpiService {
    base_mpi_url: String,
    timeout: Duration,
}

impl MpiService {
    pub fn new(base_mpi_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_mpi_url: base_mpi_url.into(),
            timeout,
        }
    }

    fn session_status_url(&self) -> String {
        format!("{}/{}", self.base_mpi_url, consts::SESSION_STATUS_ENDPOINT)
    }

    fn process_form_url(&self) -> String {
        format!("{}/{}", self.base_mpi_url, consts::PROCESS_FORM_ENDPOINT)
    }

    /// Step 1. Extract the MDOrder from the payment URL and inspect the MPI
    /// session. A session that fails the validity predicate is reported as
    /// `already-processed`, still carrying the MDOrder for display.
    #[instrument(skip_all, fields(app = %req.application, id = %req.identity, operation = "step1_start_hack"))]
    pub async fn start_hack(
        &self,
        req: StartHackRequest,
    ) -> CustomResult<StartHackResponse, HackError> {
        tracing::info!("processing");

        let payment_url = Url::parse(&req.payment_url)
            .change_context(HackError::PaymentUrlParsingFailed)
            .attach_printable_lazy(|| format!("payment url: {}", req.payment_url))?;
        let md_order = query_param(&payment_url, consts::MD_ORDER_QUERY_PARAM);

        let client = client::build_client(self.timeout)?;
        let form = SessionStatusForm {
            md_order: &md_order,
        };
        let exchange = client::post_form(&client, &self.session_status_url(), &form)
            .await
            .attach_printable_lazy(|| format!("mdOrder: {md_order}"))?;
        tracing::debug!(raw = %exchange.body, "response received");

        let session: SessionStatusResponse = serde_json::from_str(&exchange.body)
            .change_context(HackError::ResponseDeserializationFailed)
            .attach_printable("getSessionStatus.do returned undecodable json")?;

        if !session.is_valid() {
            tracing::info!(%md_order, "session expired or already processed");
            return Ok(StartHackResponse {
                status: HackStatus::AlreadyProcessed,
                md_order: Some(md_order),
                ..Default::default()
            });
        }

        Ok(StartHackResponse {
            status: HackStatus::Ok,
            md_order: Some(md_order),
            expiration_ts: Some(OffsetDateTime::now_utc().unix_timestamp() + session.remaining_secs),
            is_cvc_required: Some(!session.cvc_not_required),
            amount_info: Some(session.amount),
        })
    }

    /// Step 2. Post the card to the MPI, hand the `PaReq` to the ACS, and
    /// trigger the first OTP delivery. On success the response carries the
    /// ACS handle the caller must round-trip into steps 3 and 4.
    #[instrument(skip_all, fields(app = %req.application, id = %req.identity, operation = "step2_submit_card"))]
    pub async fn submit_card(
        &self,
        req: SubmitCardRequest,
    ) -> CustomResult<SubmitCardResponse, HackError> {
        tracing::info!("processing");

        let process_form = self
            .submit_card_form(&req)
            .await
            .attach_printable("error in part 1")?;
        if !process_form.is_valid() {
            if process_form.error_code == 1 {
                tracing::info!(error = %process_form.error, "card rejected, cvc must be specified");
                return Ok(SubmitCardResponse {
                    status: HackStatus::SpecifyCvc,
                    ..Default::default()
                });
            }
            return Err(report!(HackError::InvalidProcessFormResponse)).attach_printable_lazy(
                || {
                    format!(
                        "errorCode: {}, error: {}",
                        process_form.error_code, process_form.error
                    )
                },
            );
        }

        let landing = self
            .submit_acs_entry(&req.md_order, &process_form)
            .await
            .attach_printable("error in part 2")?;
        let resend_attempts_left = self
            .trigger_password_delivery(&landing.acs_request_id, &landing.acs_session_url)
            .await
            .attach_printable("error in part 3")?;

        Ok(SubmitCardResponse {
            status: HackStatus::Ok,
            acs_request_id: Some(landing.acs_request_id),
            acs_session_url: Some(landing.acs_session_url),
            three_d_secure_number: Some(landing.three_d_secure_number),
            resend_attempts_left: Some(resend_attempts_left),
            terminate_url: Some(process_form.term_url),
        })
    }

    /// Step 3. Ask the ACS to send a fresh OTP. A body without the
    /// attempts-left landmark still succeeds, reporting zero attempts.
    #[instrument(skip_all, fields(app = %req.application, id = %req.identity, operation = "step3_resend_code"))]
    pub async fn resend_code(
        &self,
        req: ResendCodeRequest,
    ) -> CustomResult<ResendCodeResponse, HackError> {
        tracing::info!("processing");
        tracing::debug!(acs_url = %req.acs_session_url, "submitting resend password");

        let client = client::build_client(self.timeout)?;
        let form = ResendPasswordForm {
            auth_form: consts::AUTH_FORM,
            request_id: &req.acs_request_id,
            pwd_input_visible: "",
            resend_password_link: consts::RESEND_PASSWORD_LINK,
        };
        let exchange = client::post_form(&client, &req.acs_session_url, &form).await?;
        tracing::debug!(raw = %exchange.body, "response received");

        let resend_attempts_left = transformers::parse_resend_attempts_left(&exchange.body)?;
        Ok(ResendCodeResponse {
            status: HackStatus::Ok,
            resend_attempts_left,
        })
    }

    /// Step 4. Submit the OTP; on acceptance post the extracted `PaRes` to
    /// the terminate URL and report where it landed. Rejections come back as
    /// `wrong-otp` (attempts remain) or `operation-cancelled` (terminal),
    /// with no further requests either way.
    #[instrument(skip_all, fields(app = %req.application, id = %req.identity, operation = "step4_confirm_payment"))]
    pub async fn confirm_payment(
        &self,
        req: ConfirmPaymentRequest,
    ) -> CustomResult<ConfirmPaymentResponse, HackError> {
        tracing::info!("processing");

        let outcome = self
            .submit_password(&req)
            .await
            .attach_printable("error in part 1")?;
        let pa_response = match outcome {
            OtpSubmitOutcome::Cancelled => {
                tracing::info!("wrong password, operation cancelled");
                return Ok(ConfirmPaymentResponse {
                    status: HackStatus::OperationCancelled,
                    ..Default::default()
                });
            }
            OtpSubmitOutcome::WrongPassword {
                current_attempt,
                total_attempts,
            } => {
                tracing::info!(current_attempt, total_attempts, "wrong password, attempts remain");
                return Ok(ConfirmPaymentResponse {
                    status: HackStatus::WrongOtp,
                    current_attempt: Some(current_attempt),
                    total_attempts: Some(total_attempts),
                    final_url: None,
                });
            }
            OtpSubmitOutcome::PaResponse(pa_response) => pa_response,
        };

        let final_url = self
            .complete_operation(&req.md_order, &pa_response, &req.terminate_url)
            .await
            .attach_printable("error in part 2")?;
        Ok(ConfirmPaymentResponse {
            status: HackStatus::Ok,
            final_url: Some(final_url),
            ..Default::default()
        })
    }

    #[instrument(skip_all, fields(part = "part1_submit_form"))]
    async fn submit_card_form(
        &self,
        req: &SubmitCardRequest,
    ) -> CustomResult<ProcessFormResponse, HackError> {
        if req.cvc_code.is_some() {
            tracing::info!("cvc was provided");
        }

        let client = client::build_client(self.timeout)?;
        let form = ProcessCardForm {
            md_order: &req.md_order,
            pan: &req.card_number,
            expiry: &req.expiry,
            name_on_card: &req.name_on_card,
            cvc: req.cvc_code.as_ref(),
        };
        let exchange = client::post_form(&client, &self.process_form_url(), &form).await?;
        tracing::debug!(raw = %exchange.body, "response received");

        serde_json::from_str(&exchange.body)
            .change_context(HackError::ResponseDeserializationFailed)
            .attach_printable("processform.do returned undecodable json")
    }

    #[instrument(skip_all, fields(part = "part2_submit_acs"))]
    async fn submit_acs_entry(
        &self,
        md_order: &str,
        process_form: &ProcessFormResponse,
    ) -> CustomResult<AcsLanding, HackError> {
        let client = client::build_client(self.timeout)?;
        let form = AcsEntryForm {
            md_order,
            pa_req: &process_form.pa_req,
            term_url: &process_form.term_url,
        };
        let exchange = client::post_form(&client, &process_form.acs_url, &form).await?;
        tracing::debug!(raw = %exchange.body, "response received");
        tracing::info!(acs_redirect_url = %exchange.final_url, "redirected to acs page");

        let acs_request_id = query_param(&exchange.final_url, consts::REQUEST_ID_QUERY_PARAM);
        let three_d_secure_number = transformers::parse_three_d_secure_number(&exchange.body)?;
        tracing::info!(request_id = %acs_request_id, number = %three_d_secure_number, "part 2 complete");

        Ok(AcsLanding {
            acs_session_url: exchange.final_url.into(),
            acs_request_id,
            three_d_secure_number,
        })
    }

    /// The request that makes the ACS actually send the SMS.
    #[instrument(skip_all, fields(part = "part3_send_password"))]
    async fn trigger_password_delivery(
        &self,
        acs_request_id: &str,
        acs_session_url: &str,
    ) -> CustomResult<u32, HackError> {
        tracing::debug!(acs_url = %acs_session_url, "submitting send password");

        let client = client::build_client(self.timeout)?;
        let form = SendPasswordForm {
            auth_form: consts::AUTH_FORM,
            request_id: acs_request_id,
            send_password_button: consts::SEND_PASSWORD_BUTTON,
        };
        let exchange = client::post_form(&client, acs_session_url, &form).await?;
        tracing::debug!(raw = %exchange.body, "response received");

        transformers::parse_resend_attempts_left(&exchange.body)
    }

    #[instrument(skip_all, fields(part = "part1_submit_password"))]
    async fn submit_password(
        &self,
        req: &ConfirmPaymentRequest,
    ) -> CustomResult<OtpSubmitOutcome, HackError> {
        tracing::debug!(acs_url = %req.acs_session_url, "submitting password");

        let client = client::build_client(self.timeout)?;
        let form = SubmitPasswordForm {
            request_id: &req.acs_request_id,
            auth_form: consts::AUTH_FORM,
            pwd_input_visible: &req.one_time_password,
            submit_password_button: consts::SUBMIT_PASSWORD_BUTTON,
        };
        let exchange = client::post_form(&client, &req.acs_session_url, &form).await?;
        tracing::debug!(raw = %exchange.body, "response received");

        transformers::parse_otp_submit(&exchange.body)
    }

    #[instrument(skip_all, fields(part = "part2_complete_operation"))]
    async fn complete_operation(
        &self,
        md_order: &str,
        pa_response: &Secret<String>,
        terminate_url: &str,
    ) -> CustomResult<String, HackError> {
        tracing::debug!(term_url = %terminate_url, "completing operation");

        let client = client::build_client(self.timeout)?;
        let form = TerminateForm {
            md_order,
            pa_res: pa_response,
        };
        let exchange = client::post_form(&client, terminate_url, &form).await?;
        Ok(exchange.final_url.into())
    }
}

fn query_param(url: &Url, name: &str) -> String {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
