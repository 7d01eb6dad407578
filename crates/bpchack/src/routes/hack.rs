//! The four hack operations as form-encoded POST handlers.
//!
//! Validation failures answer 400 before the driver is involved. Driver
//! protocol outcomes (whatever their status) answer 200 with the response
//! record as JSON; transport and parse failures answer 500 with the report's
//! cause chain as the body.

use actix_web::{web, HttpRequest, HttpResponse};
use bpc_mpi::{
    ConfirmPaymentRequest, CustomResult, HackError, ResendCodeRequest, StartHackRequest,
    SubmitCardRequest,
};
use masking::{PeekInterface, Secret};
use serde::Deserialize;

use super::{app::AppState, utility};
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct StartHackForm {
    pub app: String,
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubmitCardForm {
    pub app: String,
    pub id: String,
    pub md_order: String,
    pub card_number: Secret<String>,
    pub card_expiry: Secret<String>,
    pub name_on_card: String,
    pub card_cvc: Option<Secret<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResendCodeForm {
    pub app: String,
    pub id: String,
    pub acs_req_id: String,
    pub acs_session_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConfirmPaymentForm {
    pub app: String,
    pub id: String,
    pub md_order: String,
    pub acs_req_id: String,
    pub acs_session_url: String,
    pub otp: Secret<String>,
    pub term_url: String,
}

pub async fn start_hack(
    state: web::Data<AppState>,
    request: HttpRequest,
    form: web::Form<StartHackForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let Ok(()) = validate_application_and_identity(&request, &form.app, &form.id) else {
        return bad_request();
    };

    respond(
        state
            .service
            .start_hack(StartHackRequest {
                application: form.app,
                identity: form.id,
                payment_url: form.url,
            })
            .await,
    )
}

pub async fn submit_card(
    state: web::Data<AppState>,
    request: HttpRequest,
    form: web::Form<SubmitCardForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let Ok(()) = validate_application_and_identity(&request, &form.app, &form.id) else {
        return bad_request();
    };

    // An empty CVC field means the CVC was not supplied at all.
    let cvc_code = form.card_cvc.filter(|cvc| !cvc.peek().is_empty());
    if let Err(error) = validation::validate_card_details(
        &form.card_number,
        &form.card_expiry,
        &form.name_on_card,
        cvc_code.as_ref(),
    ) {
        tracing::warn!(%error, "not valid card details, ignoring request");
        return bad_request();
    }

    respond(
        state
            .service
            .submit_card(SubmitCardRequest {
                application: form.app,
                identity: form.id,
                md_order: form.md_order,
                card_number: form.card_number,
                expiry: form.card_expiry,
                name_on_card: form.name_on_card,
                cvc_code,
            })
            .await,
    )
}

pub async fn resend_code(
    state: web::Data<AppState>,
    request: HttpRequest,
    form: web::Form<ResendCodeForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let Ok(()) = validate_application_and_identity(&request, &form.app, &form.id) else {
        return bad_request();
    };

    respond(
        state
            .service
            .resend_code(ResendCodeRequest {
                application: form.app,
                identity: form.id,
                acs_request_id: form.acs_req_id,
                acs_session_url: form.acs_session_url,
            })
            .await,
    )
}

pub async fn confirm_payment(
    state: web::Data<AppState>,
    request: HttpRequest,
    form: web::Form<ConfirmPaymentForm>,
) -> HttpResponse {
    let form = form.into_inner();
    let Ok(()) = validate_application_and_identity(&request, &form.app, &form.id) else {
        return bad_request();
    };

    respond(
        state
            .service
            .confirm_payment(ConfirmPaymentRequest {
                application: form.app,
                identity: form.id,
                md_order: form.md_order,
                acs_request_id: form.acs_req_id,
                acs_session_url: form.acs_session_url,
                one_time_password: form.otp,
                terminate_url: form.term_url,
            })
            .await,
    )
}

fn validate_application_and_identity(
    request: &HttpRequest,
    application: &str,
    identity: &str,
) -> Result<(), ()> {
    validation::validate_application_and_identity(application, identity).map_err(|error| {
        tracing::warn!(
            %error,
            remote_addr = %utility::remote_address(request),
            "not valid application or identity, ignoring request"
        );
    })
}

fn bad_request() -> HttpResponse {
    HttpResponse::BadRequest().body("HTTP 400 error")
}

fn respond<R: serde::Serialize>(result: CustomResult<R, HackError>) -> HttpResponse {
    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(report) => {
            tracing::error!(status = ?report.current_context().status(), ?report, "step failed");
            HttpResponse::InternalServerError().body(format!("HTTP 500 error\nError {report:?}"))
        }
    }
}
