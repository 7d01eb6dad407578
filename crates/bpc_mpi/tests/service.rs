//! End-to-end driver tests against a mock MPI/ACS pair.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bpc_mpi::{
    ConfirmPaymentRequest, HackStatus, MpiService, ResendCodeRequest, StartHackRequest,
    SubmitCardRequest,
};
use masking::Secret;
use time::OffsetDateTime;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn service(server: &MockServer) -> MpiService {
    MpiService::new(format!("{}/mpi", server.uri()), TIMEOUT)
}

fn start_hack_request(server: &MockServer) -> StartHackRequest {
    StartHackRequest {
        application: "testapp".to_owned(),
        identity: "tester01".to_owned(),
        payment_url: format!(
            "{}/merchants/foo/payment_en.html?mdOrder=ORD-42",
            server.uri()
        ),
    }
}

fn submit_card_request(cvc: Option<&str>) -> SubmitCardRequest {
    SubmitCardRequest {
        application: "testapp".to_owned(),
        identity: "tester01".to_owned(),
        md_order: "ORD-42".to_owned(),
        card_number: Secret::new("4111111111111111".to_owned()),
        expiry: Secret::new("122030".to_owned()),
        name_on_card: "JOHN DOE".to_owned(),
        cvc_code: cvc.map(|value| Secret::new(value.to_owned())),
    }
}

fn live_session_body() -> serde_json::Value {
    serde_json::json!({
        "remainingSecs": 600,
        "sessionStatus": 0,
        "orderNumber": "ORD-42",
        "amount": "10.00 USD",
        "description": "Toy",
        "bonusAmount": 0,
        "sslOnly": false,
        "cvcNotRequired": false,
        "epinAllowed": false,
        "feeAllowed": false
    })
}

fn acs_landing_body(number: &str) -> String {
    format!(
        r#"<html><body><div id="tipContainer" class="tipContainer"><span class="tip">One-time password will be sent to number {number}</span></div></body></html>"#
    )
}

fn attempts_left_body(attempts: u32) -> String {
    format!(
        r##"<form><a id="resendPasswordLink" href="#" title="{attempts} password send attempt(s) left" onclick="jsf.util.chain(this,event)">Resend</a></form>"##
    )
}

async fn mount_live_session(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/mpi/getSessionStatus.do"))
        .and(body_string_contains("MDORDER=ORD-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_session_body()))
        .mount(server)
        .await;
}

/// Mounts the full part-1/part-2/part-3 chain of step 2: process form, ACS
/// entry redirecting to the session URL, and the send-password trigger.
async fn mount_card_acceptance(server: &MockServer, resend_attempts: u32) {
    Mock::given(method("POST"))
        .and(path("/mpi/processform.do"))
        .and(body_string_contains("MDORDER=ORD-42"))
        .and(body_string_contains("%24PAN=4111111111111111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "info": "",
            "acsUrl": format!("{}/acs/entry", server.uri()),
            "paReq": "PQ",
            "termUrl": format!("{}/mpi/term", server.uri()),
            "errorCode": 0
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/acs/entry"))
        .and(body_string_contains("MD=ORD-42"))
        .and(body_string_contains("PaReq=PQ"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "/acs/auth?request_id=RID"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acs/auth"))
        .and(query_param("request_id", "RID"))
        .respond_with(ResponseTemplate::new(200).set_body_string(acs_landing_body("***99")))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .and(body_string_contains("sendPasswordButton=Send"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(attempts_left_body(resend_attempts)),
        )
        .mount(server)
        .await;
}

fn confirm_payment_request(server: &MockServer, otp: &str) -> ConfirmPaymentRequest {
    ConfirmPaymentRequest {
        application: "testapp".to_owned(),
        identity: "tester01".to_owned(),
        md_order: "ORD-42".to_owned(),
        acs_request_id: "RID".to_owned(),
        acs_session_url: format!("{}/acs/auth?request_id=RID", server.uri()),
        one_time_password: Secret::new(otp.to_owned()),
        terminate_url: format!("{}/mpi/term", server.uri()),
    }
}

#[tokio::test]
async fn happy_path_runs_all_four_steps() {
    let server = MockServer::start().await;
    mount_live_session(&server).await;
    mount_card_acceptance(&server, 3).await;

    let service = service(&server);

    // Step 1.
    let before = OffsetDateTime::now_utc().unix_timestamp();
    let step1 = service.start_hack(start_hack_request(&server)).await.unwrap();
    let after = OffsetDateTime::now_utc().unix_timestamp();
    assert_eq!(step1.status, HackStatus::Ok);
    assert_eq!(step1.md_order.as_deref(), Some("ORD-42"));
    assert_eq!(step1.is_cvc_required, Some(true));
    assert_eq!(step1.amount_info.as_deref(), Some("10.00 USD"));
    let expiration_ts = step1.expiration_ts.unwrap();
    assert!(expiration_ts >= before + 600 && expiration_ts <= after + 600);

    // Step 2.
    let step2 = service.submit_card(submit_card_request(Some("123"))).await.unwrap();
    assert_eq!(step2.status, HackStatus::Ok);
    assert_eq!(step2.acs_request_id.as_deref(), Some("RID"));
    assert_eq!(
        step2.acs_session_url.as_deref(),
        Some(format!("{}/acs/auth?request_id=RID", server.uri()).as_str())
    );
    assert_eq!(step2.three_d_secure_number.as_deref(), Some("***99"));
    assert_eq!(step2.resend_attempts_left, Some(3));
    assert_eq!(
        step2.terminate_url.as_deref(),
        Some(format!("{}/mpi/term", server.uri()).as_str())
    );

    // Step 4: OTP accepted, PaRes posted to the terminate URL, final landing
    // observed.
    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .and(body_string_contains("submitPasswordButton=Submit"))
        .and(body_string_contains("pwdInputVisible=000000"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form action="term"><input type="hidden" name="PaRes" value="PA123" /></form>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/mpi/term"))
        .and(body_string_contains("MD=ORD-42"))
        .and(body_string_contains("PaRes=PA123"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/merchant/ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/merchant/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("paid"))
        .mount(&server)
        .await;

    let step4 = service
        .confirm_payment(confirm_payment_request(&server, "000000"))
        .await
        .unwrap();
    assert_eq!(step4.status, HackStatus::Ok);
    assert_eq!(
        step4.final_url.as_deref(),
        Some(format!("{}/merchant/ok", server.uri()).as_str())
    );
    assert_eq!(step4.current_attempt, None);
    assert_eq!(step4.total_attempts, None);
}

#[tokio::test]
async fn stale_session_reports_already_processed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mpi/getSessionStatus.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "remainingSecs": 0,
            "sessionStatus": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .start_hack(start_hack_request(&server))
        .await
        .unwrap();
    assert_eq!(response.status, HackStatus::AlreadyProcessed);
    assert_eq!(response.md_order.as_deref(), Some("ORD-42"));
    assert_eq!(response.expiration_ts, None);
    assert_eq!(response.amount_info, None);
}

#[tokio::test]
async fn cvc_rejection_skips_the_acs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mpi/processform.do"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errorCode": 1,
            "error": "CVC required"
        })))
        .expect(1)
        .mount(&server)
        .await;
    // No ACS mocks mounted: any ACS call would 404 and fail the step.

    let response = service(&server)
        .submit_card(submit_card_request(None))
        .await
        .unwrap();
    assert_eq!(response.status, HackStatus::SpecifyCvc);
    assert_eq!(response.acs_request_id, None);
    assert_eq!(response.terminate_url, None);
}

#[tokio::test]
async fn wrong_otp_reports_counters_and_skips_terminate_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .and(body_string_contains("submitPasswordButton=Submit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<div id=\"errorContainer\" class=\"errorContainer\"><ul><li class=\"errorMessage\">\tWrong password typed attempt 1 of 3 </li></ul></div>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    // The terminate URL endpoint is not mocked; posting there would fail.

    let response = service(&server)
        .confirm_payment(confirm_payment_request(&server, "999999"))
        .await
        .unwrap();
    assert_eq!(response.status, HackStatus::WrongOtp);
    assert_eq!(response.current_attempt, Some(1));
    assert_eq!(response.total_attempts, Some(3));
    assert_eq!(response.final_url, None);
}

#[tokio::test]
async fn exhausted_otp_reports_operation_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<body><span class="operationCancelledMessage">Operation cancelled</span></body>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server)
        .confirm_payment(confirm_payment_request(&server, "999999"))
        .await
        .unwrap();
    assert_eq!(response.status, HackStatus::OperationCancelled);
    assert_eq!(response.final_url, None);
}

#[tokio::test]
async fn resend_without_landmark_means_zero_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .and(body_string_contains("resendPasswordLink=resendPasswordLink"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>done</body></html>"))
        .mount(&server)
        .await;

    let response = service(&server)
        .resend_code(ResendCodeRequest {
            application: "testapp".to_owned(),
            identity: "tester01".to_owned(),
            acs_request_id: "RID".to_owned(),
            acs_session_url: format!("{}/acs/auth?request_id=RID", server.uri()),
        })
        .await
        .unwrap();
    assert_eq!(response.status, HackStatus::Ok);
    assert_eq!(response.resend_attempts_left, 0);
}

#[tokio::test]
async fn resend_reports_remaining_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/acs/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(attempts_left_body(2)))
        .mount(&server)
        .await;

    let response = service(&server)
        .resend_code(ResendCodeRequest {
            application: "testapp".to_owned(),
            identity: "tester01".to_owned(),
            acs_request_id: "RID".to_owned(),
            acs_session_url: format!("{}/acs/auth?request_id=RID", server.uri()),
        })
        .await
        .unwrap();
    assert_eq!(response.resend_attempts_left, 2);
}

#[tokio::test]
async fn elapsed_deadline_surfaces_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mpi/getSessionStatus.do"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(live_session_body())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let service = MpiService::new(format!("{}/mpi", server.uri()), Duration::from_millis(250));
    let started = std::time::Instant::now();
    let report = service
        .start_hack(start_hack_request(&server))
        .await
        .unwrap_err();
    assert_eq!(report.current_context().status(), HackStatus::NetworkError);
    // Within one timeout period, not the mock's 30 s delay.
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn non_200_upstream_is_not_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mpi/getSessionStatus.do"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let report = service(&server)
        .start_hack(start_hack_request(&server))
        .await
        .unwrap_err();
    assert_eq!(report.current_context().status(), HackStatus::OtherError);
}

#[tokio::test]
async fn unparseable_payment_url_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    // No mocks mounted at all.

    let report = service(&server)
        .start_hack(StartHackRequest {
            application: "testapp".to_owned(),
            identity: "tester01".to_owned(),
            payment_url: "not a url at all".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(report.current_context().status(), HackStatus::OtherError);
}
