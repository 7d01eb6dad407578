//! Endpoint suffixes, form field values, and HTML landmarks.
//!
//! The landmark strings are part of the wire contract with the vendor's
//! current templates and must match byte for byte, embedded whitespace
//! included. Exact substring search, never regex.

/// Session inspection endpoint, relative to the base MPI URL.
pub const SESSION_STATUS_ENDPOINT: &str = "getSessionStatus.do";

/// Card submission endpoint, relative to the base MPI URL.
pub const PROCESS_FORM_ENDPOINT: &str = "processform.do";

/// Value of the `authForm` field on every ACS form post.
pub const AUTH_FORM: &str = "authForm";

/// Value of the `sendPasswordButton` field triggering SMS delivery.
pub const SEND_PASSWORD_BUTTON: &str = "Send password";

/// Value of the `submitPasswordButton` field submitting the OTP.
pub const SUBMIT_PASSWORD_BUTTON: &str = "Submit";

/// Value of the `resendPasswordLink` field requesting a fresh OTP.
pub const RESEND_PASSWORD_LINK: &str = "resendPasswordLink";

// <div id="tipContainer" class="tipContainer"><span class="tip">One-time password will be sent to number {number}</span></div>
pub const PHONE_TIP_BEGIN: &str = r#"<div id="tipContainer" class="tipContainer"><span class="tip">One-time password will be sent to number "#;
pub const PHONE_TIP_END: &str = "</span></div>";

// <a id="resendPasswordLink" href="#" title="{n} password send attempt(s) left" onclick="jsf.util.chain...
pub const RESEND_ATTEMPTS_BEGIN: &str = r##"<a id="resendPasswordLink" href="#" title=""##;
pub const RESEND_ATTEMPTS_END: &str = r#" password send attempt(s) left" onclick="jsf.util.chain"#;

// <div id="errorContainer" class="errorContainer"><ul><li class="errorMessage">\tWrong password typed attempt {current} of {total} </li></ul></div>
pub const WRONG_PASSWORD_BEGIN: &str =
    "<div id=\"errorContainer\" class=\"errorContainer\"><ul><li class=\"errorMessage\">\tWrong password typed attempt ";
pub const WRONG_PASSWORD_MIDDLE: &str = " of ";
pub const WRONG_PASSWORD_END: &str = " </li></ul></div>";

pub const OPERATION_CANCELLED_MARKER: &str =
    r#"<span class="operationCancelledMessage">Operation cancelled</span>"#;

// <input type="hidden" name="PaRes" value="{code}" />
pub const PARES_INPUT_BEGIN: &str = r#"<input type="hidden" name="PaRes" value=""#;
pub const PARES_INPUT_END: &str = r#"" />"#;

/// Query parameter of the payment URL carrying the MPI order identifier.
pub const MD_ORDER_QUERY_PARAM: &str = "mdOrder";

/// Query parameter of the landed ACS URL carrying the ACS request identifier.
pub const REQUEST_ID_QUERY_PARAM: &str = "request_id";
