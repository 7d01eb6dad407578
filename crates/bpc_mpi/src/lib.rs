//! Browser-impersonating driver for the BPC MPI / ACS 3-D Secure card flow.
//!
//! Given a payment URL normally meant to be opened in a browser, the driver
//! performs the four steps a cardholder would otherwise click through:
//! inspect the payment session, post the card details, request a one-time
//! password, and submit the one-time password. Each step is a short chain of
//! form-encoded POSTs against the vendor MPI and the issuer ACS, with JSON or
//! HTML-landmark parsing of whatever comes back.
//!
//! The driver is stateless: callers thread the order identifier and the ACS
//! handle through the steps themselves. One [`MpiService`] may serve any
//! number of concurrent flows.

#![forbid(unsafe_code)]

pub mod consts;
pub mod errors;
pub mod service;
pub mod transformers;
pub mod types;

mod client;

pub use self::{
    errors::{CustomResult, HackError},
    service::MpiService,
    types::{
        ConfirmPaymentRequest, ConfirmPaymentResponse, HackStatus, ResendCodeRequest,
        ResendCodeResponse, StartHackRequest, StartHackResponse, SubmitCardRequest,
        SubmitCardResponse,
    },
};
