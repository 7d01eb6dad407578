use std::time::Duration;

use error_stack::{report, ResultExt};
use serde::Serialize;
use url::Url;

use crate::errors::{CustomResult, HackError};

/// One fully buffered form-POST exchange. For the redirect-heavy requests the
/// landed URL is the primary observable, not the body.
pub(crate) struct FormExchange {
    /// Where the request finally landed after any 30x chain.
    pub final_url: Url,
    pub body: String,
}

/// Fresh client per sub-request, carrying only the driver-wide aggregate
/// timeout. Redirects are followed by the client itself; no cookie jar, no
/// custom headers beyond the form content type.
pub(crate) fn build_client(timeout: Duration) -> CustomResult<reqwest::Client, HackError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .change_context(HackError::ClientConstructionFailed)
}

/// POST `form` to `url` as `application/x-www-form-urlencoded`, follow
/// redirects, and buffer the response. Non-200 outcomes are fatal for the
/// sub-request. Send failures (including an elapsed timeout or an aborted
/// caller) surface as the network-class error.
pub(crate) async fn post_form<F: Serialize>(
    client: &reqwest::Client,
    url: &str,
    form: &F,
) -> CustomResult<FormExchange, HackError> {
    let url = Url::parse(url)
        .change_context(HackError::RequestUrlInvalid)
        .attach_printable_lazy(|| format!("url: {url}"))?;

    let response = client
        .post(url.clone())
        .form(form)
        .send()
        .await
        .change_context(HackError::Network)
        .attach_printable_lazy(|| format!("error making http request to {url}"))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(report!(HackError::InvalidHttpStatus(status.as_u16())))
            .attach_printable_lazy(|| format!("url: {url}"));
    }

    let final_url = response.url().clone();
    let body = response
        .text()
        .await
        .change_context(HackError::Network)
        .attach_printable("error reading http response body")?;

    Ok(FormExchange { final_url, body })
}
