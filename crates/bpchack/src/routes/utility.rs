use actix_web::{HttpRequest, HttpResponse};
use time::OffsetDateTime;

use crate::headers;

/// Current UNIX seconds as plain text.
pub async fn epoch() -> HttpResponse {
    HttpResponse::Ok().body(OffsetDateTime::now_utc().unix_timestamp().to_string())
}

/// The caller's address as the proxy chain reported it.
pub async fn ip(request: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().body(remote_address(&request))
}

/// `X-Forwarded-For` first, then `X-Real-IP`, then the TCP peer.
pub(crate) fn remote_address(request: &HttpRequest) -> String {
    for header in [headers::X_FORWARDED_FOR, headers::X_REAL_IP] {
        if let Some(value) = request
            .headers()
            .get(header)
            .and_then(|value| value.to_str().ok())
        {
            if !value.is_empty() {
                return value.to_owned();
            }
        }
    }
    request
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_default()
}
