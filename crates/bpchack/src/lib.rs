//! Edge of the BPC hack proxy: the HTTP API the daemon serves, request
//! validation, configuration, and logging bootstrap. The protocol work itself
//! lives in [`bpc_mpi`].

#![forbid(unsafe_code)]

pub mod configs;
pub mod errors;
pub mod logger;
pub mod routes;
pub mod validation;

use std::time::Duration;

use actix_web::{dev::Server, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::{configs::settings::Settings, errors::ApplicationResult, routes::AppState};

/// Header Constants
pub mod headers {
    pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
    pub const X_REAL_IP: &str = "X-Real-IP";
}

/// Driver-wide aggregate timeout for every MPI/ACS sub-request made on
/// behalf of the HTTP API.
pub const DAEMON_DRIVER_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds and binds the HTTP API server. The returned server finishes on its
/// own after SIGINT/SIGTERM, draining in-flight requests first.
pub async fn start_server(conf: Settings) -> ApplicationResult<Server> {
    let listen_address = conf.listen_address.clone();
    let state = AppState::new(conf);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(routes::Hack::server(state.clone()))
    })
    .bind(&listen_address)?
    .client_request_timeout(Duration::from_secs(60))
    .keep_alive(Duration::from_secs(120))
    .run();

    Ok(server)
}
