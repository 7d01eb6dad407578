use std::sync::Arc;

use actix_web::{web, Scope};
use bpc_mpi::MpiService;

use super::{hack, utility};
use crate::configs::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub service: MpiService,
    pub conf: Arc<Settings>,
}

impl AppState {
    pub fn new(conf: Settings) -> Self {
        let service = MpiService::new(conf.base_mpi_url.clone(), crate::DAEMON_DRIVER_TIMEOUT);
        Self {
            service,
            conf: Arc::new(conf),
        }
    }
}

pub struct Hack;

impl Hack {
    /// The `/api` scope: the two utility endpoints plus the four versioned
    /// hack operations. Resources answer 405 for any method they don't
    /// route.
    pub fn server(state: AppState) -> Scope {
        web::scope("/api")
            .app_data(web::Data::new(state))
            .service(web::resource("/epoch").route(web::get().to(utility::epoch)))
            .service(web::resource("/ip").route(web::get().to(utility::ip)))
            .service(
                web::scope("/v1")
                    .service(
                        web::resource("/start-hack").route(web::post().to(hack::start_hack)),
                    )
                    .service(
                        web::resource("/submit-card").route(web::post().to(hack::submit_card)),
                    )
                    .service(
                        web::resource("/resend-code").route(web::post().to(hack::resend_code)),
                    )
                    .service(
                        web::resource("/confirm-payment")
                            .route(web::post().to(hack::confirm_payment)),
                    ),
            )
    }
}
