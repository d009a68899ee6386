use actix_web::web;

use crate::constants::CONTACT_PATH;
use crate::handlers::{contact, system::health_check};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    cfg.service(
        web::resource(CONTACT_PATH)
            .route(web::post().to(contact::submit_contact))
    );
}
