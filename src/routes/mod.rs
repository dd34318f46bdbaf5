pub mod health;
pub mod auth;
pub mod internships;
pub mod applications;
pub mod evaluations;
pub mod notifications;
pub mod documents;
pub mod profile;
pub mod admin;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(internships::configure)
            .configure(applications::configure)
            .configure(evaluations::configure)
            .configure(notifications::configure)
            // documents et profile vivent sous /students/... : à enregistrer
            // avant le scope admin /students pour que le préfixe long gagne
            .configure(documents::configure)
            .configure(profile::configure)
            .configure(admin::configure),
    );
}
