use actix_web::web;

pub mod getscores;
pub mod health;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(getscores::configure_routes);
}
