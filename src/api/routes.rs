// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/pricing", web::get().to(handlers::get_pricing))
            .route("/options", web::get().to(handlers::get_options))
            .route("/forms", web::post().to(handlers::submit_form))
            .service(
                web::scope("/videos")
                    .route("", web::post().to(handlers::submit_video))
                    .route("/{request_id}/status", web::get().to(handlers::get_video_status))
            )
            .service(
                web::scope("/subscriptions")
                    .route("", web::get().to(handlers::get_subscription))
                    .route("", web::post().to(handlers::update_subscription))
                    .route("/tiers", web::get().to(handlers::get_remote_tiers))
            )
    )
    .route("/ws/videos/{request_id}", web::get().to(handlers::video_ws));
}
