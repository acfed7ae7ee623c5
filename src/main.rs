// src/main.rs
use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};
use merxman::api::{configure_routes, AppState};
use merxman::{banner, config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Make sure MERXMAN_WEBHOOK_URL is set in your environment");
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    log::info!("🔗 Functions API: {}", app_config.api_url);
    log::info!(
        "⏱️  Polling every {}s, cap: {}",
        app_config.poll.interval.as_secs(),
        app_config
            .poll
            .max_attempts
            .map_or("none".to_string(), |n| format!("{} attempts", n))
    );

    let bind_addr = app_config.bind_addr.clone();
    let state = AppState::new(app_config);

    println!("🚀 Starting server on http://{}", bind_addr);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
