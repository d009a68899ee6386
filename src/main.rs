use std::time::Duration;

use actix_cors::Cors;
use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use shvitz_contact::{
    background_task::start_purge_task,
    graceful_shutdown::shutdown_signal,
    limiter::rate_limiter::FixedWindowLimiter,
    routes::configure_routes,
    settings::{AppConfig, LogFormat},
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_header(actix_web::http::header::CONTENT_TYPE)
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing_subscriber::fmt().init();
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    tracing::info!("Loaded configuration: {:?}", config);

    if !config.email_configured() {
        tracing::warn!("Email service not configured: contact submissions will be refused");
    }

    let limiter = FixedWindowLimiter::default();
    let app_state = match AppState::with_limiter(&config, limiter.clone()) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to initialise application state: {:#}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting Shvitz contact service v{} on {}",
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let cors_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&cors_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::spawn(start_purge_task(
        limiter,
        Duration::from_secs(config.purge_interval_secs),
    ));

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
