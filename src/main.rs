use actix_web::{middleware::Logger, web, App, HttpServer};
use secrecy::ExposeSecret;

use homework_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env();

    if let Err(e) = config.validate() {
        log::error!("Invalid configuration: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }

    if config.is_production() {
        if let Err(e) = config.validate_for_production() {
            log::error!("Refusing to start: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let max_upload_bytes = config
        .max_upload_bytes()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let state = AppState::new(config).await.map_err(|e| {
        log::error!("Failed to initialize application state: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    state
        .accounts
        .ensure_administrator(
            &state.config.admin_name,
            &state.config.admin_username,
            state.config.admin_password.expose_secret(),
        )
        .await
        .map_err(|e| {
            log::error!("Failed to bootstrap the administrator account: {}", e);
            std::io::Error::other(e.to_string())
        })?;

    tokio::fs::create_dir_all(&state.config.upload_folder).await?;

    log::info!("Starting HTTP server on {}:{}", host, port);

    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure(max_upload_bytes))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
