use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use severity_backend::config::DashboardConfig;
use severity_backend::pipeline::ArtifactBundle;
use severity_backend::routes::configure_routes;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = DashboardConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration failed: {}", e))
    })?;

    let pipeline = match ArtifactBundle::load(&config.artifact_path) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("Failed to load model artifacts at startup: {}", e);
            return Err(std::io::Error::other(format!("Model loading failed: {}", e)));
        }
    };

    let info = pipeline.model_info();
    log::info!(
        "Model {} ready: {} features, {} classes, {} trees",
        info.name,
        info.n_features,
        info.n_classes,
        info.n_trees
    );

    let pipeline = web::Data::new(pipeline);
    let frontend_dir = config.frontend_dir.clone();
    let bind_address = config.bind_address();

    log::info!("Serving dashboard from {}", frontend_dir.display());
    log::info!("Starting server on {}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server.bind(&bind_address)?.run().await
}
