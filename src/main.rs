use app::{AppState, create_app};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use config::{Args, Settings};
use database::WeatherStore;
use std::process;
use std::time::Duration;
use tokio::signal;

mod app;
mod config;
mod database;
mod error;
mod models;
mod routes;
mod sensor;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    // Logging is configured from the settings, so config errors go to stderr.
    let settings = match Settings::load(args) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            process::exit(2);
        }
    };
    init_logging(settings.debug);

    let store = WeatherStore::new(&settings.database_path);
    if let Err(err) = store.initialize() {
        log::error!(
            "Failed to initialize database {}: {}",
            store.file_path().display(),
            err
        );
        process::exit(1);
    }
    log::info!("storing readings in {}", store.file_path().display());

    let app = create_app(AppState { store }, &settings.assets_path);

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    let addr = settings.address();
    tokio::spawn(log_listening_address(handle.clone()));
    let result = if let Some(tls) = &settings.tls {
        log::info!(
            "using tls with key file {} and cert file {}",
            tls.key_file_path.display(),
            tls.cert_file_path.display()
        );
        let tls_config =
            match RustlsConfig::from_pem_file(&tls.cert_file_path, &tls.key_file_path).await {
                Ok(tls_config) => tls_config,
                Err(err) => {
                    log::error!("Failed to load tls key and certificate: {}", err);
                    process::exit(1);
                }
            };
        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    } else {
        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    };

    if let Err(err) = result {
        log::error!("Server stopped with error: {}", err);
        process::exit(1);
    }
    log::info!("server stopped");
}

// The configured port may be 0, so report what was actually bound.
async fn log_listening_address(handle: Handle) {
    if let Some(addr) = handle.listening().await {
        log::info!("listening on {}", addr);
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                log::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("shutdown signal received");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
}
