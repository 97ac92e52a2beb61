use std::{process, sync::Arc, time::Duration};

use sightline::{
    application::{
        error::AppError, invalidation::InvalidationCoordinator,
        principal::DigestVerifier, reads::SightReadService, tickets::TicketReadService,
        writes::SightWriteService,
    },
    cache::MemoryCache,
    config,
    infra::{db::PostgresCatalog, error::InfraError, http, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn connect_catalog(settings: &config::Settings) -> Result<PostgresCatalog, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresCatalog::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database("connect", err)))?;

    PostgresCatalog::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database("migrate", err)))?;

    Ok(PostgresCatalog::new(pool))
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    connect_catalog(&settings).await?;
    info!(target = "sightline::migrate", "migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let catalog = Arc::new(connect_catalog(&settings).await?);
    let cache = Arc::new(MemoryCache::new());

    let mut tokens = Vec::with_capacity(settings.auth.tokens.len());
    for token in &settings.auth.tokens {
        let entry = DigestVerifier::entry(&token.digest, token.subject.clone(), token.role)
            .map_err(|_| AppError::validation("invalid auth token digest in configuration"))?;
        tokens.push(entry);
    }
    let verifier = Arc::new(DigestVerifier::new(tokens));

    let invalidation = Arc::new(InvalidationCoordinator::new(cache.clone()));
    let reads = Arc::new(SightReadService::new(
        catalog.clone(),
        cache.clone(),
        settings.cache.ttl,
    ));
    let tickets = Arc::new(TicketReadService::new(catalog.clone()));
    let writes = Arc::new(SightWriteService::new(catalog.clone(), invalidation.clone()));

    let state = http::AppState {
        reads,
        tickets,
        writes,
        invalidation,
        verifier,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "sightline::serve",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!(target = "sightline::serve", "failed to listen for ctrl-c");
        return;
    }
    info!(target = "sightline::serve", "shutdown signal received");

    // Force exit if open connections outlive the grace period.
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "sightline::serve",
            "graceful shutdown timed out, exiting"
        );
        process::exit(1);
    });
}
