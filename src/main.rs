mod config;
mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use std::{path::Path, sync::Arc};

use axum::{Router, response::Redirect, routing::get};
use chrono::Duration;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::{AppConfig, LogFormat},
    infrastructure::{
        activity_repository::SeaOrmActivityRepository,
        argon2_password_hasher::Argon2PasswordHasher,
        enrollment_repository::SeaOrmEnrollmentRepository, jwt_token_service::JwtTokenService,
        schema::init_schema, seed::seed_initial_data, user_repository::SeaOrmUserRepository,
    },
    presentation::{
        extractors::TokenVerifier,
        handlers::{activity_handler::create_activity_router, auth_handler::create_auth_router},
    },
    usecase::{
        activity_usecase::ActivityUsecase, enrollment_usecase::EnrollmentUsecase,
        login_usecase::LoginUsecase, register_user_usecase::RegisterUserUsecase,
    },
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(config.log_format);
    tracing::info!(?config, "starting");

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    init_schema(&db).await?;
    if config.seed_data {
        seed_initial_data(&db).await?;
    }
    if let Some(admin) = &config.bootstrap_admin {
        let registrar = RegisterUserUsecase::new(
            SeaOrmUserRepository::new(db.clone()),
            Argon2PasswordHasher::new(),
        );
        if registrar
            .bootstrap_admin(admin.username.clone(), &admin.email, &admin.password)
            .await?
        {
            tracing::info!(username = %admin.username, "bootstrap admin created");
        }
    }

    let token_service = JwtTokenService::new(&config.secret_key);
    let app = create_app(db, token_service, config.access_token_ttl, &config.static_dir);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().flatten_event(true))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}

/// Wire repositories, use cases and routers onto one store connection.
fn create_app(
    db: DatabaseConnection,
    token_service: JwtTokenService,
    access_token_ttl: Duration,
    static_dir: &Path,
) -> Router {
    let activity_repository = SeaOrmActivityRepository::new(db.clone());
    let enrollment_repository = SeaOrmEnrollmentRepository::new(db.clone());
    let user_repository = SeaOrmUserRepository::new(db);
    let password_hasher = Argon2PasswordHasher::new();
    let verifier = TokenVerifier(Arc::new(token_service.clone()));

    let login_service = LoginUsecase::new(
        user_repository.clone(),
        user_repository.clone(),
        password_hasher.clone(),
        token_service,
        access_token_ttl,
    );
    let register_service = RegisterUserUsecase::new(user_repository, password_hasher);

    Router::new()
        .route("/", get(|| async { Redirect::temporary("/static/index.html") }))
        .nest_service("/static", ServeDir::new(static_dir))
        .merge(create_activity_router(
            ActivityUsecase::new(activity_repository),
            EnrollmentUsecase::new(enrollment_repository),
            verifier.clone(),
        ))
        .nest(
            "/auth",
            create_auth_router(login_service, register_service, verifier),
        )
        .layer(TraceLayer::new_for_http())
}
