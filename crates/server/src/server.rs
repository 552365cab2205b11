use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;

use std::net::SocketAddr;

use crate::{data, user};
use engine::DEFAULT_MAX_PROJECTS;

/// Site-wide switches of the countdown feature.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// When `false` every countdown route answers `404`.
    pub enabled: bool,
    pub max_projects_per_user: usize,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_projects_per_user: DEFAULT_MAX_PROJECTS,
        }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub countdown: CountdownConfig,
}

async fn enabled(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !state.countdown.enabled {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(next.run(request).await)
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        tracing::debug!("rejected credentials for {}", auth_header.username());
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Build the countdown router on top of `db`.
pub fn router(db: DatabaseConnection, countdown: CountdownConfig) -> Router {
    let state = ServerState { db, countdown };

    Router::new()
        .route(
            "/project-countdown/data",
            get(data::get).post(data::save),
        )
        .route("/project-countdown/settings", get(data::settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), enabled))
        .with_state(state)
}

pub async fn run(addr: SocketAddr, db: DatabaseConnection, countdown: CountdownConfig) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(db, countdown, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    db: DatabaseConnection,
    countdown: CountdownConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);
    if !countdown.enabled {
        tracing::warn!("project countdown is disabled, every route answers 404");
    }

    axum::serve(listener, router(db, countdown)).await
}

pub fn spawn_with_listener(
    db: DatabaseConnection,
    countdown: CountdownConfig,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(db, countdown, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
