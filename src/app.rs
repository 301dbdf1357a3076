//! Application wiring: shared state and the HTTP router

use crate::auth::{
    api as auth_api, auth_middleware, AuthService, BlacklistStore, GateState, JwtHandler,
    UserStore,
};
use crate::config::Config;
use crate::middleware::{rate_limit_middleware, request_logging, RateLimitConfig, RateLimitLayer};
use crate::notes::{api as notes_api, NoteService, NoteStore};
use anyhow::Result;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub notes: Arc<NoteService>,
    pub blacklist: Arc<BlacklistStore>,
    pub gate: GateState,
    pub rate_limiter: RateLimitLayer,
}

impl AppState {
    /// Open every store in the configured database file
    pub fn from_config(config: &Config) -> Result<Self> {
        let users = Arc::new(UserStore::new(&config.database_path)?);
        let blacklist = Arc::new(BlacklistStore::new(&config.database_path)?);
        let notes = Arc::new(NoteStore::new(&config.database_path)?);

        Ok(Self::assemble(
            users,
            blacklist,
            notes,
            &config.jwt_secret,
            config.bcrypt_cost,
            config.rate_limit(),
        ))
    }

    /// Fully in-memory state, used by tests
    pub fn in_memory(jwt_secret: &str, bcrypt_cost: u32, rate_limit: RateLimitConfig) -> Result<Self> {
        Ok(Self::assemble(
            Arc::new(UserStore::in_memory()?),
            Arc::new(BlacklistStore::in_memory()?),
            Arc::new(NoteStore::in_memory()?),
            jwt_secret,
            bcrypt_cost,
            rate_limit,
        ))
    }

    fn assemble(
        users: Arc<UserStore>,
        blacklist: Arc<BlacklistStore>,
        notes: Arc<NoteStore>,
        jwt_secret: &str,
        bcrypt_cost: u32,
        rate_limit: RateLimitConfig,
    ) -> Self {
        let jwt_handler = Arc::new(JwtHandler::new(jwt_secret));

        Self {
            auth: Arc::new(AuthService::new(
                users,
                blacklist.clone(),
                jwt_handler.clone(),
                bcrypt_cost,
            )),
            notes: Arc::new(NoteService::new(notes)),
            gate: GateState {
                jwt_handler,
                blacklist: blacklist.clone(),
            },
            blacklist,
            rate_limiter: RateLimitLayer::new(rate_limit),
        }
    }
}

/// Build the full router: public auth routes, gated note routes, health check
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/users/register", post(auth_api::register))
        .route("/users/login", post(auth_api::login))
        .route("/users/logout", get(auth_api::logout));

    // route_layer order: the last one added runs first, so auth precedes the rate check
    let note_routes = Router::new()
        .route("/notes", get(notes_api::list_notes))
        .route("/notes/:noteid", get(notes_api::get_note))
        .route("/notes/create", post(notes_api::create_note))
        .route("/notes/update/:id", patch(notes_api::update_note))
        .route("/notes/delete/:id", delete(notes_api::delete_note))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(note_routes)
        .with_state(state)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> &'static str {
    "NoteKeeper operational"
}
