//! Documentation of the disaster-relief profile service.
//!
//! The frontend keeps alerts, shelters, and road reports in view state;
//! the only thing it persists across sessions is the user profile. This
//! service owns that document: validation, storage, and lookup, one
//! profile per auth-provider user id.
//!
//!
//!
//! # General Infrastructure
//! - Frontend talks to this service directly over HTTP with JSON bodies
//! - One profile document per user id, stored in Redis as a JSON string
//! - A secondary `profile:email:{email}` key gives email lookup without scans
//! - No in-process caching, every request goes to Redis
//!
//!
//!
//! # API
//!
//! | Method | Path | Outcome |
//! |---|---|---|
//! | GET | `/profile/{user_id}` | 200 record, 404 if absent |
//! | PUT | `/profile/{user_id}` | upsert, 200 record, 400 on validation failure |
//! | GET | `/profile/email/{email}` | 200 record, 404 if absent |
//! | DELETE | `/profile/{user_id}` | 200 confirmation, 404 if absent |
//! | GET | `/health` | liveness |
//!
//! Every response uses the same envelope:
//! `{ "success": bool, "data"?, "message"?, "errors"?: [string] }`.
//!
//!
//!
//! # Notes
//!
//! ## Why Redis
//! The dataset is small (one document per signed-up user) and every access
//! is a point lookup by user id or email. A search engine or relational
//! store buys nothing here; Redis gives O(1) lookups and single-command
//! atomicity for the one-document writes this service performs.
//!
//! Concurrent upserts for the same user id are not serialized beyond that:
//! the read-merge-write cycle can lose an update under a race, which is
//! acceptable for a profile form saved by its own user.
//!
//!
//!
//! # Setup
//!
//! Run against a local Redis.
//! ```sh
//! REDIS_URL=redis://127.0.0.1:6379 cargo run
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod profile;
pub mod routes;
pub mod state;
pub mod store;

use routes::{
    delete_profile_handler, get_profile_by_email_handler, get_profile_handler, health_handler,
    not_found_handler, update_profile_handler,
};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/profile/{user_id}",
            get(get_profile_handler)
                .put(update_profile_handler)
                .delete(delete_profile_handler),
        )
        .route("/profile/email/{email}", get(get_profile_by_email_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new().await;

    info!("Starting server...");

    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
