// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::channel;

use catechist_core::Language;
use catechist_core::Session;
use catechist_core::Timestamp;
use catechist_core::rng::TinyRng;

use crate::catalog::Catalog;
use crate::cmd::serve::get::browse_handler;
use crate::cmd::serve::get::context_handler;
use crate::cmd::serve::get::quiz_handler;
use crate::cmd::serve::post::bookmark_handler;
use crate::cmd::serve::post::language_handler;
use crate::cmd::serve::post::quiz_action_handler;
use crate::cmd::serve::state::MutableState;
use crate::cmd::serve::state::ServerState;
use crate::db::DB_FILENAME;
use crate::db::Database;
use crate::error::Fallible;
use crate::utils::CACHE_CONTROL_IMMUTABLE;

pub struct ServerConfig {
    pub directory: Option<String>,
    pub host: String,
    pub port: u16,
    pub language: Option<Language>,
    pub session_started_at: Timestamp,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let catalog = Catalog::load(config.directory)?;
    let db = Database::open(&Path::new(&catalog.directory).join(DB_FILENAME))?;
    let bookmarks = db.bookmarks()?;

    // The CLI flag wins over the stored preference and replaces it.
    let language = match config.language {
        Some(language) => {
            db.set_language(language)?;
            language
        }
        None => db.language()?.unwrap_or(Language::En),
    };

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64;
    let mut rng = TinyRng::from_seed(seed);
    let session = Session::start(catalog.size(), &mut rng)?;
    log::info!(
        "Session of {} item(s) started at {}",
        session.queue().len(),
        config.session_started_at
    );

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = channel();

    let state = ServerState {
        catalog: Arc::new(catalog),
        session_started_at: config.session_started_at,
        mutable: Arc::new(Mutex::new(MutableState {
            session,
            language,
            bookmarks,
            db,
            finished_at: None,
        })),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(browse_handler));
    let app = app.route("/quiz", get(quiz_handler));
    let app = app.route("/quiz", post(quiz_action_handler));
    let app = app.route("/bookmark/{id}", post(bookmark_handler));
    let app = app.route("/language", post(language_handler));
    let app = app.route("/api/context", get(context_handler));
    let app = app.route("/script.js", get(script_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state.clone());
    let bind = format!("{}:{}", config.host, config.port);

    // Start the server with graceful shutdown on Ctrl+C or the End button.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    let mutable = state.mutable.lock().unwrap();
    match mutable.finished_at {
        Some(finished_at) => log::info!("Session completed at {finished_at}"),
        None => log::info!("Server stopped before the session completed"),
    }
    Ok(())
}

async fn script_handler() -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/javascript")],
        include_str!("script.js"),
    )
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn shutdown_signal(shutdown_rx: Receiver<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let shutdown = async {
        shutdown_rx.await.ok();
    };

    select! {
        _ = ctrl_c => {
            log::debug!("Received Ctrl+C, shutting down gracefully");
        },
        _ = shutdown => {
            log::debug!("Received shutdown signal, shutting down gracefully");
        },
    }
}
