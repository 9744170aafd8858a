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

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::extract::Form;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use serde::Deserialize;

use catechist_core::Direction;
use catechist_core::ItemId;
use catechist_core::Outcome;
use catechist_core::Phase;
use catechist_core::Session;
use catechist_core::SessionError;
use catechist_core::Timestamp;
use catechist_core::rng::TinyRng;

use crate::cmd::serve::get::BrowseParams;
use crate::cmd::serve::get::browse_url;
use crate::cmd::serve::state::ServerState;

#[derive(Deserialize)]
pub struct ActionForm {
    action: String,
    index: Option<usize>,
}

/// Apply one quiz transition and redirect back to the quiz view. A rejected
/// transition (stale form, bad index) is a caller bug: it surfaces as 400
/// and leaves the session exactly as it was.
pub async fn quiz_action_handler(
    State(state): State<ServerState>,
    Form(form): Form<ActionForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let mut m = state.mutable.lock().unwrap();
    log::debug!("Quiz action: {}", form.action);
    let result = match form.action.as_str() {
        "Flip" => m.session.flip(),
        "Correct" => m.session.grade(Outcome::Correct),
        "Wrong" => m.session.grade(Outcome::Wrong),
        "Previous" => m.session.navigate(Direction::Previous),
        "Next" => m.session.navigate(Direction::Next),
        "Footnote" => match form.index {
            Some(index) => {
                let id = m.session.current_item_id();
                let group_count = state
                    .catalog
                    .item(m.language, id)
                    .map(|item| item.footnote_groups())
                    .unwrap_or(0);
                m.session.toggle_footnote(index, group_count)
            }
            None => Err(SessionError::InvalidOperation(
                "the Footnote action requires an index".to_string(),
            )),
        },
        "Restart" => start_fresh_session(&state).map(|session| {
            m.session = session;
            m.finished_at = None;
        }),
        "End" => {
            if let Some(tx) = state.shutdown_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
            Ok(())
        }
        other => Err(SessionError::InvalidOperation(format!(
            "unknown action: {other}"
        ))),
    };
    // Stamp the completion time the moment the final grade lands.
    if m.session.phase() == Phase::Complete && m.finished_at.is_none() {
        m.finished_at = Some(Timestamp::now());
    }
    match result {
        Ok(()) => Ok(Redirect::to("/quiz")),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn start_fresh_session(state: &ServerState) -> Result<Session, SessionError> {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64;
    let mut rng = TinyRng::from_seed(seed);
    Session::start(state.catalog.size(), &mut rng)
}

/// Toggle a bookmark and land back on the browse view that issued the form.
pub async fn bookmark_handler(
    State(state): State<ServerState>,
    Path(id): Path<ItemId>,
    Query(params): Query<BrowseParams>,
) -> Result<Redirect, (StatusCode, String)> {
    let mut m = state.mutable.lock().unwrap();
    if state.catalog.item(m.language, id).is_none() {
        return Err((StatusCode::BAD_REQUEST, format!("no item with id {id}")));
    }
    let bookmarked = m
        .db
        .toggle_bookmark(id, Timestamp::now())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if bookmarked {
        m.bookmarks.insert(id);
    } else {
        m.bookmarks.remove(&id);
    }
    log::debug!("Bookmark {id} set to {bookmarked}");
    Ok(Redirect::to(&browse_url(
        &params.q,
        params.saved_only(),
        params.expand,
    )))
}

#[derive(Deserialize)]
pub struct LanguageForm {
    #[serde(default)]
    next: String,
}

/// Switch the interface language, persist the preference, and return to the
/// view that issued the form.
pub async fn language_handler(
    State(state): State<ServerState>,
    Form(form): Form<LanguageForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let mut m = state.mutable.lock().unwrap();
    let language = m.language.other();
    m.db.set_language(language)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    m.language = language;
    // Only same-site redirect targets.
    let next = if form.next.starts_with('/') && !form.next.starts_with("//") {
        form.next
    } else {
        "/".to_string()
    };
    Ok(Redirect::to(&next))
}
