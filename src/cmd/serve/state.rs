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

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::oneshot::Sender;

use catechist_core::ItemId;
use catechist_core::Language;
use catechist_core::Session;
use catechist_core::Timestamp;

use crate::catalog::Catalog;
use crate::db::Database;

/// Immutable server-wide state shared across handlers.
#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<Catalog>,
    pub session_started_at: Timestamp,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

/// Everything a request may change, behind one lock: the quiz session, the
/// interface language, the in-memory bookmark set, and the store they
/// persist to. Each handler locks, applies one operation, and unlocks
/// before responding, so operations never overlap on one session.
pub struct MutableState {
    pub session: Session,
    pub language: Language,
    pub bookmarks: HashSet<ItemId>,
    pub db: Database,
    pub finished_at: Option<Timestamp>,
}
