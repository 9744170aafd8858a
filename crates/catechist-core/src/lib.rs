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

//! catechist-core: Core library for the catechist study tool.
//!
//! This library provides the render-free parts of the application:
//! - The quiz session engine (sampling, flipping, grading, navigation, scoring)
//! - Catechism item types and footnote-marker segmentation
//! - Browse filtering over the catalog
//! - Keyword-matched context assembly for a language model backend
//! - Text preparation for speech synthesis

pub mod context;
pub mod error;
pub mod rng;
pub mod search;
pub mod session;
pub mod speech;
pub mod types;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible};
pub use session::{Direction, Outcome, Phase, SESSION_SIZE, Score, Session, SessionError};
pub use types::aliases::ItemId;
pub use types::item::{AnswerSegment, Item, ScriptureRef};
pub use types::language::Language;
pub use types::timestamp::Timestamp;
