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

use crate::types::item::AnswerSegment;
use crate::types::item::split_markers;

/// Prepare text for speech synthesis by dropping inline footnote markers,
/// which would otherwise be read out loud.
pub fn speech_text(text: &str) -> String {
    let mut out = String::new();
    for segment in split_markers(text) {
        if let AnswerSegment::Text(run) = segment {
            out.push_str(&run);
        }
    }
    out
}
