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

use serde::Deserialize;
use serde::Serialize;

/// A single scripture proof: a reference title and the verse text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptureRef {
    /// Reference title, e.g. "Psalm 86:8-10".
    #[serde(rename = "T")]
    pub title: String,
    /// The verse text.
    #[serde(rename = "C")]
    pub text: String,
}

/// One catechism entry: a question, its answer, and the scripture proofs
/// backing the answer's footnote markers.
///
/// Serde names follow the compact serialized form (`Q`/`A`/`S`) so existing
/// datasets load unchanged. The answer text carries inline markers like
/// `[1]`; marker `[n]` refers to `scriptures[n - 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "Q")]
    pub question: String,
    #[serde(rename = "A")]
    pub answer: String,
    #[serde(rename = "S")]
    pub scriptures: Vec<Vec<ScriptureRef>>,
}

/// A run of answer text, or a footnote marker pointing at a scripture group.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerSegment {
    Text(String),
    /// 0-based index into the item's scripture groups.
    Marker(usize),
}

impl Item {
    /// The number of footnote groups this item carries.
    pub fn footnote_groups(&self) -> usize {
        self.scriptures.len()
    }

    /// Split the answer into text runs and footnote markers.
    pub fn answer_segments(&self) -> Vec<AnswerSegment> {
        split_markers(&self.answer)
    }

    /// The 0-based group indices referenced by the answer's markers, in
    /// order of appearance.
    pub fn marker_indices(&self) -> Vec<usize> {
        self.answer_segments()
            .into_iter()
            .filter_map(|segment| match segment {
                AnswerSegment::Marker(index) => Some(index),
                AnswerSegment::Text(_) => None,
            })
            .collect()
    }

    /// Cross-check the answer's markers against the scripture groups.
    /// Returns one finding per problem; an empty list means the item is
    /// internally consistent.
    pub fn check(&self) -> Vec<String> {
        let mut findings = Vec::new();
        let markers = self.marker_indices();
        for index in &markers {
            if *index >= self.scriptures.len() {
                findings.push(format!(
                    "marker [{}] has no matching scripture group (item has {})",
                    index + 1,
                    self.scriptures.len()
                ));
            }
        }
        for group in 0..self.scriptures.len() {
            if !markers.contains(&group) {
                findings.push(format!(
                    "scripture group {} is never referenced by a marker",
                    group + 1
                ));
            }
            if self.scriptures[group].is_empty() {
                findings.push(format!("scripture group {} is empty", group + 1));
            }
        }
        findings
    }
}

/// Scan text for `[n]` markers. A marker is an opening bracket, one or more
/// ASCII digits with a value of at least 1, and a closing bracket; anything
/// else stays literal text.
pub(crate) fn split_markers(text: &str) -> Vec<AnswerSegment> {
    let mut segments: Vec<AnswerSegment> = Vec::new();
    let mut run = String::new();
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let (before, after) = rest.split_at(open);
        run.push_str(before);
        let tail = &after[1..];
        match tail.find(']') {
            Some(close) if close > 0 && tail[..close].bytes().all(|b| b.is_ascii_digit()) => {
                match tail[..close].parse::<usize>() {
                    Ok(n) if n >= 1 => {
                        if !run.is_empty() {
                            segments.push(AnswerSegment::Text(std::mem::take(&mut run)));
                        }
                        segments.push(AnswerSegment::Marker(n - 1));
                    }
                    // [0] or an unparseable run of digits.
                    _ => {
                        run.push('[');
                        run.push_str(&tail[..close]);
                        run.push(']');
                    }
                }
                rest = &tail[close + 1..];
            }
            _ => {
                run.push('[');
                rest = tail;
            }
        }
    }
    run.push_str(rest);
    if !run.is_empty() {
        segments.push(AnswerSegment::Text(run));
    }
    segments
}
