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

use crate::types::aliases::ItemId;
use crate::types::item::Item;

/// Filter settings for the browse view.
#[derive(Clone, Copy, Debug, Default)]
pub struct Filter<'a> {
    /// Free-form search string. Empty means no text filtering.
    pub query: &'a str,
    /// Restrict to bookmarked items.
    pub bookmarked_only: bool,
}

/// Apply the browse filter, pairing each surviving item with its 1-based id.
///
/// The query matches case-insensitively against question and answer text, or
/// exactly against the item id, so "12" finds item 12 rather than every
/// answer containing those digits.
pub fn filter_items<'a>(
    items: &'a [Item],
    bookmarks: &HashSet<ItemId>,
    filter: Filter<'_>,
) -> Vec<(ItemId, &'a Item)> {
    let query = filter.query.trim().to_lowercase();
    items
        .iter()
        .enumerate()
        .map(|(index, item)| ((index + 1) as ItemId, item))
        .filter(|(id, _)| !filter.bookmarked_only || bookmarks.contains(id))
        .filter(|(id, item)| {
            if query.is_empty() {
                return true;
            }
            item.question.to_lowercase().contains(&query)
                || item.answer.to_lowercase().contains(&query)
                || id.to_string() == query
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Item> {
        let entry = |question: &str, answer: &str| Item {
            question: question.to_string(),
            answer: answer.to_string(),
            scriptures: vec![],
        };
        vec![
            entry(
                "What is the chief end of man?",
                "To glorify God, and to enjoy him for ever.",
            ),
            entry("What is God?", "God is a Spirit, infinite and eternal."),
            entry("Are there more Gods than one?", "There is but One only."),
        ]
    }

    #[test]
    fn test_empty_query_passes_everything_through() {
        let items = catalog();
        let result = filter_items(&items, &HashSet::new(), Filter::default());
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].0, 1);
        assert_eq!(result[2].0, 3);
    }

    #[test]
    fn test_query_matches_question_and_answer_case_insensitively() {
        let items = catalog();
        let filter = |query| {
            filter_items(
                &items,
                &HashSet::new(),
                Filter {
                    query,
                    bookmarked_only: false,
                },
            )
        };
        let by_question = filter("CHIEF END");
        assert_eq!(by_question.len(), 1);
        assert_eq!(by_question[0].0, 1);
        let by_answer = filter("spirit");
        assert_eq!(by_answer.len(), 1);
        assert_eq!(by_answer[0].0, 2);
        assert!(filter("predestination").is_empty());
    }

    #[test]
    fn test_query_matches_id_exactly() {
        let items = catalog();
        let result = filter_items(
            &items,
            &HashSet::new(),
            Filter {
                query: "2",
                bookmarked_only: false,
            },
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0, 2);
    }

    #[test]
    fn test_bookmarked_only_composes_with_query() {
        let items = catalog();
        let bookmarks: HashSet<ItemId> = [1, 3].into_iter().collect();
        let saved = filter_items(
            &items,
            &bookmarks,
            Filter {
                query: "",
                bookmarked_only: true,
            },
        );
        assert_eq!(saved.iter().map(|(id, _)| *id).collect::<Vec<_>>(), [1, 3]);
        let saved_about_god = filter_items(
            &items,
            &bookmarks,
            Filter {
                query: "gods",
                bookmarked_only: true,
            },
        );
        assert_eq!(saved_about_god.len(), 1);
        assert_eq!(saved_about_god[0].0, 3);
    }
}
