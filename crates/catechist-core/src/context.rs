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

//! Context assembly for a language model backend.
//!
//! The model call itself happens outside this program; this module only
//! selects the catalog items relevant to a query and formats them into a
//! prompt context block.

use crate::types::aliases::ItemId;
use crate::types::item::Item;
use crate::types::language::Language;

/// The maximum number of items included in the assembled context.
pub const MAX_CONTEXT_ITEMS: usize = 5;

/// How many leading items stand in as general context when nothing matches.
const FALLBACK_ITEMS: usize = 3;

/// Find the items most relevant to a free-form query, paired with their
/// 1-based ids.
///
/// Plain keyword matching: the lowercased query must appear in the question,
/// the answer, or any scripture reference. If nothing matches, the first few
/// items are returned as general context.
pub fn find_relevant<'a>(query: &str, items: &'a [Item]) -> Vec<(ItemId, &'a Item)> {
    let query = query.trim().to_lowercase();
    let mut relevant: Vec<(ItemId, &Item)> = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let hit = item.question.to_lowercase().contains(&query)
            || item.answer.to_lowercase().contains(&query)
            || item.scriptures.iter().flatten().any(|reference| {
                reference.title.to_lowercase().contains(&query)
                    || reference.text.to_lowercase().contains(&query)
            });
        if hit {
            relevant.push(((index + 1) as ItemId, item));
            if relevant.len() == MAX_CONTEXT_ITEMS {
                break;
            }
        }
    }
    if relevant.is_empty() {
        return items
            .iter()
            .take(FALLBACK_ITEMS)
            .enumerate()
            .map(|(index, item)| ((index + 1) as ItemId, item))
            .collect();
    }
    relevant
}

/// Format selected items into the context block handed to the model.
/// Items are numbered sequentially within the block; their catalog ids
/// travel separately.
pub fn build_context(items: &[(ItemId, &Item)], language: Language) -> String {
    let mut context = String::from(match language {
        Language::En => "Here are relevant questions and answers from the catechism:\n\n",
        Language::Zh => "以下是要理问答中的相关问题和答案：\n\n",
    });
    for (position, (_, item)) in items.iter().enumerate() {
        context.push_str(&format!(
            "{}. Question: {}\n   Answer: {}\n\n",
            position + 1,
            item.question,
            item.answer
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::item::ScriptureRef;

    fn entry(question: &str, answer: &str, reference: Option<(&str, &str)>) -> Item {
        Item {
            question: question.to_string(),
            answer: answer.to_string(),
            scriptures: match reference {
                Some((title, text)) => vec![vec![ScriptureRef {
                    title: title.to_string(),
                    text: text.to_string(),
                }]],
                None => vec![],
            },
        }
    }

    #[test]
    fn test_matches_question_answer_and_scripture() {
        let items = vec![
            entry("What is the chief end of man?", "To glorify God.", None),
            entry(
                "What is God?",
                "God is a Spirit.",
                Some(("John 4:24", "God is a Spirit.")),
            ),
            entry(
                "What do the scriptures principally teach?",
                "What man is to believe.",
                Some(("2 Timothy 1:13", "Hold fast the form of sound words.")),
            ),
        ];
        let by_question = find_relevant("chief end", &items);
        assert_eq!(by_question.len(), 1);
        assert_eq!(by_question[0].0, 1);
        let by_scripture = find_relevant("timothy", &items);
        assert_eq!(by_scripture.len(), 1);
        assert_eq!(by_scripture[0].0, 3);
    }

    #[test]
    fn test_result_is_capped() {
        let items: Vec<Item> = (0..20)
            .map(|n| entry(&format!("Question {n} about grace?"), "Answer.", None))
            .collect();
        let relevant = find_relevant("grace", &items);
        assert_eq!(relevant.len(), MAX_CONTEXT_ITEMS);
        assert_eq!(relevant[0].0, 1);
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let items: Vec<Item> = (0..10)
            .map(|n| entry(&format!("Question {n}?"), "Answer.", None))
            .collect();
        let relevant = find_relevant("sacraments", &items);
        assert_eq!(relevant.len(), FALLBACK_ITEMS);
        assert_eq!(
            relevant.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_context_block_format() {
        let items = vec![
            entry("What is God?", "God is a Spirit.", None),
            entry("What is man?", "A creature.", None),
        ];
        let relevant = find_relevant("what", &items);
        let context = build_context(&relevant, Language::En);
        assert!(context.starts_with("Here are relevant questions and answers"));
        assert!(context.contains("1. Question: What is God?\n   Answer: God is a Spirit.\n"));
        assert!(context.contains("2. Question: What is man?\n   Answer: A creature.\n"));
        let zh = build_context(&relevant, Language::Zh);
        assert!(zh.starts_with("以下是要理问答中的相关问题和答案"));
    }
}
