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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use catechist_core::Item;
use catechist_core::ItemId;
use catechist_core::Language;

use crate::error::Fallible;
use crate::error::fail;

/// The bilingual item catalog, loaded once at startup and immutable for the
/// process lifetime. Both languages carry the same items in the same order,
/// so one id addresses the same entry in either language.
pub struct Catalog {
    /// Canonical path of the data directory.
    pub directory: String,
    en: Vec<Item>,
    zh: Vec<Item>,
}

impl Catalog {
    /// Load `en.json` and `zh.json` from the data directory.
    pub fn load(directory: Option<String>) -> Fallible<Catalog> {
        let directory = directory.unwrap_or_else(|| ".".to_string());
        let root = Path::new(&directory);
        if !root.is_dir() {
            return fail("directory does not exist.");
        }
        let root = root.canonicalize()?;

        let mut en_path: Option<PathBuf> = None;
        let mut zh_path: Option<PathBuf> = None;
        for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");
            match Language::try_from(stem.to_string()) {
                Ok(Language::En) => en_path = Some(path.to_path_buf()),
                Ok(Language::Zh) => zh_path = Some(path.to_path_buf()),
                // Unrelated JSON files are fine to have around.
                Err(_) => {}
            }
        }

        let en = load_items(en_path.as_deref(), Language::En)?;
        let zh = load_items(zh_path.as_deref(), Language::Zh)?;
        if en.is_empty() {
            return fail("the catalog contains no items.");
        }
        if en.len() != zh.len() {
            return fail(format!(
                "catalog size mismatch: {} en item(s) vs {} zh item(s).",
                en.len(),
                zh.len()
            ));
        }
        Ok(Catalog {
            directory: root.display().to_string(),
            en,
            zh,
        })
    }

    /// Items for a language, in catalog order.
    pub fn items(&self, language: Language) -> &[Item] {
        match language {
            Language::En => &self.en,
            Language::Zh => &self.zh,
        }
    }

    /// Look up an item by its 1-based id.
    pub fn item(&self, language: Language, id: ItemId) -> Option<&Item> {
        if id == 0 {
            return None;
        }
        self.items(language).get(id as usize - 1)
    }

    /// The number of items per language.
    pub fn size(&self) -> usize {
        self.en.len()
    }
}

fn load_items(path: Option<&Path>, language: Language) -> Fallible<Vec<Item>> {
    let path = match path {
        Some(path) => path,
        None => {
            return fail(format!(
                "{}.json not found in the data directory.",
                language.code()
            ));
        }
    };
    let text = read_to_string(path)?;
    let items: Vec<Item> = serde_json::from_str(&text)?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_copy_of_test_directory;

    #[test]
    fn test_load_fixture_catalog() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let catalog = Catalog::load(Some(directory))?;
        assert_eq!(catalog.size(), 3);
        assert_eq!(catalog.items(Language::En).len(), 3);
        assert_eq!(catalog.items(Language::Zh).len(), 3);
        Ok(())
    }

    #[test]
    fn test_item_lookup_is_one_based() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        let catalog = Catalog::load(Some(directory))?;
        assert!(catalog.item(Language::En, 0).is_none());
        let first = catalog.item(Language::En, 1).unwrap();
        assert_eq!(first.question, "What is the chief end of man?");
        assert!(catalog.item(Language::En, 4).is_none());
        Ok(())
    }

    #[test]
    fn test_missing_directory_fails() {
        let result = Catalog::load(Some("./derpherp".to_string()));
        assert_eq!(
            result.err().unwrap().to_string(),
            "error: directory does not exist."
        );
    }

    #[test]
    fn test_missing_language_file_fails() -> Fallible<()> {
        let directory = create_tmp_copy_of_test_directory()?;
        std::fs::remove_file(Path::new(&directory).join("zh.json"))?;
        let result = Catalog::load(Some(directory));
        assert!(result.err().unwrap().to_string().contains("zh.json"));
        Ok(())
    }
}
