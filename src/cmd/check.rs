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

use catechist_core::Language;

use crate::catalog::Catalog;
use crate::error::Fallible;
use crate::error::fail;

/// Validate the data directory: both language files load, their sizes agree,
/// and every item's footnote markers line up with its scripture groups.
pub fn check_catalog(directory: Option<String>) -> Fallible<()> {
    let catalog = Catalog::load(directory)?;
    let mut problem_count = 0;
    for language in [Language::En, Language::Zh] {
        for (index, item) in catalog.items(language).iter().enumerate() {
            for finding in item.check() {
                problem_count += 1;
                println!("{} #{}: {}", language.code(), index + 1, finding);
            }
        }
    }
    if problem_count > 0 {
        fail(format!("found {problem_count} problem(s)."))
    } else {
        println!(
            "{} item(s) per language, no problems found.",
            catalog.size()
        );
        Ok(())
    }
}
