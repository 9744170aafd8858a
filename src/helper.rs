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

use std::fs::copy;
use std::path::Path;

use crate::error::Fallible;

/// Copy the fixture catalog into a fresh temporary directory and return its
/// path. The directory is kept on disk so a spawned server can keep using it
/// for the duration of the test process.
pub fn create_tmp_copy_of_test_directory() -> Fallible<String> {
    let dir = tempfile::tempdir()?.keep();
    let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    for name in ["en.json", "zh.json"] {
        copy(testdata.join(name), dir.join(name))?;
    }
    Ok(dir.display().to_string())
}
