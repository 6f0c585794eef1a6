// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.
//
// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Directory type bit carried in [`Item::file_mode`] (`S_IFDIR`).
pub const MODE_DIR: u32 = 0o040000;

/// Permission bits applied to directories created by the storage layer.
pub const DIRECTORY_PERM: u32 = 0o700;

/// Permission bits applied to files created by the storage layer.
pub const REGULAR_FILE_PERM: u32 = 0o600;

/// Metadata snapshot of one storage entry (file or directory).
///
/// Items are value types built fresh on every `stat`/`list`/`walk` call;
/// they carry no reference back to the backend that produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Last-modified timestamp. Synthetic directory entries that have no
    /// stored metadata use the Unix epoch.
    pub date: DateTime<Utc>,

    /// Deterministic identifier derived from `pathname` (see [`id`]).
    pub id: String,

    /// Base name component.
    pub name: String,

    /// Canonical path, always starting with `/`. Directory Items coming
    /// from the object backend keep a trailing `/`.
    pub pathname: String,

    /// Lower-cased file extension including the leading dot; empty for
    /// directories.
    pub extension: String,

    /// Byte length; 0 for directories.
    pub size: u64,

    /// Permission and type bits; the directory bit agrees with `is_dir`.
    pub file_mode: u32,

    /// Whether this entry is a directory.
    pub is_dir: bool,
}

impl Item {
    /// True iff this is the "no such item" sentinel, distinct from an error.
    pub fn is_zero(&self) -> bool {
        self.pathname.is_empty()
    }

    /// The directory this Item belongs to: itself for a directory, the
    /// parent path with a guaranteed trailing `/` for a file.
    pub fn dir(&self) -> String {
        if self.is_dir {
            return self.pathname.clone();
        }

        match self.pathname.rsplit_once('/') {
            Some(("", _)) | None => "/".to_string(),
            Some((parent, _)) => dirname(parent),
        }
    }
}

/// Identifier for a pathname: lowercase hex of its xxh3-64 hash.
///
/// A pure function of the pathname, independent of backend and content.
pub fn id(pathname: &str) -> String {
    format!("{:x}", xxh3_64(pathname.as_bytes()))
}

/// Append a trailing `/` to `name` when it does not already carry one.
pub fn dirname(name: &str) -> String {
    if name.ends_with('/') {
        name.to_string()
    } else {
        format!("{name}/")
    }
}

/// Lower-cased extension of a base name, including the leading dot.
pub(crate) fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(index) => name[index..].to_lowercase(),
        None => String::new(),
    }
}
