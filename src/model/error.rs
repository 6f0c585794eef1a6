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

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// Callers branch on three kinds only: [`StorageError::NotExist`],
/// [`StorageError::InvalidPath`], and everything else. The remaining
/// variants keep backend-native detail for logging but are not further
/// classified.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The target, or an ancestor required to exist, is absent.
    #[error("{0}: not exists")]
    NotExist(String),

    /// The pathname contains a `..` segment; detected before any I/O.
    #[error("pathname contains relative path segments")]
    InvalidPath,

    /// Construction-time configuration problem.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem failure that is not a missing entry.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Object store failure that is not a missing key.
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Failure wrapped with the operation and pathname it happened on.
    #[error("{operation} `{pathname}`: {source}")]
    Operation {
        operation: &'static str,
        pathname: String,
        #[source]
        source: Box<StorageError>,
    },

    /// Both the write and the close of a handle failed; neither is dropped.
    #[error("{write}; close: {close}")]
    Joined {
        write: Box<StorageError>,
        close: Box<StorageError>,
    },
}

impl StorageError {
    /// Tag check for the not-exists kind, uniform across backends.
    pub fn is_not_exist(&self) -> bool {
        matches!(self, Self::NotExist(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

static RELATIVE_PATH_PATTERN: OnceLock<Regex> = OnceLock::new();

fn relative_path_pattern() -> &'static Regex {
    RELATIVE_PATH_PATTERN.get_or_init(|| Regex::new(r"(/|^)\.\.(/|$)").unwrap())
}

/// Reject any pathname containing `..` as a full segment, at the start,
/// middle, or end. Every operation on every backend calls this before
/// touching I/O.
pub fn check_relative_path(pathname: &str) -> StorageResult<()> {
    if relative_path_pattern().is_match(pathname) {
        return Err(StorageError::InvalidPath);
    }

    Ok(())
}
