// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may obtain a copy
// of the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under
// the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR REPRESENTATIONS
// OF ANY KIND, either express or implied. See the License for the specific language
// governing permissions and limitations under the License.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncSeek};

use crate::model::{Item, StorageError, StorageResult};

/// Predicate deciding whether an Item (and, for a directory, its whole
/// subtree) is excluded from `list`/`walk` results.
pub type IgnoreFn = Arc<dyn Fn(&Item) -> bool + Send + Sync>;

/// Random-access read handle returned by [`Storage::read_from`].
///
/// Seek plus read covers partial and range reads on both backends.
pub trait ReadSeek: AsyncRead + AsyncSeek + Send + Unpin {}

impl<T: AsyncRead + AsyncSeek + Send + Unpin> ReadSeek for T {}

/// Options for [`Storage::write_to`].
///
/// A known `size` lets backends that want a content length upfront
/// perform a single-shot upload; `None` (or zero) falls back to
/// unknown-length, chunked upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOpts {
    pub size: Option<u64>,
}

/// Capability set satisfied by every storage backend.
///
/// Both implementations validate pathnames before any I/O, produce the
/// same [`Item`] shape, and normalize failures onto the same error
/// taxonomy, so a caller can treat them interchangeably.
#[async_trait]
pub trait Storage: Send + Sync {
    /// True iff the backend was constructed with valid parameters
    /// (non-empty root directory or endpoint).
    fn enabled(&self) -> bool;

    /// Backend identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Return a new Storage value carrying `ignore_fn`; `list` and `walk`
    /// skip any Item the predicate matches. A matched directory stops
    /// recursive descent into it; a matched file is simply omitted.
    ///
    /// The receiver is left untouched (copy-on-configure).
    fn with_ignore_fn(&self, ignore_fn: IgnoreFn) -> Box<dyn Storage>;

    /// Backend-specific fully-qualified form of an abstract pathname.
    ///
    /// Exposed for diagnostics and tests; callers should not branch on it.
    fn path(&self, pathname: &str) -> String;

    /// Metadata for the entry at `pathname`.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotExist`] when the target is absent,
    /// [`StorageError::InvalidPath`] when the pathname fails validation.
    async fn stat(&self, pathname: &str) -> StorageResult<Item>;

    /// Direct children of `pathname`, one level only. Order is
    /// backend-dependent and not guaranteed sorted.
    async fn list(&self, pathname: &str) -> StorageResult<Vec<Item>>;

    /// Stream the reader's bytes to `pathname`, replacing any existing
    /// content. A close-time failure is combined with any write failure
    /// rather than discarding either.
    async fn write_to(
        &self,
        pathname: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        opts: WriteOpts,
    ) -> StorageResult<()>;

    /// Open a random-access handle on `pathname`.
    ///
    /// # Errors
    ///
    /// [`StorageError::NotExist`] when the target is absent.
    async fn read_from(&self, pathname: &str) -> StorageResult<Box<dyn ReadSeek>>;

    /// Depth-first traversal over the target and everything beneath it,
    /// including the target itself. Stops on, and propagates, the first
    /// error a `visit` call returns. The ignore predicate applies with
    /// subtree-skip semantics.
    async fn walk(
        &self,
        pathname: &str,
        visit: &mut (dyn FnMut(Item) -> StorageResult<()> + Send),
    ) -> StorageResult<()>;

    /// Create the directory at `pathname`, creating intermediate segments
    /// as needed. Idempotent.
    async fn create_dir(&self, pathname: &str) -> StorageResult<()>;

    /// Move a file or an entire directory subtree. The destination's
    /// parent directory is created when absent; after success no entry
    /// remains at `old_name`.
    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<()>;

    /// Remove a file, or a directory and everything beneath it.
    async fn remove(&self, pathname: &str) -> StorageResult<()>;

    /// Set the modification time of `pathname`. Backends without native
    /// support document this as a no-op.
    async fn update_date(&self, pathname: &str, date: DateTime<Utc>) -> StorageResult<()>;

    /// Map a backend-native failure onto the shared taxonomy.
    fn convert_error(&self, err: StorageError) -> StorageError;
}

impl Debug for dyn Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Storage(name={}, enabled={})", self.name(), self.enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStorage;

    #[async_trait]
    impl Storage for MockStorage {
        fn enabled(&self) -> bool {
            true
        }

        fn name(&self) -> &'static str {
            "mock"
        }

        fn with_ignore_fn(&self, _ignore_fn: IgnoreFn) -> Box<dyn Storage> {
            Box::new(MockStorage)
        }

        fn path(&self, pathname: &str) -> String {
            pathname.to_string()
        }

        async fn stat(&self, pathname: &str) -> StorageResult<Item> {
            Ok(Item {
                pathname: pathname.to_string(),
                ..Item::default()
            })
        }

        async fn list(&self, _pathname: &str) -> StorageResult<Vec<Item>> {
            Ok(vec![])
        }

        async fn write_to(
            &self,
            _pathname: &str,
            _reader: &mut (dyn AsyncRead + Send + Unpin),
            _opts: WriteOpts,
        ) -> StorageResult<()> {
            Ok(())
        }

        async fn read_from(&self, _pathname: &str) -> StorageResult<Box<dyn ReadSeek>> {
            Ok(Box::new(std::io::Cursor::new(Vec::new())))
        }

        async fn walk(
            &self,
            _pathname: &str,
            _visit: &mut (dyn FnMut(Item) -> StorageResult<()> + Send),
        ) -> StorageResult<()> {
            Ok(())
        }

        async fn create_dir(&self, _pathname: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn rename(&self, _old_name: &str, _new_name: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn remove(&self, _pathname: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn update_date(&self, _pathname: &str, _date: DateTime<Utc>) -> StorageResult<()> {
            Ok(())
        }

        fn convert_error(&self, err: StorageError) -> StorageError {
            err
        }
    }

    #[test]
    fn test_dyn_storage_debug() {
        let storage: &dyn Storage = &MockStorage;
        let debug_str = format!("{storage:?}");
        assert!(debug_str.contains("name=mock"));
        assert!(debug_str.contains("enabled=true"));
    }

    #[tokio::test]
    async fn test_write_opts_default_means_unknown_size() {
        let opts = WriteOpts::default();
        assert_eq!(opts.size, None);
    }
}
