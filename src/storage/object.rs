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

//! S3-compatible storage backend.
//!
//! Object stores have no native directories, moves, or recursive removal;
//! this backend emulates all three so the observable semantics match the
//! filesystem backend.
//!
//! Directory emulation uses the marker object convention: an emulated
//! directory `d` is represented by a zero-byte object at key `d/.dir`
//! (object store keys cannot end in `/`). A directory exists when its
//! marker exists or when at least one object lives under its prefix, which
//! keeps an explicitly created empty directory distinguishable from one
//! that exists only through its children.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::buffered::{BufReader, BufWriter};
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore, PutPayload};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::model::item::extension_of;
use crate::model::{check_relative_path, dirname, id, Item, StorageError, StorageResult, MODE_DIR};
use crate::storage::config::ObjectConfig;
use crate::storage::provider::{IgnoreFn, ReadSeek, Storage, WriteOpts};

const NAME: &str = "object";

/// Region used when the configuration does not name one.
const DEFAULT_REGION: &str = "us-east-1";

/// Base name of the zero-byte objects marking emulated directories.
/// Reserved: regular files must not use this name.
const DIR_MARKER: &str = ".dir";

/// Storage backend over an S3-compatible object store.
pub struct ObjectStorage {
    store: Option<Arc<dyn ObjectStore>>,
    part_size: usize,
    ignore_fn: Option<IgnoreFn>,
}

impl ObjectStorage {
    /// Create a backend from configuration.
    ///
    /// An empty endpoint yields a disabled instance, mirroring the
    /// filesystem backend's empty root directory.
    pub fn new(config: &ObjectConfig) -> StorageResult<Self> {
        if config.endpoint.is_empty() {
            return Ok(Self {
                store: None,
                part_size: config.part_size as usize,
                ignore_fn: None,
            });
        }

        let scheme = if config.use_ssl { "https" } else { "http" };
        let endpoint = if config.endpoint.contains("://") {
            config.endpoint.clone()
        } else {
            format!("{scheme}://{}", config.endpoint)
        };

        let region = config.region.as_deref().unwrap_or(DEFAULT_REGION);
        let builder = AmazonS3Builder::new()
            .with_endpoint(endpoint)
            .with_bucket_name(&config.bucket)
            .with_access_key_id(&config.access_key)
            .with_secret_access_key(&config.secret_key)
            .with_region(region)
            .with_allow_http(!config.use_ssl);

        let store = builder
            .build()
            .map_err(|err| StorageError::Config(format!("object store client: {err}")))?;

        Ok(Self {
            store: Some(Arc::new(store)),
            part_size: config.part_size as usize,
            ignore_fn: None,
        })
    }

    /// Create a backend over an already-built `object_store` client.
    pub fn from_store(store: Arc<dyn ObjectStore>, part_size: u64) -> Self {
        Self {
            store: Some(store),
            part_size: part_size as usize,
            ignore_fn: None,
        }
    }

    fn store(&self) -> StorageResult<&Arc<dyn ObjectStore>> {
        self.store
            .as_ref()
            .ok_or_else(|| StorageError::Config("object storage is not enabled".to_string()))
    }

    fn is_ignored(&self, item: &Item) -> bool {
        self.ignore_fn.as_ref().is_some_and(|ignore| ignore(item))
    }

    fn op_error(
        &self,
        operation: &'static str,
        pathname: &str,
        err: impl Into<StorageError>,
    ) -> StorageError {
        match self.convert_error(err.into()) {
            StorageError::NotExist(_) => {
                StorageError::NotExist(format!("{operation} `{pathname}`"))
            }
            other => StorageError::Operation {
                operation,
                pathname: pathname.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// Whether the emulated directory at `key` exists: marker object
    /// first, then a one-entry probe of the prefix.
    async fn dir_exists(&self, key: &str) -> StorageResult<bool> {
        let store = self.store()?;

        match store.head(&marker_path(key)).await {
            Ok(_) => return Ok(true),
            Err(object_store::Error::NotFound { .. }) => {}
            Err(err) => return Err(self.convert_error(err.into())),
        }

        let prefix = ObjectPath::from(key);
        let mut entries = store.list(Some(&prefix));
        Ok(entries
            .next()
            .await
            .transpose()
            .map_err(|err| self.convert_error(err.into()))?
            .is_some())
    }

    async fn collect_objects(&self, prefix: &str) -> StorageResult<Vec<ObjectMeta>> {
        let store = self.store()?;
        let location = ObjectPath::from(prefix);
        let prefix = if prefix.is_empty() {
            None
        } else {
            Some(&location)
        };

        let mut objects = Vec::new();
        let mut stream = store.list(prefix);
        while let Some(meta) = stream.next().await {
            objects.push(meta.map_err(|err| self.convert_error(err.into()))?);
        }

        Ok(objects)
    }

    async fn delete_quiet(&self, location: &ObjectPath) -> StorageResult<()> {
        let store = self.store()?;

        match store.delete(location).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(self.op_error("delete object", location.as_ref(), err)),
        }
    }
}

#[async_trait]
impl Storage for ObjectStorage {
    fn enabled(&self) -> bool {
        self.store.is_some()
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn with_ignore_fn(&self, ignore_fn: IgnoreFn) -> Box<dyn Storage> {
        Box::new(Self {
            store: self.store.clone(),
            part_size: self.part_size,
            ignore_fn: Some(ignore_fn),
        })
    }

    /// Object key of an abstract pathname: the leading `/` stripped.
    fn path(&self, pathname: &str) -> String {
        pathname.trim_start_matches('/').to_string()
    }

    async fn stat(&self, pathname: &str) -> StorageResult<Item> {
        check_relative_path(pathname)?;

        let key = self.path(pathname);
        if key.is_empty() {
            return Ok(root_item());
        }

        let store = self.store()?;

        if key.ends_with('/') {
            // Directory lookup: marker object, then prefix probe.
            match store.head(&marker_path(&key)).await {
                Ok(meta) => return Ok(convert_meta(&meta)),
                Err(object_store::Error::NotFound { .. }) => {}
                Err(err) => return Err(self.op_error("stat object", pathname, err)),
            }

            if self.dir_exists(&key).await? {
                let pathname = format!("/{}", dirname(key.trim_end_matches('/')));
                return Ok(dir_item(&pathname, DateTime::UNIX_EPOCH));
            }

            return Err(StorageError::NotExist(format!("stat object `{pathname}`")));
        }

        match store.head(&ObjectPath::from(key.as_str())).await {
            Ok(meta) => Ok(convert_meta(&meta)),
            Err(err) => Err(self.op_error("stat object", pathname, err)),
        }
    }

    async fn list(&self, pathname: &str) -> StorageResult<Vec<Item>> {
        check_relative_path(pathname)?;

        let key = self.path(pathname);
        let store = self.store()?;

        let location = ObjectPath::from(key.as_str());
        let prefix = if key.is_empty() {
            None
        } else {
            Some(&location)
        };

        let listing = store
            .list_with_delimiter(prefix)
            .await
            .map_err(|err| self.convert_error(err.into()))?;

        let mut items = Vec::new();

        for meta in &listing.objects {
            // The listed directory's own marker is not a child.
            if meta.location.filename() == Some(DIR_MARKER) {
                continue;
            }

            let item = convert_meta(meta);
            if self.is_ignored(&item) {
                continue;
            }

            items.push(item);
        }

        for prefix in &listing.common_prefixes {
            let item = dir_item(&format!("/{}/", prefix.as_ref()), DateTime::UNIX_EPOCH);
            if self.is_ignored(&item) {
                continue;
            }

            items.push(item);
        }

        Ok(items)
    }

    async fn write_to(
        &self,
        pathname: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        opts: WriteOpts,
    ) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let store = self.store()?;
        let location = ObjectPath::from(self.path(pathname));

        match opts.size {
            // Known size: single-shot upload.
            Some(size) if size > 0 => {
                let mut content = Vec::with_capacity(size as usize);
                reader
                    .read_to_end(&mut content)
                    .await
                    .map_err(|err| self.op_error("put object", pathname, err))?;

                store
                    .put(&location, PutPayload::from(Bytes::from(content)))
                    .await
                    .map_err(|err| self.op_error("put object", pathname, err))?;

                Ok(())
            }
            // Unknown size: multipart upload with the configured part size.
            _ => {
                let mut writer =
                    BufWriter::with_capacity(Arc::clone(store), location, self.part_size);

                match tokio::io::copy(reader, &mut writer).await {
                    Ok(_) => writer
                        .shutdown()
                        .await
                        .map_err(|err| self.op_error("put object", pathname, err)),
                    Err(err) => {
                        let _ = writer.abort().await;
                        Err(self.op_error("put object", pathname, err))
                    }
                }
            }
        }
    }

    async fn read_from(&self, pathname: &str) -> StorageResult<Box<dyn ReadSeek>> {
        check_relative_path(pathname)?;

        let store = self.store()?;
        let location = ObjectPath::from(self.path(pathname));

        let meta = store
            .head(&location)
            .await
            .map_err(|err| self.op_error("get object", pathname, err))?;

        Ok(Box::new(BufReader::new(Arc::clone(store), &meta)))
    }

    async fn walk(
        &self,
        pathname: &str,
        visit: &mut (dyn FnMut(Item) -> StorageResult<()> + Send),
    ) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let key = self.path(pathname);
        let store = self.store()?;

        let mut items = Vec::new();

        // Prefix listings are per path segment, so a file target never
        // matches its own prefix; probe the exact key first.
        if !key.is_empty() {
            match store.head(&ObjectPath::from(key.as_str())).await {
                Ok(meta) if meta.location.filename() != Some(DIR_MARKER) => {
                    items.push(convert_meta(&meta));
                }
                Ok(_) | Err(object_store::Error::NotFound { .. }) => {}
                Err(err) => return Err(self.convert_error(err.into())),
            }
        }

        for meta in self.collect_objects(&key).await? {
            items.push(convert_meta(&meta));
        }

        // Key order puts a directory right before its descendants, so
        // ignored directories prune their whole subtree in one pass.
        items.sort_by(|a, b| a.pathname.cmp(&b.pathname));

        let mut skipped: Vec<String> = Vec::new();
        for item in items {
            if skipped.iter().any(|prefix| item.pathname.starts_with(prefix)) {
                continue;
            }

            if self.is_ignored(&item) {
                if item.is_dir {
                    skipped.push(item.pathname.clone());
                }
                continue;
            }

            visit(item)?;
        }

        Ok(())
    }

    async fn create_dir(&self, pathname: &str) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let store = self.store()?;
        let key = dirname(&self.path(pathname));
        let segments: Vec<&str> = key.split('/').collect();

        for index in 0..segments.len() {
            let prefix = segments[..index].join("/");
            if prefix.is_empty() {
                continue;
            }

            if !self.dir_exists(&prefix).await? {
                debug!(directory = %prefix, "creating directory marker");
                store
                    .put(&marker_path(&prefix), PutPayload::from(Bytes::new()))
                    .await
                    .map_err(|err| self.op_error("create directory", pathname, err))?;
            }
        }

        Ok(())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        check_relative_path(old_name)?;
        check_relative_path(new_name)?;

        let store = self.store()?;
        let old_key = self.path(old_name);
        let new_key = self.path(new_name);
        let old_location = ObjectPath::from(old_key.as_str());

        // Single object: one copy + delete.
        match store.head(&old_location).await {
            Ok(_) => {
                let new_location = ObjectPath::from(new_key.as_str());
                store
                    .copy(&old_location, &new_location)
                    .await
                    .map_err(|err| self.op_error("copy object", old_name, err))?;
                return self.delete_quiet(&old_location).await;
            }
            Err(object_store::Error::NotFound { .. }) => {}
            Err(err) => return Err(self.op_error("stat object", old_name, err)),
        }

        // Subtree: copy and delete every key under the old prefix. Not
        // atomic; a failure partway leaves a mixed old/new tree.
        let old_prefix = old_key.trim_end_matches('/');
        let new_prefix = new_key.trim_end_matches('/');

        let objects = self.collect_objects(old_prefix).await?;
        let moved = objects.len();

        for meta in objects {
            let target = meta.location.as_ref().replacen(old_prefix, new_prefix, 1);
            let target = ObjectPath::from(target);

            store
                .copy(&meta.location, &target)
                .await
                .map_err(|err| self.op_error("copy object", meta.location.as_ref(), err))?;
            self.delete_quiet(&meta.location).await?;
        }

        debug!(from = %old_name, to = %new_name, count = moved, "renamed subtree");

        Ok(())
    }

    async fn remove(&self, pathname: &str) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let key = self.path(pathname);

        for meta in self.collect_objects(key.trim_end_matches('/')).await? {
            self.delete_quiet(&meta.location).await?;
        }

        // The prefix key itself, when the target was a single object.
        self.delete_quiet(&ObjectPath::from(key.as_str())).await
    }

    /// Object stores keep no mutable modification time; this is a
    /// documented no-op that reports success.
    async fn update_date(&self, pathname: &str, _date: DateTime<Utc>) -> StorageResult<()> {
        check_relative_path(pathname)?;

        Ok(())
    }

    fn convert_error(&self, err: StorageError) -> StorageError {
        match err {
            StorageError::ObjectStore(object_store::Error::NotFound { path, .. }) => {
                StorageError::NotExist(format!("key `{path}` does not exist"))
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage(name={NAME}, enabled={}, part_size={})",
            self.enabled(),
            self.part_size
        )
    }
}

fn marker_path(key: &str) -> ObjectPath {
    ObjectPath::from(format!("{}/{DIR_MARKER}", key.trim_end_matches('/')))
}

fn root_item() -> Item {
    Item {
        id: id("/"),
        name: "/".to_string(),
        pathname: "/".to_string(),
        file_mode: MODE_DIR,
        is_dir: true,
        ..Item::default()
    }
}

fn dir_item(pathname: &str, date: DateTime<Utc>) -> Item {
    let name = pathname
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string();

    Item {
        id: id(pathname),
        name,
        pathname: pathname.to_string(),
        date,
        file_mode: MODE_DIR,
        is_dir: true,
        ..Item::default()
    }
}

/// Convert an object listing entry into an Item; marker objects become
/// the directory they stand for.
fn convert_meta(meta: &ObjectMeta) -> Item {
    let key = meta.location.as_ref();

    if let Some(parent) = key.strip_suffix(&format!("/{DIR_MARKER}")) {
        return dir_item(&format!("/{parent}/"), meta.last_modified);
    }

    let pathname = format!("/{key}");
    let name = meta.location.filename().unwrap_or(key).to_string();

    Item {
        id: id(&pathname),
        extension: extension_of(&name),
        name,
        pathname,
        size: meta.size as u64,
        date: meta.last_modified,
        file_mode: 0,
        is_dir: false,
    }
}
