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

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncSeek, ReadBuf};
use tracing::{field, info_span, Instrument, Span};

use crate::model::{Item, StorageError, StorageResult};
use crate::storage::provider::{IgnoreFn, ReadSeek, Storage, WriteOpts};

/// Decorator wrapping any Storage value with one tracing span per
/// operation.
///
/// Spans carry the relevant pathname arguments and are flagged with an
/// `error` field when the call fails. For streaming reads the span stays
/// open until the returned reader is dropped, not until `read_from`
/// returns. No behavior is added beyond span lifecycle.
pub struct TracedStorage {
    storage: Arc<dyn Storage>,
}

impl TracedStorage {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn flag_on_error<T>(span: &Span, result: &StorageResult<T>) {
        if let Err(err) = result {
            span.record("error", field::display(err));
        }
    }
}

#[async_trait]
impl Storage for TracedStorage {
    fn enabled(&self) -> bool {
        self.storage.enabled()
    }

    fn name(&self) -> &'static str {
        self.storage.name()
    }

    fn with_ignore_fn(&self, ignore_fn: IgnoreFn) -> Box<dyn Storage> {
        Box::new(Self {
            storage: Arc::from(self.storage.with_ignore_fn(ignore_fn)),
        })
    }

    fn path(&self, pathname: &str) -> String {
        self.storage.path(pathname)
    }

    async fn stat(&self, pathname: &str) -> StorageResult<Item> {
        let span = info_span!("stat", pathname = %pathname, error = field::Empty);
        let result = self.storage.stat(pathname).instrument(span.clone()).await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn list(&self, pathname: &str) -> StorageResult<Vec<Item>> {
        let span = info_span!("list", pathname = %pathname, error = field::Empty);
        let result = self.storage.list(pathname).instrument(span.clone()).await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn write_to(
        &self,
        pathname: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        opts: WriteOpts,
    ) -> StorageResult<()> {
        let span = info_span!("write_to", pathname = %pathname, error = field::Empty);
        let result = self
            .storage
            .write_to(pathname, reader, opts)
            .instrument(span.clone())
            .await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn read_from(&self, pathname: &str) -> StorageResult<Box<dyn ReadSeek>> {
        let span = info_span!("read_from", pathname = %pathname, error = field::Empty);
        let result = self
            .storage
            .read_from(pathname)
            .instrument(span.clone())
            .await;

        match result {
            Ok(reader) => Ok(Box::new(TracedReader {
                inner: reader,
                span,
            })),
            Err(err) => {
                span.record("error", field::display(&err));
                Err(err)
            }
        }
    }

    async fn walk(
        &self,
        pathname: &str,
        visit: &mut (dyn FnMut(Item) -> StorageResult<()> + Send),
    ) -> StorageResult<()> {
        let span = info_span!("walk", pathname = %pathname, error = field::Empty);
        let result = self
            .storage
            .walk(pathname, visit)
            .instrument(span.clone())
            .await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn create_dir(&self, pathname: &str) -> StorageResult<()> {
        let span = info_span!("create_dir", pathname = %pathname, error = field::Empty);
        let result = self
            .storage
            .create_dir(pathname)
            .instrument(span.clone())
            .await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        let span = info_span!(
            "rename",
            old_name = %old_name,
            new_name = %new_name,
            error = field::Empty,
        );
        let result = self
            .storage
            .rename(old_name, new_name)
            .instrument(span.clone())
            .await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn remove(&self, pathname: &str) -> StorageResult<()> {
        let span = info_span!("remove", pathname = %pathname, error = field::Empty);
        let result = self.storage.remove(pathname).instrument(span.clone()).await;
        Self::flag_on_error(&span, &result);
        result
    }

    async fn update_date(&self, pathname: &str, date: DateTime<Utc>) -> StorageResult<()> {
        let span = info_span!("update_date", pathname = %pathname, error = field::Empty);
        let result = self
            .storage
            .update_date(pathname, date)
            .instrument(span.clone())
            .await;
        Self::flag_on_error(&span, &result);
        result
    }

    fn convert_error(&self, err: StorageError) -> StorageError {
        self.storage.convert_error(err)
    }
}

impl std::fmt::Debug for TracedStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TracedStorage(name={})", self.storage.name())
    }
}

/// Read handle keeping its `read_from` span open until dropped.
struct TracedReader {
    inner: Box<dyn ReadSeek>,
    span: Span,
}

impl AsyncRead for TracedReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let _guard = this.span.enter();
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl AsyncSeek for TracedReader {
    fn start_seek(mut self: Pin<&mut Self>, position: io::SeekFrom) -> io::Result<()> {
        let this = &mut *self;
        let _guard = this.span.enter();
        Pin::new(&mut this.inner).start_seek(position)
    }

    fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        let this = &mut *self;
        let _guard = this.span.enter();
        Pin::new(&mut this.inner).poll_complete(cx)
    }
}
