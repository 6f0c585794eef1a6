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

use std::io::ErrorKind;
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::model::item::extension_of;
use crate::model::{
    check_relative_path, id, Item, StorageError, StorageResult, DIRECTORY_PERM, REGULAR_FILE_PERM,
};
use crate::storage::provider::{IgnoreFn, ReadSeek, Storage, WriteOpts};
use crate::util::BufferPool;

const NAME: &str = "filesystem";

static WRITE_BUFFERS: BufferPool = BufferPool::new();

/// Storage backend over a local directory tree.
///
/// Abstract pathnames resolve by concatenating the root directory with
/// the pathname; directories, renames, and recursive removal are native
/// OS operations.
pub struct FilesystemStorage {
    root_directory: String,
    ignore_fn: Option<IgnoreFn>,
}

impl FilesystemStorage {
    /// Create a backend rooted at `directory`.
    ///
    /// An empty directory yields a disabled instance. Otherwise the path
    /// must exist and be a directory.
    pub async fn new(directory: &str) -> StorageResult<Self> {
        let root_directory = directory.trim_end_matches('/').to_string();

        if root_directory.is_empty() {
            return Ok(Self {
                root_directory,
                ignore_fn: None,
            });
        }

        let metadata = tokio::fs::metadata(&root_directory)
            .await
            .map_err(|err| convert_io_error(err.into()))?;

        if !metadata.is_dir() {
            return Err(StorageError::Config(format!(
                "path {root_directory} is not a directory"
            )));
        }

        Ok(Self {
            root_directory,
            ignore_fn: None,
        })
    }

    fn relative_path(&self, fullpath: &str) -> String {
        fullpath
            .strip_prefix(&self.root_directory)
            .unwrap_or(fullpath)
            .to_string()
    }

    fn is_ignored(&self, item: &Item) -> bool {
        self.ignore_fn.as_ref().is_some_and(|ignore| ignore(item))
    }

    fn convert_entry(&self, fullpath: &str, metadata: &std::fs::Metadata) -> Item {
        let pathname = self.relative_path(fullpath);
        let name = fullpath
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(fullpath)
            .to_string();

        let date = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or(DateTime::UNIX_EPOCH);

        let mut item = Item {
            id: id(&pathname),
            name,
            pathname,
            date,
            file_mode: mode_of(metadata),
            is_dir: metadata.is_dir(),
            ..Item::default()
        };

        if !item.is_dir {
            item.extension = extension_of(&item.name);
            item.size = metadata.len();
        }

        item
    }

    async fn writable_file(&self, pathname: &str) -> StorageResult<tokio::fs::File> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(REGULAR_FILE_PERM);

        options
            .open(self.path(pathname))
            .await
            .map_err(|err| self.convert_error(err.into()))
    }

    async fn copy_reader(
        &self,
        reader: &mut (dyn AsyncRead + Send + Unpin),
        file: &mut tokio::fs::File,
        buffer: &mut [u8],
    ) -> StorageResult<()> {
        loop {
            let read = reader
                .read(buffer)
                .await
                .map_err(|err| self.convert_error(err.into()))?;
            if read == 0 {
                return Ok(());
            }

            file.write_all(&buffer[..read])
                .await
                .map_err(|err| self.convert_error(err.into()))?;
        }
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    fn enabled(&self) -> bool {
        !self.root_directory.is_empty()
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn with_ignore_fn(&self, ignore_fn: IgnoreFn) -> Box<dyn Storage> {
        Box::new(Self {
            root_directory: self.root_directory.clone(),
            ignore_fn: Some(ignore_fn),
        })
    }

    fn path(&self, pathname: &str) -> String {
        if pathname.starts_with('/') {
            format!("{}{}", self.root_directory, pathname)
        } else {
            format!("{}/{}", self.root_directory, pathname)
        }
    }

    async fn stat(&self, pathname: &str) -> StorageResult<Item> {
        check_relative_path(pathname)?;

        let fullpath = self.path(pathname);
        let metadata = tokio::fs::metadata(&fullpath)
            .await
            .map_err(|err| self.convert_error(err.into()))?;

        Ok(self.convert_entry(&fullpath, &metadata))
    }

    async fn list(&self, pathname: &str) -> StorageResult<Vec<Item>> {
        check_relative_path(pathname)?;

        let fullpath = self.path(pathname);
        let mut entries = tokio::fs::read_dir(&fullpath)
            .await
            .map_err(|err| self.convert_error(err.into()))?;

        let mut items = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| self.convert_error(err.into()))?
        {
            let metadata = entry
                .metadata()
                .await
                .map_err(|err| self.convert_error(err.into()))?;

            let child = join_path(&fullpath, &entry.file_name().to_string_lossy());
            let item = self.convert_entry(&child, &metadata);
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
        _opts: WriteOpts,
    ) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let mut file = self.writable_file(pathname).await?;

        let mut buffer = WRITE_BUFFERS.acquire();
        let copied = self.copy_reader(reader, &mut file, buffer.as_mut()).await;
        let closed = file.shutdown().await;

        match (copied, closed) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(write), Ok(())) => Err(write),
            (Ok(()), Err(close)) => Err(self.convert_error(close.into())),
            (Err(write), Err(close)) => Err(StorageError::Joined {
                write: Box::new(write),
                close: Box::new(StorageError::Io(close)),
            }),
        }
    }

    async fn read_from(&self, pathname: &str) -> StorageResult<Box<dyn ReadSeek>> {
        check_relative_path(pathname)?;

        let file = tokio::fs::OpenOptions::new()
            .read(true)
            .open(self.path(pathname))
            .await
            .map_err(|err| self.convert_error(err.into()))?;

        Ok(Box::new(file))
    }

    async fn walk(
        &self,
        pathname: &str,
        visit: &mut (dyn FnMut(Item) -> StorageResult<()> + Send),
    ) -> StorageResult<()> {
        check_relative_path(pathname)?;

        // Preorder traversal in lexical order; children are pushed in
        // reverse so the stack pops them sorted.
        let mut pending = vec![self.path(pathname)];

        while let Some(current) = pending.pop() {
            let metadata = tokio::fs::symlink_metadata(&current)
                .await
                .map_err(|err| self.convert_error(err.into()))?;

            let item = self.convert_entry(&current, &metadata);
            let is_dir = item.is_dir;
            if self.is_ignored(&item) {
                continue;
            }

            visit(item)?;

            if is_dir {
                let mut entries = tokio::fs::read_dir(&current)
                    .await
                    .map_err(|err| self.convert_error(err.into()))?;

                let mut names = Vec::new();
                while let Some(entry) = entries
                    .next_entry()
                    .await
                    .map_err(|err| self.convert_error(err.into()))?
                {
                    names.push(entry.file_name().to_string_lossy().to_string());
                }

                names.sort();
                for name in names.into_iter().rev() {
                    pending.push(join_path(&current, &name));
                }
            }
        }

        Ok(())
    }

    async fn create_dir(&self, pathname: &str) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIRECTORY_PERM);

        builder
            .create(self.path(pathname))
            .await
            .map_err(|err| self.convert_error(err.into()))
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<()> {
        check_relative_path(old_name)?;
        check_relative_path(new_name)?;

        let new_dir_path = parent_dir(new_name);
        match self.stat(new_dir_path).await {
            Ok(_) => {}
            Err(err) if err.is_not_exist() => self.create_dir(new_dir_path).await?,
            Err(err) => return Err(err),
        }

        tokio::fs::rename(self.path(old_name), self.path(new_name))
            .await
            .map_err(|err| self.convert_error(err.into()))
    }

    async fn remove(&self, pathname: &str) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let fullpath = self.path(pathname);
        let metadata = match tokio::fs::metadata(&fullpath).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(self.convert_error(err.into())),
        };

        let removal = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&fullpath).await
        } else {
            tokio::fs::remove_file(&fullpath).await
        };

        removal.map_err(|err| self.convert_error(err.into()))
    }

    async fn update_date(&self, pathname: &str, date: DateTime<Utc>) -> StorageResult<()> {
        check_relative_path(pathname)?;

        let fullpath = self.path(pathname);
        let modified = SystemTime::from(date);

        let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let file = std::fs::File::open(&fullpath)?;
            file.set_modified(modified)
        })
        .await
        .map_err(|err| StorageError::Io(std::io::Error::other(err)))?;

        result.map_err(|err| self.convert_error(err.into()))
    }

    fn convert_error(&self, err: StorageError) -> StorageError {
        convert_io_error(err)
    }
}

fn convert_io_error(err: StorageError) -> StorageError {
    match err {
        StorageError::Io(io_err)
            if matches!(io_err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) =>
        {
            StorageError::NotExist(io_err.to_string())
        }
        other => other,
    }
}

impl std::fmt::Debug for FilesystemStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage(name={NAME}, root_directory={})",
            self.root_directory
        )
    }
}

fn join_path(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

fn parent_dir(pathname: &str) -> &str {
    let trimmed = pathname.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some(("", _)) | None => "/",
        Some((parent, _)) => parent,
    }
}

fn mode_of(metadata: &std::fs::Metadata) -> u32 {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode()
    }
    #[cfg(not(unix))]
    {
        if metadata.is_dir() {
            crate::model::MODE_DIR | DIRECTORY_PERM
        } else {
            REGULAR_FILE_PERM
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::AsyncSeekExt;

    use crate::model::MODE_DIR;

    fn instance(root: &str) -> FilesystemStorage {
        FilesystemStorage {
            root_directory: root.to_string(),
            ignore_fn: None,
        }
    }

    async fn storage(temp: &TempDir) -> FilesystemStorage {
        FilesystemStorage::new(temp.path().to_str().unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_path() {
        let storage = instance("/home/users");

        assert_eq!(storage.path("/test"), "/home/users/test");
        assert_eq!(storage.path("test"), "/home/users/test");
    }

    #[test]
    fn test_relative_path() {
        let storage = instance("/home/users");

        assert_eq!(storage.relative_path("/home/users/test"), "/test");
        assert_eq!(storage.relative_path("/elsewhere/test"), "/elsewhere/test");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("/new/test.txt"), "/new");
        assert_eq!(parent_dir("/renamed/"), "/");
        assert_eq!(parent_dir("/file.txt"), "/");
        assert_eq!(parent_dir("/a/b/c"), "/a/b");
    }

    #[tokio::test]
    async fn test_new_empty_directory_is_disabled() {
        let storage = FilesystemStorage::new("").await.unwrap();
        assert!(!storage.enabled());
    }

    #[tokio::test]
    async fn test_new_missing_directory() {
        let err = FilesystemStorage::new("/nonexistent/invalid/path")
            .await
            .unwrap_err();
        assert!(err.is_not_exist());
    }

    #[tokio::test]
    async fn test_new_on_file_fails() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("plain.txt");
        std::fs::write(&file_path, "content").unwrap();

        let err = FilesystemStorage::new(file_path.to_str().unwrap())
            .await
            .unwrap_err();
        match err {
            StorageError::Config(message) => assert!(message.contains("is not a directory")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_enabled_and_name() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        assert!(storage.enabled());
        assert_eq!(storage.name(), "filesystem");
    }

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        let content = b"Streamed content";
        storage
            .write_to("/example.txt", &mut &content[..], WriteOpts::default())
            .await
            .unwrap();

        let mut reader = storage.read_from("/example.txt").await.unwrap();
        let mut back = Vec::new();
        reader.read_to_end(&mut back).await.unwrap();
        assert_eq!(back, content);
    }

    #[tokio::test]
    async fn test_write_replaces_existing_content() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/note.txt", &mut &b"first version, longer"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/note.txt", &mut &b"second"[..], WriteOpts::default())
            .await
            .unwrap();

        let item = storage.stat("/note.txt").await.unwrap();
        assert_eq!(item.size, 6);
    }

    #[tokio::test]
    async fn test_read_supports_seek() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/seek.txt", &mut &b"0123456789"[..], WriteOpts::default())
            .await
            .unwrap();

        let mut reader = storage.read_from("/seek.txt").await.unwrap();
        reader.seek(std::io::SeekFrom::Start(4)).await.unwrap();

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert_eq!(rest, b"456789");
    }

    #[tokio::test]
    async fn test_read_from_missing() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        let err = storage.read_from("/missing.txt").await.err().unwrap();
        assert!(err.is_not_exist());
    }

    #[tokio::test]
    async fn test_stat_file() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/PHOTO.PNG", &mut &b"not a real png"[..], WriteOpts::default())
            .await
            .unwrap();

        let item = storage.stat("/PHOTO.PNG").await.unwrap();
        assert_eq!(item.name, "PHOTO.PNG");
        assert_eq!(item.pathname, "/PHOTO.PNG");
        assert_eq!(item.extension, ".png");
        assert_eq!(item.size, 14);
        assert!(!item.is_dir);
        assert_eq!(item.id, id("/PHOTO.PNG"));
    }

    #[tokio::test]
    async fn test_stat_directory() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/photos").await.unwrap();

        let item = storage.stat("/photos").await.unwrap();
        assert!(item.is_dir);
        assert_eq!(item.size, 0);
        assert_eq!(item.extension, "");
        assert_ne!(item.file_mode & MODE_DIR, 0);
    }

    #[tokio::test]
    async fn test_stat_rejects_relative_path() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        let err = storage.stat("/a/../b").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath));
    }

    #[tokio::test]
    async fn test_stat_file_component_as_directory() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/plain.txt", &mut &b"data"[..], WriteOpts::default())
            .await
            .unwrap();

        // Treating a file as a path component normalizes to not-exists.
        let err = storage.stat("/plain.txt/below").await.unwrap_err();
        assert!(err.is_not_exist(), "got {err:?}");
    }

    #[tokio::test]
    async fn test_list_one_level() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/dir/sub").await.unwrap();
        storage
            .write_to("/dir/a.txt", &mut &b"a"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/dir/sub/deep.txt", &mut &b"deep"[..], WriteOpts::default())
            .await
            .unwrap();

        let items = storage.list("/dir").await.unwrap();
        let mut names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, ["a.txt", "sub"]);
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        let err = storage.list("/absent").await.unwrap_err();
        assert!(err.is_not_exist());
    }

    #[tokio::test]
    async fn test_list_applies_ignore_fn() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/keep.txt", &mut &b"keep"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/skip.tmp", &mut &b"skip"[..], WriteOpts::default())
            .await
            .unwrap();

        let filtered =
            storage.with_ignore_fn(Arc::new(|item: &Item| item.extension == ".tmp"));
        let items = filtered.list("/").await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "keep.txt");
    }

    #[tokio::test]
    async fn test_walk_preorder_lexical() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/walkdir/b").await.unwrap();
        storage
            .write_to("/walkdir/a.txt", &mut &b"a"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/walkdir/b/c.txt", &mut &b"c"[..], WriteOpts::default())
            .await
            .unwrap();

        let mut pathnames = Vec::new();
        storage
            .walk("/walkdir", &mut |item| {
                pathnames.push(item.pathname);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(
            pathnames,
            ["/walkdir", "/walkdir/a.txt", "/walkdir/b", "/walkdir/b/c.txt"]
        );
    }

    #[tokio::test]
    async fn test_walk_ignored_directory_skips_subtree() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/walkdir/b").await.unwrap();
        storage
            .write_to("/walkdir/a.txt", &mut &b"a"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/walkdir/b/c.txt", &mut &b"c"[..], WriteOpts::default())
            .await
            .unwrap();

        let filtered = storage.with_ignore_fn(Arc::new(|item: &Item| item.name == "b"));

        let mut pathnames = Vec::new();
        filtered
            .walk("/walkdir", &mut |item| {
                pathnames.push(item.pathname);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(pathnames, ["/walkdir", "/walkdir/a.txt"]);
    }

    #[tokio::test]
    async fn test_walk_stops_on_visitor_error() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/a.txt", &mut &b"a"[..], WriteOpts::default())
            .await
            .unwrap();
        storage
            .write_to("/b.txt", &mut &b"b"[..], WriteOpts::default())
            .await
            .unwrap();

        let mut visited = 0;
        let err = storage
            .walk("/", &mut |item| {
                visited += 1;
                if item.name == "a.txt" {
                    return Err(StorageError::Config("stop here".to_string()));
                }
                Ok(())
            })
            .await
            .unwrap_err();

        match err {
            StorageError::Config(message) => assert_eq!(message, "stop here"),
            other => panic!("expected the visitor error back, got {other:?}"),
        }
        // Root plus a.txt; b.txt never visited.
        assert_eq!(visited, 2);
    }

    #[tokio::test]
    async fn test_create_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/nested/deep").await.unwrap();
        storage.create_dir("/nested/deep").await.unwrap();

        assert!(storage.stat("/nested/deep").await.unwrap().is_dir);
    }

    #[tokio::test]
    async fn test_rename_creates_missing_parent() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/source.txt", &mut &b"payload"[..], WriteOpts::default())
            .await
            .unwrap();

        storage.rename("/source.txt", "/new/test.txt").await.unwrap();

        let err = storage.stat("/source.txt").await.unwrap_err();
        assert!(err.is_not_exist());

        let item = storage.stat("/new/test.txt").await.unwrap();
        assert_eq!(item.size, 7);
    }

    #[tokio::test]
    async fn test_rename_directory_subtree() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/old").await.unwrap();
        storage
            .write_to("/old/file.txt", &mut &b"contents"[..], WriteOpts::default())
            .await
            .unwrap();

        storage.rename("/old", "/moved").await.unwrap();

        assert!(storage.stat("/old").await.unwrap_err().is_not_exist());
        assert_eq!(storage.stat("/moved/file.txt").await.unwrap().size, 8);
    }

    #[tokio::test]
    async fn test_remove_recursive() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/tree/inner").await.unwrap();
        storage
            .write_to("/tree/inner/file.txt", &mut &b"x"[..], WriteOpts::default())
            .await
            .unwrap();

        storage.remove("/tree").await.unwrap();

        assert!(storage.stat("/tree").await.unwrap_err().is_not_exist());
        assert!(storage.list("/tree").await.unwrap_err().is_not_exist());
    }

    #[tokio::test]
    async fn test_remove_absent_target_succeeds() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.remove("/never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_date() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage
            .write_to("/dated.txt", &mut &b"x"[..], WriteOpts::default())
            .await
            .unwrap();

        let date = DateTime::parse_from_rfc3339("2020-01-02T03:04:05Z")
            .unwrap()
            .with_timezone(&Utc);
        storage.update_date("/dated.txt", date).await.unwrap();

        let item = storage.stat("/dated.txt").await.unwrap();
        assert_eq!(item.date, date);
    }

    #[tokio::test]
    async fn test_convert_error() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        let not_found: StorageError =
            std::io::Error::new(ErrorKind::NotFound, "no such file").into();
        assert!(storage.convert_error(not_found).is_not_exist());

        let denied: StorageError =
            std::io::Error::new(ErrorKind::PermissionDenied, "denied").into();
        assert!(!storage.convert_error(denied).is_not_exist());
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp).await;

        storage.create_dir("/test").await.unwrap();
        storage
            .write_to(
                "/test/example.txt",
                &mut &b"Streamed content"[..],
                WriteOpts::default(),
            )
            .await
            .unwrap();
        storage
            .write_to(
                "/test/second.txt",
                &mut &b"Fixed size content"[..],
                WriteOpts { size: Some(18) },
            )
            .await
            .unwrap();

        storage.rename("/test/", "/renamed/").await.unwrap();

        let items = storage.list("/renamed/").await.unwrap();
        assert_eq!(items.len(), 2);

        storage
            .rename("/renamed/example.txt", "/new/test.txt")
            .await
            .unwrap();

        let err = storage.stat("/renamed/example.txt").await.unwrap_err();
        assert!(err.is_not_exist());

        storage.remove("/renamed").await.unwrap();
        storage.remove("/new").await.unwrap();

        assert!(storage.list("/").await.unwrap().is_empty());
    }
}
