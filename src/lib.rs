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

//! # Polystore
//!
//! A uniform storage abstraction: file-like operations (stat, list, read,
//! write, rename, remove, walk) against either a local directory tree or
//! an S3-compatible object store, through one interface.
//!
//! Both backends share the same path validation, the same error taxonomy,
//! the same [`Item`] metadata shape, and the same recursive rename/remove
//! behavior, so callers never need to know which one is active.
//!
//! ## Quick start
//!
//! ### Local filesystem
//!
//! ```rust,no_run
//! use polystore::{StorageConfig, StorageFactory, WriteOpts};
//!
//! # async fn example() -> polystore::StorageResult<()> {
//! let config = StorageConfig::filesystem("/tmp/data");
//! let storage = StorageFactory::from_config(&config).await?;
//!
//! storage.create_dir("/photos").await?;
//! storage
//!     .write_to("/photos/note.txt", &mut "hello".as_bytes(), WriteOpts::default())
//!     .await?;
//!
//! let item = storage.stat("/photos/note.txt").await?;
//! println!("{} is {} bytes", item.pathname, item.size);
//! # Ok(())
//! # }
//! ```
//!
//! ### S3-compatible object store
//!
//! ```rust,no_run
//! use polystore::{ObjectConfig, StorageConfig, StorageFactory};
//!
//! # async fn example() -> polystore::StorageResult<()> {
//! let config = StorageConfig::object(
//!     ObjectConfig::new("minio.local:9000", "ACCESS_KEY", "SECRET_KEY", "my-bucket")
//!         .with_use_ssl(false),
//! );
//!
//! let storage = StorageFactory::from_config(&config).await?;
//! for item in storage.list("/photos/").await? {
//!     println!("{}", item.pathname);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Item metadata record, error taxonomy, path validation
//! - [`storage`] - Storage contract, filesystem and object backends
//! - [`util`] - Reusable buffer pool for copy loops

pub mod model;
pub mod storage;
pub mod util;

// Re-export commonly used types
pub use model::{check_relative_path, id, Item, StorageError, StorageResult};
pub use storage::{
    FilesystemStorage, IgnoreFn, ObjectConfig, ObjectStorage, ReadSeek, Storage, StorageConfig,
    StorageFactory, TracedStorage, WriteOpts,
};
