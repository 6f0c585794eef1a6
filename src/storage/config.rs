// Copyright 2022 Adobe. All rights reserved.
// This file is licensed to you under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may obtain a copy
// of the License at http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under
// the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR REPRESENTATIONS
// OF ANY KIND, either express or implied. See the License for the specific language
// governing permissions and limitations under the License.

use serde::{Deserialize, Serialize};

/// Default multipart upload part size for the object backend: 5 MiB.
pub const DEFAULT_PART_SIZE: u64 = 5 << 20;

/// Configuration selecting exactly one storage backend.
///
/// A closed set of tagged variants: a Storage instance is backed by a
/// local directory tree or by an S3-compatible object store, never both.
/// Consumed once at construction; no hot-reload.
///
/// # Examples
///
/// ## Local filesystem
/// ```
/// use polystore::StorageConfig;
///
/// let config = StorageConfig::filesystem("/tmp/data");
/// ```
///
/// ## S3-compatible object store
/// ```
/// use polystore::{ObjectConfig, StorageConfig};
///
/// let config = StorageConfig::object(
///     ObjectConfig::new("minio.local:9000", "ACCESS_KEY", "SECRET_KEY", "my-bucket")
///         .with_use_ssl(false)
///         .with_region("us-east-1"),
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local directory tree.
    Filesystem(FilesystemConfig),
    /// S3-compatible object store.
    Object(ObjectConfig),
}

impl StorageConfig {
    /// Create a filesystem configuration rooted at `root_directory`.
    pub fn filesystem(root_directory: impl Into<String>) -> Self {
        Self::Filesystem(FilesystemConfig {
            root_directory: root_directory.into(),
        })
    }

    /// Create an object store configuration.
    pub fn object(config: ObjectConfig) -> Self {
        Self::Object(config)
    }

    /// The backend this configuration selects, as a string.
    pub fn backend_str(&self) -> &'static str {
        match self {
            Self::Filesystem(_) => "filesystem",
            Self::Object(_) => "object",
        }
    }
}

/// Filesystem backend parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Root directory all abstract pathnames resolve under.
    pub root_directory: String,
}

/// Object store backend parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Endpoint of the store, with or without scheme. An empty endpoint
    /// yields a disabled backend.
    pub endpoint: String,

    /// Access key for static credentials.
    pub access_key: String,

    /// Secret key for static credentials.
    pub secret_key: String,

    /// Bucket holding every object of this Storage instance.
    pub bucket: String,

    /// Whether to reach the endpoint over TLS.
    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,

    /// Part size for unknown-length (multipart) uploads.
    #[serde(default = "default_part_size")]
    pub part_size: u64,

    /// Optional region override.
    #[serde(default)]
    pub region: Option<String>,
}

fn default_use_ssl() -> bool {
    true
}

fn default_part_size() -> u64 {
    DEFAULT_PART_SIZE
}

impl ObjectConfig {
    /// Create an object store configuration with TLS on and the default
    /// part size.
    pub fn new(
        endpoint: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            bucket: bucket.into(),
            use_ssl: default_use_ssl(),
            part_size: default_part_size(),
            region: None,
        }
    }

    /// Toggle TLS towards the endpoint (for method chaining).
    pub fn with_use_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// Override the multipart upload part size (for method chaining).
    pub fn with_part_size(mut self, part_size: u64) -> Self {
        self.part_size = part_size;
        self
    }

    /// Set the region (for method chaining).
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}
