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

//! Backend-polymorphic storage layer
//!
//! This module provides one capability interface ([`Storage`]) and two
//! concrete backends satisfying it with equivalent observable semantics:
//! a local directory tree ([`FilesystemStorage`]) and an S3-compatible
//! object store ([`ObjectStorage`]). Callers depend on the trait only and
//! never learn which backend is active.

pub mod config;
pub mod factory;
pub mod filesystem;
pub mod object;
pub mod provider;
pub mod telemetry;

// Public exports
pub use config::{FilesystemConfig, ObjectConfig, StorageConfig};
pub use factory::StorageFactory;
pub use filesystem::FilesystemStorage;
pub use object::ObjectStorage;
pub use provider::{IgnoreFn, ReadSeek, Storage, WriteOpts};
pub use telemetry::TracedStorage;
