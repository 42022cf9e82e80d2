// Avatar Store for Amazon S3 Compatible Cloud Storage
// Copyright 2025 The avatar-store Authors
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

//! # avatar-store
//!
//! Storage of user avatar files on Amazon S3 and S3-compatible object stores.
//!
//! Large files are pushed with a client-driven multipart upload: the file is
//! split into fixed-size parts, the parts are uploaded concurrently under a
//! configurable ceiling, and the upload is either completed with every part in
//! order or aborted so no orphaned parts remain.
//!
//! ## Basic Usage
//!
//! ```no_run
//! use avatar_store::s3::S3Client;
//! use avatar_store::s3::creds::Credentials;
//! use avatar_store::s3::http::BaseUrl;
//! use avatar_store::s3::multipart::{MultipartUploadCoordinator, UploadConfig};
//! use avatar_store::s3::source::FileSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let base_url: BaseUrl = "http://localhost:9000".parse().unwrap();
//!     let client = S3Client::new(
//!         base_url,
//!         Some(Credentials::new("minioadmin", "minioadmin")),
//!     )
//!     .unwrap();
//!
//!     let coordinator = MultipartUploadCoordinator::new(
//!         Arc::new(client),
//!         UploadConfig::builder().max_concurrency(4).build(),
//!     );
//!     let source = FileSource::open("avatar.png").await.unwrap();
//!     let location = coordinator
//!         .upload("avatars", "user/avatar/1/avatar.png", Arc::new(source))
//!         .await
//!         .expect("upload failed");
//!
//!     println!("stored at {}", location.location);
//! }
//! ```
//!
//! ## Design
//! - [`s3::store::ObjectStore`] is the protocol the upload path needs; [`s3::S3Client`] implements it over HTTP with AWS Signature V4
//! - [`s3::multipart::MultipartUploadCoordinator`] owns a session from open to commit or abort
//! - [`avatar::AvatarRepository`] maps users to their avatar folder and picks single or multipart upload by size

#![allow(clippy::result_large_err)]
#![allow(clippy::too_many_arguments)]
pub mod avatar;
pub mod config;
pub mod s3;

#[cfg(test)]
#[macro_use]
extern crate quickcheck;
