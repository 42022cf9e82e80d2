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

//! Object-store protocol used by the upload path

use crate::s3::error::Error;
use crate::s3::types::{ObjectEntry, ObjectLocation, Part};
use crate::s3::utils::UtcTime;
use async_trait::async_trait;
use bytes::Bytes;

/// Operations the multipart coordinator and the avatar repository need from
/// an S3-compatible store.
///
/// Implementations must be safe to call concurrently: part uploads of one
/// session run in parallel against the same store value.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Opens a multipart upload session and returns its upload id.
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        expires: UtcTime,
    ) -> Result<String, Error>;

    /// Uploads one part and returns the ETag the store assigned to it.
    async fn upload_part(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: Bytes,
    ) -> Result<String, Error>;

    /// Assembles the uploaded parts into the final object. `parts` must be
    /// sorted by part number.
    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<ObjectLocation, Error>;

    /// Discards the session and every part uploaded under it.
    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
    ) -> Result<(), Error>;

    /// Stores a small object in a single request.
    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        data: Bytes,
    ) -> Result<ObjectLocation, Error>;

    async fn remove_object(&self, bucket: &str, object: &str) -> Result<(), Error>;

    /// Lists every object under `prefix`.
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, Error>;

    /// Returns the URL an object is reachable at.
    fn object_url(&self, bucket: &str, object: &str) -> Result<String, Error>;
}
