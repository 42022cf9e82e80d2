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

use super::S3Client;
use crate::s3::error::Error;
use crate::s3::store::ObjectStore;
use crate::s3::types::{ObjectEntry, ObjectLocation, Part};
use crate::s3::utils::UtcTime;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
impl ObjectStore for S3Client {
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        expires: UtcTime,
    ) -> Result<String, Error> {
        S3Client::create_multipart_upload(self, bucket, object, expires).await
    }

    async fn upload_part(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: Bytes,
    ) -> Result<String, Error> {
        S3Client::upload_part(self, bucket, object, upload_id, part_number, data).await
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<ObjectLocation, Error> {
        S3Client::complete_multipart_upload(self, bucket, object, upload_id, parts).await
    }

    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        S3Client::abort_multipart_upload(self, bucket, object, upload_id).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        data: Bytes,
    ) -> Result<ObjectLocation, Error> {
        S3Client::put_object(self, bucket, object, data).await
    }

    async fn remove_object(&self, bucket: &str, object: &str) -> Result<(), Error> {
        S3Client::remove_object(self, bucket, object).await
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, Error> {
        S3Client::list_objects(self, bucket, prefix).await
    }

    fn object_url(&self, bucket: &str, object: &str) -> Result<String, Error> {
        S3Client::object_url(self, bucket, object)
    }
}
