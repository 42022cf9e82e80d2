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
use crate::s3::error::{Error, ValidationErr};
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::{check_bucket_name, check_object_name};
use http::Method;

impl S3Client {
    /// Executes [AbortMultipartUpload](https://docs.aws.amazon.com/AmazonS3/latest/API/API_AbortMultipartUpload.html)
    /// S3 API.
    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;
        if upload_id.is_empty() {
            return Err(ValidationErr::InvalidUploadId("upload ID cannot be empty".into()).into());
        }

        let mut query_params = Multimap::new();
        query_params.add("uploadId", upload_id);

        self.execute(
            Method::DELETE,
            &mut Multimap::new(),
            &query_params,
            bucket,
            Some(object),
            None,
        )
        .await?;
        Ok(())
    }
}
