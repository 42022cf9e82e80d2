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

use super::{MAX_MULTIPART_COUNT, S3Client};
use crate::s3::error::{Error, S3ServerError, ValidationErr};
use crate::s3::header_constants::{CONTENT_TYPE, ETAG};
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::{check_bucket_name, check_object_name};
use bytes::Bytes;
use http::Method;

impl S3Client {
    /// Executes [UploadPart](https://docs.aws.amazon.com/AmazonS3/latest/API/API_UploadPart.html)
    /// S3 API and returns the ETag header exactly as the server sent it.
    pub async fn upload_part(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: Bytes,
    ) -> Result<String, Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;

        if upload_id.is_empty() {
            return Err(ValidationErr::InvalidUploadId("upload ID cannot be empty".into()).into());
        }
        if !(1..=MAX_MULTIPART_COUNT).contains(&part_number) {
            return Err(ValidationErr::InvalidPartNumber(part_number).into());
        }

        let mut query_params = Multimap::new();
        query_params.add("partNumber", part_number.to_string());
        query_params.add("uploadId", upload_id);

        let resp = self
            .execute(
                Method::PUT,
                &mut Multimap::new(),
                &query_params,
                bucket,
                Some(object),
                Some(data),
            )
            .await?;

        match resp.headers().get(ETAG) {
            Some(v) => Ok(v.to_str()?.to_string()),
            None => Err(S3ServerError::InvalidServerResponse {
                message: format!("missing ETag header for part {part_number}"),
                http_status_code: resp.status().as_u16(),
                content_type: resp
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string(),
            }
            .into()),
        }
    }
}
