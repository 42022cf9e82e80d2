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
use crate::s3::header_constants::EXPIRES;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::{
    UtcTime, check_bucket_name, check_object_name, get_text_result, to_http_header_value,
};
use bytes::Buf;
use http::Method;
use xmltree::Element;

impl S3Client {
    /// Executes [CreateMultipartUpload](https://docs.aws.amazon.com/AmazonS3/latest/API/API_CreateMultipartUpload.html)
    /// S3 API and returns the upload id of the new session.
    pub async fn create_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        expires: UtcTime,
    ) -> Result<String, Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;

        let mut headers = Multimap::new();
        headers.add(EXPIRES, to_http_header_value(expires));

        let mut query_params = Multimap::new();
        query_params.add("uploads", "");

        let resp = self
            .execute(
                Method::POST,
                &mut headers,
                &query_params,
                bucket,
                Some(object),
                None,
            )
            .await?;

        let body = resp.bytes().await?;
        let root = Element::parse(body.reader())?;
        Ok(get_text_result(&root, "UploadId")?)
    }
}
