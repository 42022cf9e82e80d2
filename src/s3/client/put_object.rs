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
use crate::s3::header_constants::ETAG;
use crate::s3::multimap_ext::Multimap;
use crate::s3::types::ObjectLocation;
use crate::s3::utils::{check_bucket_name, check_object_name, trim_quotes};
use bytes::Bytes;
use http::Method;

impl S3Client {
    /// Executes [PutObject](https://docs.aws.amazon.com/AmazonS3/latest/API/API_PutObject.html)
    /// S3 API with the whole object as body.
    pub async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        data: Bytes,
    ) -> Result<ObjectLocation, Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;

        let resp = self
            .execute(
                Method::PUT,
                &mut Multimap::new(),
                &Multimap::new(),
                bucket,
                Some(object),
                Some(data),
            )
            .await?;

        let etag = match resp.headers().get(ETAG) {
            Some(v) => trim_quotes(v.to_str()?.to_string()),
            None => String::new(),
        };

        Ok(ObjectLocation {
            bucket: bucket.to_string(),
            object: object.to_string(),
            location: self.object_url(bucket, object)?,
            etag,
        })
    }
}
