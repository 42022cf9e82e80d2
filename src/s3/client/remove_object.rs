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
use crate::s3::multimap_ext::Multimap;
use crate::s3::utils::{check_bucket_name, check_object_name};
use http::Method;

impl S3Client {
    /// Executes [DeleteObject](https://docs.aws.amazon.com/AmazonS3/latest/API/API_DeleteObject.html)
    /// S3 API.
    pub async fn remove_object(&self, bucket: &str, object: &str) -> Result<(), Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;

        self.execute(
            Method::DELETE,
            &mut Multimap::new(),
            &Multimap::new(),
            bucket,
            Some(object),
            None,
        )
        .await?;
        Ok(())
    }
}
