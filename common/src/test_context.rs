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

use avatar_store::s3::S3Client;
use avatar_store::s3::client::S3ClientBuilder;
use avatar_store::s3::creds::Credentials;
use avatar_store::s3::http::BaseUrl;

/// Connection to a live S3-compatible server, configured through
/// `SERVER_ENDPOINT`, `ACCESS_KEY`, `SECRET_KEY`, `SERVER_REGION` and
/// `SERVER_BUCKET`. The bucket must already exist.
#[derive(Clone, Debug)]
pub struct TestContext {
    pub client: S3Client,
    pub bucket: String,
}

impl TestContext {
    /// Returns `None` when `SERVER_ENDPOINT` is unset, so server tests can
    /// skip themselves on machines without one.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SERVER_ENDPOINT").ok()?;
        log::debug!("SERVER_ENDPOINT={host}");
        let access_key = std::env::var("ACCESS_KEY").unwrap_or("minioadmin".to_string());
        let secret_key = std::env::var("SECRET_KEY").unwrap_or("minioadmin".to_string());
        let region = std::env::var("SERVER_REGION").ok();
        let bucket = std::env::var("SERVER_BUCKET").unwrap_or("avatar-store-test".to_string());

        let base_url: BaseUrl = host.parse().unwrap();
        let client = S3ClientBuilder::new(base_url)
            .provider(Some(Credentials::new(access_key, secret_key)))
            .region(region)
            .ignore_cert_check(Some(std::env::var("IGNORE_CERT_CHECK").is_ok()))
            .build()
            .unwrap();

        Some(Self { client, bucket })
    }
}
