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

//! Environment configuration

use crate::avatar::{AvatarRepository, DEFAULT_MULTIPART_THRESHOLD};
use crate::s3::client::{MAX_PART_SIZE, MIN_PART_SIZE, S3Client, S3ClientBuilder};
use crate::s3::creds::Credentials;
use crate::s3::error::{Error, ValidationErr};
use crate::s3::http::BaseUrl;
use crate::s3::multipart::{DEFAULT_MAX_CONCURRENCY, DEFAULT_PART_SIZE, UploadConfig};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const AWS_ENDPOINT: &str = "AWS_ENDPOINT";
pub const AWS_ACCESS_KEY: &str = "AWS_ACCESS_KEY";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_BUCKET_NAME: &str = "AWS_BUCKET_NAME";
pub const AVATAR_PART_SIZE: &str = "AVATAR_PART_SIZE";
pub const AVATAR_CONCURRENCY: &str = "AVATAR_CONCURRENCY";
pub const AVATAR_MULTIPART_THRESHOLD: &str = "AVATAR_MULTIPART_THRESHOLD";
/// Per-request timeout in seconds; unset means no timeout.
pub const AVATAR_REQUEST_TIMEOUT: &str = "AVATAR_REQUEST_TIMEOUT";

pub const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Settings of the avatar store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub credentials: Credentials,
    pub region: Option<String>,
    pub bucket: String,
    pub part_size: u64,
    pub max_concurrency: usize,
    pub multipart_threshold: u64,
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ValidationErr> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| get(key).ok_or_else(|| ValidationErr::MissingConfig(key.to_string()));

        let config = Config {
            endpoint: get(AWS_ENDPOINT).unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            credentials: Credentials::new(
                required(AWS_ACCESS_KEY)?,
                required(AWS_SECRET_ACCESS_KEY)?,
            )
            .session_token(get(AWS_SESSION_TOKEN)),
            region: get(AWS_REGION),
            bucket: required(AWS_BUCKET_NAME)?,
            part_size: parse_or(get(AVATAR_PART_SIZE), AVATAR_PART_SIZE, DEFAULT_PART_SIZE)?,
            max_concurrency: parse_or(
                get(AVATAR_CONCURRENCY),
                AVATAR_CONCURRENCY,
                DEFAULT_MAX_CONCURRENCY,
            )?,
            multipart_threshold: parse_or(
                get(AVATAR_MULTIPART_THRESHOLD),
                AVATAR_MULTIPART_THRESHOLD,
                DEFAULT_MULTIPART_THRESHOLD,
            )?,
            request_timeout: get(AVATAR_REQUEST_TIMEOUT)
                .map(|v| parse_or(Some(v), AVATAR_REQUEST_TIMEOUT, 0u64))
                .transpose()?
                .map(Duration::from_secs),
        };

        if config.part_size < MIN_PART_SIZE {
            return Err(ValidationErr::InvalidMinPartSize(config.part_size));
        }
        if config.part_size > MAX_PART_SIZE {
            return Err(ValidationErr::InvalidMaxPartSize(config.part_size));
        }
        if config.max_concurrency == 0 {
            return Err(ValidationErr::InvalidConcurrency);
        }
        if config.request_timeout == Some(Duration::ZERO) {
            return Err(ValidationErr::InvalidConfig {
                key: AVATAR_REQUEST_TIMEOUT.to_string(),
                value: "0".to_string(),
            });
        }
        Ok(config)
    }

    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig::builder()
            .part_size(self.part_size)
            .max_concurrency(self.max_concurrency)
            .build()
    }

    /// Builds an S3 client signing with the configured static credentials and
    /// applying the request timeout to every call.
    pub fn client(&self) -> Result<S3Client, Error> {
        let base_url = BaseUrl::from_str(&self.endpoint)?;
        S3ClientBuilder::new(base_url)
            .provider(Some(self.credentials.clone()))
            .region(self.region.clone())
            .timeout(self.request_timeout)
            .build()
    }

    pub fn repository(&self) -> Result<AvatarRepository, Error> {
        let client = self.client()?;
        Ok(
            AvatarRepository::new(Arc::new(client), self.bucket.clone(), self.upload_config())
                .multipart_threshold(self.multipart_threshold),
        )
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, ValidationErr> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| ValidationErr::InvalidConfig {
            key: key.to_string(),
            value: v,
        }),
        None => Ok(default),
    }
}
