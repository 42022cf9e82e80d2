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

//! Credentials used to sign requests
//!
//! The avatar store signs with one static key pair, read by
//! [`Config`](crate::config::Config) from `AWS_ACCESS_KEY`,
//! `AWS_SECRET_ACCESS_KEY` and, for temporary credentials, `AWS_SESSION_TOKEN`.

use std::fmt;

/// Access key pair with an optional session token.
///
/// The secret key and token never appear in `Debug` output, since clients and
/// configs holding them are logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    /// ```
    /// use avatar_store::s3::creds::Credentials;
    ///
    /// let creds = Credentials::new("minioadmin", "minioadmin")
    ///     .session_token(Some("token".to_string()));
    /// assert_eq!(creds.session_token.as_deref(), Some("token"));
    /// ```
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    /// Sets the token of temporary credentials; it is sent as
    /// `x-amz-security-token`.
    pub fn session_token(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Source of the credentials for each signed request.
pub trait Provider: fmt::Debug {
    fn fetch(&self) -> Credentials;
}

impl Provider for Credentials {
    fn fetch(&self) -> Credentials {
        self.clone()
    }
}
