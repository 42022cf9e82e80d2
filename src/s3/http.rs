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

use crate::s3::client::DEFAULT_REGION;
use crate::s3::error::ValidationErr;
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::urlencode_object_key;
use http::Uri;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref AWS_S3_ENDPOINT_REGEX: Regex =
        Regex::new(r"^s3([.-](?P<region>[a-z\d-]{1,63}))?\.amazonaws\.com(?P<cn>\.cn)?$").unwrap();
}

#[derive(Clone, Debug)]
/// Represents HTTP URL
pub struct Url {
    pub https: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Multimap,
}

impl Url {
    pub fn host_header_value(&self) -> String {
        if self.port > 0 {
            return format!("{}:{}", self.host, self.port);
        }
        self.host.clone()
    }
}

impl Default for Url {
    fn default() -> Self {
        Self {
            https: true,
            host: String::default(),
            port: u16::default(),
            path: String::default(),
            query: Multimap::default(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.host.is_empty() {
            return Err(std::fmt::Error);
        }

        if self.https {
            f.write_str("https://")?;
        } else {
            f.write_str("http://")?;
        }

        if self.port > 0 {
            f.write_str(&format!("{}:{}", self.host, self.port))?;
        } else {
            f.write_str(&self.host)?;
        }

        if !self.path.starts_with('/') {
            f.write_str("/")?;
        }
        f.write_str(&self.path)?;

        if !self.query.is_empty() {
            f.write_str("?")?;
            f.write_str(&self.query.to_query_string())?;
        }

        Ok(())
    }
}

/// Returns true if the host is an Amazon S3 endpoint.
pub fn match_aws_s3_endpoint(value: &str) -> bool {
    AWS_S3_ENDPOINT_REGEX.is_match(value.to_lowercase().as_str())
}

#[derive(Clone, Debug)]
/// Represents Base URL of S3 endpoint
pub struct BaseUrl {
    pub https: bool,
    host: String,
    port: u16,
    pub region: String,
    aws_domain_suffix: String,
    pub virtual_style: bool,
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self {
            https: true,
            host: "127.0.0.1".to_string(),
            port: 9000,
            region: "".to_string(),
            aws_domain_suffix: "".to_string(),
            virtual_style: false,
        }
    }
}

impl FromStr for BaseUrl {
    type Err = ValidationErr;

    /// Convert a string to a BaseUrl.
    ///
    /// # Examples
    ///
    /// ```
    /// use avatar_store::s3::http::BaseUrl;
    ///
    /// let base_url: BaseUrl = "http://localhost:9000".parse().unwrap();
    /// assert!(!base_url.https);
    /// let base_url: BaseUrl = "s3.ap-northeast-1.amazonaws.com".parse().unwrap();
    /// assert_eq!(base_url.region, "ap-northeast-1");
    /// ```
    fn from_str(s: &str) -> Result<Self, ValidationErr> {
        let url = s.parse::<Uri>()?;

        let https = match url.scheme() {
            None => true,
            Some(scheme) => match scheme.as_str() {
                "http" => false,
                "https" => true,
                _ => {
                    return Err(ValidationErr::InvalidBaseUrl(
                        "scheme must be http or https".into(),
                    ));
                }
            },
        };

        let mut host = match url.host() {
            Some(h) => h,
            _ => {
                return Err(ValidationErr::InvalidBaseUrl(
                    "valid host must be provided".into(),
                ));
            }
        };

        let ipv6host = "[".to_string() + host + "]";
        if host.parse::<std::net::Ipv6Addr>().is_ok() {
            host = &ipv6host;
        }

        let mut port = match url.port() {
            Some(p) => p.as_u16(),
            _ => 0u16,
        };

        if (https && port == 443) || (!https && port == 80) {
            port = 0u16;
        }

        if url.path() != "/" && !url.path().is_empty() {
            return Err(ValidationErr::InvalidBaseUrl(
                "path must be empty for base URL".into(),
            ));
        }

        if url.query().is_some() {
            return Err(ValidationErr::InvalidBaseUrl(
                "query must be none for base URL".into(),
            ));
        }

        let lhost = host.to_lowercase();
        let (region, aws_domain_suffix) = match AWS_S3_ENDPOINT_REGEX.captures(&lhost) {
            Some(caps) => {
                let region = caps
                    .name("region")
                    .map_or(String::new(), |m| m.as_str().to_string());
                let mut suffix = String::from("amazonaws.com");
                if caps.name("cn").is_some() {
                    if region.is_empty() {
                        return Err(ValidationErr::InvalidBaseUrl(format!(
                            "region missing in Amazon S3 China endpoint {host}"
                        )));
                    }
                    suffix.push_str(".cn");
                }
                (region, suffix)
            }
            None => (String::new(), String::new()),
        };
        let virtual_style = !aws_domain_suffix.is_empty();

        Ok(BaseUrl {
            https,
            host: host.to_string(),
            port,
            region,
            aws_domain_suffix,
            virtual_style,
        })
    }
}

impl BaseUrl {
    /// Checks base URL is AWS host
    pub fn is_aws_host(&self) -> bool {
        !self.aws_domain_suffix.is_empty()
    }

    /// Builds URL from base URL for given parameters for S3 operation
    pub fn build_url(
        &self,
        region: &str,
        query: &Multimap,
        bucket_name: &str,
        object_name: Option<&str>,
    ) -> Result<Url, ValidationErr> {
        let mut url = Url {
            https: self.https,
            host: self.host.clone(),
            port: self.port,
            path: String::from("/"),
            query: query.clone(),
        };

        if self.is_aws_host() {
            let region = if region.is_empty() {
                DEFAULT_REGION
            } else {
                region
            };
            url.host = format!("s3.{region}.{}", self.aws_domain_suffix);
        }

        // Use path style for bucket name containing '.' which causes
        // SSL certificate validation error.
        let enforce_path_style = bucket_name.contains('.') && self.https;

        let mut path = String::new();
        if enforce_path_style || !self.virtual_style {
            path.push('/');
            path.push_str(bucket_name);
        } else {
            url.host = format!("{bucket_name}.{}", url.host);
        }

        if let Some(v) = object_name {
            if !v.starts_with('/') {
                path.push('/');
            }
            path.push_str(&urlencode_object_key(v));
        }

        if path.is_empty() {
            path.push('/');
        }
        url.path = path;

        Ok(url)
    }
}
