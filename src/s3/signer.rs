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

//! AWS Signature Version 4 for S3 requests

use crate::s3::creds::Credentials;
use crate::s3::header_constants::{AUTHORIZATION, X_AMZ_SECURITY_TOKEN};
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::utils::{UtcTime, sha256_hash, to_amz_date, to_signer_date};
use hmac::{Hmac, Mac};
use http::Method;
use sha2::Sha256;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Signs S3 requests made with one set of credentials, in one region, at one
/// point in time.
pub struct RequestSigner<'a> {
    creds: &'a Credentials,
    region: &'a str,
    date: UtcTime,
}

impl<'a> RequestSigner<'a> {
    pub fn new(creds: &'a Credentials, region: &'a str, date: UtcTime) -> Self {
        Self {
            creds,
            region,
            date,
        }
    }

    /// `<yyyymmdd>/<region>/s3/aws4_request`
    fn scope(&self) -> String {
        format!(
            "{}/{}/{SERVICE}/aws4_request",
            to_signer_date(self.date),
            self.region
        )
    }

    fn signing_key(&self) -> Vec<u8> {
        let secret = format!("AWS4{}", self.creds.secret_key);
        let date_key = hmac_sha256(secret.as_bytes(), to_signer_date(self.date).as_bytes());
        [self.region.as_bytes(), SERVICE.as_bytes(), b"aws4_request"]
            .iter()
            .fold(date_key, |key, part| hmac_sha256(&key, part))
    }

    /// Adds `Authorization` (and `x-amz-security-token` for temporary
    /// credentials) to `headers`, which must already hold every other header
    /// of the request, and returns the signature.
    pub fn sign(
        &self,
        method: &Method,
        uri: &str,
        headers: &mut Multimap,
        query: &Multimap,
        content_sha256: &str,
    ) -> String {
        if let Some(token) = &self.creds.session_token {
            headers.add(X_AMZ_SECURITY_TOKEN, token.clone());
        }

        let (signed_headers, canonical_headers) = headers.get_canonical_headers();
        let canonical_request = format!(
            "{method}\n{uri}\n{}\n{canonical_headers}\n\n{signed_headers}\n{content_sha256}",
            query.get_canonical_query_string()
        );
        let scope = self.scope();
        let string_to_sign = format!(
            "{ALGORITHM}\n{}\n{scope}\n{}",
            to_amz_date(self.date),
            sha256_hash(canonical_request.as_bytes())
        );
        let signature = hex(&hmac_sha256(&self.signing_key(), string_to_sign.as_bytes()));

        headers.add(
            AUTHORIZATION,
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.creds.access_key
            ),
        );
        signature
    }
}
