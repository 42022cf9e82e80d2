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
use crate::s3::types::ObjectEntry;
use crate::s3::utils::{
    check_bucket_name, from_iso8601utc, get_text_default, get_text_option, get_text_result,
    trim_quotes,
};
use bytes::{Buf, Bytes};
use http::Method;
use xmltree::Element;

/// Parses one `ListBucketResult` page into its entries and the continuation
/// token of the next page, if the listing is truncated.
pub(crate) fn parse_list_objects_v2(
    body: Bytes,
) -> Result<(Vec<ObjectEntry>, Option<String>), Error> {
    let mut root = Element::parse(body.reader())?;

    let is_truncated = get_text_default(&root, "IsTruncated").to_lowercase() == "true";
    let next_token = match is_truncated {
        true => get_text_option(&root, "NextContinuationToken"),
        false => None,
    };

    let mut contents = Vec::new();
    while let Some(content) = root.take_child("Contents") {
        let size = get_text_default(&content, "Size");
        let last_modified = match get_text_option(&content, "LastModified") {
            Some(v) => Some(from_iso8601utc(&v).map_err(ValidationErr::from)?),
            None => None,
        };
        contents.push(ObjectEntry {
            key: get_text_result(&content, "Key")?,
            size: match size.is_empty() {
                true => 0,
                false => size
                    .parse::<u64>()
                    .map_err(ValidationErr::from)?,
            },
            etag: get_text_option(&content, "ETag").map(trim_quotes),
            last_modified,
        });
    }

    Ok((contents, next_token))
}

impl S3Client {
    /// Lists all objects under `prefix` using
    /// [ListObjectsV2](https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListObjectsV2.html),
    /// following continuation tokens until the listing is exhausted.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, Error> {
        check_bucket_name(bucket, true)?;

        let mut entries = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut query_params = Multimap::new();
            query_params.add("list-type", "2");
            query_params.add("prefix", prefix);
            if let Some(token) = continuation_token.take() {
                query_params.add("continuation-token", token);
            }

            let resp = self
                .execute(
                    Method::GET,
                    &mut Multimap::new(),
                    &query_params,
                    bucket,
                    None,
                    None,
                )
                .await?;

            let (mut page, next) = parse_list_objects_v2(resp.bytes().await?)?;
            entries.append(&mut page);
            match next {
                Some(token) => continuation_token = Some(token),
                None => return Ok(entries),
            }
        }
    }
}
