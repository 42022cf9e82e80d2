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
use crate::s3::error::{Error, S3ServerError, ValidationErr};
use crate::s3::error_response::S3ErrorResponse;
use crate::s3::header_constants::{CONTENT_MD5, CONTENT_TYPE};
use crate::s3::multimap_ext::{Multimap, MultimapExt};
use crate::s3::types::{ObjectLocation, Part};
use crate::s3::utils::{
    check_bucket_name, check_object_name, get_text_default, md5sum_hash, trim_quotes,
};
use bytes::{Buf, Bytes, BytesMut};
use http::Method;
use xmltree::Element;

/// Builds the `CompleteMultipartUpload` request body for given parts.
pub(crate) fn complete_multipart_upload_body(parts: &[Part]) -> Bytes {
    // Set capacity of the byte-buffer based on the part count - attempting
    // to avoid extra allocations when building the XML payload.
    let mut data = BytesMut::with_capacity(100 * parts.len() + 100);
    data.extend_from_slice(b"<CompleteMultipartUpload>");
    for part in parts.iter() {
        data.extend_from_slice(b"<Part><PartNumber>");
        data.extend_from_slice(part.number.to_string().as_bytes());
        data.extend_from_slice(b"</PartNumber><ETag>");
        data.extend_from_slice(part.etag.as_bytes());
        data.extend_from_slice(b"</ETag></Part>");
    }
    data.extend_from_slice(b"</CompleteMultipartUpload>");
    data.freeze()
}

/// Parses a `CompleteMultipartUploadResult`.
///
/// The server may answer 200 OK and still report a failure in the body, so an
/// `<Error>` document is turned into an S3 error here.
pub(crate) fn parse_complete_multipart_upload_response(
    body: Bytes,
    headers: http::HeaderMap,
    bucket: &str,
    object: &str,
    default_location: String,
) -> Result<ObjectLocation, Error> {
    let root = Element::parse(body.clone().reader())?;
    if root.name == "Error" {
        let e = S3ErrorResponse::new_from_body(body, headers)?;
        return Err(S3ServerError::S3Error(Box::new(e)).into());
    }

    let location = get_text_default(&root, "Location");
    let bucket_name = get_text_default(&root, "Bucket");
    let object_name = get_text_default(&root, "Key");
    Ok(ObjectLocation {
        bucket: if bucket_name.is_empty() {
            bucket.to_string()
        } else {
            bucket_name
        },
        object: if object_name.is_empty() {
            object.to_string()
        } else {
            object_name
        },
        location: if location.is_empty() {
            default_location
        } else {
            location
        },
        etag: trim_quotes(get_text_default(&root, "ETag")),
    })
}

impl S3Client {
    /// Executes [CompleteMultipartUpload](https://docs.aws.amazon.com/AmazonS3/latest/API/API_CompleteMultipartUpload.html)
    /// S3 API. `parts` are sent in the given order.
    pub async fn complete_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<ObjectLocation, Error> {
        check_bucket_name(bucket, true)?;
        check_object_name(object)?;

        if upload_id.is_empty() {
            return Err(ValidationErr::InvalidUploadId("upload ID cannot be empty".into()).into());
        }
        if parts.is_empty() {
            return Err(ValidationErr::EmptyParts.into());
        }

        let data = complete_multipart_upload_body(parts);

        let mut headers = Multimap::new();
        headers.add(CONTENT_TYPE, "application/xml");
        headers.add(CONTENT_MD5, md5sum_hash(data.as_ref()));

        let mut query_params = Multimap::new();
        query_params.add("uploadId", upload_id);

        let mut resp = self
            .execute(
                Method::POST,
                &mut headers,
                &query_params,
                bucket,
                Some(object),
                Some(data),
            )
            .await?;

        let headers = std::mem::take(resp.headers_mut());
        let body = resp.bytes().await?;
        parse_complete_multipart_upload_response(
            body,
            headers,
            bucket,
            object,
            self.object_url(bucket, object)?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::s3::error_response::S3ErrorCode;

    #[test]
    fn test_complete_body_keeps_part_order_and_etags() {
        let parts = vec![
            Part {
                number: 1,
                etag: "\"a1\"".into(),
            },
            Part {
                number: 2,
                etag: "\"b2\"".into(),
            },
        ];
        let body = complete_multipart_upload_body(&parts);
        assert_eq!(
            body,
            Bytes::from_static(
                b"<CompleteMultipartUpload>\
                <Part><PartNumber>1</PartNumber><ETag>\"a1\"</ETag></Part>\
                <Part><PartNumber>2</PartNumber><ETag>\"b2\"</ETag></Part>\
                </CompleteMultipartUpload>"
            )
        );
    }

    #[test]
    fn test_parse_complete_result() {
        let body = Bytes::from_static(
            b"<CompleteMultipartUploadResult>\
            <Location>https://avatars.s3.amazonaws.com/user/avatar/1/me.png</Location>\
            <Bucket>avatars</Bucket><Key>user/avatar/1/me.png</Key>\
            <ETag>\"3858f62230ac3c915f300c664312c11f-3\"</ETag>\
            </CompleteMultipartUploadResult>",
        );
        let loc = parse_complete_multipart_upload_response(
            body,
            http::HeaderMap::new(),
            "avatars",
            "user/avatar/1/me.png",
            "unused".into(),
        )
        .unwrap();
        assert_eq!(
            loc.location,
            "https://avatars.s3.amazonaws.com/user/avatar/1/me.png"
        );
        assert_eq!(loc.bucket, "avatars");
        assert_eq!(loc.etag, "3858f62230ac3c915f300c664312c11f-3");
    }

    #[test]
    fn test_parse_complete_result_without_location() {
        let body = Bytes::from_static(
            b"<CompleteMultipartUploadResult><ETag>\"e\"</ETag></CompleteMultipartUploadResult>",
        );
        let loc = parse_complete_multipart_upload_response(
            body,
            http::HeaderMap::new(),
            "avatars",
            "a.png",
            "http://localhost:9000/avatars/a.png".into(),
        )
        .unwrap();
        assert_eq!(loc.location, "http://localhost:9000/avatars/a.png");
        assert_eq!(loc.object, "a.png");
    }

    #[test]
    fn test_parse_complete_error_with_ok_status() {
        let body = Bytes::from_static(
            b"<Error><Code>InvalidPartOrder</Code><Message>bad order</Message></Error>",
        );
        let r = parse_complete_multipart_upload_response(
            body,
            http::HeaderMap::new(),
            "avatars",
            "a.png",
            String::new(),
        );
        match r {
            Err(Error::S3Server(S3ServerError::S3Error(e))) => {
                assert_eq!(e.code(), S3ErrorCode::InvalidPartOrder)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
