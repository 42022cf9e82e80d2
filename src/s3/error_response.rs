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

use crate::s3::error::ValidationErr;
use crate::s3::utils::{get_text_default, get_text_option};
use bytes::{Buf, Bytes};
use http::HeaderMap;
use std::str::FromStr;
use xmltree::Element;

/// Error codes returned by the server that the upload path reacts to.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum S3ErrorCode {
    #[default]
    NoError,
    AccessDenied,
    BadRequest,
    /// The proposed upload is smaller than the minimum allowed part size
    EntityTooSmall,
    EntityTooLarge,
    /// One or more of the specified parts could not be found
    InvalidPart,
    /// The list of parts was not in ascending order
    InvalidPartOrder,
    MethodNotAllowed,
    NoSuchBucket,
    NoSuchKey,
    /// The upload id is unknown, or the upload was already completed or aborted
    NoSuchUpload,
    ResourceNotFound,
    ResourceConflict,
    SignatureDoesNotMatch,
    SlowDown,
    InternalError,

    OtherError(String),
}

#[allow(dead_code)]
const ALL_S3_ERROR_CODE: &[S3ErrorCode] = &[
    S3ErrorCode::NoError,
    S3ErrorCode::AccessDenied,
    S3ErrorCode::BadRequest,
    S3ErrorCode::EntityTooSmall,
    S3ErrorCode::EntityTooLarge,
    S3ErrorCode::InvalidPart,
    S3ErrorCode::InvalidPartOrder,
    S3ErrorCode::MethodNotAllowed,
    S3ErrorCode::NoSuchBucket,
    S3ErrorCode::NoSuchKey,
    S3ErrorCode::NoSuchUpload,
    S3ErrorCode::ResourceNotFound,
    S3ErrorCode::ResourceConflict,
    S3ErrorCode::SignatureDoesNotMatch,
    S3ErrorCode::SlowDown,
    S3ErrorCode::InternalError,
];

impl FromStr for S3ErrorCode {
    type Err = ValidationErr;

    fn from_str(s: &str) -> Result<Self, ValidationErr> {
        match s.to_lowercase().as_str() {
            "noerror" => Ok(S3ErrorCode::NoError),
            "accessdenied" => Ok(S3ErrorCode::AccessDenied),
            "badrequest" => Ok(S3ErrorCode::BadRequest),
            "entitytoosmall" => Ok(S3ErrorCode::EntityTooSmall),
            "entitytoolarge" => Ok(S3ErrorCode::EntityTooLarge),
            "invalidpart" => Ok(S3ErrorCode::InvalidPart),
            "invalidpartorder" => Ok(S3ErrorCode::InvalidPartOrder),
            "methodnotallowed" => Ok(S3ErrorCode::MethodNotAllowed),
            "nosuchbucket" => Ok(S3ErrorCode::NoSuchBucket),
            "nosuchkey" => Ok(S3ErrorCode::NoSuchKey),
            "nosuchupload" => Ok(S3ErrorCode::NoSuchUpload),
            "resourcenotfound" => Ok(S3ErrorCode::ResourceNotFound),
            "resourceconflict" => Ok(S3ErrorCode::ResourceConflict),
            "signaturedoesnotmatch" => Ok(S3ErrorCode::SignatureDoesNotMatch),
            "slowdown" => Ok(S3ErrorCode::SlowDown),
            "internalerror" => Ok(S3ErrorCode::InternalError),

            v => Ok(S3ErrorCode::OtherError(v.to_owned())),
        }
    }
}

impl std::fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            S3ErrorCode::NoError => write!(f, "NoError"),
            S3ErrorCode::AccessDenied => write!(f, "AccessDenied"),
            S3ErrorCode::BadRequest => write!(f, "BadRequest"),
            S3ErrorCode::EntityTooSmall => write!(f, "EntityTooSmall"),
            S3ErrorCode::EntityTooLarge => write!(f, "EntityTooLarge"),
            S3ErrorCode::InvalidPart => write!(f, "InvalidPart"),
            S3ErrorCode::InvalidPartOrder => write!(f, "InvalidPartOrder"),
            S3ErrorCode::MethodNotAllowed => write!(f, "MethodNotAllowed"),
            S3ErrorCode::NoSuchBucket => write!(f, "NoSuchBucket"),
            S3ErrorCode::NoSuchKey => write!(f, "NoSuchKey"),
            S3ErrorCode::NoSuchUpload => write!(f, "NoSuchUpload"),
            S3ErrorCode::ResourceNotFound => write!(f, "ResourceNotFound"),
            S3ErrorCode::ResourceConflict => write!(f, "ResourceConflict"),
            S3ErrorCode::SignatureDoesNotMatch => write!(f, "SignatureDoesNotMatch"),
            S3ErrorCode::SlowDown => write!(f, "SlowDown"),
            S3ErrorCode::InternalError => write!(f, "InternalError"),
            S3ErrorCode::OtherError(msg) => write!(f, "{msg}"),
        }
    }
}


/// Typed error returned by the server for a failed request.
#[derive(Clone, Debug)]
pub struct S3ErrorResponse {
    code: S3ErrorCode,
    message: Option<String>,
    headers: HeaderMap,
    resource: String,
    request_id: String,
    host_id: String,
    bucket_name: Option<String>,
    object_name: Option<String>,
}

impl S3ErrorResponse {
    pub fn new(
        headers: HeaderMap,
        code: S3ErrorCode,
        message: Option<String>,
        resource: String,
        request_id: String,
        host_id: String,
        bucket_name: Option<String>,
        object_name: Option<String>,
    ) -> Self {
        Self {
            headers,
            code,
            message,
            resource,
            request_id,
            host_id,
            bucket_name,
            object_name,
        }
    }

    pub fn new_from_body(body: Bytes, headers: HeaderMap) -> Result<Self, ValidationErr> {
        let root = Element::parse(body.reader())?;
        Ok(Self {
            headers,
            code: S3ErrorCode::from_str(&get_text_default(&root, "Code"))?,
            message: get_text_option(&root, "Message"),
            resource: get_text_default(&root, "Resource"),
            request_id: get_text_default(&root, "RequestId"),
            host_id: get_text_default(&root, "HostId"),
            bucket_name: get_text_option(&root, "BucketName"),
            object_name: get_text_option(&root, "Key"),
        })
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
    pub fn code(&self) -> S3ErrorCode {
        self.code.clone()
    }
    pub fn message(&self) -> &Option<String> {
        &self.message
    }
    pub fn resource(&self) -> &str {
        &self.resource
    }
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
    pub fn host_id(&self) -> &str {
        &self.host_id
    }
    pub fn bucket_name(&self) -> &Option<String> {
        &self.bucket_name
    }
    pub fn object_name(&self) -> &Option<String> {
        &self.object_name
    }
}

impl std::fmt::Display for S3ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "S3 operation failed: code: {}, message: {:?}, resource: {}, request_id: {}, host_id: {}, bucket_name: {:?}, object_name: {:?}",
            self.code,
            self.message,
            self.resource,
            self.request_id,
            self.host_id,
            self.bucket_name,
            self.object_name,
        )
    }
}

impl std::error::Error for S3ErrorResponse {}
