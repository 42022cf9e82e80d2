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

//! Error definitions for S3 and multipart upload operations

use crate::s3::error_response::S3ErrorResponse;
use thiserror::Error;

/// Errors caused by invalid arguments or unparsable data.
#[derive(Debug, Error)]
pub enum ValidationErr {
    #[error("invalid bucket name: {0}")]
    InvalidBucketName(String),

    #[error("invalid object name: {0}")]
    InvalidObjectName(String),

    #[error("invalid upload id: {0}")]
    InvalidUploadId(String),

    #[error("part number {0} is out of range; must be between 1 and 10000")]
    InvalidPartNumber(u16),

    #[error("part size {0} is not supported; minimum allowed 5MiB")]
    InvalidMinPartSize(u64),

    #[error("part size {0} is not supported; maximum allowed 5GiB")]
    InvalidMaxPartSize(u64),

    #[error("object size {0} is not supported; maximum allowed 5TiB")]
    InvalidObjectSize(u64),

    #[error("object size {object_size} and part size {part_size} make more than {max} parts for upload")]
    InvalidPartCount {
        object_size: u64,
        part_size: u64,
        max: u16,
    },

    #[error("source is empty; zero-length objects cannot be uploaded with multipart upload")]
    EmptySource,

    #[error("parts cannot be empty")]
    EmptyParts,

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("missing configuration: environment variable {0} is not set")]
    MissingConfig(String),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("XML parse error: {0}")]
    XmlParseError(#[from] xmltree::ParseError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("header value is not valid text: {0}")]
    StrError(#[from] reqwest::header::ToStrError),

    #[error("integer parse error: {0}")]
    IntError(#[from] std::num::ParseIntError),

    #[error("time parse error: {0}")]
    TimeParseError(#[from] chrono::ParseError),
}

/// Errors raised by local I/O.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
}

/// Errors raised by the transport when the server gives no parsable reason.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("server failed with HTTP status code {0}")]
    ServerError(u16),
}

/// Errors reported by the S3 server.
#[derive(Debug, Error)]
pub enum S3ServerError {
    #[error("{0}")]
    S3Error(Box<S3ErrorResponse>),

    #[error(
        "invalid server response: {message}; status code: {http_status_code}; content-type: {content_type}"
    )]
    InvalidServerResponse {
        message: String,
        http_status_code: u16,
        content_type: String,
    },
}

/// Failures of a multipart upload attempt, one per lifecycle stage.
#[derive(Debug, Error)]
pub enum UploadErr {
    #[error("failed to open multipart upload for {bucket}/{object}: {source}")]
    SessionOpen {
        bucket: String,
        object: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to upload part {part_number}: {source}")]
    PartUpload {
        part_number: u16,
        #[source]
        source: Box<Error>,
    },

    #[error("short read for part {part_number}; expected: {expected}, got: {got} bytes")]
    ShortRead {
        part_number: u16,
        expected: u64,
        got: u64,
    },

    #[error("failed to complete multipart upload {upload_id}: {source}")]
    Commit {
        upload_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to abort multipart upload {upload_id}: {source}")]
    Abort {
        upload_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("upload of part {0} was cancelled before it started")]
    Cancelled(u16),

    #[error("worker for part {0} stopped without reporting a result")]
    WorkerLost(u16),
}

impl UploadErr {
    /// Returns the part number this error refers to, if it is a part-level failure.
    pub fn part_number(&self) -> Option<u16> {
        match self {
            UploadErr::PartUpload { part_number, .. }
            | UploadErr::ShortRead { part_number, .. } => Some(*part_number),
            UploadErr::Cancelled(n) | UploadErr::WorkerLost(n) => Some(*n),
            _ => None,
        }
    }
}

/// Error type of every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(#[from] ValidationErr),

    #[error("{0}")]
    Io(#[from] IoError),

    #[error("{0}")]
    Network(#[from] NetworkError),

    #[error("{0}")]
    S3Server(#[from] S3ServerError),

    #[error("{0}")]
    Upload(#[from] UploadErr),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(IoError::IOError(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Validation(ValidationErr::HttpError(err))
    }
}

impl From<xmltree::ParseError> for Error {
    fn from(err: xmltree::ParseError) -> Self {
        Error::Validation(ValidationErr::XmlParseError(err))
    }
}

impl From<reqwest::header::ToStrError> for Error {
    fn from(err: reqwest::header::ToStrError) -> Self {
        Error::Validation(ValidationErr::StrError(err))
    }
}
