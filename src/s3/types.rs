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

//! Value types shared by the object-store client and the multipart upload path

use crate::s3::error::UploadErr;
use crate::s3::utils::UtcTime;
use std::fmt;

/// State of a single multipart upload attempt.
///
/// Created once the store has handed out an upload id and never mutated
/// afterwards. An attempt that fails is discarded; a retry opens a new session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSession {
    pub bucket: String,
    pub object: String,
    pub upload_id: String,
    pub expires: UtcTime,
    pub object_size: u64,
    pub part_size: u64,
    pub concurrency: usize,
}

/// Byte range of the source uploaded as one part.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartTask {
    /// 1-based part number
    pub number: u16,
    pub offset: u64,
    pub length: u64,
}

impl PartTask {
    /// Offset one past the last byte of this part.
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

impl fmt::Display for PartTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "part {} [{}, {})",
            self.number,
            self.offset,
            self.end()
        )
    }
}

/// Completion token of an uploaded part
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub number: u16,
    pub etag: String,
}

/// Outcome of one part upload, emitted exactly once per dispatched [`PartTask`].
pub type PartResult = Result<Part, UploadErr>;

/// Where a stored object ended up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub object: String,
    pub location: String,
    pub etag: String,
}

/// Listing entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<UtcTime>,
}

impl ObjectEntry {
    /// Returns the last path segment of the key.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}
