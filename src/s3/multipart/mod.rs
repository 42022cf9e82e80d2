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

//! Concurrent multipart upload of a single object

mod coordinator;
mod part_uploader;
mod partition;

pub use coordinator::{
    DEFAULT_MAX_CONCURRENCY, DEFAULT_PART_SIZE, DEFAULT_SESSION_EXPIRY, MultipartUploadCoordinator,
    UploadConfig,
};
pub use part_uploader::PartUploader;
pub use partition::split_parts;
