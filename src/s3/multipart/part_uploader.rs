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

use crate::s3::error::UploadErr;
use crate::s3::source::ObjectSource;
use crate::s3::store::ObjectStore;
use crate::s3::types::{Part, PartResult, PartTask, UploadSession};
use std::sync::Arc;

/// Uploads single byte ranges of a source under an open multipart session.
#[derive(Clone)]
pub struct PartUploader {
    store: Arc<dyn ObjectStore>,
    source: Arc<dyn ObjectSource>,
    session: Arc<UploadSession>,
}

impl PartUploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        source: Arc<dyn ObjectSource>,
        session: Arc<UploadSession>,
    ) -> Self {
        Self {
            store,
            source,
            session,
        }
    }

    /// Reads the range of `task` and uploads it with a single call.
    ///
    /// A read returning fewer than `task.length` bytes fails the part without
    /// contacting the store. The ETag is returned exactly as the store sent it.
    pub async fn upload(&self, task: PartTask) -> PartResult {
        let data = self
            .source
            .read_at(task.offset, task.length)
            .await
            .map_err(|e| UploadErr::PartUpload {
                part_number: task.number,
                source: Box::new(e),
            })?;

        if data.len() as u64 != task.length {
            return Err(UploadErr::ShortRead {
                part_number: task.number,
                expected: task.length,
                got: data.len() as u64,
            });
        }

        let session = &self.session;
        let etag = self
            .store
            .upload_part(
                &session.bucket,
                &session.object,
                &session.upload_id,
                task.number,
                data,
            )
            .await
            .map_err(|e| UploadErr::PartUpload {
                part_number: task.number,
                source: Box::new(e),
            })?;

        log::debug!(
            "uploaded {task} of {}/{} (upload id {})",
            session.bucket,
            session.object,
            session.upload_id
        );
        Ok(Part {
            number: task.number,
            etag,
        })
    }
}
