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

//! Storage of user avatar files
//!
//! Every user owns the folder `user/avatar/{id}/` in the configured bucket and
//! is expected to have at most one file in it. Files below the multipart
//! threshold are stored with a single `PutObject`; larger ones go through
//! [`MultipartUploadCoordinator`].

use crate::s3::client::MIN_PART_SIZE;
use crate::s3::error::{Error, UploadErr, ValidationErr};
use crate::s3::multipart::{MultipartUploadCoordinator, UploadConfig};
use crate::s3::source::ObjectSource;
use crate::s3::store::ObjectStore;
use crate::s3::types::ObjectEntry;
use futures_util::future::try_join_all;
use std::sync::Arc;

/// Common prefix of all avatar folders.
pub const AVATAR_FOLDER: &str = "user/avatar";

/// Files of at least this many bytes are uploaded in parts.
pub const DEFAULT_MULTIPART_THRESHOLD: u64 = MIN_PART_SIZE;

/// Returns the folder holding the avatar of `user_id`, without trailing slash.
pub fn avatar_folder(user_id: u64) -> String {
    format!("{AVATAR_FOLDER}/{user_id}")
}

#[derive(Clone)]
pub struct AvatarRepository {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    coordinator: MultipartUploadCoordinator,
    multipart_threshold: u64,
}

impl AvatarRepository {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, config: UploadConfig) -> Self {
        Self {
            coordinator: MultipartUploadCoordinator::new(store.clone(), config),
            store,
            bucket: bucket.into(),
            multipart_threshold: DEFAULT_MULTIPART_THRESHOLD,
        }
    }

    /// Sets the size from which uploads use multipart upload.
    pub fn multipart_threshold(mut self, threshold: u64) -> Self {
        self.multipart_threshold = threshold;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the URL of the avatar of `user_id`, or `None` if the user has
    /// no avatar.
    pub async fn get_url_by_user(&self, user_id: u64) -> Result<Option<String>, Error> {
        match self.current_file(user_id).await? {
            Some(entry) => Ok(Some(self.store.object_url(&self.bucket, &entry.key)?)),
            None => Ok(None),
        }
    }

    /// Stores `source` as the avatar of `user_id` under `file_name` and returns
    /// its location.
    pub async fn create(
        &self,
        user_id: u64,
        file_name: &str,
        source: Arc<dyn ObjectSource>,
    ) -> Result<String, Error> {
        check_file_name(file_name)?;
        let object = format!("{}/{file_name}", avatar_folder(user_id));
        let size = source.size();
        if size == 0 {
            return Err(ValidationErr::EmptySource.into());
        }

        let location = if size < self.multipart_threshold {
            let data = source.read_at(0, size).await?;
            if data.len() as u64 != size {
                return Err(UploadErr::ShortRead {
                    part_number: 1,
                    expected: size,
                    got: data.len() as u64,
                }
                .into());
            }
            self.store.put_object(&self.bucket, &object, data).await?
        } else {
            log::debug!(
                "uploading {size} bytes to {}/{object} in parts of {} bytes",
                self.bucket,
                self.coordinator.config().part_size
            );
            self.coordinator
                .upload(&self.bucket, &object, source)
                .await?
        };

        log::info!("stored avatar of user {user_id} at {}", location.location);
        Ok(location.location)
    }

    /// Replaces the avatar of `user_id`. The previous file is removed after
    /// the new one is stored, unless both have the same name. Failing to remove
    /// it is logged; the new avatar is stored either way, so its location is
    /// still returned.
    pub async fn update(
        &self,
        user_id: u64,
        file_name: &str,
        source: Arc<dyn ObjectSource>,
    ) -> Result<String, Error> {
        let existing = self.current_file(user_id).await?;
        let location = self.create(user_id, file_name, source).await?;

        if let Some(entry) = existing
            && entry.file_name() != file_name
        {
            match self.store.remove_object(&self.bucket, &entry.key).await {
                Ok(()) => log::debug!("removed superseded avatar {}", entry.key),
                Err(e) => log::error!(
                    "failed to remove superseded avatar {} of user {user_id}: {e}",
                    entry.key
                ),
            }
        }
        Ok(location)
    }

    /// Removes every file in the avatar folder of `user_id`.
    pub async fn delete(&self, user_id: u64) -> Result<(), Error> {
        let prefix = format!("{}/", avatar_folder(user_id));
        let entries = self.store.list_objects(&self.bucket, &prefix).await?;
        try_join_all(
            entries
                .iter()
                .map(|entry| self.store.remove_object(&self.bucket, &entry.key)),
        )
        .await?;
        Ok(())
    }

    /// Returns the first non-empty object in the folder; zero-size entries are
    /// folder markers.
    async fn current_file(&self, user_id: u64) -> Result<Option<ObjectEntry>, Error> {
        let prefix = format!("{}/", avatar_folder(user_id));
        let entries = self.store.list_objects(&self.bucket, &prefix).await?;
        Ok(entries.into_iter().find(|e| e.size > 0))
    }
}

fn check_file_name(file_name: &str) -> Result<(), ValidationErr> {
    if file_name.is_empty() || file_name.contains('/') {
        return Err(ValidationErr::InvalidObjectName(format!(
            "avatar file name must be a single non-empty path segment: {file_name:?}"
        )));
    }
    Ok(())
}
