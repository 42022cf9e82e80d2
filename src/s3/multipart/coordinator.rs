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

use crate::s3::client::MIN_PART_SIZE;
use crate::s3::error::{Error, UploadErr, ValidationErr};
use crate::s3::multipart::part_uploader::PartUploader;
use crate::s3::multipart::partition::split_parts;
use crate::s3::source::ObjectSource;
use crate::s3::store::ObjectStore;
use crate::s3::types::{ObjectLocation, Part, PartResult, UploadSession};
use crate::s3::utils::utc_now;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use typed_builder::TypedBuilder;

/// Default size of every part but the last.
pub const DEFAULT_PART_SIZE: u64 = MIN_PART_SIZE;

/// Default number of part uploads allowed in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Default lifetime of the uploaded object, sent as its `Expires` header.
pub const DEFAULT_SESSION_EXPIRY: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const SESSION_OPEN_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Settings of a multipart upload.
///
/// ```
/// use avatar_store::s3::multipart::UploadConfig;
///
/// let config = UploadConfig::builder()
///     .part_size(8 * 1024 * 1024)
///     .max_concurrency(4)
///     .build();
/// assert_eq!(config.max_retries_on_session_open, 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, TypedBuilder)]
pub struct UploadConfig {
    /// Size of every part but the last, in bytes.
    #[builder(default = DEFAULT_PART_SIZE)]
    pub part_size: u64,
    /// Ceiling on part uploads in flight, independent of the part count.
    #[builder(default = DEFAULT_MAX_CONCURRENCY)]
    pub max_concurrency: usize,
    /// Extra attempts at opening the session. Parts are never retried.
    #[builder(default = 0)]
    pub max_retries_on_session_open: u32,
    #[builder(default = DEFAULT_SESSION_EXPIRY)]
    pub session_expiry: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Drives one multipart upload from session open to commit or abort.
///
/// Every part is dispatched to its own task at once; a semaphore of
/// `max_concurrency` permits gates the actual uploads. Results come back over
/// one channel whose senders are owned by the workers, so the channel closes
/// once every worker has reported. On the first failed part the semaphore is
/// closed, which makes queued workers report [`UploadErr::Cancelled`] without
/// touching the store. When all workers are done the session is aborted once,
/// or, if every part succeeded, committed once with the parts sorted by number.
///
/// Dropping the future returned by [`upload`](Self::upload) after the session
/// is open, for example under `tokio::time::timeout`, cancels the workers and
/// aborts the session from a background task.
#[derive(Clone)]
pub struct MultipartUploadCoordinator {
    store: Arc<dyn ObjectStore>,
    config: UploadConfig,
}

impl MultipartUploadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>, config: UploadConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Uploads `source` to `bucket`/`object` and returns where it was stored.
    ///
    /// Validation errors are raised before a session is opened. Once a session
    /// exists it is always either committed or aborted before this returns; a
    /// failing abort is logged and the part failure that caused it is returned.
    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        source: Arc<dyn ObjectSource>,
    ) -> Result<ObjectLocation, Error> {
        if self.config.max_concurrency == 0 {
            return Err(ValidationErr::InvalidConcurrency.into());
        }
        let object_size = source.size();
        let tasks = split_parts(object_size, self.config.part_size)?;

        let session = Arc::new(self.open_session(bucket, object, object_size).await?);
        let mut guard = SessionGuard::new(self.store.clone(), session.clone());
        log::info!(
            "opened multipart upload {} for {bucket}/{object}: {object_size} bytes in {} parts",
            session.upload_id,
            tasks.len()
        );

        let uploader = PartUploader::new(self.store.clone(), source, session.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let (tx, mut rx) = mpsc::channel::<PartResult>(self.config.max_concurrency);

        let part_count = tasks.len();
        let mut workers = JoinSet::new();
        for task in tasks {
            let tx = tx.clone();
            let semaphore = semaphore.clone();
            let uploader = uploader.clone();
            workers.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => uploader.upload(task).await,
                    Err(_) => Err(UploadErr::Cancelled(task.number)),
                };
                // The receiver outlives every worker.
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let mut completed: Vec<Part> = Vec::with_capacity(part_count);
        let mut failure: Option<UploadErr> = None;
        while let Some(result) = rx.recv().await {
            if failure.is_some() {
                match result {
                    Ok(part) => log::debug!("discarding part {} of failed upload", part.number),
                    Err(e) => log::debug!("discarding failure of failed upload: {e}"),
                }
                continue;
            }
            match result {
                Ok(part) => completed.push(part),
                Err(e) => {
                    log::warn!(
                        "multipart upload {} of {bucket}/{object} failed: {e}",
                        session.upload_id
                    );
                    semaphore.close();
                    failure = Some(e);
                }
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                log::error!("part worker of upload {} ended abnormally: {e}", session.upload_id);
            }
        }

        completed.sort_unstable_by_key(|p| p.number);
        if failure.is_none() && completed.len() != part_count {
            let missing = (1..=part_count as u16)
                .find(|n| completed.binary_search_by_key(n, |p| p.number).is_err())
                .unwrap_or(1);
            failure = Some(UploadErr::WorkerLost(missing));
        }

        if let Some(e) = failure {
            abort_session(self.store.as_ref(), &session).await;
            guard.disarm();
            return Err(e.into());
        }

        let committed = self
            .store
            .complete_multipart_upload(bucket, object, &session.upload_id, &completed)
            .await;
        guard.disarm();
        let location = committed.map_err(|e| UploadErr::Commit {
            upload_id: session.upload_id.clone(),
            source: Box::new(e),
        })?;

        log::info!(
            "completed multipart upload {} of {bucket}/{object} with {} parts",
            session.upload_id,
            completed.len()
        );
        Ok(location)
    }

    async fn open_session(
        &self,
        bucket: &str,
        object: &str,
        object_size: u64,
    ) -> Result<UploadSession, Error> {
        let expiry = chrono::TimeDelta::from_std(self.config.session_expiry).map_err(|_| {
            ValidationErr::InvalidConfig {
                key: "session_expiry".into(),
                value: format!("{:?}", self.config.session_expiry),
            }
        })?;
        let expires = utc_now() + expiry;

        let mut attempt = 0u32;
        loop {
            match self
                .store
                .create_multipart_upload(bucket, object, expires)
                .await
            {
                Ok(upload_id) => {
                    return Ok(UploadSession {
                        bucket: bucket.to_string(),
                        object: object.to_string(),
                        upload_id,
                        expires,
                        object_size,
                        part_size: self.config.part_size,
                        concurrency: self.config.max_concurrency,
                    });
                }
                Err(e) if attempt < self.config.max_retries_on_session_open => {
                    attempt += 1;
                    log::warn!(
                        "opening multipart upload for {bucket}/{object} failed, retrying ({attempt}/{}): {e}",
                        self.config.max_retries_on_session_open
                    );
                    tokio::time::sleep(SESSION_OPEN_RETRY_DELAY * attempt).await;
                }
                Err(e) => {
                    return Err(UploadErr::SessionOpen {
                        bucket: bucket.to_string(),
                        object: object.to_string(),
                        source: Box::new(e),
                    }
                    .into());
                }
            }
        }
    }
}

async fn abort_session(store: &dyn ObjectStore, session: &UploadSession) {
    match store
        .abort_multipart_upload(&session.bucket, &session.object, &session.upload_id)
        .await
    {
        Ok(()) => log::info!(
            "aborted multipart upload {} of {}/{}",
            session.upload_id,
            session.bucket,
            session.object
        ),
        Err(e) => log::error!(
            "{}",
            UploadErr::Abort {
                upload_id: session.upload_id.clone(),
                source: Box::new(e),
            }
        ),
    }
}

/// Aborts an open session from a spawned task when dropped while armed.
///
/// The coordinator disarms it once it has committed or aborted the session
/// itself, so it only fires when the upload future is dropped mid-flight.
struct SessionGuard {
    store: Arc<dyn ObjectStore>,
    session: Arc<UploadSession>,
    armed: bool,
}

impl SessionGuard {
    fn new(store: Arc<dyn ObjectStore>, session: Arc<UploadSession>) -> Self {
        Self {
            store,
            session,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                log::warn!(
                    "multipart upload {} was cancelled, aborting it",
                    self.session.upload_id
                );
                let store = self.store.clone();
                let session = self.session.clone();
                handle.spawn(async move { abort_session(store.as_ref(), &session).await });
            }
            Err(_) => log::error!(
                "multipart upload {} was dropped outside a runtime and cannot be aborted",
                self.session.upload_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_config_defaults() {
        let config = UploadConfig::default();
        assert_eq!(config.part_size, 5 * 1024 * 1024);
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.max_retries_on_session_open, 0);
        assert_eq!(config.session_expiry, Duration::from_secs(2_592_000));
    }
}
