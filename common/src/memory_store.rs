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

//! In-memory object store with scriptable failures, for exercising the upload
//! path without a server.

use async_trait::async_trait;
use avatar_store::s3::error::{Error, NetworkError, S3ServerError};
use avatar_store::s3::error_response::{S3ErrorCode, S3ErrorResponse};
use avatar_store::s3::store::ObjectStore;
use avatar_store::s3::types::{ObjectEntry, ObjectLocation, Part};
use avatar_store::s3::utils::UtcTime;
use bytes::{Bytes, BytesMut};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug)]
struct Upload {
    bucket: String,
    object: String,
    parts: BTreeMap<u16, (String, Bytes)>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    uploads: HashMap<String, Upload>,
    expiries: HashMap<String, UtcTime>,
    objects: BTreeMap<(String, String), (String, Bytes)>,
    open_calls: usize,
    part_calls: usize,
    commits: Vec<Vec<Part>>,
    aborts: Vec<String>,
    removed: Vec<String>,
}

#[derive(Debug, Default)]
struct Script {
    failing_open_calls: usize,
    failing_parts: HashSet<u16>,
    panicking_parts: HashSet<u16>,
    part_delay: Duration,
    part_delays: HashMap<u16, Duration>,
    fail_commit: bool,
    fail_abort: bool,
    fail_remove: bool,
}

/// Object store keeping everything in memory.
///
/// Failures and delays are configured up front with the builder-style
/// methods; every call is recorded for later assertions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    script: Script,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn server_error(code: S3ErrorCode, message: &str, bucket: &str, object: &str) -> Error {
    S3ServerError::S3Error(Box::new(S3ErrorResponse::new(
        Default::default(),
        code,
        Some(message.to_string()),
        format!("/{bucket}/{object}"),
        String::new(),
        String::new(),
        Some(bucket.to_string()),
        Some(object.to_string()),
    )))
    .into()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the first `count` session opens fail.
    pub fn fail_open(mut self, count: usize) -> Self {
        self.script.failing_open_calls = count;
        self
    }

    /// Makes every upload of part `number` fail.
    pub fn fail_part(mut self, number: u16) -> Self {
        self.script.failing_parts.insert(number);
        self
    }

    /// Makes the upload of part `number` panic, as a crashing worker would.
    pub fn panic_part(mut self, number: u16) -> Self {
        self.script.panicking_parts.insert(number);
        self
    }

    /// Delays every part upload by `delay`.
    pub fn part_delay(mut self, delay: Duration) -> Self {
        self.script.part_delay = delay;
        self
    }

    /// Delays the upload of part `number` by `delay` instead of the default.
    pub fn part_delay_for(mut self, number: u16, delay: Duration) -> Self {
        self.script.part_delays.insert(number, delay);
        self
    }

    pub fn fail_commit(mut self) -> Self {
        self.script.fail_commit = true;
        self
    }

    pub fn fail_abort(mut self) -> Self {
        self.script.fail_abort = true;
        self
    }

    pub fn fail_remove(mut self) -> Self {
        self.script.fail_remove = true;
        self
    }

    /// Stores an object directly, bypassing the recorded calls.
    pub fn insert_object(&self, bucket: &str, object: &str, data: Bytes) {
        let mut state = self.state.lock().unwrap();
        let etag = format!("etag-{object}");
        state
            .objects
            .insert((bucket.to_string(), object.to_string()), (etag, data));
    }

    pub fn object(&self, bucket: &str, object: &str) -> Option<Bytes> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(bucket.to_string(), object.to_string()))
            .map(|(_, data)| data.clone())
    }

    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn open_calls(&self) -> usize {
        self.state.lock().unwrap().open_calls
    }

    pub fn part_calls(&self) -> usize {
        self.state.lock().unwrap().part_calls
    }

    /// Part lists of every commit call, in call order.
    pub fn commits(&self) -> Vec<Vec<Part>> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Upload ids of every abort call, in call order.
    pub fn aborts(&self) -> Vec<String> {
        self.state.lock().unwrap().aborts.clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }

    /// Number of sessions neither committed nor aborted.
    pub fn open_uploads(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }

    /// Expiry sent when `upload_id` was opened; kept after commit or abort.
    pub fn upload_expiry(&self, upload_id: &str) -> Option<UtcTime> {
        self.state.lock().unwrap().expiries.get(upload_id).copied()
    }

    /// Highest number of part uploads observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        expires: UtcTime,
    ) -> Result<String, Error> {
        let mut state = self.state.lock().unwrap();
        state.open_calls += 1;
        if state.open_calls <= self.script.failing_open_calls {
            return Err(NetworkError::ServerError(503).into());
        }

        state.next_id += 1;
        let upload_id = format!("upload-{}", state.next_id);
        state.uploads.insert(
            upload_id.clone(),
            Upload {
                bucket: bucket.to_string(),
                object: object.to_string(),
                parts: BTreeMap::new(),
            },
        );
        state.expiries.insert(upload_id.clone(), expires);
        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        part_number: u16,
        data: Bytes,
    ) -> Result<String, Error> {
        self.state.lock().unwrap().part_calls += 1;
        if self.script.panicking_parts.contains(&part_number) {
            panic!("part {part_number} crashed");
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = self
            .script
            .part_delays
            .get(&part_number)
            .copied()
            .unwrap_or(self.script.part_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.script.failing_parts.contains(&part_number) {
            return Err(server_error(
                S3ErrorCode::InternalError,
                &format!("part {part_number} rejected"),
                bucket,
                object,
            ));
        }

        let mut state = self.state.lock().unwrap();
        let upload = state
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| server_error(S3ErrorCode::NoSuchUpload, "no such upload", bucket, object))?;
        let etag = format!("\"{upload_id}-{part_number}\"");
        upload.parts.insert(part_number, (etag.clone(), data));
        Ok(etag)
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
        parts: &[Part],
    ) -> Result<ObjectLocation, Error> {
        let mut state = self.state.lock().unwrap();
        state.commits.push(parts.to_vec());
        if self.script.fail_commit {
            return Err(server_error(
                S3ErrorCode::InternalError,
                "commit rejected",
                bucket,
                object,
            ));
        }

        let upload = state
            .uploads
            .remove(upload_id)
            .ok_or_else(|| server_error(S3ErrorCode::NoSuchUpload, "no such upload", bucket, object))?;
        if parts.windows(2).any(|w| w[0].number >= w[1].number) {
            return Err(server_error(
                S3ErrorCode::InvalidPartOrder,
                "parts not ascending",
                bucket,
                object,
            ));
        }

        let mut data = BytesMut::new();
        for part in parts {
            match upload.parts.get(&part.number) {
                Some((etag, bytes)) if *etag == part.etag => data.extend_from_slice(bytes),
                _ => {
                    return Err(server_error(
                        S3ErrorCode::InvalidPart,
                        &format!("part {} not found", part.number),
                        bucket,
                        object,
                    ));
                }
            }
        }

        let etag = format!("{upload_id}-{}", parts.len());
        state.objects.insert(
            (upload.bucket.clone(), upload.object.clone()),
            (etag.clone(), data.freeze()),
        );
        Ok(ObjectLocation {
            bucket: bucket.to_string(),
            object: object.to_string(),
            location: format!("memory://{bucket}/{object}"),
            etag,
        })
    }

    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        object: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        state.aborts.push(upload_id.to_string());
        if self.script.fail_abort {
            return Err(server_error(
                S3ErrorCode::InternalError,
                "abort rejected",
                bucket,
                object,
            ));
        }
        state
            .uploads
            .remove(upload_id)
            .map(|_| ())
            .ok_or_else(|| server_error(S3ErrorCode::NoSuchUpload, "no such upload", bucket, object))
    }

    async fn put_object(
        &self,
        bucket: &str,
        object: &str,
        data: Bytes,
    ) -> Result<ObjectLocation, Error> {
        let etag = format!("put-{}", data.len());
        self.state.lock().unwrap().objects.insert(
            (bucket.to_string(), object.to_string()),
            (etag.clone(), data),
        );
        Ok(ObjectLocation {
            bucket: bucket.to_string(),
            object: object.to_string(),
            location: format!("memory://{bucket}/{object}"),
            etag,
        })
    }

    async fn remove_object(&self, bucket: &str, object: &str) -> Result<(), Error> {
        if self.script.fail_remove {
            return Err(server_error(S3ErrorCode::AccessDenied, "remove rejected", bucket, object));
        }
        let mut state = self.state.lock().unwrap();
        state
            .objects
            .remove(&(bucket.to_string(), object.to_string()));
        state.removed.push(object.to_string());
        Ok(())
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .map(|((_, k), (etag, data))| ObjectEntry {
                key: k.clone(),
                size: data.len() as u64,
                etag: Some(etag.clone()),
                last_modified: None,
            })
            .collect())
    }

    fn object_url(&self, bucket: &str, object: &str) -> Result<String, Error> {
        Ok(format!("memory://{bucket}/{object}"))
    }
}
