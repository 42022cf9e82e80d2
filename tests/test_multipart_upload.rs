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

use avatar_store::s3::error::{Error, UploadErr, ValidationErr};
use avatar_store::s3::multipart::{MultipartUploadCoordinator, UploadConfig};
use avatar_store::s3::types::Part;
use avatar_store::s3::utils::utc_now;
use avatar_store_common::memory_store::MemoryStore;
use avatar_store_common::sources::{TruncatedSource, rand_bytes};
use avatar_store_common::utils::init_logger;
use bytes::Bytes;
use chrono::TimeDelta;
use std::sync::Arc;
use std::time::Duration;

const BUCKET: &str = "avatars";
const OBJECT: &str = "user/avatar/1/me.png";

fn coordinator(store: &Arc<MemoryStore>, part_size: u64, concurrency: usize) -> MultipartUploadCoordinator {
    MultipartUploadCoordinator::new(
        store.clone(),
        UploadConfig::builder()
            .part_size(part_size)
            .max_concurrency(concurrency)
            .build(),
    )
}

fn part_numbers(parts: &[Part]) -> Vec<u16> {
    parts.iter().map(|p| p.number).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn upload_twelve_million_bytes_in_three_parts() {
    init_logger();
    let store = Arc::new(MemoryStore::new());
    let data = rand_bytes(12_000_000, 1);

    let location = coordinator(&store, 5_000_000, 5)
        .upload(BUCKET, OBJECT, Arc::new(data.clone()))
        .await
        .unwrap();

    assert_eq!(location.location, format!("memory://{BUCKET}/{OBJECT}"));
    assert_eq!(store.open_calls(), 1);
    assert!(store.aborts().is_empty());

    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(part_numbers(&commits[0]), vec![1, 2, 3]);
    assert_eq!(store.object(BUCKET, OBJECT), Some(data));
    assert_eq!(store.open_uploads(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_part_aborts_once_and_surfaces_part_error() {
    let store = Arc::new(MemoryStore::new().fail_part(2));

    let err = coordinator(&store, 5_000_000, 5)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(12_000_000, 2)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upload(UploadErr::PartUpload { part_number: 2, .. })
    ));
    assert_eq!(store.aborts(), vec!["upload-1".to_string()]);
    assert!(store.commits().is_empty());
    assert_eq!(store.open_uploads(), 0);
    assert!(store.object(BUCKET, OBJECT).is_none());
}

#[tokio::test]
async fn empty_source_is_rejected_before_session_open() {
    let store = Arc::new(MemoryStore::new());

    let err = coordinator(&store, 5_000_000, 5)
        .upload(BUCKET, OBJECT, Arc::new(Bytes::new()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationErr::EmptySource)
    ));
    assert_eq!(store.open_calls(), 0);
    assert!(store.aborts().is_empty());
    assert!(store.commits().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn commit_list_is_sorted_regardless_of_arrival_order() {
    let store = Arc::new(
        MemoryStore::new()
            .part_delay_for(1, Duration::from_millis(150))
            .part_delay_for(2, Duration::from_millis(100))
            .part_delay_for(3, Duration::from_millis(50)),
    );

    coordinator(&store, 100, 8)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(750, 3)))
        .await
        .unwrap();

    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(part_numbers(&commits[0]), (1..=8).collect::<Vec<u16>>());
    assert_eq!(commits[0][0].etag, "\"upload-1-1\"");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn many_concurrent_failures_abort_exactly_once() {
    let store = Arc::new(
        MemoryStore::new()
            .fail_part(2)
            .fail_part(3)
            .fail_part(5)
            .fail_part(7)
            .part_delay(Duration::from_millis(20)),
    );

    let err = coordinator(&store, 10, 16)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(160, 4)))
        .await
        .unwrap_err();

    match err {
        Error::Upload(e @ UploadErr::PartUpload { .. }) => {
            assert!([2, 3, 5, 7].contains(&e.part_number().unwrap()))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.aborts().len(), 1);
    assert!(store.commits().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_abort_does_not_replace_part_error() {
    let store = Arc::new(MemoryStore::new().fail_part(2).fail_abort());

    let err = coordinator(&store, 5_000_000, 5)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(12_000_000, 5)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upload(UploadErr::PartUpload { part_number: 2, .. })
    ));
    assert_eq!(store.aborts().len(), 1);
    assert!(store.commits().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_commit_is_terminal() {
    let store = Arc::new(MemoryStore::new().fail_commit());

    let err = coordinator(&store, 100, 4)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(250, 6)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(UploadErr::Commit { .. })));
    assert_eq!(store.commits().len(), 1);
    assert!(store.aborts().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrency_ceiling_is_never_exceeded() {
    let store = Arc::new(MemoryStore::new().part_delay(Duration::from_millis(20)));

    coordinator(&store, 10, 3)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(200, 7)))
        .await
        .unwrap();

    assert_eq!(store.part_calls(), 20);
    assert!(store.max_in_flight() <= 3);
    assert!(store.max_in_flight() >= 2);
    assert_eq!(part_numbers(&store.commits()[0]).len(), 20);
}

#[tokio::test]
async fn queued_parts_are_cancelled_after_first_failure() {
    let store = Arc::new(
        MemoryStore::new()
            .fail_part(1)
            .part_delay(Duration::from_millis(50)),
    );

    let err = coordinator(&store, 10, 1)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(50, 8)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Upload(UploadErr::PartUpload { part_number: 1, .. })
    ));
    assert!(store.part_calls() <= 2);
    assert_eq!(store.aborts().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn short_read_fails_the_part() {
    let store = Arc::new(MemoryStore::new());
    let source = TruncatedSource::new(rand_bytes(11_000_000, 9), 12_000_000);

    let err = coordinator(&store, 5_000_000, 5)
        .upload(BUCKET, OBJECT, Arc::new(source))
        .await
        .unwrap_err();

    match err {
        Error::Upload(UploadErr::ShortRead {
            part_number,
            expected,
            got,
        }) => {
            assert_eq!(part_number, 3);
            assert_eq!(expected, 2_000_000);
            assert_eq!(got, 1_000_000);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.part_calls() <= 2);
    assert_eq!(store.aborts().len(), 1);
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn session_open_is_retried_up_to_the_configured_limit() {
    let store = Arc::new(MemoryStore::new().fail_open(2));
    let config = UploadConfig::builder()
        .part_size(100)
        .max_retries_on_session_open(2)
        .build();

    MultipartUploadCoordinator::new(store.clone(), config)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(150, 10)))
        .await
        .unwrap();

    assert_eq!(store.open_calls(), 3);
    assert_eq!(store.commits().len(), 1);
}

#[tokio::test]
async fn session_open_failure_returns_without_abort() {
    let store = Arc::new(MemoryStore::new().fail_open(3));
    let config = UploadConfig::builder()
        .part_size(100)
        .max_retries_on_session_open(2)
        .build();

    let err = MultipartUploadCoordinator::new(store.clone(), config)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(150, 11)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(UploadErr::SessionOpen { .. })));
    assert_eq!(store.open_calls(), 3);
    assert_eq!(store.part_calls(), 0);
    assert!(store.aborts().is_empty());
    assert!(store.commits().is_empty());
}

#[tokio::test]
async fn session_open_is_not_retried_by_default() {
    let store = Arc::new(MemoryStore::new().fail_open(1));

    let err = coordinator(&store, 100, 2)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(150, 12)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(UploadErr::SessionOpen { .. })));
    assert_eq!(store.open_calls(), 1);
}

#[tokio::test]
async fn zero_concurrency_is_rejected() {
    let store = Arc::new(MemoryStore::new());

    let err = coordinator(&store, 100, 0)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(150, 13)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationErr::InvalidConcurrency)
    ));
    assert_eq!(store.open_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn dropped_upload_aborts_its_session() {
    let store = Arc::new(MemoryStore::new().part_delay(Duration::from_millis(500)));
    let coordinator = coordinator(&store, 100, 2);

    let result = tokio::time::timeout(
        Duration::from_millis(100),
        coordinator.upload(BUCKET, OBJECT, Arc::new(rand_bytes(250, 14))),
    )
    .await;
    assert!(result.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(store.aborts(), vec!["upload-1".to_string()]);
    assert_eq!(store.open_uploads(), 0);
    assert!(store.commits().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn finished_upload_is_not_aborted_afterwards() {
    let store = Arc::new(MemoryStore::new());

    coordinator(&store, 100, 2)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(250, 15)))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.commits().len(), 1);
    assert!(store.aborts().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn crashed_worker_aborts_once() {
    let store = Arc::new(MemoryStore::new().panic_part(2));

    let err = coordinator(&store, 100, 4)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(250, 16)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload(UploadErr::WorkerLost(2))));
    assert_eq!(store.aborts(), vec!["upload-1".to_string()]);
    assert!(store.commits().is_empty());
    assert_eq!(store.open_uploads(), 0);
}

#[tokio::test]
async fn session_expiry_is_sent_on_open() {
    let store = Arc::new(MemoryStore::new());
    let before = utc_now();

    coordinator(&store, 100, 2)
        .upload(BUCKET, OBJECT, Arc::new(rand_bytes(150, 17)))
        .await
        .unwrap();

    let after = utc_now();
    let expires = store.upload_expiry("upload-1").unwrap();
    assert!(expires >= before + TimeDelta::days(30));
    assert!(expires <= after + TimeDelta::days(30));
}
