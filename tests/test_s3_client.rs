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

//! Tests against a live server; skipped unless SERVER_ENDPOINT is set.

use avatar_store::s3::error::{Error, S3ServerError, UploadErr};
use avatar_store::s3::error_response::S3ErrorCode;
use avatar_store::s3::multipart::{MultipartUploadCoordinator, UploadConfig};
use avatar_store::s3::utils::utc_now;
use avatar_store_common::sources::rand_bytes;
use avatar_store_common::test_context::TestContext;
use avatar_store_common::utils::rand_object_name;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 10)]
async fn multipart_upload_round_trip() {
    let Some(ctx) = TestContext::from_env() else {
        return;
    };
    let object = format!("user/avatar/1/{}.bin", rand_object_name());
    let size = 11 * 1024 * 1024 + 17;

    let coordinator = MultipartUploadCoordinator::new(
        Arc::new(ctx.client.clone()),
        UploadConfig::builder().max_concurrency(3).build(),
    );
    let location = coordinator
        .upload(&ctx.bucket, &object, Arc::new(rand_bytes(size, 1)))
        .await
        .unwrap();
    assert!(!location.etag.is_empty());

    let entries = ctx.client.list_objects(&ctx.bucket, &object).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, size as u64);

    ctx.client.remove_object(&ctx.bucket, &object).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 10)]
async fn undersized_parts_are_rejected_on_commit() {
    let Some(ctx) = TestContext::from_env() else {
        return;
    };
    let object = format!("user/avatar/2/{}.bin", rand_object_name());

    let coordinator = MultipartUploadCoordinator::new(
        Arc::new(ctx.client.clone()),
        UploadConfig::builder().part_size(1024).build(),
    );
    let err = coordinator
        .upload(&ctx.bucket, &object, Arc::new(rand_bytes(3000, 2)))
        .await
        .unwrap_err();

    match err {
        Error::Upload(UploadErr::Commit { source, .. }) => match *source {
            Error::S3Server(S3ServerError::S3Error(e)) => {
                assert_eq!(e.code(), S3ErrorCode::EntityTooSmall)
            }
            other => panic!("unexpected cause: {other}"),
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 10)]
async fn abort_releases_session() {
    let Some(ctx) = TestContext::from_env() else {
        return;
    };
    let object = format!("user/avatar/3/{}.bin", rand_object_name());

    let upload_id = ctx
        .client
        .create_multipart_upload(&ctx.bucket, &object, utc_now())
        .await
        .unwrap();
    ctx.client
        .upload_part(&ctx.bucket, &object, &upload_id, 1, rand_bytes(1024, 3))
        .await
        .unwrap();
    ctx.client
        .abort_multipart_upload(&ctx.bucket, &object, &upload_id)
        .await
        .unwrap();

    let err = ctx
        .client
        .upload_part(&ctx.bucket, &object, &upload_id, 2, rand_bytes(1024, 4))
        .await
        .unwrap_err();
    match err {
        Error::S3Server(S3ServerError::S3Error(e)) => {
            assert_eq!(e.code(), S3ErrorCode::NoSuchUpload)
        }
        other => panic!("unexpected error: {other}"),
    }
}
