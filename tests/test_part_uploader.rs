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

use avatar_store::s3::error::{Error, UploadErr};
use avatar_store::s3::multipart::PartUploader;
use avatar_store::s3::store::ObjectStore;
use avatar_store::s3::types::{PartTask, UploadSession};
use avatar_store::s3::utils::utc_now;
use avatar_store_common::memory_store::MemoryStore;
use avatar_store_common::sources::{TruncatedSource, rand_bytes};
use std::sync::Arc;

async fn open_session(store: &MemoryStore, size: u64) -> UploadSession {
    let expires = utc_now();
    let upload_id = store
        .create_multipart_upload("avatars", "me.png", expires)
        .await
        .unwrap();
    UploadSession {
        bucket: "avatars".into(),
        object: "me.png".into(),
        upload_id,
        expires,
        object_size: size,
        part_size: 10,
        concurrency: 1,
    }
}

#[tokio::test]
async fn uploads_range_and_returns_etag_verbatim() {
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(open_session(&store, 25).await);
    let uploader = PartUploader::new(store.clone(), Arc::new(rand_bytes(25, 1)), session);

    let part = uploader
        .upload(PartTask {
            number: 3,
            offset: 20,
            length: 5,
        })
        .await
        .unwrap();

    assert_eq!(part.number, 3);
    assert_eq!(part.etag, "\"upload-1-3\"");
    assert_eq!(store.part_calls(), 1);
}

#[tokio::test]
async fn short_read_skips_the_store() {
    let store = Arc::new(MemoryStore::new());
    let session = Arc::new(open_session(&store, 30).await);
    let source = TruncatedSource::new(rand_bytes(25, 2), 30);
    let uploader = PartUploader::new(store.clone(), Arc::new(source), session);

    let err = uploader
        .upload(PartTask {
            number: 3,
            offset: 20,
            length: 10,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        UploadErr::ShortRead {
            part_number: 3,
            expected: 10,
            got: 5
        }
    ));
    assert_eq!(store.part_calls(), 0);
}

#[tokio::test]
async fn store_failure_carries_part_number_and_cause() {
    let store = Arc::new(MemoryStore::new().fail_part(1));
    let session = Arc::new(open_session(&store, 10).await);
    let uploader = PartUploader::new(store.clone(), Arc::new(rand_bytes(10, 3)), session);

    let err = uploader
        .upload(PartTask {
            number: 1,
            offset: 0,
            length: 10,
        })
        .await
        .unwrap_err();

    match err {
        UploadErr::PartUpload {
            part_number,
            source,
        } => {
            assert_eq!(part_number, 1);
            assert!(matches!(*source, Error::S3Server(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
