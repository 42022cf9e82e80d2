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

use avatar_store::avatar::AvatarRepository;
use avatar_store::s3::error::{Error, ValidationErr};
use avatar_store::s3::multipart::UploadConfig;
use avatar_store_common::memory_store::MemoryStore;
use avatar_store_common::sources::rand_bytes;
use bytes::Bytes;
use std::sync::Arc;

const BUCKET: &str = "avatars";

fn repository(store: &Arc<MemoryStore>) -> AvatarRepository {
    AvatarRepository::new(
        store.clone(),
        BUCKET,
        UploadConfig::builder().part_size(400).max_concurrency(2).build(),
    )
    .multipart_threshold(1000)
}

#[tokio::test]
async fn small_file_uses_single_put() {
    let store = Arc::new(MemoryStore::new());
    let data = rand_bytes(999, 1);

    let location = repository(&store)
        .create(1, "me.png", Arc::new(data.clone()))
        .await
        .unwrap();

    assert_eq!(location, "memory://avatars/user/avatar/1/me.png");
    assert_eq!(store.open_calls(), 0);
    assert_eq!(store.object(BUCKET, "user/avatar/1/me.png"), Some(data));
}

#[tokio::test]
async fn large_file_uses_multipart_upload() {
    let store = Arc::new(MemoryStore::new());
    let data = rand_bytes(1000, 2);

    repository(&store)
        .create(1, "me.png", Arc::new(data.clone()))
        .await
        .unwrap();

    assert_eq!(store.open_calls(), 1);
    let commits = store.commits();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].len(), 3);
    assert_eq!(store.object(BUCKET, "user/avatar/1/me.png"), Some(data));
}

#[tokio::test]
async fn url_lookup_ignores_folder_markers_and_other_users() {
    let store = Arc::new(MemoryStore::new());
    let repo = repository(&store);
    assert_eq!(repo.get_url_by_user(1).await.unwrap(), None);

    store.insert_object(BUCKET, "user/avatar/1/", Bytes::new());
    store.insert_object(BUCKET, "user/avatar/10/other.png", rand_bytes(10, 3));
    assert_eq!(repo.get_url_by_user(1).await.unwrap(), None);

    store.insert_object(BUCKET, "user/avatar/1/me.png", rand_bytes(10, 4));
    assert_eq!(
        repo.get_url_by_user(1).await.unwrap().as_deref(),
        Some("memory://avatars/user/avatar/1/me.png")
    );
}

#[tokio::test]
async fn update_removes_superseded_file() {
    let store = Arc::new(MemoryStore::new());
    let repo = repository(&store);
    store.insert_object(BUCKET, "user/avatar/7/old.png", rand_bytes(10, 5));

    let location = repo
        .update(7, "new.png", Arc::new(rand_bytes(20, 6)))
        .await
        .unwrap();

    assert_eq!(location, "memory://avatars/user/avatar/7/new.png");
    assert_eq!(store.removed(), vec!["user/avatar/7/old.png".to_string()]);
    assert_eq!(store.object_keys(BUCKET), vec!["user/avatar/7/new.png"]);
}

#[tokio::test]
async fn update_with_same_name_keeps_the_file() {
    let store = Arc::new(MemoryStore::new());
    let repo = repository(&store);
    store.insert_object(BUCKET, "user/avatar/7/me.png", rand_bytes(10, 7));
    let data = rand_bytes(20, 8);

    repo.update(7, "me.png", Arc::new(data.clone())).await.unwrap();

    assert!(store.removed().is_empty());
    assert_eq!(store.object(BUCKET, "user/avatar/7/me.png"), Some(data));
}

#[tokio::test]
async fn delete_removes_the_whole_folder() {
    let store = Arc::new(MemoryStore::new());
    let repo = repository(&store);
    store.insert_object(BUCKET, "user/avatar/3/a.png", rand_bytes(10, 9));
    store.insert_object(BUCKET, "user/avatar/3/b.png", rand_bytes(10, 10));
    store.insert_object(BUCKET, "user/avatar/30/c.png", rand_bytes(10, 11));

    repo.delete(3).await.unwrap();

    assert_eq!(store.object_keys(BUCKET), vec!["user/avatar/30/c.png"]);
}

#[tokio::test]
async fn empty_avatar_is_rejected() {
    let store = Arc::new(MemoryStore::new());

    let err = repository(&store)
        .create(1, "me.png", Arc::new(Bytes::new()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationErr::EmptySource)
    ));
    assert!(store.object_keys(BUCKET).is_empty());
}

#[tokio::test]
async fn update_keeps_new_location_when_old_file_cannot_be_removed() {
    let store = Arc::new(MemoryStore::new().fail_remove());
    let repo = repository(&store);
    store.insert_object(BUCKET, "user/avatar/7/old.png", rand_bytes(10, 12));

    let location = repo
        .update(7, "new.png", Arc::new(rand_bytes(20, 13)))
        .await
        .unwrap();

    assert_eq!(location, "memory://avatars/user/avatar/7/new.png");
    assert_eq!(
        store.object_keys(BUCKET),
        vec!["user/avatar/7/new.png", "user/avatar/7/old.png"]
    );
}
