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

//! Readable sources of object data

use crate::s3::error::Error;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Random-access source of the bytes of an object being uploaded.
///
/// Reads at independent offsets may run concurrently.
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Total size in bytes.
    fn size(&self) -> u64;

    /// Reads up to `length` bytes starting at `offset`. Returns fewer bytes
    /// only when the source ends early.
    async fn read_at(&self, offset: u64, length: u64) -> Result<Bytes, Error>;
}

#[async_trait]
impl ObjectSource for Bytes {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn read_at(&self, offset: u64, length: u64) -> Result<Bytes, Error> {
        let len = self.len() as u64;
        let start = offset.min(len);
        let end = offset.saturating_add(length).min(len);
        Ok(self.slice(start as usize..end as usize))
    }
}

/// Source backed by a file on the local filesystem.
///
/// Each read opens its own handle, so concurrent reads never share a cursor.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    size: u64,
}

impl FileSource {
    /// Opens `path` and records its current length.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let meta = tokio::fs::metadata(&path).await?;
        Ok(Self {
            path,
            size: meta.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, used as object name.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

#[async_trait]
impl ObjectSource for FileSource {
    fn size(&self) -> u64 {
        self.size
    }

    async fn read_at(&self, offset: u64, length: u64) -> Result<Bytes, Error> {
        let mut file = tokio::fs::File::open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;

        let mut buf = BytesMut::with_capacity(length as usize);
        let mut reader = file.take(length);
        while reader.read_buf(&mut buf).await? > 0 {}
        Ok(buf.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_bytes_source_read_at() {
        let src = Bytes::from_static(b"0123456789");
        assert_eq!(src.size(), 10);
        assert_eq!(src.read_at(2, 3).await.unwrap(), Bytes::from_static(b"234"));
        assert_eq!(src.read_at(8, 5).await.unwrap(), Bytes::from_static(b"89"));
        assert!(src.read_at(12, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_source_read_at() {
        let path = std::env::temp_dir().join(format!(
            "avatar-store-source-{}.bin",
            std::process::id()
        ));
        {
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(b"abcdefghij").unwrap();
        }

        let src = FileSource::open(&path).await.unwrap();
        assert_eq!(src.size(), 10);
        let (a, b) = tokio::join!(src.read_at(0, 4), src.read_at(4, 6));
        assert_eq!(a.unwrap(), Bytes::from_static(b"abcd"));
        assert_eq!(b.unwrap(), Bytes::from_static(b"efghij"));
        assert_eq!(src.read_at(8, 4).await.unwrap(), Bytes::from_static(b"ij"));

        std::fs::remove_file(&path).unwrap();
    }
}
