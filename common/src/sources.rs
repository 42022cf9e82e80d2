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

use async_trait::async_trait;
use avatar_store::s3::error::Error;
use avatar_store::s3::source::ObjectSource;
use bytes::Bytes;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Returns `size` pseudo-random bytes; equal seeds give equal data.
pub fn rand_bytes(size: usize, seed: u64) -> Bytes {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut buf = vec![0u8; size];
    rng.fill_bytes(&mut buf);
    Bytes::from(buf)
}

/// Source that reports `declared` bytes but only holds `data`, like a file
/// truncated after its size was taken.
pub struct TruncatedSource {
    data: Bytes,
    declared: u64,
}

impl TruncatedSource {
    pub fn new(data: Bytes, declared: u64) -> Self {
        Self { data, declared }
    }
}

#[async_trait]
impl ObjectSource for TruncatedSource {
    fn size(&self) -> u64 {
        self.declared
    }

    async fn read_at(&self, offset: u64, length: u64) -> Result<Bytes, Error> {
        self.data.read_at(offset, length).await
    }
}
