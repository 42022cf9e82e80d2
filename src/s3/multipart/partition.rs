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

use crate::s3::client::{MAX_MULTIPART_COUNT, MAX_OBJECT_SIZE, MAX_PART_SIZE};
use crate::s3::error::ValidationErr;
use crate::s3::types::PartTask;

/// Splits an object of `object_size` bytes into consecutive parts of
/// `part_size` bytes; the last part holds the remainder.
///
/// Parts are numbered from 1 and together cover `[0, object_size)` exactly
/// once. Zero-length objects are rejected, as are layouts the store cannot
/// accept (parts above 5 GiB, objects above 5 TiB, more than 10000 parts).
/// The 5 MiB minimum part size is left to the store, which reports it as
/// `EntityTooSmall` on completion.
pub fn split_parts(object_size: u64, part_size: u64) -> Result<Vec<PartTask>, ValidationErr> {
    if object_size == 0 {
        return Err(ValidationErr::EmptySource);
    }
    if part_size == 0 {
        return Err(ValidationErr::InvalidMinPartSize(part_size));
    }
    if part_size > MAX_PART_SIZE {
        return Err(ValidationErr::InvalidMaxPartSize(part_size));
    }
    if object_size > MAX_OBJECT_SIZE {
        return Err(ValidationErr::InvalidObjectSize(object_size));
    }

    let part_count = object_size.div_ceil(part_size);
    if part_count > MAX_MULTIPART_COUNT as u64 {
        return Err(ValidationErr::InvalidPartCount {
            object_size,
            part_size,
            max: MAX_MULTIPART_COUNT,
        });
    }

    let mut parts = Vec::with_capacity(part_count as usize);
    let mut offset = 0u64;
    let mut number = 1u16;
    while offset < object_size {
        let length = part_size.min(object_size - offset);
        parts.push(PartTask {
            number,
            offset,
            length,
        });
        offset += length;
        number += 1;
    }
    Ok(parts)
}
