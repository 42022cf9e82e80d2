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

//! Header and query multimaps, and their canonical forms for signing

use crate::s3::utils::url_encode;
use std::collections::BTreeMap;

/// Multimap for string key and string value
pub type Multimap = multimap::MultiMap<String, String>;

/// Trims a header value and collapses runs of spaces into one.
fn canonical_header_value(value: &str) -> String {
    value
        .trim()
        .split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn encoded_pairs(map: &Multimap) -> impl Iterator<Item = (String, String)> + '_ {
    map.iter_all().flat_map(|(key, values)| {
        values
            .iter()
            .map(move |value| (url_encode(key), url_encode(value)))
    })
}

pub trait MultimapExt {
    /// Adds a key-value pair to the multimap
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V);

    /// Converts multimap to HTTP query string
    fn to_query_string(&self) -> String;

    /// Query string with pairs sorted by encoded name, then value.
    fn get_canonical_query_string(&self) -> String;

    /// Returns `(signed_headers, canonical_headers)`: lowercase names joined by
    /// `;`, and `name:value` lines. `authorization` and `user-agent` are left
    /// out.
    fn get_canonical_headers(&self) -> (String, String);
}

impl MultimapExt for Multimap {
    fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.insert(key.into(), value.into());
    }

    fn to_query_string(&self) -> String {
        encoded_pairs(self)
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn get_canonical_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = encoded_pairs(self).collect();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn get_canonical_headers(&self) -> (String, String) {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, values) in self.iter_all() {
            let name = name.to_lowercase();
            if name == "authorization" || name == "user-agent" {
                continue;
            }
            headers
                .entry(name)
                .or_default()
                .extend(values.iter().map(|v| canonical_header_value(v)));
        }

        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical_headers = headers
            .into_iter()
            .map(|(name, mut values)| {
                values.sort();
                format!("{name}:{}", values.join(","))
            })
            .collect::<Vec<_>>()
            .join("\n");
        (signed_headers, canonical_headers)
    }
}
