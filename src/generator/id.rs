// Copyright 2024 OctoFHIR Team
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

//! Local identifier generation

use super::provider::{IdGenerator, ProviderError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Builds ids from a prefix, the current UTC time and a process-wide counter
///
/// Ids look like `https://example.com/ids/sm/20250101T120000Z-7`.
#[derive(Debug)]
pub struct TimestampIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl TimestampIdGenerator {
    /// Generator producing ids under `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    fn next_id(&self) -> String {
        let sequence = self.counter.fetch_add(1, Ordering::Relaxed);
        let timestamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        format!("{}{}-{}", self.prefix, timestamp, sequence)
    }
}

#[async_trait]
impl IdGenerator for TimestampIdGenerator {
    async fn generate_ids(&self, count: u32) -> Result<Vec<String>, ProviderError> {
        Ok((0..count).map(|_| self.next_id()).collect())
    }
}
