//! In-memory event source.

use anyhow::Result;
use async_trait::async_trait;

use super::{tag_provider, EventSource};
use crate::types::{EventRecord, Sport};

/// Serves a fixed set of records. Records without a sport are never served.
pub struct StaticSource {
    name: String,
    records: Vec<EventRecord>,
}

impl StaticSource {
    pub fn new(name: &str, mut records: Vec<EventRecord>) -> Self {
        tag_provider(&mut records, name);
        Self {
            name: name.to_string(),
            records,
        }
    }
}

#[async_trait]
impl EventSource for StaticSource {
    async fn fetch(&self, sport: Sport) -> Result<Vec<EventRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.sport == Some(sport))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
