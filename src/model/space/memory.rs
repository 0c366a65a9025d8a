use std::string;
use std::sync;

use crate::model::space;

/// An immutable in-memory byte sequence. The bytes are shared with whoever
/// handed them over, not copied.
pub struct MemorySource {
    data: sync::Arc<[u8]>,
    pub label: string::String,
}

impl MemorySource {
    pub fn new(data: impl Into<sync::Arc<[u8]>>, label: &str) -> MemorySource {
        MemorySource {
            data: data.into(),
            label: label.to_string(),
        }
    }
}

impl space::SourceExt for MemorySource {
    fn get_label(&self) -> &str {
        &self.label
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn fetch(&self, extent: (u64, u64)) -> space::FetchResult {
        let Ok(begin) = usize::try_from(extent.0) else { return space::FetchResult::Unreadable };

        if begin >= self.data.len() {
            return space::FetchResult::Unreadable;
        }

        let end = std::cmp::min(begin.saturating_add(extent.1 as usize), self.data.len());
        let chunk = self.data[begin..end].to_vec();

        if chunk.len() as u64 == extent.1 {
            space::FetchResult::Ok(chunk)
        } else {
            space::FetchResult::Partial(chunk)
        }
    }
}
