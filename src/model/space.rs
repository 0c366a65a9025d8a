use std::vec;

use enum_dispatch::enum_dispatch;
use tracing::instrument;

pub mod file;
pub mod memory;

pub enum FetchResult {
    Ok(vec::Vec<u8>),
    Partial(vec::Vec<u8>),
    Unreadable,
    IoError(std::io::Error)
}

/// A random-access, read-only byte source. Nothing in this crate ever
/// writes to one.
#[enum_dispatch]
pub trait SourceExt {
    fn get_label(&self) -> &str;
    fn length(&self) -> u64;
    /// `extent` is (offset, size). Implementations may return fewer bytes
    /// than requested.
    fn fetch(&self, extent: (u64, u64)) -> FetchResult;
}

#[enum_dispatch(SourceExt)]
pub enum PagedSource {
    File(file::FileSource),
    Memory(memory::MemorySource),
}

#[derive(Debug)]
pub enum SourceError {
    Io {
        offset: u64,
        error: std::io::Error,
    },
    /// The source claimed to have data at this offset but produced none.
    Unreadable {
        offset: u64,
    },
}

/// A materialized window of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub bytes: vec::Vec<u8>,
}

impl PagedSource {
    /// Reads up to `max_bytes` starting at `offset`, never past the end of
    /// the source. Short reads are retried until the clamped size is
    /// satisfied or the source stops producing data.
    #[instrument(level = "debug", skip(self))]
    pub fn fetch_page(&self, offset: u64, max_bytes: usize) -> Result<Page, SourceError> {
        let size = std::cmp::min(max_bytes as u64, self.length().saturating_sub(offset)) as usize;
        let mut bytes = vec::Vec::with_capacity(size);

        while bytes.len() < size {
            let addr = offset + bytes.len() as u64;
            let want = (size - bytes.len()) as u64;

            match self.fetch((addr, want)) {
                FetchResult::Ok(chunk) => bytes.extend_from_slice(&chunk),
                FetchResult::Partial(chunk) if !chunk.is_empty() => bytes.extend_from_slice(&chunk),
                FetchResult::Partial(_) | FetchResult::Unreadable => {
                    if bytes.is_empty() {
                        return Err(SourceError::Unreadable { offset: addr });
                    }
                    tracing::warn!(addr, "source ended early; page truncated");
                    break;
                },
                FetchResult::IoError(error) => return Err(SourceError::Io { offset: addr, error }),
            }
        }

        tracing::debug!(offset, len = bytes.len(), "fetched page");

        Ok(Page { offset, bytes })
    }
}

impl std::fmt::Debug for PagedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedSource")
            .field("label", &self.get_label())
            .field("length", &self.length())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io { offset, error } => write!(f, "I/O error reading at {:#x}: {}", offset, error),
            SourceError::Unreadable { offset } => write!(f, "Source produced no data at {:#x}", offset),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io { error, .. } => Some(error),
            SourceError::Unreadable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn counting(n: usize) -> PagedSource {
        memory::MemorySource::new((0..n).map(|i| i as u8).collect::<Vec<u8>>(), "counting").into()
    }

    #[test]
    fn fetch_is_clamped_to_length() {
        let source = counting(40);

        assert_eq!(source.fetch_page(0, 16).unwrap().bytes, (0..16).collect::<Vec<u8>>());
        assert_eq!(source.fetch_page(32, 16).unwrap().bytes, (32..40).collect::<Vec<u8>>());
        assert_eq!(source.fetch_page(40, 16).unwrap().bytes, Vec::<u8>::new());
        assert_eq!(source.fetch_page(1000, 16).unwrap(), Page { offset: 1000, bytes: vec![] });
    }

    #[test]
    fn file_and_memory_agree() {
        let bytes: Vec<u8> = (0..=255).collect();
        let path = crate::util::temp_path("space-agree");
        std::fs::write(&path, &bytes).unwrap();

        let file: PagedSource = file::FileSource::open(path.clone(), "agree").unwrap().into();
        let memory: PagedSource = memory::MemorySource::new(bytes, "agree").into();

        assert_eq!(file.length(), 256);
        for offset in [0, 16, 250] {
            assert_eq!(file.fetch_page(offset, 16).unwrap(), memory.fetch_page(offset, 16).unwrap());
        }

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn io_failure_is_reported() {
        let path = crate::util::temp_path("space-writeonly");
        let mut handle = std::fs::OpenOptions::new().write(true).create(true).truncate(true).open(&path).unwrap();
        std::io::Write::write_all(&mut handle, &[0u8; 64]).unwrap();

        /* the handle can't be read from, so every fetch fails */
        let source: PagedSource = file::FileSource::from_file(handle, "writeonly").unwrap().into();
        assert_eq!(source.length(), 64);
        assert_matches!(source.fetch_page(0, 16), Err(SourceError::Io { offset: 0, .. }));

        std::fs::remove_file(path).unwrap();
    }
}
