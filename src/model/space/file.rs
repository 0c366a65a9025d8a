use std::string;
use std::vec;
use std::io::Read;
use std::io::Seek;

use crate::model::space;

pub struct FileSource {
    file: std::fs::File,
    length: u64,
    pub label: string::String,
}

impl FileSource {
    pub fn open(path: std::path::PathBuf, label: &str) -> Result<FileSource, std::io::Error> {
        let file = std::fs::File::open(&path)?;
        Self::from_file(file, label)
    }

    /// Wraps a handle the host already opened. The length is sampled once,
    /// here; a file that grows afterwards is not followed.
    pub fn from_file(file: std::fs::File, label: &str) -> Result<FileSource, std::io::Error> {
        let length = file.metadata()?.len();

        Ok(FileSource {
            file,
            length,
            label: label.to_string(),
        })
    }

    fn read_sync(&self, offset: u64, mut out: vec::Vec<u8>) -> space::FetchResult {
        /* Read and Seek are implemented for &File, so shared access is enough */
        let mut file = &self.file;

        file.seek(std::io::SeekFrom::Start(offset))
            .and_then(|_| file.read(&mut out[..]))
            .map(|r| {
                match r {
                    i if i == out.len() => space::FetchResult::Ok(out),
                    0 => space::FetchResult::Unreadable,
                    i => {
                        out.truncate(i);
                        space::FetchResult::Partial(out)
                    }
                }}).unwrap_or_else(space::FetchResult::IoError)
    }
}

impl space::SourceExt for FileSource {
    fn get_label(&self) -> &str {
        &self.label
    }

    fn length(&self) -> u64 {
        self.length
    }

    fn fetch(&self, extent: (u64, u64)) -> space::FetchResult {
        let size = std::cmp::min(extent.1, self.length.saturating_sub(extent.0));
        self.read_sync(extent.0, vec![0; size as usize])
    }
}
