use super::RangeSource;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Local file served through positional reads
pub struct LocalFileSource {
    file: std::fs::File,
    path: String,
    size: u64,
}

impl LocalFileSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))?;
        let size = file
            .metadata()
            .map_err(|e| Error::Configuration(format!("{}: {e}", path.display())))?
            .len();
        Ok(Self {
            file,
            path: path.display().to_string(),
            size,
        })
    }
}

#[async_trait]
impl RangeSource for LocalFileSource {
    async fn fetch(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        debug_assert!(start < end && end <= self.len());
        let mut buf = vec![0u8; (end - start) as usize];

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file
                .read_exact_at(&mut buf, start)
                .map_err(|e| Error::Network(format!("{}: {e}", self.path)))?;
        }

        #[cfg(not(unix))]
        {
            use std::io::{Read, Seek, SeekFrom};
            // The handle's cursor is shared; the stream issues one fetch at a time.
            let mut file = &self.file;
            file.seek(SeekFrom::Start(start))
                .and_then(|_| file.read_exact(&mut buf))
                .map_err(|e| Error::Network(format!("{}: {e}", self.path)))?;
        }

        Ok(buf)
    }

    fn len(&self) -> u64 {
        self.size
    }

    fn location(&self) -> &str {
        &self.path
    }
}
