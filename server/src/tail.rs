//! Follow a log file from its current end.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Reads lines appended to a file after it was opened.
///
/// A trailing line without a newline is held back until it is completed. If
/// the file shrinks (truncated or rotated in place) reading restarts from the
/// beginning.
pub struct LogTail {
    path: PathBuf,
    file: File,
    position: u64,
    partial: Vec<u8>,
}

impl LogTail {
    pub async fn open_at_end(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;
        let position = file.metadata().await?.len();
        Ok(Self {
            path,
            file,
            position,
            partial: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Complete lines written since the last call, trimmed. Blank lines are
    /// skipped.
    pub async fn poll_lines(&mut self) -> io::Result<Vec<String>> {
        let len = self.file.metadata().await?.len();
        if len < self.position {
            log::info!("{} was truncated, reading from the start", self.path.display());
            self.position = 0;
            self.partial.clear();
        }
        if len == self.position {
            return Ok(Vec::new());
        }

        self.file.seek(SeekFrom::Start(self.position)).await?;
        let mut buf = Vec::new();
        let read = (&mut self.file)
            .take(len - self.position)
            .read_to_end(&mut buf)
            .await?;
        self.position += read as u64;
        self.partial.extend_from_slice(&buf);

        let mut lines = Vec::new();
        while let Some(newline) = self.partial.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        Ok(lines)
    }
}
