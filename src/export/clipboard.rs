use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("nothing to copy, no quote has been generated")]
    Empty,

    #[error("failed to write quote to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
}

/// Write-only text sink standing in for the system clipboard.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Clipboard for FileClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }

        fs::write(&self.path, text).map_err(|source| ClipboardError::Write {
            target: self.path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")
            .and_then(|_| stdout.flush())
            .map_err(|source| ClipboardError::Write {
                target: "stdout".to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_clipboard_writes_text() {
        let path = std::env::temp_dir().join(format!("otc-quote-clip-{}.txt", std::process::id()));
        let mut clipboard = FileClipboard::new(&path);

        clipboard.write_text("QUOTE RESULT").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "QUOTE RESULT");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unwritable_target_is_reported() {
        let path = std::env::temp_dir().join("otc-quote-missing-dir").join("nested").join("q.txt");
        let error = FileClipboard::new(path).write_text("QUOTE").unwrap_err();

        assert!(matches!(error, ClipboardError::Write { .. }));
    }

    #[test]
    fn empty_text_is_refused() {
        let error = StdoutClipboard.write_text("").unwrap_err();

        assert!(matches!(error, ClipboardError::Empty));
    }
}
