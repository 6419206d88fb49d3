use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use frep_tree::{ArchiveError, ShapeId};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("script was not loaded from a file; nowhere to save it")]
    NoOrigin,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("no live shape {0}")]
    UnknownShape(ShapeId),
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Script text being edited, plus the file it came from.
///
/// `dirty` is set by every edit and cleared by [`ScriptBuffer::take_dirty`];
/// the viewer re-evaluates the script on frames where it was dirty.
#[derive(Debug, Clone)]
pub struct ScriptBuffer {
    text: String,
    origin: Option<PathBuf>,
    dirty: bool,
}

impl ScriptBuffer {
    /// A scratch buffer with no file behind it.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: None,
            dirty: true,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| PersistError::io(path, e))?;
        log::info!("loaded script from {}", path.display());
        Ok(Self {
            text,
            origin: Some(path.to_path_buf()),
            dirty: true,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the text changed since the last call, and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Writes the text back to its origin, one `\n` after every line.
    pub fn save(&self) -> Result<&Path, PersistError> {
        let path = self.origin.as_deref().ok_or(PersistError::NoOrigin)?;

        let mut out = String::with_capacity(self.text.len() + 1);
        // Split on '\n' only so CRLF scripts keep their '\r'.
        for line in self.text.split_terminator('\n') {
            out.push_str(line);
            out.push('\n');
        }

        fs::write(path, out).map_err(|e| PersistError::io(path, e))?;
        log::info!("saved script to {}", path.display());
        Ok(path)
    }
}
