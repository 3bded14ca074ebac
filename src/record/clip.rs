//! Finished clips and the store that assembles them
//!
//! The store concatenates a session's fragments into a file under a
//! session-scoped temp directory. A [`Clip`] owns its file and deletes it
//! on drop, so replacing a clip releases the old recording instead of
//! leaking it.

use crate::capture::MediaKind;
use crate::{RecitalError, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Assembles fragments into playable files
///
/// All clips live in one temp directory that disappears with the store.
pub struct ClipStore {
    dir: TempDir,
    next_id: AtomicU64,
}

impl ClipStore {
    pub fn new() -> Result<Self> {
        let dir = TempDir::with_prefix("recital-")
            .map_err(|e| RecitalError::Clip(format!("Failed to create clip directory: {}", e)))?;
        debug!("Clip store at {}", dir.path().display());
        Ok(Self {
            dir,
            next_id: AtomicU64::new(0),
        })
    }

    /// Concatenate `fragments` into a new clip of the given kind
    ///
    /// Zero fragments still produce a clip; its file is simply empty.
    pub fn assemble(&self, fragments: &[Vec<u8>], kind: MediaKind) -> Result<Clip> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let path = self
            .dir
            .path()
            .join(format!("clip-{}.{}", id, kind.extension()));

        let mut file = File::create(&path)?;
        let mut len: u64 = 0;
        for fragment in fragments {
            file.write_all(fragment)?;
            len += fragment.len() as u64;
        }
        file.sync_all()?;

        info!(
            "Assembled {} clip: {} fragment(s), {} bytes, {}",
            kind,
            fragments.len(),
            len,
            path.display()
        );

        Ok(Clip {
            path,
            kind,
            len,
            recorded_at: Local::now(),
        })
    }
}

/// A playable recording, backed by a file this handle owns
pub struct Clip {
    path: PathBuf,
    kind: MediaKind,
    len: u64,
    recorded_at: DateTime<Local>,
}

impl Clip {
    /// De-referenceable location of the clip's bytes
    pub fn url(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// MIME type the clip is tagged with
    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn recorded_at(&self) -> DateTime<Local> {
        self.recorded_at
    }
}

impl Drop for Clip {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to release clip {}: {}", self.path.display(), e);
            }
        } else {
            debug!("Released clip {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_concatenates_fragments() {
        let store = ClipStore::new().unwrap();
        let fragments = vec![b"abc".to_vec(), b"def".to_vec()];

        let clip = store.assemble(&fragments, MediaKind::Audio).unwrap();
        assert_eq!(clip.len(), 6);
        assert_eq!(clip.mime(), "audio/mp3");
        assert_eq!(fs::read(clip.url()).unwrap(), b"abcdef");
    }

    #[test]
    fn test_zero_fragments_still_yield_a_clip() {
        let store = ClipStore::new().unwrap();
        let clip = store.assemble(&[], MediaKind::Video).unwrap();

        assert!(clip.is_empty());
        assert!(clip.url().exists());
        assert!(clip.url().to_string_lossy().ends_with(".webm"));
    }

    #[test]
    fn test_drop_releases_the_file() {
        let store = ClipStore::new().unwrap();
        let clip = store.assemble(&[b"x".to_vec()], MediaKind::Audio).unwrap();
        let path = clip.url().to_path_buf();

        assert!(path.exists());
        drop(clip);
        assert!(!path.exists());
    }

    #[test]
    fn test_clip_names_do_not_collide() {
        let store = ClipStore::new().unwrap();
        let a = store.assemble(&[b"a".to_vec()], MediaKind::Audio).unwrap();
        let b = store.assemble(&[b"b".to_vec()], MediaKind::Audio).unwrap();
        assert_ne!(a.url(), b.url());
    }
}
