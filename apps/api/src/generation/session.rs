//! Process-wide session: the custom stopword registry and the current artifact.
//!
//! Stopword mutations are serialized by a writer lock. Generation takes a snapshot at
//! the start and never holds a lock while it runs. Publishing the artifact swaps one
//! `Arc`, so the last successful generation wins and a failed one leaves the previous
//! artifact in place.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::generation::generator::{generate, CloudConfig, GeneratedArtifact};
use crate::layout::GlyphSource;
use crate::render::{thumbnail, ResizeFilter};
use crate::text::{StopwordRegistry, StopwordSnapshot};

#[derive(Debug, Default)]
pub struct WordCloudSession {
    stopwords: RwLock<StopwordRegistry>,
    current: RwLock<Option<Arc<GeneratedArtifact>>>,
}

// A panic while holding a lock cannot leave either value half-written: registry
// mutations validate before touching the set and the artifact slot is a single store.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl WordCloudSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Stopwords ──────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StopwordSnapshot {
        read(&self.stopwords).snapshot()
    }

    pub fn add_custom_stopword(&self, term: &str) -> Result<StopwordSnapshot, AppError> {
        let snapshot = write(&self.stopwords).add(term)?;
        info!(term = term.trim(), version = snapshot.version(), "Custom stopword added");
        Ok(snapshot)
    }

    pub fn remove_custom_stopword(&self, term: &str) -> Result<StopwordSnapshot, AppError> {
        let snapshot = write(&self.stopwords).remove(term)?;
        info!(term = term.trim(), version = snapshot.version(), "Custom stopword removed");
        Ok(snapshot)
    }

    pub fn reset_custom_stopwords(&self) -> StopwordSnapshot {
        let snapshot = write(&self.stopwords).reset();
        info!(version = snapshot.version(), "Custom stopwords cleared");
        snapshot
    }

    /// Custom stopwords, sorted.
    pub fn custom_stopwords(&self) -> Vec<String> {
        read(&self.stopwords).custom_terms()
    }

    // ── Artifact ───────────────────────────────────────────────────────────

    /// Generates with the stopwords in effect right now and publishes the result.
    pub fn generate_and_publish(
        &self,
        text: &str,
        config: &CloudConfig,
        glyphs: &dyn GlyphSource,
    ) -> Result<Arc<GeneratedArtifact>, AppError> {
        let snapshot = self.snapshot();
        let artifact = generate(text, &snapshot, config, glyphs)?;
        Ok(self.publish(artifact))
    }

    /// Replaces the current artifact.
    pub fn publish(&self, artifact: GeneratedArtifact) -> Arc<GeneratedArtifact> {
        let artifact = Arc::new(artifact);
        *write(&self.current) = Some(Arc::clone(&artifact));
        artifact
    }

    pub fn current(&self) -> Option<Arc<GeneratedArtifact>> {
        read(&self.current).clone()
    }

    /// PNG bytes of the current artifact.
    pub fn export_current_artifact(&self) -> Result<Bytes, AppError> {
        self.current()
            .map(|artifact| artifact.png.clone())
            .ok_or(AppError::NoArtifactYet)
    }

    /// A resized PNG of the current artifact. The stored image is not modified.
    pub fn current_thumbnail(&self, width: u32, height: u32, filter: ResizeFilter) -> Result<Bytes, AppError> {
        let png = self.export_current_artifact()?;
        thumbnail(&png, width, height, filter)
    }

    /// Clears the custom stopwords and the current artifact.
    pub fn reset_session(&self) {
        let snapshot = write(&self.stopwords).reset();
        *write(&self.current) = None;
        info!(version = snapshot.version(), "Session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::generator::default_cloud_config;
    use crate::layout::BlockFace;

    fn config() -> CloudConfig {
        CloudConfig {
            width: 200,
            height: 120,
            ..default_cloud_config()
        }
    }

    #[test]
    fn test_export_before_generation_fails() {
        let session = WordCloudSession::new();
        assert!(matches!(session.export_current_artifact(), Err(AppError::NoArtifactYet)));
        assert!(matches!(
            session.current_thumbnail(10, 10, ResizeFilter::Nearest),
            Err(AppError::NoArtifactYet)
        ));
    }

    #[test]
    fn test_generate_publishes_artifact() {
        let session = WordCloudSession::new();
        let artifact = session
            .generate_and_publish("river river stone", &config(), BlockFace::shared())
            .unwrap();
        assert_eq!(session.current().unwrap().id, artifact.id);
        assert_eq!(session.export_current_artifact().unwrap(), artifact.png);
    }

    #[test]
    fn test_failed_generation_keeps_previous_artifact() {
        let session = WordCloudSession::new();
        let first = session
            .generate_and_publish("river river stone", &config(), BlockFace::shared())
            .unwrap();
        let err = session.generate_and_publish("", &config(), BlockFace::shared());
        assert!(matches!(err, Err(AppError::EmptyInput)));
        assert_eq!(session.current().unwrap().id, first.id);
    }

    #[test]
    fn test_last_writer_wins() {
        let session = WordCloudSession::new();
        session
            .generate_and_publish("river stone", &config(), BlockFace::shared())
            .unwrap();
        let second = session
            .generate_and_publish("cloud cloud", &config(), BlockFace::shared())
            .unwrap();
        assert_eq!(session.current().unwrap().id, second.id);
    }

    #[test]
    fn test_stopword_round_trip() {
        let session = WordCloudSession::new();
        assert!(!session.snapshot().contains("river"));
        session.add_custom_stopword("river").unwrap();
        assert!(session.snapshot().contains("river"));
        assert!(matches!(
            session.add_custom_stopword("river"),
            Err(AppError::AlreadyPresent(_))
        ));
        session.remove_custom_stopword("river").unwrap();
        assert!(!session.snapshot().contains("river"));
        assert!(matches!(
            session.remove_custom_stopword("river"),
            Err(AppError::NotPresent(_))
        ));
    }

    #[test]
    fn test_custom_stopwords_affect_next_generation() {
        let session = WordCloudSession::new();
        session.add_custom_stopword("river").unwrap();
        let artifact = session
            .generate_and_publish("river river stone", &config(), BlockFace::shared())
            .unwrap();
        assert_eq!(artifact.top_terms.len(), 1);
        assert_eq!(artifact.top_terms[0].term, "stone");
    }

    #[test]
    fn test_thumbnail_of_current_artifact() {
        let session = WordCloudSession::new();
        session
            .generate_and_publish("river river stone", &config(), BlockFace::shared())
            .unwrap();
        let small = session.current_thumbnail(50, 30, ResizeFilter::Area).unwrap();
        let img = image::load_from_memory(&small).unwrap();
        assert_eq!((img.width(), img.height()), (50, 30));
        let original = image::load_from_memory(&session.export_current_artifact().unwrap()).unwrap();
        assert_eq!((original.width(), original.height()), (200, 120));
    }

    #[test]
    fn test_reset_session_clears_everything() {
        let session = WordCloudSession::new();
        session.add_custom_stopword("river").unwrap();
        session
            .generate_and_publish("stone stone", &config(), BlockFace::shared())
            .unwrap();
        session.reset_session();
        assert!(session.custom_stopwords().is_empty());
        assert!(matches!(session.export_current_artifact(), Err(AppError::NoArtifactYet)));
    }

    #[test]
    fn test_concurrent_adds_are_serialized() {
        let session = Arc::new(WordCloudSession::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || session.add_custom_stopword(&format!("term{i}")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(session.custom_stopwords().len(), 8);
        assert_eq!(session.snapshot().version(), 8);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_edits() {
        let session = WordCloudSession::new();
        let before = session.snapshot();
        session.add_custom_stopword("river").unwrap();
        assert!(!before.contains("river"));
        assert!(session.snapshot().contains("river"));
    }
}
