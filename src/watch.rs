use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Editors often save with several events in quick succession
const DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

/// Watches a single source file.
///
/// The parent directory is watched rather than the file itself so that
/// editors replacing the file on save keep producing events.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<Result<Event, notify::Error>>,
    file_name: OsString,
}

impl SourceWatcher {
    pub fn new(source: &Path) -> Result<Self> {
        let file_name = source
            .file_name()
            .with_context(|| format!("{} is not a file path", source.display()))?
            .to_os_string();
        let dir = match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        tracing::debug!(dir = %dir.display(), "Watching for changes");

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_name,
        })
    }

    /// Wait for the next event on the watched file (blocking).
    /// Returns None once the watcher has shut down.
    pub fn next(&self) -> Option<SourceEvent> {
        loop {
            let event = match self.receiver.recv() {
                Ok(Ok(event)) => event,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Watch error");
                    continue;
                }
                Err(_) => return None,
            };
            if let Some(event) = self.classify_event(event) {
                self.drain_burst();
                return Some(event);
            }
        }
    }

    /// Swallow the rest of a burst of events for the same save
    fn drain_burst(&self) {
        loop {
            match self.receiver.recv_timeout(DEBOUNCE) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn classify_event(&self, event: Event) -> Option<SourceEvent> {
        let path = event
            .paths
            .iter()
            .find(|p| p.file_name() == Some(self.file_name.as_os_str()))?
            .clone();

        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => Some(SourceEvent::Changed(path)),
            EventKind::Remove(_) => Some(SourceEvent::Removed(path)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use tempfile::TempDir;

    fn watcher_for(temp_dir: &TempDir) -> (PathBuf, SourceWatcher) {
        let source = temp_dir.path().join("schema.bt");
        std::fs::write(&source, "").unwrap();
        let watcher = SourceWatcher::new(&source).unwrap();
        (source, watcher)
    }

    #[test]
    fn test_classify_matches_only_watched_file() {
        let temp_dir = TempDir::new().unwrap();
        let (source, watcher) = watcher_for(&temp_dir);

        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(source.clone());
        assert_eq!(
            watcher.classify_event(modify),
            Some(SourceEvent::Changed(source.clone()))
        );

        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(temp_dir.path().join("other.bt"));
        assert_eq!(watcher.classify_event(other), None);

        let removed = Event::new(EventKind::Remove(RemoveKind::File)).add_path(source.clone());
        assert_eq!(
            watcher.classify_event(removed),
            Some(SourceEvent::Removed(source))
        );
    }

    #[test]
    fn test_rejects_directory_like_path() {
        assert!(SourceWatcher::new(Path::new("/")).is_err());
    }
}
