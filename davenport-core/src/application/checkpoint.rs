//! Conversation checkpointing keyed by thread identifier.

use crate::domain::types::ChatMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to access checkpoint {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode checkpoint {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable, monotonically-appending message history keyed by thread id.
/// `load` on an unknown thread returns an empty history; `append` must be
/// atomic per call so a partial write is never observable.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>, CheckpointError>;
    async fn append(
        &self,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), CheckpointError>;
}

/// Process-local checkpoint store. The single lock makes each append atomic
/// and serializes concurrent calls on the same thread id.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    threads: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>, CheckpointError> {
        let threads = self.threads.lock().await;
        Ok(threads.get(thread_id).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), CheckpointError> {
        let mut threads = self.threads.lock().await;
        let history = threads.entry(thread_id.to_string()).or_default();
        history.extend_from_slice(messages);
        debug!(
            thread_id,
            total_messages = history.len(),
            "Checkpointed conversation history"
        );
        Ok(())
    }
}

/// One JSON file per thread under a directory. Appends go through a
/// write-to-temp-then-rename step, and a store-level lock serializes them so
/// two appends on the same thread cannot interleave.
pub struct FileCheckpointStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCheckpointStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn thread_path(&self, thread_id: &str) -> PathBuf {
        let safe: String = thread_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    fn read_history(&self, thread_id: &str) -> Result<Vec<ChatMessage>, CheckpointError> {
        let path = self.thread_path(thread_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CheckpointError::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|source| CheckpointError::Decode { path, source })
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>, CheckpointError> {
        self.read_history(thread_id)
    }

    async fn append(
        &self,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(), CheckpointError> {
        let _guard = self.write_lock.lock().await;

        let mut history = self.read_history(thread_id)?;
        history.extend_from_slice(messages);

        let path = self.thread_path(thread_id);
        std::fs::create_dir_all(&self.dir).map_err(|source| CheckpointError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let encoded =
            serde_json::to_vec_pretty(&history).map_err(|source| CheckpointError::Decode {
                path: path.clone(),
                source,
            })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &encoded).map_err(|source| CheckpointError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| CheckpointError::Io { path, source })?;

        debug!(
            thread_id,
            total_messages = history.len(),
            "Checkpointed conversation history to disk"
        );
        Ok(())
    }
}
