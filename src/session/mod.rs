//! Session management
//!
//! Per-conversation message windows keyed by session id. Sessions idle for
//! longer than the configured timeout are evicted by a periodic sweep.
use crate::config::{parse_duration, SessionConfig};
use crate::error::{Result, VersewiseError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Sliding window over the most recent messages of one conversation
#[derive(Debug, Clone, Serialize)]
pub struct SessionMemory {
    /// Unique memory identifier
    pub id: Uuid,

    /// Session id this memory is stored under; `None` when ephemeral
    pub session_id: Option<String>,

    pub created_at: DateTime<Utc>,

    max_messages: usize,
    messages: VecDeque<Message>,
}

impl SessionMemory {
    pub fn new(session_id: Option<String>, max_messages: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            created_at: Utc::now(),
            max_messages,
            messages: VecDeque::with_capacity(max_messages),
        }
    }

    /// Append a message, dropping the oldest beyond the window
    pub fn add(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.add(Message::new(Role::User, content));
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.add(Message::new(Role::Assistant, content));
    }

    /// Messages, oldest first
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_ephemeral(&self) -> bool {
        self.session_id.is_none()
    }
}

/// Handle to a session's memory, shared between the store and its users
pub type SharedMemory = Arc<Mutex<SessionMemory>>;

struct SessionEntry {
    memory: SharedMemory,
    last_access: Instant,
}

/// Concurrent session store
///
/// `get_or_create` is single-flight per id: concurrent callers for the same
/// id always receive the same memory.
pub struct SessionStore {
    sessions: Arc<DashMap<String, SessionEntry>>,
    max_messages: usize,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(max_messages: usize, idle_timeout: Duration) -> Result<Self> {
        if max_messages == 0 {
            return Err(VersewiseError::Session(
                "max_messages must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            sessions: Arc::new(DashMap::new()),
            max_messages,
            idle_timeout,
        })
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let idle_timeout = parse_duration(&config.idle_timeout).map_err(|message| {
            VersewiseError::InvalidConfigValue {
                path: "session.idle_timeout".to_string(),
                message,
            }
        })?;
        Self::new(config.max_messages, idle_timeout)
    }

    /// Memory for `session_id`, created on first use
    ///
    /// A blank id yields a fresh ephemeral memory that is not stored.
    pub fn get_or_create(&self, session_id: &str) -> SharedMemory {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            warn!("No session id provided, creating ephemeral memory");
            return Arc::new(Mutex::new(SessionMemory::new(None, self.max_messages)));
        }

        let entry = self
            .sessions
            .entry(session_id.to_string())
            .and_modify(|entry| entry.last_access = Instant::now())
            .or_insert_with(|| {
                info!("Creating session memory for {}", session_id);
                SessionEntry {
                    memory: Arc::new(Mutex::new(SessionMemory::new(
                        Some(session_id.to_string()),
                        self.max_messages,
                    ))),
                    last_access: Instant::now(),
                }
            });

        entry.memory.clone()
    }

    /// Remove a session; returns whether it existed
    pub fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id.trim()).is_some();
        if removed {
            info!("Cleared session memory for {}", session_id);
        }
        removed
    }

    pub fn active_session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Evict sessions idle longer than the timeout; returns how many were removed
    pub fn sweep_expired(&self) -> usize {
        sweep(&self.sessions, self.idle_timeout)
    }

    /// Run `sweep_expired` every `interval` on the tokio runtime
    ///
    /// The task stops when the returned handle is aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        let idle_timeout = self.idle_timeout;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                sweep(&sessions, idle_timeout);
            }
        })
    }
}

fn sweep(sessions: &DashMap<String, SessionEntry>, idle_timeout: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|id, entry| {
        let idle = entry.last_access.elapsed();
        let keep = idle <= idle_timeout;
        if !keep {
            debug!("Evicting expired session {} (idle for {}ms)", id, idle.as_millis());
        }
        keep
    });

    let removed = before.saturating_sub(sessions.len());
    if removed > 0 {
        info!(
            "Cleaned up {} expired sessions. Active sessions: {}",
            removed,
            sessions.len()
        );
    }
    removed
}
