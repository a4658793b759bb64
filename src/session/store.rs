//! Page sessions and their store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{FixedOffset, Local};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::WaitForCancellationFutureOwned;
use uuid::Uuid;

use crate::chat::ConversationController;
use crate::config::{ChatConfig, UploadConfig};
use crate::scheduler::TaskScope;
use crate::upload::{FileDescriptor, UploadControl, UploadSink};

/// One browser tab's worth of state.
///
/// Cloning shares the session. The session is disposed when it is removed from
/// the store or when the last clone is dropped; disposal cancels its timers and
/// freezes its state.
#[derive(Debug, Clone)]
pub struct PageSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: String,
    conversation: ConversationController,
    upload: UploadControl,
    scope: TaskScope,
    started: Instant,
    /// Milliseconds after `started` of the last request touching this session.
    last_activity_ms: AtomicU64,
    /// Event streams currently subscribed to this session.
    open_streams: AtomicUsize,
    viewer_offset_secs: AtomicI32,
}

impl SessionInner {
    fn dispose(&self) {
        if self.scope.is_disposed() {
            return;
        }
        self.scope.dispose();
        self.conversation.seal();
        self.upload.seal();
        tracing::info!(name: "session.disposed", session_id = %self.id, "Page session disposed");
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl PageSession {
    fn new(
        id: String,
        chat: ChatConfig,
        upload: UploadConfig,
        sink: Arc<dyn UploadSink>,
        viewer_offset: FixedOffset,
    ) -> Self {
        let scope = TaskScope::new();
        let conversation = ConversationController::new(chat, &scope);

        let target = conversation.clone();
        let upload = UploadControl::new(
            upload,
            sink,
            &scope,
            Arc::new(move |file: &FileDescriptor| target.attach_document(file.clone())),
        );

        Self {
            inner: Arc::new(SessionInner {
                id,
                conversation,
                upload,
                scope,
                started: Instant::now(),
                last_activity_ms: AtomicU64::new(0),
                open_streams: AtomicUsize::new(0),
                viewer_offset_secs: AtomicI32::new(viewer_offset.local_minus_utc()),
            }),
        }
    }

    /// Get the session ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn conversation(&self) -> &ConversationController {
        &self.inner.conversation
    }

    #[must_use]
    pub fn upload(&self) -> &UploadControl {
        &self.inner.upload
    }

    /// UTC offset the viewer's clock runs at, used to format timestamps.
    #[must_use]
    pub fn viewer_offset(&self) -> FixedOffset {
        let secs = self.inner.viewer_offset_secs.load(Ordering::Relaxed);
        FixedOffset::east_opt(secs).unwrap_or_else(server_offset)
    }

    pub fn set_viewer_offset(&self, offset: FixedOffset) {
        self.inner
            .viewer_offset_secs
            .store(offset.local_minus_utc(), Ordering::Relaxed);
    }

    /// Whether the session's timers have been cancelled.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.scope.is_disposed()
    }

    /// Resolves once the session is disposed.
    pub fn disposed(&self) -> WaitForCancellationFutureOwned {
        self.inner.scope.disposed()
    }

    /// Number of timers still pending.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.inner.scope.pending()
    }

    /// Cancel all timers and freeze state. Idempotent.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Update the last activity timestamp.
    pub fn touch(&self) {
        let elapsed = Instant::now().duration_since(self.inner.started);
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.inner.last_activity_ms.store(millis, Ordering::Relaxed);
    }

    /// Time since the last request touching this session.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        let last = self.inner.started
            + Duration::from_millis(self.inner.last_activity_ms.load(Ordering::Relaxed));
        Instant::now().saturating_duration_since(last)
    }

    /// Mark an event stream as subscribed until the guard is dropped.
    ///
    /// A session with an open stream never expires.
    #[must_use]
    pub fn open_stream(&self) -> StreamGuard {
        self.inner.open_streams.fetch_add(1, Ordering::Relaxed);
        self.touch();
        StreamGuard {
            session: self.clone(),
        }
    }

    /// Number of event streams currently subscribed.
    #[must_use]
    pub fn open_streams(&self) -> usize {
        self.inner.open_streams.load(Ordering::Relaxed)
    }

    /// Check if the session has been idle longer than `timeout` with no open
    /// event stream.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        self.open_streams() == 0 && self.idle_for() > timeout
    }
}

/// Keeps a page session alive while an event stream is open.
#[derive(Debug)]
pub struct StreamGuard {
    session: PageSession,
}

impl StreamGuard {
    /// Record activity, e.g. when a fragment is pushed.
    pub fn touch(&self) {
        self.session.touch();
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.session.inner.open_streams.fetch_sub(1, Ordering::Relaxed);
        self.session.touch();
    }
}

/// Parse a browser-reported offset in minutes east of UTC.
#[must_use]
pub fn viewer_offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

fn server_offset() -> FixedOffset {
    *Local::now().offset()
}

/// Thread-safe store for page sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    sessions: RwLock<HashMap<String, PageSession>>,
    chat: ChatConfig,
    upload: UploadConfig,
    sink: Arc<dyn UploadSink>,
}

impl SessionStore {
    /// Create an empty store. New sessions use these settings and upload sink.
    #[must_use]
    pub fn new(chat: ChatConfig, upload: UploadConfig, sink: Arc<dyn UploadSink>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                sessions: RwLock::new(HashMap::new()),
                chat,
                upload,
                sink,
            }),
        }
    }

    /// Create a new session and return it.
    ///
    /// Without a viewer offset, timestamps render in the server's local time.
    pub async fn create(&self, viewer_offset: Option<FixedOffset>) -> PageSession {
        let session = PageSession::new(
            Uuid::new_v4().to_string(),
            self.inner.chat.clone(),
            self.inner.upload.clone(),
            Arc::clone(&self.inner.sink),
            viewer_offset.unwrap_or_else(server_offset),
        );
        session.touch();

        let mut guard = self.inner.sessions.write().await;
        guard.insert(session.id().to_string(), session.clone());
        drop(guard);

        tracing::info!(name: "session.created", session_id = %session.id(), "Page session created");
        session
    }

    /// Get a session by ID and mark it active.
    pub async fn get(&self, id: &str) -> Option<PageSession> {
        let session = self.inner.sessions.read().await.get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        session
    }

    /// Remove a session by ID and dispose it.
    pub async fn remove(&self, id: &str) -> Option<PageSession> {
        let removed = self.inner.sessions.write().await.remove(id);
        if let Some(session) = &removed {
            session.dispose();
        }
        removed
    }

    /// Get the number of live sessions.
    pub async fn len(&self) -> usize {
        self.inner.sessions.read().await.len()
    }

    /// Check if there are no sessions.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove and dispose sessions idle longer than `timeout`.
    ///
    /// Returns the number of sessions removed.
    pub async fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.inner.sessions.write().await;
        let before = guard.len();
        guard.retain(|_, session| {
            let expired = session.is_expired_with_timeout(timeout);
            if expired {
                session.dispose();
            }
            !expired
        });
        before - guard.len()
    }

    /// Remove and dispose every session. Used on shutdown so open event
    /// streams end.
    pub async fn dispose_all(&self) -> usize {
        let drained: Vec<PageSession> = {
            let mut guard = self.inner.sessions.write().await;
            guard.drain().map(|(_, session)| session).collect()
        };
        for session in &drained {
            session.dispose();
        }
        drained.len()
    }

    /// Periodically expire idle sessions until the store is dropped.
    pub fn spawn_sweeper(&self, every: Duration, idle_timeout: Duration) -> JoinHandle<()> {
        let store: Weak<StoreInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let Some(inner) = store.upgrade() else {
                    break;
                };
                let removed = SessionStore { inner }
                    .cleanup_expired_with_timeout(idle_timeout)
                    .await;
                if removed > 0 {
                    tracing::info!(name: "session.expired", removed, "Expired idle page sessions");
                }
            }
        })
    }
}
