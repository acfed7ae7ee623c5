// src/polling/registry.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

use crate::client::StatusSource;
use crate::config::PollConfig;
use crate::models::RequestId;
use crate::polling::session::{PollSession, PollSnapshot};

struct Entry {
    session: Arc<PollSession>,
    viewers: usize,
}

/// Shares one polling session per request id between all of its viewers.
pub struct PollRegistry {
    source: Arc<dyn StatusSource>,
    config: PollConfig,
    sessions: Mutex<HashMap<RequestId, Entry>>,
}

impl PollRegistry {
    pub fn new(source: Arc<dyn StatusSource>, config: PollConfig) -> Arc<Self> {
        Arc::new(Self {
            source,
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Joins the session for `request_id`, starting one if none is live.
    ///
    /// A session that already stopped is replaced, so reopening a result
    /// view always checks again.
    pub fn attach(self: &Arc<Self>, request_id: RequestId) -> PollHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = sessions
            .get_mut(&request_id)
            .filter(|entry| !entry.session.is_stopped())
            .map(|entry| {
                entry.viewers += 1;
                log::debug!("Viewer joined {} ({} watching)", request_id, entry.viewers);
                entry.session.clone()
            });

        let session = match existing {
            Some(session) => session,
            None => {
                let session = Arc::new(PollSession::start(
                    self.source.clone(),
                    request_id.clone(),
                    self.config.clone(),
                ));
                if let Some(old) = sessions.insert(
                    request_id.clone(),
                    Entry {
                        session: session.clone(),
                        viewers: 1,
                    },
                ) {
                    // stopped session: drop it from the map, remaining viewers keep their handle
                    old.session.stop();
                }
                session
            }
        };

        PollHandle {
            registry: self.clone(),
            request_id,
            session,
        }
    }

    fn detach(&self, request_id: &RequestId, session: &Arc<PollSession>) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = sessions.get_mut(request_id) else {
            return;
        };
        if !Arc::ptr_eq(&entry.session, session) {
            // handle belongs to a session that was already replaced
            return;
        }

        entry.viewers = entry.viewers.saturating_sub(1);
        if entry.viewers == 0 {
            if let Some(entry) = sessions.remove(request_id) {
                entry.session.stop();
            }
        }
    }

    /// Number of request ids currently tracked.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn viewers(&self, request_id: &RequestId) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_id)
            .map_or(0, |entry| entry.viewers)
    }

    /// Snapshot receivers still open on the session for `request_id`.
    pub fn subscribers(&self, request_id: &RequestId) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(request_id)
            .map_or(0, |entry| entry.session.subscribers())
    }
}

/// One viewer's attachment to a polling session. Dropping it detaches.
pub struct PollHandle {
    registry: Arc<PollRegistry>,
    request_id: RequestId,
    session: Arc<PollSession>,
}

impl PollHandle {
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn snapshot(&self) -> PollSnapshot {
        self.session.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.session.subscribe()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.registry.detach(&self.request_id, &self.session);
    }
}
