//! Deferred user-facing notices, queued on the session and drained at the
//! next page render. Notices pushed before a redirect survive it.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

const SESSION_KEY: &str = "notices";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// CSS modifier used by the page template.
    pub fn level_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
        }
    }
}

/// Queue a notice for the next render of this session. Session failures are
/// logged and the notice dropped; they never fail the request.
pub async fn push(session: &Session, notice: Notice) {
    let mut queued: Vec<Notice> = session
        .get(SESSION_KEY)
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(notice);
    if let Err(e) = session.insert(SESSION_KEY, queued).await {
        tracing::warn!("Failed to queue notice: {}", e);
    }
}

/// Drain every queued notice.
pub async fn take(session: &Session) -> Vec<Notice> {
    match session.remove::<Vec<Notice>>(SESSION_KEY).await {
        Ok(queued) => queued.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read notices: {}", e);
            Vec::new()
        }
    }
}
