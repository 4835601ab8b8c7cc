use std::fmt;

use recall_core::{LoadStatus, TabId};

/// Load-status notifications from the tab host, fed to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Updated { tab: TabId, status: LoadStatus },
    Removed { tab: TabId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: String,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "undecodable response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("could not open tab for {url}: {message}")]
    TabCreation { url: String, message: String },
    #[error("tab {0} is closed")]
    TabClosed(TabId),
    #[error("could not deliver to tab {tab}: {message}")]
    Delivery { tab: TabId, message: String },
}
