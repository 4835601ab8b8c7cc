use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::Effect;

pub type TabId = u64;

/// Load status reported by the tab host for one tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Unloaded,
    Loading,
    Complete,
}

/// Lifecycle of one open-and-highlight request.
///
/// `Requested` precedes the tab's existence and `Delivered` follows removal
/// from the table, so only the two middle stages are ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenStage {
    Requested,
    TabCreated,
    AwaitingLoad,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOpen {
    pub url: String,
    pub query: String,
    pub stage: OpenStage,
    pub since: Instant,
}

/// Table of open-and-highlight requests keyed by the tab they opened.
///
/// One shared load-status subscription feeds every event through
/// [`PendingOpens::tab_updated`]; an entry leaves the table the moment its
/// highlight is handed out, so a tab can never be highlighted twice.
#[derive(Debug, Clone, Default)]
pub struct PendingOpens {
    entries: BTreeMap<TabId, PendingOpen>,
}

impl PendingOpens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested -> TabCreated. Returns any entry previously held for `tab`.
    pub fn tab_created(
        &mut self,
        tab: TabId,
        url: impl Into<String>,
        query: impl Into<String>,
        now: Instant,
    ) -> Option<PendingOpen> {
        self.entries.insert(
            tab,
            PendingOpen {
                url: url.into(),
                query: query.into(),
                stage: OpenStage::TabCreated,
                since: now,
            },
        )
    }

    /// TabCreated -> AwaitingLoad. Returns false if `tab` is not in TabCreated.
    pub fn await_load(&mut self, tab: TabId) -> bool {
        match self.entries.get_mut(&tab) {
            Some(entry) if entry.stage == OpenStage::TabCreated => {
                entry.stage = OpenStage::AwaitingLoad;
                true
            }
            _ => false,
        }
    }

    /// AwaitingLoad -> Delivered on the first `complete` for `tab`.
    ///
    /// Events for other tabs, other statuses, or tabs not yet awaiting load
    /// leave the table untouched.
    pub fn tab_updated(&mut self, tab: TabId, status: LoadStatus) -> Option<Effect> {
        if status != LoadStatus::Complete {
            return None;
        }
        if self.stage(tab) != Some(OpenStage::AwaitingLoad) {
            return None;
        }
        self.entries
            .remove(&tab)
            .map(|entry| Effect::DeliverHighlight {
                tab,
                query: entry.query,
            })
    }

    /// Drops the request for a closed tab.
    pub fn tab_removed(&mut self, tab: TabId) -> Option<PendingOpen> {
        self.entries.remove(&tab)
    }

    /// Drops every request older than `ttl`, returning the affected tabs.
    pub fn expire(&mut self, now: Instant, ttl: Duration) -> Vec<TabId> {
        let expired: Vec<TabId> = self
            .entries
            .iter()
            .filter(|(_, entry)| now.saturating_duration_since(entry.since) >= ttl)
            .map(|(tab, _)| *tab)
            .collect();
        for tab in &expired {
            self.entries.remove(tab);
        }
        expired
    }

    pub fn stage(&self, tab: TabId) -> Option<OpenStage> {
        self.entries.get(&tab).map(|entry| entry.stage)
    }

    pub fn get(&self, tab: TabId) -> Option<&PendingOpen> {
        self.entries.get(&tab)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
