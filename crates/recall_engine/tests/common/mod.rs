#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Once};

use recall_core::{IndexReceipt, Msg, PageRecord, RetrieveResponse, TabId};
use recall_engine::{
    CoordinatorHandle, FailureKind, HostError, PageIndex, ServiceError, TabHost,
};
use tokio::sync::{mpsc, Notify};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(recall_logging::initialize_for_tests);
}

/// Waits until every command posted before this call has been handled.
pub async fn settle(handle: &CoordinatorHandle) -> RetrieveResponse {
    handle.retrieve("__settle__").await
}

pub struct FakeIndex {
    indexed_tx: mpsc::UnboundedSender<(String, String)>,
    results: Mutex<Result<Vec<PageRecord>, ServiceError>>,
    queries: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

impl FakeIndex {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(String, String)>) {
        let (indexed_tx, indexed_rx) = mpsc::unbounded_channel();
        let index = Arc::new(Self {
            indexed_tx,
            results: Mutex::new(Ok(Vec::new())),
            queries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        });
        (index, indexed_rx)
    }

    pub fn set_results(&self, results: Vec<PageRecord>) {
        *self.results.lock().unwrap() = Ok(results);
    }

    pub fn fail_with(&self, kind: FailureKind) {
        *self.results.lock().unwrap() = Err(ServiceError {
            kind,
            message: "simulated".to_string(),
        });
    }

    /// Queries seen so far, without the ones `settle` issues.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|query| query.as_str() != "__settle__")
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl PageIndex for FakeIndex {
    async fn index_page(&self, url: &str, text: &str) -> Result<IndexReceipt, ServiceError> {
        let _ = self.indexed_tx.send((url.to_string(), text.to_string()));
        Ok(IndexReceipt {
            status: Some("success".to_string()),
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
        })
    }

    async fn retrieve(&self, query: &str) -> Result<Vec<PageRecord>, ServiceError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.results.lock().unwrap().clone()
    }

    async fn report(&self, _id: u64) -> Result<PageRecord, ServiceError> {
        Err(ServiceError {
            kind: FailureKind::HttpStatus(404),
            message: "Page not found".to_string(),
        })
    }
}

/// Tab host that hands out sequential tab ids starting at 1.
pub struct FakeBrowser {
    next_tab: AtomicU64,
    fail_next: AtomicBool,
    opened_tx: mpsc::UnboundedSender<(TabId, String)>,
    delivered: Mutex<Vec<(TabId, Msg)>>,
    delivery: Notify,
    inboxes: Mutex<HashMap<TabId, mpsc::UnboundedSender<Msg>>>,
}

impl FakeBrowser {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(TabId, String)>) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        let browser = Arc::new(Self {
            next_tab: AtomicU64::new(1),
            fail_next: AtomicBool::new(false),
            opened_tx,
            delivered: Mutex::new(Vec::new()),
            delivery: Notify::new(),
            inboxes: Mutex::new(HashMap::new()),
        });
        (browser, opened_rx)
    }

    pub fn fail_next_creation(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Routes later messages for `tab` to a page context.
    pub fn attach(&self, tab: TabId, inbox: mpsc::UnboundedSender<Msg>) {
        self.inboxes.lock().unwrap().insert(tab, inbox);
    }

    pub fn delivered(&self) -> Vec<(TabId, Msg)> {
        self.delivered.lock().unwrap().clone()
    }

    /// Waits until at least `count` messages were handed to tabs.
    pub async fn wait_delivered(&self, count: usize) -> Vec<(TabId, Msg)> {
        loop {
            let notified = self.delivery.notified();
            let delivered = self.delivered();
            if delivered.len() >= count {
                return delivered;
            }
            notified.await;
        }
    }
}

#[async_trait::async_trait]
impl TabHost for FakeBrowser {
    async fn create_tab(&self, url: &str) -> Result<TabId, HostError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(HostError::TabCreation {
                url: url.to_string(),
                message: "simulated".to_string(),
            });
        }
        let tab = self.next_tab.fetch_add(1, Ordering::SeqCst);
        let _ = self.opened_tx.send((tab, url.to_string()));
        Ok(tab)
    }

    async fn send_to_tab(&self, tab: TabId, msg: Msg) -> Result<(), HostError> {
        self.delivered.lock().unwrap().push((tab, msg.clone()));
        self.delivery.notify_waiters();
        if let Some(inbox) = self.inboxes.lock().unwrap().get(&tab) {
            inbox.send(msg).map_err(|_| HostError::TabClosed(tab))?;
        }
        Ok(())
    }
}

/// Tab host whose calls never complete once stalled.
pub struct StalledBrowser {
    stall_creation: bool,
    created: AtomicBool,
}

impl StalledBrowser {
    /// `create_tab` never returns.
    pub fn hung_creation() -> Arc<Self> {
        Arc::new(Self {
            stall_creation: true,
            created: AtomicBool::new(false),
        })
    }

    /// `create_tab` returns tab 1 at once; `send_to_tab` never returns.
    pub fn hung_delivery() -> Arc<Self> {
        Arc::new(Self {
            stall_creation: false,
            created: AtomicBool::new(false),
        })
    }

    pub fn created(&self) -> bool {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TabHost for StalledBrowser {
    async fn create_tab(&self, _url: &str) -> Result<TabId, HostError> {
        if self.stall_creation {
            std::future::pending::<()>().await;
        }
        self.created.store(true, Ordering::SeqCst);
        Ok(1)
    }

    async fn send_to_tab(&self, _tab: TabId, _msg: Msg) -> Result<(), HostError> {
        std::future::pending().await
    }
}
