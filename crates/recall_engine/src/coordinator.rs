use std::sync::Arc;
use std::time::{Duration, Instant};

use recall_core::{Effect, Msg, OpenStage, PageRecord, PendingOpens, RetrieveResponse, TabId};
use recall_logging::{recall_debug, recall_error, recall_info, recall_warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};

use crate::{PageIndex, TabEvent, TabHost};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Open-and-highlight requests whose tab has not finished loading after
    /// this long are dropped. `None` keeps them until the tab closes.
    pub pending_ttl: Option<Duration>,
    /// How often expired requests are looked for. Clamped to at least 1 ms;
    /// unused without a `pending_ttl`.
    pub sweep_interval: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            pending_ttl: Some(Duration::from_secs(300)),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

enum Command {
    Deliver {
        msg: Msg,
        reply: Option<oneshot::Sender<RetrieveResponse>>,
    },
    Tab(TabEvent),
    TabCreated {
        tab: TabId,
        url: String,
        query: String,
    },
}

/// Sending side of the coordinator's bus. Cheap to clone; the coordinator
/// stops once every handle is dropped.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl CoordinatorHandle {
    /// Fire-and-forget delivery. Any reply the message would produce is dropped.
    pub fn post(&self, msg: Msg) {
        if self
            .cmd_tx
            .send(Command::Deliver { msg, reply: None })
            .is_err()
        {
            recall_warn!("coordinator is gone; message dropped");
        }
    }

    /// Delivers `msg`, holding the reply channel open when the action has one.
    ///
    /// Resolves to `Some` only for `retrieve`. Retrieval never fails: every
    /// failure, including a stopped coordinator, resolves to empty results.
    pub async fn dispatch(&self, msg: Msg) -> Option<RetrieveResponse> {
        if !msg.expects_reply() {
            self.post(msg);
            return None;
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        let command = Command::Deliver {
            msg,
            reply: Some(reply_tx),
        };
        if self.cmd_tx.send(command).is_err() {
            recall_warn!("coordinator is gone; answering with no results");
            return Some(RetrieveResponse::empty());
        }
        Some(reply_rx.await.unwrap_or_default())
    }

    /// Transport adapter for JSON-encoded messages. Undecodable input is ignored.
    pub async fn post_raw(&self, raw: &str) -> Option<RetrieveResponse> {
        match Msg::decode(raw) {
            Ok(msg) => self.dispatch(msg).await,
            Err(err) => {
                recall_debug!("ignoring message: {}", err);
                None
            }
        }
    }

    pub async fn retrieve(&self, query: &str) -> RetrieveResponse {
        self.dispatch(Msg::Retrieve {
            query: query.to_owned(),
        })
        .await
        .unwrap_or_default()
    }

    /// Feeds the shared load-status subscription.
    pub fn tab_event(&self, event: TabEvent) {
        if self.cmd_tx.send(Command::Tab(event)).is_err() {
            recall_warn!("coordinator is gone; {:?} dropped", event);
        }
    }
}

/// The long-lived router between observers, query surfaces and the service.
pub struct Coordinator {
    index: Arc<dyn PageIndex>,
    host: Arc<dyn TabHost>,
    settings: CoordinatorSettings,
    pending: PendingOpens,
    // Weak so that dropping every handle still stops the coordinator.
    feedback: mpsc::WeakUnboundedSender<Command>,
}

impl Coordinator {
    /// Spawns the coordinator on the current tokio runtime.
    pub fn spawn(
        index: Arc<dyn PageIndex>,
        host: Arc<dyn TabHost>,
        settings: CoordinatorSettings,
    ) -> CoordinatorHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            index,
            host,
            settings,
            pending: PendingOpens::new(),
            feedback: cmd_tx.downgrade(),
        };
        tokio::spawn(coordinator.run(cmd_rx));
        CoordinatorHandle { cmd_tx }
    }

    async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<Command>) {
        recall_info!("coordinator started");
        let period = self.settings.sweep_interval.max(MIN_SWEEP_INTERVAL);
        let mut sweep = self.settings.pending_ttl.map(|_| {
            let mut sweep = tokio::time::interval(period);
            sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
            sweep
        });

        loop {
            tokio::select! {
                command = cmd_rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = next_sweep(&mut sweep) => self.sweep(),
            }
        }
        recall_info!(
            "coordinator stopped with {} open request(s) pending",
            self.pending.len()
        );
    }

    // Must not await. Calls into the service or the tab host run in their own tasks.
    fn handle(&mut self, command: Command) {
        match command {
            Command::Deliver { msg, reply } => self.route(msg, reply),
            Command::Tab(event) => self.on_tab_event(event),
            Command::TabCreated { tab, url, query } => self.tab_created(tab, url, query),
        }
    }

    fn route(&mut self, msg: Msg, reply: Option<oneshot::Sender<RetrieveResponse>>) {
        match msg {
            Msg::PageContent { url, text } => self.index_page(url, text),
            Msg::Retrieve { query } => self.retrieve(query, reply),
            Msg::OpenAndHighlight { result, query } => self.open_and_highlight(result, query),
            Msg::Highlight { .. } => {
                recall_debug!("ignoring highlight addressed to the coordinator");
            }
        }
    }

    fn index_page(&self, url: String, text: String) {
        let index = Arc::clone(&self.index);
        tokio::spawn(async move {
            match index.index_page(&url, &text).await {
                Ok(receipt) => recall_info!("Indexed page {} with id {}", url, receipt.id),
                Err(err) => recall_error!("Error indexing page {}: {}", url, err),
            }
        });
    }

    fn retrieve(&self, query: String, reply: Option<oneshot::Sender<RetrieveResponse>>) {
        let index = Arc::clone(&self.index);
        tokio::spawn(async move {
            let response = match index.retrieve(&query).await {
                Ok(results) => {
                    recall_debug!("{} result(s) for {:?}", results.len(), query);
                    RetrieveResponse::new(results)
                }
                Err(err) => {
                    recall_error!("Error retrieving pages for {:?}: {}", query, err);
                    RetrieveResponse::empty()
                }
            };
            if let Some(reply) = reply {
                // The requester may have gone away; nothing to do then.
                let _ = reply.send(response);
            }
        });
    }

    /// Creates the tab off the router. The id comes back as a command on the
    /// same channel, so load events the host reports after `create_tab`
    /// returns are handled once the request is waiting for them.
    fn open_and_highlight(&self, result: PageRecord, query: String) {
        recall_debug!("open {:?}: {}", OpenStage::Requested, result.url);
        let host = Arc::clone(&self.host);
        let feedback = self.feedback.clone();
        tokio::spawn(async move {
            let url = result.url;
            let tab = match host.create_tab(&url).await {
                Ok(tab) => tab,
                Err(err) => {
                    recall_error!("Error opening {}: {}", url, err);
                    return;
                }
            };
            let Some(feedback) = feedback.upgrade() else {
                recall_debug!("coordinator gone before tab {} for {} was tracked", tab, url);
                return;
            };
            let _ = feedback.send(Command::TabCreated { tab, url, query });
        });
    }

    fn tab_created(&mut self, tab: TabId, url: String, query: String) {
        if let Some(previous) = self.pending.tab_created(tab, url, query, now()) {
            recall_warn!("tab {} reused; dropping request for {}", tab, previous.url);
        }
        recall_debug!("open {:?}: tab {}", OpenStage::TabCreated, tab);
        self.pending.await_load(tab);
        recall_debug!("open {:?}: tab {}", OpenStage::AwaitingLoad, tab);
    }

    fn on_tab_event(&mut self, event: TabEvent) {
        match event {
            TabEvent::Updated { tab, status } => {
                if let Some(effect) = self.pending.tab_updated(tab, status) {
                    self.run_effect(effect);
                }
            }
            TabEvent::Removed { tab } => {
                if let Some(dropped) = self.pending.tab_removed(tab) {
                    recall_debug!("tab {} closed before loading {}", tab, dropped.url);
                }
            }
        }
    }

    /// The entry is already gone from the table, so delivery needs no
    /// coordinator state and runs detached.
    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::DeliverHighlight { tab, query } => {
                let host = Arc::clone(&self.host);
                tokio::spawn(async move {
                    match host.send_to_tab(tab, Msg::Highlight { query }).await {
                        Ok(()) => recall_debug!("open {:?}: tab {}", OpenStage::Delivered, tab),
                        Err(err) => recall_warn!("highlight for tab {} not delivered: {}", tab, err),
                    }
                });
            }
        }
    }

    fn sweep(&mut self) {
        let Some(ttl) = self.settings.pending_ttl else {
            return;
        };
        for tab in self.pending.expire(now(), ttl) {
            recall_warn!("tab {} did not finish loading within {:?}; highlight dropped", tab, ttl);
        }
    }
}

async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(sweep) => {
            sweep.tick().await;
        }
        None => std::future::pending().await,
    }
}

// Follows tokio's clock so paused test time drives expiry as well.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
