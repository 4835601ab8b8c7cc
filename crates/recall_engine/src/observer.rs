use std::sync::Arc;
use std::time::Duration;

use recall_core::{HighlightScope, Highlighter, Msg};
use recall_logging::{recall_debug, recall_trace};
use tokio::sync::mpsc;

use crate::CoordinatorHandle;

/// Document readiness as the page reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// The live document an observer is attached to.
#[async_trait::async_trait]
pub trait PageDocument: Send + Sync {
    fn url(&self) -> String;

    fn ready_state(&self) -> ReadyState;

    /// Resolves once the document has left [`ReadyState::Loading`].
    async fn wait_until_loaded(&self);

    /// The text a reader sees, used for indexing.
    fn rendered_text(&self) -> String;

    /// Inner markup of `<body>`, the part highlighting rewrites. Documents
    /// without a body element expose their whole markup.
    fn body_markup(&self) -> String;

    fn replace_body_markup(&self, markup: String);
}

#[derive(Debug, Clone)]
pub struct ObserverSettings {
    /// Pause after the load signal before reading text, for pages that keep
    /// rendering right after it.
    pub settle_delay: Duration,
    pub scope: HighlightScope,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(1000),
            scope: HighlightScope::Markup,
        }
    }
}

/// Page-embedded context: submits the page for indexing once and applies
/// highlight instructions for as long as the page lives.
pub struct PageObserver<D> {
    document: Arc<D>,
    coordinator: CoordinatorHandle,
    settings: ObserverSettings,
}

impl<D: PageDocument> PageObserver<D> {
    pub fn new(document: Arc<D>, coordinator: CoordinatorHandle, settings: ObserverSettings) -> Self {
        Self {
            document,
            coordinator,
            settings,
        }
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    /// Sends the single `pageContent` submission for this page view.
    pub async fn submit_when_ready(&self) {
        if self.document.ready_state() == ReadyState::Loading {
            self.document.wait_until_loaded().await;
        }
        tokio::time::sleep(self.settings.settle_delay).await;

        let url = self.document.url();
        let text = self.document.rendered_text();
        recall_debug!("submitting {} ({} chars) for indexing", url, text.len());
        self.coordinator.post(Msg::PageContent { url, text });
    }

    /// Handles one message addressed to this page. Returns the number of
    /// highlighted matches.
    pub fn on_message(&self, msg: Msg) -> usize {
        match msg {
            Msg::Highlight { query } => self.highlight(&query),
            other => {
                recall_trace!("page ignoring {}", other.action());
                0
            }
        }
    }

    fn highlight(&self, query: &str) -> usize {
        let Some(highlighter) = Highlighter::new(query) else {
            return 0;
        };
        let highlighted = highlighter.apply(&self.document.body_markup(), self.settings.scope);
        if highlighted.matches > 0 {
            self.document.replace_body_markup(highlighted.content);
        }
        recall_debug!(
            "highlighted {} match(es) of {:?} on {}",
            highlighted.matches,
            query,
            self.document.url()
        );
        highlighted.matches
    }

    /// Runs the submission and the highlight listener until `inbox` closes.
    pub async fn run(self, mut inbox: mpsc::UnboundedReceiver<Msg>) {
        let submit = self.submit_when_ready();
        tokio::pin!(submit);
        let mut submitted = false;

        loop {
            tokio::select! {
                _ = &mut submit, if !submitted => submitted = true,
                msg = inbox.recv() => match msg {
                    Some(msg) => {
                        self.on_message(msg);
                    }
                    None => break,
                },
            }
        }
    }
}
