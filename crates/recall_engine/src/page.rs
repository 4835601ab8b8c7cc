use std::ops::Range;
use std::sync::Mutex;

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::watch;

use crate::{PageDocument, ReadyState};

/// In-memory page backed by an HTML string.
pub struct HtmlPage {
    url: String,
    markup: Mutex<String>,
    ready: watch::Sender<ReadyState>,
}

impl HtmlPage {
    /// A page whose content has not arrived yet.
    pub fn loading(url: impl Into<String>) -> Self {
        Self::with_state(url.into(), String::new(), ReadyState::Loading)
    }

    pub fn loaded(url: impl Into<String>, markup: impl Into<String>) -> Self {
        Self::with_state(url.into(), markup.into(), ReadyState::Complete)
    }

    fn with_state(url: String, markup: String, state: ReadyState) -> Self {
        let (ready, _) = watch::channel(state);
        Self {
            url,
            markup: Mutex::new(markup),
            ready,
        }
    }

    /// Installs the final markup and signals load completion.
    pub fn finish_loading(&self, markup: impl Into<String>) {
        *self.lock_markup() = markup.into();
        self.ready.send_replace(ReadyState::Complete);
    }

    /// The whole document, head included.
    pub fn markup(&self) -> String {
        self.lock_markup().clone()
    }

    fn lock_markup(&self) -> std::sync::MutexGuard<'_, String> {
        // A poisoned lock still holds a complete string.
        self.markup.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl PageDocument for HtmlPage {
    fn url(&self) -> String {
        self.url.clone()
    }

    fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    async fn wait_until_loaded(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| *state != ReadyState::Loading).await;
    }

    fn rendered_text(&self) -> String {
        visible_text(&self.lock_markup())
    }

    fn body_markup(&self) -> String {
        let markup = self.lock_markup();
        match body_range(&markup) {
            Some(range) => markup[range].to_string(),
            None => markup.clone(),
        }
    }

    fn replace_body_markup(&self, body: String) {
        let mut markup = self.lock_markup();
        match body_range(&markup) {
            Some(range) => markup.replace_range(range, &body),
            None => *markup = body,
        }
    }
}

/// Byte range between `<body ...>` and `</body>`. A missing close tag runs
/// the body to the end of the markup.
fn body_range(markup: &str) -> Option<Range<usize>> {
    // ASCII lowercasing keeps byte offsets valid for `markup`.
    let lower = markup.to_ascii_lowercase();
    let mut from = 0;
    let open = loop {
        let at = from + lower[from..].find("<body")?;
        let after = lower[at + "<body".len()..].chars().next();
        if after.is_some_and(|ch| ch == '>' || ch == '/' || ch.is_ascii_whitespace()) {
            break at;
        }
        from = at + "<body".len();
    };
    let start = open + lower[open..].find('>')? + 1;
    let end = lower[start..]
        .rfind("</body")
        .map_or(markup.len(), |idx| start + idx);
    Some(start..end)
}

/// Whitespace-collapsed text of `<body>`, skipping script and style contents.
fn visible_text(markup: &str) -> String {
    let doc = Html::parse_document(markup);
    let body_sel = Selector::parse("body").ok();
    let root = body_sel
        .as_ref()
        .and_then(|sel| doc.select(sel).next())
        .unwrap_or_else(|| doc.root_element());

    let mut words: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| matches!(parent.value().name(), "script" | "style" | "noscript"));
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::{body_range, visible_text};

    #[test]
    fn collects_body_text_only() {
        let html = "<html><head><title>T</title></head><body><h1>Hello</h1>\n<p>big   world</p></body></html>";
        assert_eq!(visible_text(html), "Hello big world");
    }

    #[test]
    fn skips_scripts_and_styles() {
        let html = "<body><script>var x = 1;</script><style>p{}</style><p>kept</p></body>";
        assert_eq!(visible_text(html), "kept");
    }

    #[test]
    fn fragment_without_body_still_yields_text() {
        assert_eq!(visible_text("<p>just a fragment</p>"), "just a fragment");
    }

    #[test]
    fn body_range_covers_inner_body_markup() {
        let html = r#"<html><head><title>t</title></head><BODY class="x"><p>hi</p></BODY></html>"#;
        let range = body_range(html).expect("has a body");
        assert_eq!(&html[range], "<p>hi</p>");
    }

    #[test]
    fn body_range_skips_lookalike_tags() {
        let html = "<bodyguard>no</bodyguard><body><p>yes</p>";
        let range = body_range(html).expect("has a body");
        assert_eq!(&html[range], "<p>yes</p>");
    }

    #[test]
    fn fragment_has_no_body_range() {
        assert_eq!(body_range("<p>just a fragment</p>"), None);
    }
}
