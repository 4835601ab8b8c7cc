//! Recall core: wire messages, highlighting and the open-and-highlight table.
mod effect;
mod highlight;
mod msg;
mod pending;
mod query;
mod record;
mod view_model;

pub use effect::Effect;
pub use highlight::{
    escape_literal, Highlighted, HighlightScope, Highlighter, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN,
};
pub use msg::{DecodeError, Msg, RetrieveResponse};
pub use pending::{LoadStatus, OpenStage, PendingOpen, PendingOpens, TabId};
pub use query::Query;
pub use record::{IndexReceipt, PageRecord};
pub use view_model::{ResultRow, ResultsView, EMPTY_QUERY_PROMPT, NO_MATCHES_TEXT};
