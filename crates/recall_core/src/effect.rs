use crate::TabId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the one-shot `highlight` message to a freshly loaded tab.
    DeliverHighlight { tab: TabId, query: String },
}
