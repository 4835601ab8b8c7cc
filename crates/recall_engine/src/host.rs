use recall_core::{Msg, TabId};

use crate::HostError;

/// The browser side of the coordinator: opens tabs and messages page contexts.
///
/// Load progress for created tabs is reported separately through
/// [`crate::CoordinatorHandle::tab_event`].
#[async_trait::async_trait]
pub trait TabHost: Send + Sync {
    /// Starts loading `url` in a new tab and returns its id without waiting for the load.
    async fn create_tab(&self, url: &str) -> Result<TabId, HostError>;

    /// Delivers `msg` to the page context running in `tab`.
    async fn send_to_tab(&self, tab: TabId, msg: Msg) -> Result<(), HostError>;
}
