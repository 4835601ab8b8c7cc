//! Recall engine: the coordinator, page and query contexts, and the service client.
mod coordinator;
mod host;
mod observer;
mod page;
mod service;
mod surface;
mod types;

pub use coordinator::{Coordinator, CoordinatorHandle, CoordinatorSettings};
pub use host::TabHost;
pub use observer::{ObserverSettings, PageDocument, PageObserver, ReadyState};
pub use page::HtmlPage;
pub use service::{
    HttpPageIndex, PageIndex, ServiceSettings, BASE_URL_ENV, DEFAULT_BASE_URL,
};
pub use surface::{QuerySurface, SurfaceError};
pub use types::{FailureKind, HostError, ServiceError, TabEvent};
