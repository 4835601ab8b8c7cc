use recall_core::{Msg, PageRecord, Query, ResultsView};
use recall_logging::recall_debug;

use crate::CoordinatorHandle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("Please enter a search query.")]
    EmptyQuery,
    #[error("no result at index {index} ({available} shown)")]
    NoSuchResult { index: usize, available: usize },
}

/// User-facing query context: one search at a time, then a selection.
pub struct QuerySurface {
    coordinator: CoordinatorHandle,
    query: Option<Query>,
    results: Vec<PageRecord>,
    view: ResultsView,
}

impl QuerySurface {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self {
            coordinator,
            query: None,
            results: Vec::new(),
            view: ResultsView::NoMatches,
        }
    }

    /// Retrieves pages for `raw` and renders them. A blank query sends nothing.
    pub async fn search(&mut self, raw: &str) -> Result<&ResultsView, SurfaceError> {
        let query = Query::parse(raw).ok_or(SurfaceError::EmptyQuery)?;
        let response = self.coordinator.retrieve(query.as_str()).await;
        recall_debug!("{} result(s) shown for {:?}", response.results.len(), query.as_str());

        self.view = ResultsView::from_records(&response.results);
        self.results = response.results;
        self.query = Some(query);
        Ok(&self.view)
    }

    /// Opens the selected result and asks for the current query to be highlighted there.
    pub fn select(&self, index: usize) -> Result<(), SurfaceError> {
        let no_such_result = SurfaceError::NoSuchResult {
            index,
            available: self.results.len(),
        };
        let query = self.query.as_ref().ok_or(no_such_result.clone())?;
        let result = self.results.get(index).cloned().ok_or(no_such_result)?;
        self.coordinator.post(Msg::OpenAndHighlight {
            result,
            query: query.to_string(),
        });
        Ok(())
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    pub fn results(&self) -> &[PageRecord] {
        &self.results
    }
}
