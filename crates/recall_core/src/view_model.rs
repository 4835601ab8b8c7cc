use crate::PageRecord;

pub const NO_MATCHES_TEXT: &str = "No matching pages found.";
pub const EMPTY_QUERY_PROMPT: &str = "Please enter a search query.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub index: usize,
    pub label: String,
}

/// What the query surface shows after a retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResultsView {
    #[default]
    NoMatches,
    Matches(Vec<ResultRow>),
}

impl ResultsView {
    pub fn from_records(records: &[PageRecord]) -> Self {
        if records.is_empty() {
            return Self::NoMatches;
        }
        Self::Matches(
            records
                .iter()
                .enumerate()
                .map(|(index, record)| ResultRow {
                    index,
                    label: record.url.clone(),
                })
                .collect(),
        )
    }

    pub fn rows(&self) -> &[ResultRow] {
        match self {
            Self::NoMatches => &[],
            Self::Matches(rows) => rows,
        }
    }

    /// One line per row, or the no-matches notice.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::NoMatches => vec![NO_MATCHES_TEXT.to_string()],
            Self::Matches(rows) => rows.iter().map(|row| row.label.clone()).collect(),
        }
    }
}
