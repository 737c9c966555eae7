//! Page model: one panel per catalog query plus the overall load status.

use serde::Serialize;

use crate::catalog::QueryId;
use crate::chart::{Chart, ChartKind};
use crate::error::CoreError;
use crate::filter::DateRange;
use crate::insight;

/// Page heading.
pub const PAGE_TITLE: &str = "Automotive Data Analytics Dashboard";

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Outcome of one panel's query and rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    /// The chart has data to draw.
    Ready,
    /// The query returned zero rows.
    Empty,
    /// The query or its rendering failed.
    Failed { message: String },
    /// Not run because an earlier query aborted the load.
    Skipped,
}

/// SQL text and bound values shown in the raw-query inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDetails {
    pub sql: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub query: QueryId,
    pub title: &'static str,
    pub chart_kind: ChartKind,
    #[serde(flatten)]
    pub state: PanelState,
    pub chart: Option<Chart>,
    pub insight: Option<String>,
    pub details: Option<QueryDetails>,
}

impl Panel {
    fn base(query: QueryId, state: PanelState) -> Self {
        Self {
            query,
            title: query.title(),
            chart_kind: query.chart_kind(),
            state,
            chart: None,
            insight: None,
            details: None,
        }
    }

    /// A panel built from a rendered chart. Empty charts get the empty state
    /// and no insight.
    pub fn from_chart(query: QueryId, chart: Chart) -> Self {
        if chart.is_empty() {
            return Self {
                chart: Some(chart),
                ..Self::base(query, PanelState::Empty)
            };
        }
        Self {
            insight: insight::for_chart(query, &chart),
            chart: Some(chart),
            ..Self::base(query, PanelState::Ready)
        }
    }

    /// A panel whose query or rendering failed.
    pub fn failed(query: QueryId, error: &CoreError) -> Self {
        Self::base(
            query,
            PanelState::Failed {
                message: error.to_string(),
            },
        )
    }

    pub fn skipped(query: QueryId) -> Self {
        Self::base(query, PanelState::Skipped)
    }

    pub fn with_details(mut self, details: QueryDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, PanelState::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Terminal status of a page load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// Every query ran; empty results still count as success.
    Success,
    /// Some queries failed; the others rendered.
    Partial { failed: Vec<QueryId> },
    /// A query timed out and the remaining queries were not run.
    Aborted { query: QueryId, message: String },
}

impl LoadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Banner text shown at the bottom of the page.
    pub fn message(&self) -> String {
        match self {
            Self::Success => "Dashboard loaded successfully!".to_string(),
            Self::Partial { failed } => {
                let names: Vec<&str> = failed.iter().map(|q| q.slug()).collect();
                format!(
                    "Dashboard loaded with errors in {} chart(s): {}",
                    failed.len(),
                    names.join(", ")
                )
            }
            Self::Aborted { message, .. } => {
                format!("Dashboard load aborted: {message}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub title: &'static str,
    pub range: DateRange,
    pub panels: Vec<Panel>,
    #[serde(flatten)]
    pub status: LoadStatus,
}

impl DashboardPage {
    /// Assemble a page, deriving the status from the panels unless a load
    /// was aborted.
    pub fn new(
        range: DateRange,
        panels: Vec<Panel>,
        aborted: Option<(QueryId, &CoreError)>,
    ) -> Self {
        let status = match aborted {
            Some((query, err)) => LoadStatus::Aborted {
                query,
                message: err.to_string(),
            },
            None => {
                let failed: Vec<QueryId> = panels
                    .iter()
                    .filter(|p| p.is_failed())
                    .map(|p| p.query)
                    .collect();
                if failed.is_empty() {
                    LoadStatus::Success
                } else {
                    LoadStatus::Partial { failed }
                }
            }
        };

        Self {
            title: PAGE_TITLE,
            range,
            panels,
            status,
        }
    }
}
