//! Server-rendered HTML view of a [`DashboardPage`].

use askama::Template;
use autodash_core::dashboard::{DashboardPage, LoadStatus, Panel, PanelState, PAGE_TITLE};
use autodash_core::error::CoreError;
use autodash_core::filter::default_start;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::query::DateRangeParams;

/// Footer credit line.
pub const FOOTER: &str = "Dashboard created by the Automotive Analytics Team";

const EMPTY_MESSAGE: &str = "No data available for this chart.";
const SKIPPED_MESSAGE: &str = "Not run because an earlier query aborted the dashboard load.";

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: &'static str,
    pub footer: &'static str,
    /// Values echoed back into the sidebar form.
    pub start_date: String,
    pub end_date: String,
    /// Sidebar validation message; set when the filter was rejected.
    pub filter_error: Option<String>,
    pub status: Option<StatusView>,
    pub panels: Vec<PanelView>,
}

pub struct StatusView {
    /// CSS modifier: `success`, `warning` or `error`.
    pub level: &'static str,
    pub message: String,
}

pub struct PanelView {
    pub slug: &'static str,
    pub title: &'static str,
    /// `ready`, `empty`, `failed` or `skipped`.
    pub state: &'static str,
    /// Placeholder text for panels without a chart.
    pub message: Option<String>,
    pub insight: Option<String>,
    /// Chart specification, already escaped for a `<script>` block.
    pub chart_json: Option<String>,
    pub details: Option<DetailsView>,
}

pub struct DetailsView {
    pub sql: String,
    pub params: Vec<String>,
}

impl DashboardTemplate {
    pub fn from_page(page: &DashboardPage) -> AppResult<Self> {
        let panels = page
            .panels
            .iter()
            .map(PanelView::from_panel)
            .collect::<AppResult<Vec<_>>>()?;

        let level = match page.status {
            LoadStatus::Success => "success",
            LoadStatus::Partial { .. } => "warning",
            LoadStatus::Aborted { .. } => "error",
        };

        Ok(Self {
            title: page.title,
            footer: FOOTER,
            start_date: page.range.start().to_string(),
            end_date: page.range.end().to_string(),
            filter_error: None,
            status: Some(StatusView {
                level,
                message: page.status.message(),
            }),
            panels,
        })
    }

    /// The form alone, re-prompting after a rejected date range.
    pub fn invalid_filter(params: &DateRangeParams, error: &CoreError) -> Self {
        Self {
            filter_error: Some(error.to_string()),
            ..Self::form_only(params)
        }
    }

    /// The form and an error banner; no panels could be loaded.
    pub fn connection_failed(params: &DateRangeParams, today: NaiveDate) -> Self {
        let mut view = Self::form_only(params);
        if view.end_date.is_empty() {
            view.end_date = today.to_string();
        }
        view.status = Some(StatusView {
            level: "error",
            message: "Could not connect to the database. Check the connection settings and try again."
                .to_string(),
        });
        view
    }

    fn form_only(params: &DateRangeParams) -> Self {
        let start_date = params
            .start_date
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_start().to_string());
        Self {
            title: PAGE_TITLE,
            footer: FOOTER,
            start_date,
            end_date: params.end_date.clone().unwrap_or_default(),
            filter_error: None,
            status: None,
            panels: Vec::new(),
        }
    }

    pub fn render_html(&self) -> AppResult<String> {
        self.render()
            .map_err(|e| AppError::Core(CoreError::Internal(format!("Template rendering failed: {e}"))))
    }
}

impl PanelView {
    fn from_panel(panel: &Panel) -> AppResult<Self> {
        let (state, message) = match &panel.state {
            PanelState::Ready => ("ready", None),
            PanelState::Empty => ("empty", Some(EMPTY_MESSAGE.to_string())),
            PanelState::Failed { message } => ("failed", Some(message.clone())),
            PanelState::Skipped => ("skipped", Some(SKIPPED_MESSAGE.to_string())),
        };

        let chart_json = match (&panel.state, &panel.chart) {
            (PanelState::Ready, Some(chart)) => {
                let json = serde_json::to_string(chart).map_err(|e| {
                    AppError::Core(CoreError::Internal(format!(
                        "Failed to serialize chart '{}': {e}",
                        panel.query
                    )))
                })?;
                Some(escape_script_json(&json))
            }
            _ => None,
        };

        Ok(Self {
            slug: panel.query.slug(),
            title: panel.title,
            state,
            message,
            insight: panel.insight.clone(),
            chart_json,
            details: panel.details.as_ref().map(|d| DetailsView {
                sql: d.sql.clone(),
                params: d.params.clone(),
            }),
        })
    }
}

/// Make JSON safe to embed in an HTML `<script>` element.
///
/// Replaces the characters that could close the element or open a comment
/// with their `\u` escapes, which JSON parsers read back unchanged.
pub fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
