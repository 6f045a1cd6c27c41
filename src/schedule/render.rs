//! HTML and JSON rendering of the board.

use minijinja::{context, Environment};

use crate::error::RenderError;

use super::pipeline::DISPLAY_TIME_FORMAT;
use super::types::{DisplayEntry, Mode, TableRow};

const INDEX_TEMPLATE_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Convert board entries to serializable rows.
pub fn table_rows(entries: &[DisplayEntry]) -> Vec<TableRow> {
    entries
        .iter()
        .map(|e| TableRow {
            name: e.name.clone(),
            time: e.time.format(DISPLAY_TIME_FORMAT).to_string(),
            minutes_left: e.minutes_left,
            is_past: e.is_past,
        })
        .collect()
}

/// Renders the board page from a compiled template.
#[derive(Debug)]
pub struct BoardRenderer {
    env: Environment<'static>,
    title: String,
    refresh_seconds: u32,
}

impl BoardRenderer {
    /// Compile the built-in page template.
    pub fn new(title: impl Into<String>, refresh_seconds: u32) -> Result<Self, RenderError> {
        Self::with_template(INDEX_TEMPLATE, title, refresh_seconds)
    }

    /// Compile a custom page template.
    pub fn with_template(
        source: &'static str,
        title: impl Into<String>,
        refresh_seconds: u32,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(INDEX_TEMPLATE_NAME, source)?;

        Ok(Self {
            env,
            title: title.into(),
            refresh_seconds,
        })
    }

    /// Render the full page.
    pub fn render_page(
        &self,
        entries: &[DisplayEntry],
        mode: Mode,
        zone_label: &str,
    ) -> Result<String, RenderError> {
        let template = self.env.get_template(INDEX_TEMPLATE_NAME)?;
        let html = template.render(context! {
            title => &self.title,
            refresh_seconds => self.refresh_seconds,
            show_resp => mode.is_respawn(),
            zone => zone_label,
            rows => table_rows(entries),
        })?;
        Ok(html)
    }

    /// Render the rows as a JSON array.
    pub fn render_table(&self, entries: &[DisplayEntry]) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&table_rows(entries))?)
    }
}
