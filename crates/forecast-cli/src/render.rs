//! Terminal rendering of a projected view

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use forecast_core::interface::{ForecastTable, MetadataPanel, StatusBanner, View};

use crate::cli::OutputFormat;

pub fn render(view: &View, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_text(view)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(view)?),
    }
}

/// Sections in page order: status, company, price, table, charts.
pub fn render_text(view: &View) -> String {
    let mut sections = Vec::new();

    if let Some(status) = &view.status {
        sections.push(match status {
            StatusBanner::Error(message) => format!("Error: {message}"),
            StatusBanner::Loading => status.text().to_string(),
        });
    }
    if let Some(panel) = &view.metadata_panel {
        sections.push(render_panel(panel));
    }
    if let Some(notice) = &view.metadata_notice {
        sections.push(notice.clone());
    }
    if let Some(price) = &view.price_banner {
        sections.push(price.clone());
    }
    if let Some(table) = &view.table {
        sections.push(render_table(table));
    }
    if !view.images.is_empty() {
        let lines: Vec<String> = view
            .images
            .iter()
            .map(|image| format!("  {}\n    {}", image.title, image.src))
            .collect();
        sections.push(format!("Charts\n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

pub fn render_panel(panel: &MetadataPanel) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for (label, value) in &panel.rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }

    let mut out = panel.title.clone();
    if !panel.rows.is_empty() {
        out.push('\n');
        out.push_str(&table.to_string());
    }
    if let Some(about) = &panel.about {
        out.push_str("\n\n");
        out.push_str(about);
    }
    out
}

fn render_table(forecast: &ForecastTable) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(forecast.headers.iter().map(Cell::new));

    for row in &forecast.rows {
        let mut cells = vec![Cell::new(row.date.format("%Y-%m-%d"))];
        cells.extend(
            row.values
                .iter()
                .map(|value| Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)),
        );
        table.add_row(cells);
    }

    format!("{}\n{table}", forecast.title)
}
