use crate::page::document::{NodeId, Page};
use crate::page::markup::{ATTR_DOWNLOAD_ID, CLASS_HIDDEN};
use crate::page::Selector;
use crate::sync::format::PLACEHOLDER;
use crate::sync::locator::RowSlots;
use crate::sync::snapshot::DownloadSnapshot;

/// Format bytes into human-readable string (KB, MB, GB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Counter text as shown in the table: byte sizes when numeric, the raw text otherwise
fn format_counter(raw: &str) -> String {
    match raw.trim().parse::<u64>() {
        Ok(bytes) => format_bytes(bytes),
        Err(_) if raw.trim().is_empty() => PLACEHOLDER.to_string(),
        Err(_) => raw.to_string(),
    }
}

const HEADERS: [&str; 10] = [
    "ID", "STATUS", "PROGRESS", "SIZE", "SPEED", "MAX", "CREATED", "STARTED", "FINISHED", "RETRIES",
];

fn slot_text(page: &Page, slot: Option<NodeId>) -> String {
    slot.map(|el| page.text(el).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn row_cells(page: &Page, row: NodeId) -> Vec<String> {
    let slots = RowSlots::resolve(page, row);
    let id = page.attr(row, ATTR_DOWNLOAD_ID).unwrap_or_default().to_string();

    let progress = slots
        .bar
        .and_then(|bar| page.style_width(bar))
        .unwrap_or(PLACEHOLDER)
        .to_string();

    let size = format!(
        "{} / {}",
        slots.received.map(|el| format_counter(page.text(el))).unwrap_or_else(|| PLACEHOLDER.to_string()),
        slots.total.map(|el| format_counter(page.text(el))).unwrap_or_else(|| PLACEHOLDER.to_string()),
    );

    let mut status = slot_text(page, slots.badge);
    if let Some(form) = slots.delete_form {
        if !page.has_class(form, CLASS_HIDDEN) {
            status.push_str(" [x]");
        }
    }

    vec![
        id,
        status,
        progress,
        size,
        slot_text(page, slots.speed_current),
        slot_text(page, slots.speed_max),
        slot_text(page, slots.created_time),
        slot_text(page, slots.last_started),
        slot_text(page, slots.finished_time),
        slot_text(page, slots.retries),
    ]
}

/// Render the download rows of a page as a text table.
///
/// A `[x]` after the status marks rows whose delete action is offered.
pub fn format_listing(page: &Page) -> String {
    let rows: Vec<Vec<String>> = page
        .query_all(page.root(), &Selector::tag("tr").and_attr(ATTR_DOWNLOAD_ID))
        .into_iter()
        .map(|row| row_cells(page, row))
        .collect();

    if rows.is_empty() {
        return "No downloads.".to_string();
    }

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths[i].saturating_sub(cell.chars().count());
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render_line(HEADERS.to_vec())];
    for row in &rows {
        lines.push(render_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Tracks what was last printed so an unchanged page is not printed again
#[derive(Debug, Default)]
pub struct ListingRefresh {
    last_mutations: Option<u64>,
}

impl ListingRefresh {
    /// The formatted listing when the page changed since the previous call
    /// (always on the first call)
    pub fn changed(&mut self, page: &Page) -> Option<String> {
        let mutations = page.mutation_count();
        if self.last_mutations == Some(mutations) {
            return None;
        }
        self.last_mutations = Some(mutations);
        Some(format_listing(page))
    }
}

/// Format a fetched batch as pretty JSON
pub fn format_batch_json(batch: &[DownloadSnapshot]) -> String {
    serde_json::to_string_pretty(batch).unwrap_or_else(|_| "[]".to_string())
}
