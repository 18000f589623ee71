use super::format::{format_speed, DisplayOptions};
use super::locator::{RowIndex, RowSlots};
use super::progress::render_progress_bars;
use super::snapshot::{DownloadSnapshot, DownloadStatus};
use crate::page::document::Page;
use crate::page::markup::{ATTR_DATA_RECEIVED, ATTR_DATA_TOTAL, BADGE_DEFAULT, CLASS_HIDDEN};

/// Every class the badge can carry; only the one for the current status is kept
pub const BADGE_CLASSES: [&str; 4] = [
    "badge--running",
    "badge--paused",
    "badge--canceled",
    BADGE_DEFAULT,
];

/// Badge class for a status
pub fn badge_class(status: &DownloadStatus) -> &'static str {
    match status {
        DownloadStatus::Running => "badge--running",
        DownloadStatus::Paused => "badge--paused",
        DownloadStatus::Canceled => "badge--canceled",
        _ => BADGE_DEFAULT,
    }
}

/// Whether the delete action is offered for a status
pub fn delete_allowed(status: &DownloadStatus) -> bool {
    status.is_terminal()
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Snapshots applied to a row
    pub applied: usize,
    /// Snapshots with no matching row
    pub skipped: usize,
    /// Progress bars re-rendered at the end of the pass
    pub bars: usize,
}

/// Bring one row in line with its snapshot.
///
/// Each field is written only when its slot exists. Bar width is not touched
/// here; the batch pass re-renders all bars once at the end.
pub fn reconcile(page: &mut Page, slots: &RowSlots, snapshot: &DownloadSnapshot, display: &DisplayOptions) {
    let received = snapshot.received_bytes.to_string();
    let total = snapshot.total_bytes.to_string();

    if let Some(el) = slots.received {
        page.set_text(el, received.as_str());
    }
    if let Some(el) = slots.total {
        page.set_text(el, total.as_str());
    }

    if let Some(bar) = slots.bar {
        page.set_attr(bar, ATTR_DATA_RECEIVED, received);
        page.set_attr(bar, ATTR_DATA_TOTAL, total);
    }

    if let Some(badge) = slots.badge {
        page.set_text(badge, snapshot.status.as_str());
        let wanted = badge_class(&snapshot.status);
        for class in BADGE_CLASSES.iter().filter(|class| **class != wanted) {
            page.remove_class(badge, class);
        }
        page.add_class(badge, wanted);
    }

    if let Some(form) = slots.delete_form {
        page.toggle_class(form, CLASS_HIDDEN, !delete_allowed(&snapshot.status));
    }

    let text_slots = [
        (slots.speed_current, format_speed(snapshot.avg_speed_bps)),
        (slots.speed_max, format_speed(snapshot.max_speed_bps)),
        (slots.created_time, display.format_time(snapshot.created_at.as_deref())),
        (slots.last_started, display.format_time(snapshot.last_started_at.as_deref())),
        (slots.finished_time, display.format_time(snapshot.last_finished_at.as_deref())),
        (slots.retries, snapshot.retries_or_default().to_string()),
    ];
    for (slot, text) in text_slots {
        if let Some(el) = slot {
            page.set_text(el, text);
        }
    }
}

/// Reconcile a whole batch, then re-render every progress bar once.
///
/// Snapshots without a row are skipped without touching the page.
pub fn reconcile_batch(
    page: &mut Page,
    snapshots: &[DownloadSnapshot],
    display: &DisplayOptions,
) -> ReconcileReport {
    let index = RowIndex::build(page);
    let mut report = ReconcileReport::default();

    for snapshot in snapshots {
        let Some(row) = index.get(&snapshot.id) else {
            tracing::trace!("No row for download {}, skipping", snapshot.id);
            report.skipped += 1;
            continue;
        };
        let slots = RowSlots::resolve(page, row);
        reconcile(page, &slots, snapshot, display);
        report.applied += 1;
    }

    report.bars = render_progress_bars(page);
    report
}
