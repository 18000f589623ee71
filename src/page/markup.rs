//! Names the page exposes to the sync engine, and a builder producing the
//! downloads listing the server renders.

use super::document::{NodeId, Page};
use crate::sync::format::PLACEHOLDER;
use crate::sync::snapshot::DownloadSnapshot;

/// Body attribute naming the active view
pub const ATTR_DATA_PAGE: &str = "data-page";
/// `data-page` value of the downloads listing
pub const VIEW_DOWNLOADS: &str = "downloads";

pub const ATTR_DOWNLOAD_ID: &str = "data-download-id";
pub const ATTR_DATA_RECEIVED: &str = "data-received";
pub const ATTR_DATA_TOTAL: &str = "data-total";
pub const ATTR_DATA_WAIT: &str = "data-wait";
pub const ATTR_DATA_CONFIRM: &str = "data-confirm";

pub const CLASS_PROGRESS: &str = "progress";
pub const CLASS_PROGRESS_NUMS: &str = "progress__nums";
pub const CLASS_BAR: &str = "progress__bar";
pub const CLASS_BAR_FILL: &str = "progress__bar-fill";
pub const CLASS_RECEIVED: &str = "js-rec";
pub const CLASS_TOTAL: &str = "js-tot";
pub const CLASS_BADGE: &str = "badge";
pub const CLASS_DELETE_FORM: &str = "js-delete-form";
pub const CLASS_HIDDEN: &str = "is-hidden";
pub const CLASS_SPEED_CURRENT: &str = "js-speed-current";
pub const CLASS_SPEED_MAX: &str = "js-speed-max";
pub const CLASS_CREATED_TIME: &str = "js-start-time";
pub const CLASS_LAST_STARTED: &str = "js-last-start";
pub const CLASS_FINISHED_TIME: &str = "js-finish-time";
pub const CLASS_RETRIES: &str = "js-retries";

pub const BADGE_DEFAULT: &str = "badge--default";

/// Empty page for the given view
pub fn render_page(view: &str) -> Page {
    let mut page = Page::new();
    let body = page.body();
    page.set_attr(body, ATTR_DATA_PAGE, view);
    page
}

/// Downloads listing with one row per snapshot, carrying the values the
/// server puts into its template. Bar widths are left for the initial
/// progress pass.
pub fn render_listing(snapshots: &[DownloadSnapshot]) -> Page {
    let mut page = render_page(VIEW_DOWNLOADS);
    let table = append(&mut page, None, "table", &[]);
    let tbody = append(&mut page, Some(table), "tbody", &[]);

    for snapshot in snapshots {
        render_row(&mut page, tbody, snapshot);
    }

    page
}

fn append(page: &mut Page, parent: Option<NodeId>, tag: &str, classes: &[&str]) -> NodeId {
    let node = page.create_element(tag);
    for class in classes {
        page.add_class(node, class);
    }
    let parent = parent.unwrap_or_else(|| page.body());
    page.append_child(parent, node);
    node
}

fn text_cell(page: &mut Page, row: NodeId, class: &str, text: &str) -> NodeId {
    let cell = append(page, Some(row), "td", &[]);
    let slot = append(page, Some(cell), "span", &[class]);
    page.set_text(slot, text);
    slot
}

/// Append one listing row for `snapshot` under `tbody`
pub fn render_row(page: &mut Page, tbody: NodeId, snapshot: &DownloadSnapshot) -> NodeId {
    let row = append(page, Some(tbody), "tr", &[]);
    page.set_attr(row, ATTR_DOWNLOAD_ID, snapshot.id.as_str());

    let progress_cell = append(page, Some(row), "td", &[]);
    let progress = append(page, Some(progress_cell), "div", &[CLASS_PROGRESS]);

    let bar = append(page, Some(progress), "div", &[CLASS_BAR]);
    let fill = append(page, Some(bar), "div", &[CLASS_BAR_FILL]);
    page.set_attr(fill, "role", "progressbar");
    page.set_attr(fill, "aria-valuemin", "0");
    page.set_attr(fill, "aria-valuemax", "100");
    page.set_attr(fill, ATTR_DATA_RECEIVED, snapshot.received_bytes.to_string());
    page.set_attr(fill, ATTR_DATA_TOTAL, snapshot.total_bytes.to_string());

    let nums = append(page, Some(progress), "div", &[CLASS_PROGRESS_NUMS]);
    let rec = append(page, Some(nums), "span", &[CLASS_RECEIVED]);
    page.set_text(rec, snapshot.received_bytes.to_string());
    let tot = append(page, Some(nums), "span", &[CLASS_TOTAL]);
    page.set_text(tot, snapshot.total_bytes.to_string());

    let wait = append(page, Some(progress), "span", &[]);
    page.set_attr(wait, ATTR_DATA_WAIT, "");
    page.set_text(wait, "…");

    let status_cell = append(page, Some(row), "td", &[]);
    let badge = append(page, Some(status_cell), "span", &[CLASS_BADGE, BADGE_DEFAULT]);
    page.set_text(badge, snapshot.status.as_str());

    text_cell(page, row, CLASS_SPEED_CURRENT, PLACEHOLDER);
    text_cell(page, row, CLASS_SPEED_MAX, PLACEHOLDER);
    text_cell(page, row, CLASS_CREATED_TIME, PLACEHOLDER);
    text_cell(page, row, CLASS_LAST_STARTED, PLACEHOLDER);
    text_cell(page, row, CLASS_FINISHED_TIME, PLACEHOLDER);
    text_cell(page, row, CLASS_RETRIES, &snapshot.retries_or_default().to_string());

    let actions = append(page, Some(row), "td", &[]);
    let form = append(page, Some(actions), "form", &[CLASS_DELETE_FORM]);
    page.set_attr(form, "method", "post");
    page.set_attr(form, "action", format!("/downloads/{}/delete", snapshot.id));
    page.set_attr(form, ATTR_DATA_CONFIRM, "Delete this download?");
    page.toggle_class(form, CLASS_HIDDEN, !snapshot.status.is_terminal());

    row
}
