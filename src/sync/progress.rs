//! Progress-bar fill rendering.
//!
//! The fill element's `data-received` / `data-total` attributes are the source
//! of truth; width and `aria-valuenow` are always derived from them here.

use crate::page::document::{NodeId, Page};
use crate::page::markup::{ATTR_DATA_RECEIVED, ATTR_DATA_TOTAL, ATTR_DATA_WAIT, CLASS_BAR_FILL, CLASS_PROGRESS};
use crate::page::Selector;

/// Fill percentage in `0.0..=100.0`.
///
/// Unknown or non-positive totals and non-finite received counts yield 0.
pub fn progress_percent(received: f64, total: f64) -> f64 {
    if !(total > 0.0) || !received.is_finite() {
        return 0.0;
    }
    (received / total * 100.0).clamp(0.0, 100.0)
}

/// Numeric reading of an attribute value: missing or blank is 0, anything
/// that does not parse is NaN
fn attr_number(raw: Option<&str>) -> f64 {
    let raw = raw.unwrap_or("").trim();
    if raw.is_empty() {
        return 0.0;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}

/// Render one bar from its data attributes. Returns the percentage applied.
pub fn render_bar(page: &mut Page, bar: NodeId) -> f64 {
    let received = attr_number(page.attr(bar, ATTR_DATA_RECEIVED));
    let total = attr_number(page.attr(bar, ATTR_DATA_TOTAL));
    let pct = progress_percent(received, total);

    page.set_style_width(bar, format!("{:.2}%", pct));
    page.set_attr(bar, "aria-valuenow", format!("{:.0}", pct.round()));

    if pct >= 100.0 {
        let container = page.closest(bar, &Selector::class(CLASS_PROGRESS));
        if let Some(wait) = container.and_then(|c| page.query(c, &Selector::attr(ATTR_DATA_WAIT))) {
            page.remove(wait);
            tracing::trace!("Removed waiting indicator for completed bar");
        }
    }

    pct
}

/// Render every progress fill on the page that carries received/total data.
///
/// Returns the number of bars rendered.
pub fn render_progress_bars(page: &mut Page) -> usize {
    let selector = Selector::class(CLASS_BAR_FILL).and_attr(ATTR_DATA_RECEIVED);
    let bars = page.query_all(page.root(), &selector);
    for bar in &bars {
        render_bar(page, *bar);
    }
    bars.len()
}
