use crate::page::document::{NodeId, Page};
use crate::page::markup::*;
use crate::page::Selector;
use std::collections::HashMap;

/// Download id → row mapping, built once per tick
#[derive(Debug, Default)]
pub struct RowIndex {
    rows: HashMap<String, NodeId>,
}

impl RowIndex {
    /// Scan the page for rows tagged with a download id. When an id appears
    /// twice, the first row in document order wins.
    pub fn build(page: &Page) -> Self {
        let selector = Selector::tag("tr").and_attr(ATTR_DOWNLOAD_ID);
        let mut rows = HashMap::new();

        for row in page.query_all(page.root(), &selector) {
            if let Some(id) = page.attr(row, ATTR_DOWNLOAD_ID) {
                rows.entry(id.to_string()).or_insert(row);
            }
        }

        tracing::trace!("Indexed {} download rows", rows.len());
        Self { rows }
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.rows.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sub-elements of one row; each may independently be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSlots {
    pub row: Option<NodeId>,
    pub received: Option<NodeId>,
    pub total: Option<NodeId>,
    pub bar: Option<NodeId>,
    pub badge: Option<NodeId>,
    pub delete_form: Option<NodeId>,
    pub speed_current: Option<NodeId>,
    pub speed_max: Option<NodeId>,
    pub created_time: Option<NodeId>,
    pub last_started: Option<NodeId>,
    pub finished_time: Option<NodeId>,
    pub retries: Option<NodeId>,
}

impl RowSlots {
    pub fn resolve(page: &Page, row: NodeId) -> Self {
        let nums = |class: &str| {
            page.query(
                row,
                &Selector::class(CLASS_PROGRESS_NUMS).descendant(Selector::class(class)),
            )
        };
        let find = |class: &str| page.query(row, &Selector::class(class));

        Self {
            row: Some(row),
            received: nums(CLASS_RECEIVED),
            total: nums(CLASS_TOTAL),
            bar: find(CLASS_BAR_FILL),
            badge: find(CLASS_BADGE),
            delete_form: find(CLASS_DELETE_FORM),
            speed_current: find(CLASS_SPEED_CURRENT),
            speed_max: find(CLASS_SPEED_MAX),
            created_time: find(CLASS_CREATED_TIME),
            last_started: find(CLASS_LAST_STARTED),
            finished_time: find(CLASS_FINISHED_TIME),
            retries: find(CLASS_RETRIES),
        }
    }
}

/// Locate a single row by download id without building an index
pub fn find_row(page: &Page, id: &str) -> Option<NodeId> {
    page.query(
        page.root(),
        &Selector::tag("tr").and_attr_eq(ATTR_DOWNLOAD_ID, id),
    )
}
