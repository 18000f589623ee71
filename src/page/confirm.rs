use super::document::{NodeId, Page};
use super::markup::ATTR_DATA_CONFIRM;

pub const MODAL_ID: &str = "confirmModal";
pub const MODAL_TEXT_ID: &str = "confirmText";
pub const DEFAULT_MESSAGE: &str = "Confirm action?";
pub const ATTR_CONFIRM_BYPASS: &str = "data-confirm-bypass";

/// What the caller should do with a submitted form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Submit right away
    Proceed(NodeId),
    /// Held until the user confirms
    Deferred,
}

/// Confirmation gate for destructive forms.
///
/// The pending form is owned here rather than living in page-wide state.
#[derive(Debug, Default)]
pub struct ConfirmDialog {
    pending: Option<NodeId>,
}

impl ConfirmDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<NodeId> {
        self.pending
    }

    /// Intercept a form submission.
    ///
    /// Forms without `data-confirm`, or pages without a modal, go through.
    pub fn request(&mut self, page: &mut Page, form: NodeId) -> Submission {
        let Some(message) = page.attr(form, ATTR_DATA_CONFIRM).map(str::to_string) else {
            return Submission::Proceed(form);
        };
        let Some(modal) = page.element_by_id(MODAL_ID) else {
            return Submission::Proceed(form);
        };

        let message = if message.is_empty() {
            DEFAULT_MESSAGE.to_string()
        } else {
            message
        };

        self.pending = Some(form);
        page.set_attr(modal, "open", "");
        page.remove_attr(modal, "aria-hidden");
        if let Some(text) = page.element_by_id(MODAL_TEXT_ID) {
            page.set_text(text, message);
        }

        tracing::debug!("Deferred form submission pending confirmation");
        Submission::Deferred
    }

    /// Release the pending form for submission and close the modal
    pub fn confirm(&mut self, page: &mut Page) -> Option<NodeId> {
        let form = self.pending.take();
        if let Some(form) = form {
            page.remove_attr(form, ATTR_DATA_CONFIRM);
            page.set_attr(form, ATTR_CONFIRM_BYPASS, "true");
        }
        close_modal(page);
        form
    }

    /// Close the modal without submitting
    pub fn dismiss(&mut self, page: &mut Page) {
        close_modal(page);
    }
}

pub fn close_modal(page: &mut Page) {
    if let Some(modal) = page.element_by_id(MODAL_ID) {
        page.remove_attr(modal, "open");
        page.set_attr(modal, "aria-hidden", "true");
    }
}
