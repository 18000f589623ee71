pub mod confirm;
pub mod document;
pub mod markup;
pub mod theme;

pub use document::{NodeId, Page, Selector};
