pub mod app;
pub mod cli;
pub mod page;
pub mod sync;
pub mod util;

pub use app::{config::Config, state::AppState};
