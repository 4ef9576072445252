pub mod cli;
pub mod error;
pub mod http;
pub mod log_store;
pub mod state;

pub use cli::Opts;
pub use error::AppError;
pub use log_store::LogStore;
pub use state::{AppState, SelfInfo};
