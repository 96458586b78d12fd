pub mod config;
pub mod models;
pub mod session_watch;
pub mod utils;

pub use crate::config::*;
pub use crate::utils::*;
