//! GoAI dashboard gateway: auth cookie proxy, history and boot-data proxies,
//! and the static site they sit beside.

pub mod api;
pub mod cookies;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod static_files;
pub mod upstream;
