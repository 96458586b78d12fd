// common/src/models/history.rs
use serde::{Deserialize, Serialize};

/// Pagination parameters for session history reads.
///
/// Both values stay strings: they are forwarded to the backend untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: String,
    #[serde(default = "default_limit")]
    pub limit: String,
}

fn default_page() -> String {
    "1".to_string()
}

fn default_limit() -> String {
    "10".to_string()
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl HistoryQuery {
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [("page", self.page.as_str()), ("limit", self.limit.as_str())]
    }
}
