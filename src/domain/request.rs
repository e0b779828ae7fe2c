use serde::{Deserialize, Serialize};

/// Metadata of the HTTP request a submission arrived on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMeta {
    pub host: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub remote_addr: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}
