use serde::{Deserialize, Serialize};

/// HTTP host configuration, read from `modules.api_ingress`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    #[serde(default)]
    pub cors_enabled: bool,
    /// Directory served under `/images`; relative paths resolve against the home dir.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            cors_enabled: false,
            assets_dir: default_assets_dir(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

fn default_assets_dir() -> String {
    "public/images".to_string()
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}
