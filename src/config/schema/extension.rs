use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Packaged browser extension served by the download endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
    /// File name offered to the browser
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    "formaid-extension.zip".into()
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            archive_path: None,
            file_name: default_file_name(),
        }
    }
}
