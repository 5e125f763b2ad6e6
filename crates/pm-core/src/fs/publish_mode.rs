use serde::{Deserialize, Serialize};

/// How a build artifact is placed into the bin root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Hard link the artifact; both names share one file.
    #[default]
    Hardlink,
    /// Copy the artifact.
    Copy,
    /// Hard link, copying instead when the roots sit on different devices.
    Auto,
}

impl PublishMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishMode::Hardlink => "hardlink",
            PublishMode::Copy => "copy",
            PublishMode::Auto => "auto",
        }
    }
}
