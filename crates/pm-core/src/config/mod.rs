//! Loading the package list and root locations from `pm.toml`.
//!
//! ```toml
//! [paths]
//! bin = "/home/me/.local/share/pm/bin"
//!
//! [settings]
//! command_timeout = 600
//! publish = "auto"
//!
//! [[package]]
//! name = "pm"
//! source = "https://github.com/hugoocoto/pm"
//! ```

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_pm_toml, parse_pm_toml_str};
pub use paths::{default_config_path, default_data_dir};
pub use schema::{PackageEntry, PathsConfig, PmConfig, SettingsConfig};
pub use store::ConfigStore;
