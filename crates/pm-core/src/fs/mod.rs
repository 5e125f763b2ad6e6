//! Filesystem primitives shared across features.

pub mod ensure;
pub mod publish;
pub mod publish_mode;

pub use ensure::ensure_dir;
pub use publish::publish;
pub use publish_mode::PublishMode;
