//! Recursive directory creation for the root locations.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::{PmError, Result};

/// Create `path` and every missing ancestor.
///
/// An entry that already exists is accepted when it is a directory. Any other
/// failure is reported as [`PmError::Initialization`] for the component that
/// could not be created. Calling it again on an existing tree does nothing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    let mut components: Vec<&Path> = path
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .collect();
    components.reverse();

    for dir in components {
        match fs::create_dir(dir) {
            Ok(()) => debug!(path = %dir.display(), "created directory"),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                if !dir.is_dir() {
                    return Err(PmError::Initialization {
                        path: dir.to_path_buf(),
                        source: io::Error::new(
                            io::ErrorKind::NotADirectory,
                            "path exists and is not a directory",
                        ),
                    });
                }
            }
            Err(source) => {
                return Err(PmError::Initialization {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(())
}
