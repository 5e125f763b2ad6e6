//! Placing build artifacts into the bin root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::PublishMode;

/// Publish `artifact` at `target`.
///
/// An existing file or symlink at `target` is replaced; a directory there is
/// refused. The new entry is prepared under a temporary sibling name and then
/// moved into place. Returns the mode that was actually used, which differs
/// from `mode` only when [`PublishMode::Auto`] fell back to copying.
pub fn publish(artifact: &Path, target: &Path, mode: PublishMode) -> io::Result<PublishMode> {
    ensure_artifact(artifact)?;
    ensure_replaceable(target)?;

    info!(
        "[LINK] {} ---> {}",
        artifact.display(),
        target.display()
    );

    let tmp = unique_temp_path(target)?;
    let used = match place_at(artifact, &tmp, mode) {
        Ok(used) => used,
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
    };

    if let Err(err) = replace_target_with_tmp(target, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(used)
}

fn place_at(artifact: &Path, tmp: &Path, mode: PublishMode) -> io::Result<PublishMode> {
    match mode {
        PublishMode::Hardlink => {
            fs::hard_link(artifact, tmp)?;
            Ok(PublishMode::Hardlink)
        }
        PublishMode::Copy => {
            copy_file(artifact, tmp)?;
            Ok(PublishMode::Copy)
        }
        PublishMode::Auto => match fs::hard_link(artifact, tmp) {
            Ok(()) => Ok(PublishMode::Hardlink),
            Err(err) if is_cross_device_os_error(&err) => {
                debug!(artifact = %artifact.display(), "cross-device link, copying instead");
                copy_file(artifact, tmp)?;
                Ok(PublishMode::Copy)
            }
            Err(err) => Err(err),
        },
    }
}

fn ensure_artifact(artifact: &Path) -> io::Result<()> {
    let meta = fs::metadata(artifact).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("build artifact {} is missing: {}", artifact.display(), err),
        )
    })?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("build artifact {} is not a file", artifact.display()),
        ));
    }
    Ok(())
}

fn ensure_replaceable(target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => Err(io::Error::new(
            io::ErrorKind::IsADirectory,
            format!("{} is a directory", target.display()),
        )),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

fn replace_target_with_tmp(target: &Path, tmp: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(_) => {
            debug!(target = %target.display(), "removing previously published entry");
            fs::remove_file(target)?;
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::rename(tmp, target)
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}

fn unique_temp_path(target: &Path) -> io::Result<PathBuf> {
    let parent = target.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", target.display()),
        )
    })?;
    let base = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());

    for attempt in 0..100 {
        let candidate = parent.join(format!(
            ".{}.tmp.{}.{}",
            base,
            std::process::id(),
            attempt
        ));
        if fs::symlink_metadata(&candidate).is_err() {
            return Ok(candidate);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("failed to allocate a temp path for {}", target.display()),
    ))
}

fn is_cross_device_os_error(err: &io::Error) -> bool {
    let Some(code) = err.raw_os_error() else {
        return false;
    };

    #[cfg(unix)]
    {
        const EXDEV: i32 = 18;
        code == EXDEV
    }

    #[cfg(not(unix))]
    {
        let _ = code;
        false
    }
}
