use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{CommandRunner, CommandSpec};
use crate::error::CommandError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
        info!("[RUN ] {}", spec);
        let mut child = spawn(spec, build_command(spec))?;
        let status = wait(spec, &mut child)?;
        check_status(spec, status)
    }

    fn capture_line(&self, spec: &CommandSpec) -> Result<String, CommandError> {
        info!("[RUN ] {}", spec);
        let mut command = build_command(spec);
        command.stdout(Stdio::piped());
        let mut child = spawn(spec, command)?;

        let mut stdout = child.stdout.take().ok_or_else(|| CommandError::Io {
            command: spec.display_line(),
            source: io::Error::other("stdout was not captured"),
        })?;
        // Drain on a helper thread so a chatty child cannot fill the pipe
        // while we wait on it.
        let reader = thread::spawn(move || -> io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf)?;
            Ok(buf)
        });

        let status = wait(spec, &mut child)?;
        let output = reader
            .join()
            .map_err(|_| CommandError::Io {
                command: spec.display_line(),
                source: io::Error::other("stdout reader panicked"),
            })?
            .map_err(|source| CommandError::Io {
                command: spec.display_line(),
                source,
            })?;
        check_status(spec, status)?;

        let text = String::from_utf8_lossy(&output);
        match text.lines().next() {
            Some(line) if !line.is_empty() => {
                debug!(command = %spec, output = %line, "captured output");
                Ok(line.to_string())
            }
            _ => Err(CommandError::NoOutput {
                command: spec.display_line(),
            }),
        }
    }
}

fn build_command(spec: &CommandSpec) -> Command {
    let mut command = Command::new(spec.program());
    command.args(spec.get_args());
    if let Some(dir) = spec.get_current_dir() {
        command.current_dir(dir);
    }
    command
}

fn spawn(spec: &CommandSpec, mut command: Command) -> Result<Child, CommandError> {
    debug!(command = %spec, cwd = ?spec.get_current_dir(), "spawning process");
    command.spawn().map_err(|source| CommandError::Spawn {
        program: spec.program_name(),
        source,
    })
}

fn wait(spec: &CommandSpec, child: &mut Child) -> Result<ExitStatus, CommandError> {
    let io_err = |source| CommandError::Io {
        command: spec.display_line(),
        source,
    };

    let Some(timeout) = spec.get_timeout() else {
        return child.wait().map_err(io_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(io_err)? {
            return Ok(status);
        }
        let now = Instant::now();
        if now >= deadline {
            warn!(command = %spec, timeout_secs = timeout.as_secs(), "command timed out, killing it");
            let _ = child.kill();
            let _ = child.wait();
            return Err(CommandError::TimedOut {
                command: spec.display_line(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

fn check_status(spec: &CommandSpec, status: ExitStatus) -> Result<(), CommandError> {
    if status.success() {
        return Ok(());
    }
    Err(CommandError::Failed {
        command: spec.display_line(),
        code: status.code(),
    })
}
