//! In-memory stand-in for git and recipe commands.
//!
//! Each source URL has an upstream tip revision (`rev-1` until changed).
//! `git clone` creates the destination directory and checks out the tip,
//! `git fetch --all` refreshes the working copy's view of `origin`, and
//! `git reset --hard` moves `HEAD` to it. A `make` recipe writes
//! `<cwd>/<dir name>` containing `built <HEAD>`; any other program succeeds
//! without side effects.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pm_core::error::CommandError;
use pm_core::process::{CommandRunner, CommandSpec};

const INITIAL_REVISION: &str = "rev-1";

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    upstream: HashMap<String, String>,
    origins: HashMap<PathBuf, String>,
    heads: HashMap<PathBuf, String>,
    fetched: HashMap<PathBuf, String>,
    failing: Vec<String>,
    panicking: Vec<String>,
}

#[derive(Default)]
pub struct FakeRunner {
    state: Mutex<FakeState>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the upstream branch of `url` at `rev`.
    pub fn set_upstream(&self, url: &str, rev: &str) {
        let mut state = self.state.lock().unwrap();
        state.upstream.insert(url.to_string(), rev.to_string());
    }

    /// Treat a working copy that already exists on disk as cloned from `url`.
    pub fn adopt_clone(&self, dir: &Path, url: &str, rev: &str) {
        let mut state = self.state.lock().unwrap();
        state.origins.insert(dir.to_path_buf(), url.to_string());
        state.heads.insert(dir.to_path_buf(), rev.to_string());
        state.fetched.insert(dir.to_path_buf(), rev.to_string());
    }

    /// Every command whose line contains `needle` exits with status 2.
    pub fn fail_when(&self, needle: &str) {
        self.state.lock().unwrap().failing.push(needle.to_string());
    }

    /// Every command whose line contains `needle` panics.
    pub fn panic_when(&self, needle: &str) {
        self.state.lock().unwrap().panicking.push(needle.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.failing.clear();
        state.panicking.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn head(&self, dir: &Path) -> Option<String> {
        self.state.lock().unwrap().heads.get(dir).cloned()
    }

    fn dispatch(&self, spec: &CommandSpec) -> Result<Option<String>, CommandError> {
        let line = spec.to_string();
        let should_panic = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(line.clone());
            state.panicking.iter().any(|needle| line.contains(needle))
        };
        if should_panic {
            panic!("fake runner asked to panic on `{line}`");
        }

        let mut state = self.state.lock().unwrap();
        if state.failing.iter().any(|needle| line.contains(needle)) {
            return Err(CommandError::Failed {
                command: line,
                code: Some(2),
            });
        }

        let args: Vec<String> = spec
            .get_args()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        let cwd = spec.get_current_dir().map(Path::to_path_buf);

        if spec.program_name() != "git" {
            if spec.program_name() == "make" {
                let dir = cwd.expect("recipe runs inside the working copy");
                let name = dir.file_name().unwrap().to_owned();
                let head = state
                    .heads
                    .get(&dir)
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                fs::write(dir.join(name), format!("built {head}")).unwrap();
            }
            return Ok(None);
        }

        match args.first().map(String::as_str) {
            Some("clone") => {
                let url = args[4].clone();
                let dest = PathBuf::from(&args[5]);
                let tip = state.tip(&url);
                fs::create_dir_all(&dest).unwrap();
                state.origins.insert(dest.clone(), url);
                state.heads.insert(dest.clone(), tip.clone());
                state.fetched.insert(dest, tip);
                Ok(None)
            }
            Some("fetch") => {
                let dir = cwd.expect("fetch runs inside the working copy");
                let url = state.origins.get(&dir).cloned().unwrap_or_default();
                let tip = state.tip(&url);
                state.fetched.insert(dir, tip);
                Ok(None)
            }
            Some("rev-parse") => {
                let dir = cwd.expect("rev-parse runs inside the working copy");
                let rev = if args[1] == "HEAD" {
                    state.heads.get(&dir)
                } else {
                    state.fetched.get(&dir)
                };
                rev.cloned()
                    .map(Some)
                    .ok_or(CommandError::NoOutput { command: line })
            }
            Some("reset") => {
                let dir = cwd.expect("reset runs inside the working copy");
                let fetched = state.fetched.get(&dir).cloned().unwrap_or_default();
                state.heads.insert(dir, fetched);
                Ok(None)
            }
            _ => Ok(None),
        }
    }
}

impl FakeState {
    fn tip(&self, url: &str) -> String {
        self.upstream
            .get(url)
            .cloned()
            .unwrap_or_else(|| INITIAL_REVISION.to_string())
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> Result<(), CommandError> {
        self.dispatch(spec).map(|_| ())
    }

    fn capture_line(&self, spec: &CommandSpec) -> Result<String, CommandError> {
        match self.dispatch(spec)? {
            Some(line) => Ok(line),
            None => Err(CommandError::NoOutput {
                command: spec.to_string(),
            }),
        }
    }
}
