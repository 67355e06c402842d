//! git subprocess backend.

use super::{VcsBackend, VcsFailure, VcsResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Markers git prints when a commit has nothing to record.
const NOTHING_TO_COMMIT_MARKERS: &[&str] = &[
    "nothing to commit",
    "nothing added to commit",
    "no changes added to commit",
];

/// Which changes `stage_all` marks for commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageScope {
    /// Every working-tree change (`git add --all`).
    #[default]
    All,
    /// Only the listed root-relative paths (`git add -- <paths>`).
    Paths(Vec<PathBuf>),
}

/// Captured result of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCapture {
    pub args: Vec<String>,
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandCapture {
    /// Text explaining a failed invocation: stderr, else stdout, else the
    /// exit status.
    pub fn failure_text(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.status {
            Some(code) => format!("git {} exited with status {}", self.args.join(" "), code),
            None => format!("git {} was terminated by a signal", self.args.join(" ")),
        }
    }

    fn is_nothing_to_commit(&self) -> bool {
        let combined = format!("{}\n{}", self.stdout, self.stderr);
        NOTHING_TO_COMMIT_MARKERS
            .iter()
            .any(|marker| combined.contains(marker))
    }
}

/// Runs git as a blocking subprocess inside a working tree.
#[derive(Debug, Clone)]
pub struct GitBackend {
    program: String,
    workdir: PathBuf,
    remote: Option<String>,
    branch: Option<String>,
    scope: StageScope,
}

impl GitBackend {
    /// Backend for the working tree at `workdir`, using `git` from `PATH`.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: "git".to_string(),
            workdir: workdir.into(),
            remote: None,
            branch: None,
            scope: StageScope::All,
        }
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Push to an explicit remote instead of the branch's upstream.
    pub fn with_remote(mut self, remote: Option<String>) -> Self {
        self.remote = remote;
        self
    }

    /// Push an explicit refspec (only meaningful with a remote).
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_stage_scope(mut self, scope: StageScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Arguments for the push invocation.
    pub fn push_args(&self) -> Vec<String> {
        let mut args = vec!["push".to_string()];
        if let Some(ref remote) = self.remote {
            args.push(remote.clone());
            if let Some(ref branch) = self.branch {
                args.push(branch.clone());
            }
        }
        args
    }

    /// Arguments for the stage invocation.
    pub fn stage_args(&self) -> Vec<OsString> {
        match self.scope {
            StageScope::All => vec!["add".into(), "--all".into()],
            StageScope::Paths(ref paths) => {
                let mut args: Vec<OsString> = vec!["add".into(), "--".into()];
                args.extend(paths.iter().map(|p| p.as_os_str().to_os_string()));
                args
            }
        }
    }

    /// Run git with `args` and capture its output.
    pub fn run(&self, args: &[OsString]) -> Result<CommandCapture, VcsFailure> {
        let printable: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        debug!(program = %self.program, args = ?printable, workdir = %self.workdir.display(), "Running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            // Keep messages untranslated so failure detection stays stable.
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| VcsFailure::new(format!("failed to run {}: {}", self.program, e)))?;

        Ok(CommandCapture {
            args: printable,
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run_checked(&self, args: &[OsString]) -> Result<CommandCapture, VcsFailure> {
        let capture = self.run(args)?;
        if capture.success {
            Ok(capture)
        } else {
            Err(VcsFailure::new(capture.failure_text()))
        }
    }
}

impl VcsBackend for GitBackend {
    fn stage_all(&self) -> VcsResult {
        self.run_checked(&self.stage_args()).map(|_| ())
    }

    fn commit(&self, message: &str) -> VcsResult {
        let args: Vec<OsString> = vec!["commit".into(), "-m".into(), message.into()];
        let capture = self.run(&args)?;
        if capture.success {
            Ok(())
        } else if capture.is_nothing_to_commit() {
            Err(VcsFailure::nothing_to_commit(capture.failure_text()))
        } else {
            Err(VcsFailure::new(capture.failure_text()))
        }
    }

    fn push(&self) -> VcsResult {
        let args: Vec<OsString> = self.push_args().into_iter().map(OsString::from).collect();
        self.run_checked(&args).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(stdout: &str, stderr: &str, status: Option<i32>) -> CommandCapture {
        CommandCapture {
            args: vec!["commit".to_string()],
            status,
            success: false,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_failure_text_prefers_stderr() {
        let c = capture("out", "  fatal: no upstream\n", Some(128));
        assert_eq!(c.failure_text(), "fatal: no upstream");
    }

    #[test]
    fn test_failure_text_falls_back_to_stdout_then_status() {
        let c = capture("nothing to commit, working tree clean\n", "", Some(1));
        assert_eq!(c.failure_text(), "nothing to commit, working tree clean");

        let c = capture("", "", Some(1));
        assert_eq!(c.failure_text(), "git commit exited with status 1");
    }

    #[test]
    fn test_nothing_to_commit_detection() {
        assert!(capture("nothing to commit, working tree clean", "", Some(1)).is_nothing_to_commit());
        assert!(
            capture("no changes added to commit (use \"git add\")", "", Some(1))
                .is_nothing_to_commit()
        );
        assert!(
            !capture("", "Please tell me who you are.", Some(128)).is_nothing_to_commit()
        );
    }

    #[test]
    fn test_push_args() {
        let backend = GitBackend::new(".");
        assert_eq!(backend.push_args(), vec!["push"]);

        let backend = GitBackend::new(".")
            .with_remote(Some("origin".into()))
            .with_branch(Some("main".into()));
        assert_eq!(backend.push_args(), vec!["push", "origin", "main"]);

        // A branch without a remote is ignored; git needs the remote first.
        let backend = GitBackend::new(".").with_branch(Some("main".into()));
        assert_eq!(backend.push_args(), vec!["push"]);
    }

    #[test]
    fn test_stage_args_by_scope() {
        let backend = GitBackend::new(".");
        assert_eq!(backend.stage_args(), vec![OsString::from("add"), OsString::from("--all")]);

        let backend = GitBackend::new(".").with_stage_scope(StageScope::Paths(vec![
            PathBuf::from("Dockerfile"),
        ]));
        assert_eq!(
            backend.stage_args(),
            vec![
                OsString::from("add"),
                OsString::from("--"),
                OsString::from("Dockerfile")
            ]
        );
    }

    #[test]
    fn test_missing_program_is_a_failure() {
        let backend = GitBackend::new(".").with_program("confpush-no-such-git-binary");
        let err = backend.stage_all().unwrap_err();
        assert!(err.message.contains("failed to run"));
        assert!(!err.nothing_to_commit);
    }
}
