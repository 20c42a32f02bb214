//! Interactive shell session with sentinel-based completion detection.
//!
//! The shell exposes only an unframed byte stream, so a per-session
//! sentinel token echoed after each submitted command is the single
//! synchronization primitive telling the caller "this command's output is
//! complete". Known limitation: if a command's own output contains the
//! literal sentinel text, completion detection triggers early. The sentinel
//! embeds a v4 UUID, regenerated per session, which makes collisions
//! practically impossible for ordinary commands.

pub mod buffer;
pub mod manager;
pub mod overflow;

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::models::ToolResult;
use crate::{AppError, Result};

pub use buffer::OutputBuffer;
pub use manager::SessionManager;

/// Spawn-time isolation settings for the shell process.
///
/// Demotion to a fixed unprivileged identity and a fresh process group are
/// applied once at spawn; they form the isolation boundary for everything
/// the session subsequently executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSpec {
    /// Uid the shell is demoted to, when set.
    pub uid: Option<u32>,
    /// Gid the shell is demoted to, when set.
    pub gid: Option<u32>,
    /// Whether the shell gets its own process group.
    pub new_process_group: bool,
}

impl Default for SpawnSpec {
    fn default() -> Self {
        Self {
            uid: None,
            gid: None,
            new_process_group: true,
        }
    }
}

/// Tunable settings for one [`ShellSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Shell command line, run via `/bin/sh -c`.
    pub shell: String,
    /// Interval between output-buffer polls.
    pub poll_interval: Duration,
    /// Hard per-command timeout.
    pub timeout: Duration,
    /// Maximum preview bytes embedded inline in a timeout error.
    pub preview_limit: usize,
    /// Spawn-time isolation settings.
    pub spawn: SpawnSpec,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            shell: "/bin/bash".into(),
            poll_interval: Duration::from_millis(200),
            timeout: Duration::from_secs(30),
            preview_limit: 10_000,
            spawn: SpawnSpec::default(),
        }
    }
}

impl SessionOptions {
    /// Derive options from the `[session]` config section.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            timeout: Duration::from_secs(config.timeout_seconds),
            preview_limit: config.preview_limit_bytes,
            spawn: SpawnSpec {
                uid: Some(config.run_as_uid),
                gid: Some(config.run_as_gid),
                new_process_group: true,
            },
        }
    }
}

/// Completion outcome of one submitted command, decoupled from transport.
#[derive(Debug)]
enum RunOutcome {
    /// Sentinel observed; streams captured up to it.
    Complete { stdout: String, stderr: String },
    /// Deadline elapsed before the sentinel appeared.
    TimedOut { stdout: String, stderr: String },
    /// Shell process had already exited before the command was written.
    Exited(ExitStatus),
}

/// Live process handle plus its write channel.
struct SessionProcess {
    child: Child,
    stdin: ChildStdin,
}

/// One persistent shell process and its completion protocol.
///
/// `run` takes `&mut self`, so at most one command is in flight at a time;
/// callers that need concurrency must serialize access themselves. A
/// session that timed out is poisoned and accepts no further commands
/// until it is discarded and replaced.
pub struct ShellSession {
    options: SessionOptions,
    sentinel: String,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
    proc: Option<SessionProcess>,
    timed_out: bool,
}

impl ShellSession {
    /// New, not-yet-started session with a freshly generated sentinel.
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            sentinel: format!("<<exit:{}>>", Uuid::new_v4()),
            stdout: OutputBuffer::new(),
            stderr: OutputBuffer::new(),
            proc: None,
            timed_out: false,
        }
    }

    /// Whether the shell process has been spawned.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.proc.is_some()
    }

    /// Spawn the shell process and its two output readers.
    ///
    /// Idempotent: a second call on a started session yields control once
    /// and returns without re-spawning.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the shell cannot be spawned or its
    /// stdio pipes cannot be taken.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_started() {
            tokio::task::yield_now().await;
            return Ok(());
        }

        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c")
            .arg(&self.options.shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        {
            if self.options.spawn.new_process_group {
                cmd.process_group(0);
            }
            if let Some(uid) = self.options.spawn.uid {
                cmd.uid(uid);
            }
            if let Some(gid) = self.options.spawn.gid {
                cmd.gid(gid);
            }
        }

        let mut child = cmd
            .spawn()
            .map_err(|err| AppError::Session(format!("failed to spawn shell: {err}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Session("shell stdin pipe missing".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AppError::Session("shell stdout pipe missing".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AppError::Session("shell stderr pipe missing".into()))?;

        spawn_reader(stdout, self.stdout.clone());
        spawn_reader(stderr, self.stderr.clone());

        info!(
            pid = child.id().unwrap_or(0),
            shell = self.options.shell,
            "shell session started"
        );

        self.proc = Some(SessionProcess { child, stdin });
        Ok(())
    }

    /// Execute a command and wait for its completion sentinel.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` if the session was never started, and
    /// `AppError::Timeout` if this command timed out or a previous one
    /// already poisoned the session. A shell that exited on its own is an
    /// operational result (`system: "tool must be restarted"`), not an
    /// error.
    pub async fn run(&mut self, command: &str) -> Result<ToolResult> {
        if !self.is_started() {
            return Err(AppError::Usage("session has not started".into()));
        }

        match self.submit(command).await? {
            RunOutcome::Exited(status) => {
                tokio::task::yield_now().await;
                Ok(ToolResult::system_with_error(
                    "tool must be restarted",
                    format!("shell has exited with {status}"),
                ))
            }
            RunOutcome::Complete { stdout, stderr } => Ok(ToolResult::cli(stdout, stderr)),
            RunOutcome::TimedOut { stdout, stderr } => {
                self.timed_out = true;
                warn!(
                    timeout_secs = self.options.timeout.as_secs(),
                    "shell command timed out, session poisoned"
                );
                Err(self.timeout_failure(&stdout, &stderr))
            }
        }
    }

    /// Terminate the shell.
    ///
    /// No-op if the process already exited; otherwise sends `SIGTERM` to
    /// the shell's process group (or kills the child directly when no
    /// process group was created).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` if the session was never started, or
    /// `AppError::Session` if signalling fails.
    pub fn stop(&mut self) -> Result<()> {
        let Some(proc) = self.proc.as_mut() else {
            return Err(AppError::Usage("session has not started".into()));
        };

        if let Ok(Some(_)) = proc.child.try_wait() {
            return Ok(());
        }

        #[cfg(unix)]
        if self.options.spawn.new_process_group {
            if let Some(pid) = proc.child.id() {
                let pgid = i32::try_from(pid)
                    .map_err(|_| AppError::Session(format!("pid {pid} out of range")))?;
                nix::sys::signal::killpg(
                    nix::unistd::Pid::from_raw(pgid),
                    nix::sys::signal::Signal::SIGTERM,
                )
                .map_err(|err| {
                    AppError::Session(format!("failed to signal process group: {err}"))
                })?;
                debug!(pid, "sent SIGTERM to shell process group");
                return Ok(());
            }
        }

        proc.child
            .start_kill()
            .map_err(|err| AppError::Session(format!("failed to kill shell: {err}")))?;
        Ok(())
    }

    /// Write the framed command and resolve its [`RunOutcome`].
    async fn submit(&mut self, command: &str) -> Result<RunOutcome> {
        let Some(proc) = self.proc.as_mut() else {
            return Err(AppError::Usage("session has not started".into()));
        };

        if let Some(status) = proc
            .child
            .try_wait()
            .map_err(|err| AppError::Session(format!("failed to poll shell status: {err}")))?
        {
            return Ok(RunOutcome::Exited(status));
        }

        // Fail fast on a poisoned session without touching the process.
        if self.timed_out {
            return Err(self.poisoned_failure());
        }

        let framed = format!("{command}; echo '{}'\n", self.sentinel);
        proc.stdin
            .write_all(framed.as_bytes())
            .await
            .map_err(|err| AppError::Session(format!("failed to write to shell stdin: {err}")))?;
        proc.stdin
            .flush()
            .await
            .map_err(|err| AppError::Session(format!("failed to flush shell stdin: {err}")))?;

        Ok(self.await_sentinel().await)
    }

    /// Poll the stdout buffer until the sentinel appears or the deadline
    /// elapses. The sleep between polls is the loop's only suspension
    /// point, so the scheduler is never blocked.
    async fn await_sentinel(&self) -> RunOutcome {
        let wait = async {
            loop {
                tokio::time::sleep(self.options.poll_interval).await;
                if let Some(index) = self.stdout.find(&self.sentinel) {
                    return index;
                }
            }
        };

        match tokio::time::timeout(self.options.timeout, wait).await {
            Ok(index) => {
                let stdout = self.stdout.drain_to(index);
                let stderr = self.stderr.drain();
                RunOutcome::Complete {
                    stdout: strip_trailing_newline(stdout),
                    stderr: strip_trailing_newline(stderr),
                }
            }
            Err(_) => RunOutcome::TimedOut {
                stdout: self.stdout.snapshot(),
                stderr: self.stderr.snapshot(),
            },
        }
    }

    /// Error for a run attempted on an already-poisoned session.
    fn poisoned_failure(&self) -> AppError {
        AppError::Timeout(format!(
            "timed out: shell has not returned in {} seconds and must be restarted.",
            self.options.timeout.as_secs()
        ))
    }

    /// Error for a freshly timed-out command: spill the full streams to
    /// durable storage and embed truncated previews. If spilling fails,
    /// degrade to previews only rather than losing the timeout signal.
    fn timeout_failure(&self, stdout: &str, stderr: &str) -> AppError {
        let limit = self.options.preview_limit;
        let stdout_preview = overflow::truncate_preview(stdout, limit);
        let stderr_preview = overflow::truncate_preview(stderr, limit);
        let header = format!(
            "timed out: shell has not returned in {} seconds and must be restarted.",
            self.options.timeout.as_secs()
        );

        match (
            overflow::spill("shell_stdout_", stdout),
            overflow::spill("shell_stderr_", stderr),
        ) {
            (Ok(stdout_path), Ok(stderr_path)) => AppError::Timeout(format!(
                "{header}\nFull logs saved to:\n  STDOUT: {}\n  STDERR: {}\nTruncated output:\n  STDOUT: {stdout_preview}\n  STDERR: {stderr_preview}",
                stdout_path.display(),
                stderr_path.display()
            )),
            (spill_out, spill_err) => {
                if let Err(err) = spill_out {
                    warn!(%err, "failed to spill timed-out stdout");
                }
                if let Err(err) = spill_err {
                    warn!(%err, "failed to spill timed-out stderr");
                }
                AppError::Timeout(format!(
                    "{header}\nTruncated output:\n  STDOUT: {stdout_preview}\n  STDERR: {stderr_preview}"
                ))
            }
        }
    }
}

/// Spawn a background task draining one output pipe into a buffer.
fn spawn_reader<R>(mut stream: R, buffer: OutputBuffer)
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = [0u8; 4096];
        loop {
            match stream.read(&mut chunk).await {
                Ok(0) => break,
                Ok(n) => buffer.extend(&chunk[..n]),
                Err(err) => {
                    warn!(%err, "shell output reader failed");
                    break;
                }
            }
        }
    });
}

/// Strip a single trailing newline, matching shell `echo` framing.
fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}
