//! Single-slot session ownership.
//!
//! Translates execute/restart requests from the transport front end into
//! [`ShellSession`] operations. At most one session exists at a time; a
//! restart discards the current session (poisoned or not) and starts a
//! fresh one.

use tracing::{info, warn};

use crate::models::ToolResult;
use crate::session::{SessionOptions, ShellSession};
use crate::{AppError, Result};

/// Operational note returned after every restart.
const RESTART_NOTICE: &str = "tool has been restarted.";

/// Owner of at most one [`ShellSession`].
pub struct SessionManager {
    options: SessionOptions,
    session: Option<ShellSession>,
}

impl SessionManager {
    /// Manager with no session yet; one is created lazily on first use.
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            session: None,
        }
    }

    /// Execute a command, optionally restarting the session first.
    ///
    /// A restart stops any existing session (tolerating teardown
    /// failures), starts a fresh one, and returns the fixed restart
    /// notice regardless of prior state. Otherwise a session is created
    /// lazily and `command` is delegated to it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Usage` when neither `restart` nor `command` is
    /// given, plus whatever [`ShellSession::run`] surfaces.
    pub async fn execute(&mut self, command: Option<&str>, restart: bool) -> Result<ToolResult> {
        if restart {
            if let Some(mut session) = self.session.take() {
                if let Err(err) = session.stop() {
                    warn!(%err, "failed to stop session during restart");
                }
            }
            let mut session = ShellSession::new(self.options.clone());
            session.start().await?;
            self.session = Some(session);

            info!("shell session restarted");
            return Ok(ToolResult::system(RESTART_NOTICE));
        }

        if self.session.is_none() {
            let mut session = ShellSession::new(self.options.clone());
            session.start().await?;
            self.session = Some(session);
        }

        if let Some(command) = command {
            let Some(session) = self.session.as_mut() else {
                return Err(AppError::Usage("session has not started".into()));
            };
            return session.run(command).await;
        }

        Err(AppError::Usage("no command provided.".into()))
    }
}
