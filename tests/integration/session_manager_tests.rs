//! Integration tests for single-slot session management.

use std::time::Duration;

use serial_test::serial;

use evalbox::session::{SessionManager, SessionOptions};
use evalbox::AppError;

fn manager(timeout_secs: u64) -> SessionManager {
    SessionManager::new(SessionOptions {
        shell: "/bin/sh".into(),
        poll_interval: Duration::from_millis(50),
        timeout: Duration::from_secs(timeout_secs),
        ..SessionOptions::default()
    })
}

#[tokio::test]
async fn no_command_and_no_restart_is_a_usage_error() {
    let mut mgr = manager(10);
    let err = mgr.execute(None, false).await.expect_err("must fail");
    assert!(matches!(err, AppError::Usage(_)));
    assert!(err.to_string().contains("no command provided"));
}

#[tokio::test]
async fn session_is_created_lazily_on_first_command() {
    let mut mgr = manager(10);
    let result = mgr.execute(Some("echo hi"), false).await.expect("run");
    assert_eq!(result.output.as_deref(), Some("hi"));
}

#[tokio::test]
async fn restart_without_prior_session_returns_the_fixed_notice() {
    let mut mgr = manager(10);
    let result = mgr.execute(None, true).await.expect("restart");
    assert_eq!(result.system.as_deref(), Some("tool has been restarted."));
    assert_eq!(result.output, None);
}

#[tokio::test]
async fn restart_with_running_session_returns_the_fixed_notice() {
    let mut mgr = manager(10);
    mgr.execute(Some("echo warmup"), false).await.expect("warmup");

    let result = mgr.execute(None, true).await.expect("restart");
    assert_eq!(result.system.as_deref(), Some("tool has been restarted."));
}

#[tokio::test]
async fn restarted_session_loses_shell_state() {
    let mut mgr = manager(10);
    mgr.execute(Some("MARKER=old"), false).await.expect("set");
    mgr.execute(None, true).await.expect("restart");

    let result = mgr.execute(Some("echo x$MARKER"), false).await.expect("read");
    assert_eq!(result.output.as_deref(), Some("x"));
}

#[tokio::test]
#[serial]
async fn restart_recovers_a_poisoned_session() {
    let mut mgr = manager(1);

    let err = mgr
        .execute(Some("sleep 100"), false)
        .await
        .expect_err("must time out");
    assert!(matches!(err, AppError::Timeout(_)));

    // Poisoned session refuses further commands...
    let err = mgr.execute(Some("echo hi"), false).await.expect_err("poisoned");
    assert!(matches!(err, AppError::Timeout(_)));

    // ...until an explicit restart discards it.
    let result = mgr.execute(None, true).await.expect("restart");
    assert_eq!(result.system.as_deref(), Some("tool has been restarted."));

    let result = mgr.execute(Some("echo hi"), false).await.expect("run again");
    assert_eq!(result.output.as_deref(), Some("hi"));
}
