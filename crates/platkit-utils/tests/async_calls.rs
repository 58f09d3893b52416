//! Integration tests for async utility calls driven by a separate pump.
//!
//! In a real host the pump is the main loop calling `run_callbacks` every
//! frame. Here a spawned task stands in for it so the awaiting side and the
//! driving side run concurrently, the way they would in a game.

use std::sync::Arc;
use std::time::Duration;

use platkit_native::LoopbackNative;
use platkit_types::{FileSignature, PeerId};
use platkit_utils::{Utils, UtilsConfig, UtilsError};
use tokio::task::JoinHandle;

fn setup(latency_polls: u32) -> (Arc<Utils<LoopbackNative>>, Arc<LoopbackNative>) {
    let native = Arc::new(LoopbackNative::standalone(PeerId(1)));
    native.with_utils(|u| {
        u.call_latency_polls = latency_polls;
        u.file_signatures
            .insert("bin/game".into(), FileSignature::ValidSignature);
        u.file_signatures
            .insert("bin/tampered".into(), FileSignature::InvalidSignature);
    });
    let utils = Arc::new(Utils::new(Arc::clone(&native), &UtilsConfig::default()));
    (utils, native)
}

/// Pumps pending calls every millisecond until aborted.
fn spawn_pump(utils: &Arc<Utils<LoopbackNative>>) -> JoinHandle<()> {
    let utils = Arc::clone(utils);
    tokio::spawn(async move {
        loop {
            utils.pump_calls();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
}

#[tokio::test]
async fn test_check_file_signature_resolves_when_pumped() {
    let (utils, native) = setup(3);
    let pump = spawn_pump(&utils);

    let signature = utils
        .check_file_signature("bin/game")
        .await
        .expect("call should complete");

    pump.abort();
    assert_eq!(signature, FileSignature::ValidSignature);
    assert_eq!(native.outstanding_calls(), 0);
}

#[tokio::test]
async fn test_check_file_signature_reports_native_verdicts() {
    let (utils, _) = setup(1);
    let pump = spawn_pump(&utils);

    let tampered = utils.check_file_signature("bin/tampered").await.unwrap();
    let missing = utils.check_file_signature("bin/nowhere").await.unwrap();

    pump.abort();
    assert_eq!(tampered, FileSignature::InvalidSignature);
    assert_eq!(missing, FileSignature::FileNotFound);
}

#[tokio::test]
async fn test_concurrent_checks_each_resolve_once() {
    let (utils, _) = setup(2);
    let pump = spawn_pump(&utils);

    let (a, b) = tokio::join!(
        utils.check_file_signature("bin/game"),
        utils.check_file_signature("bin/tampered"),
    );

    pump.abort();
    assert_eq!(a.unwrap(), FileSignature::ValidSignature);
    assert_eq!(b.unwrap(), FileSignature::InvalidSignature);
    assert_eq!(utils.call_results().pending(), 0);
}

#[tokio::test]
async fn test_check_file_signature_failed_call_is_error() {
    let (utils, native) = setup(1);
    native.with_utils(|u| u.fail_calls = true);
    let pump = spawn_pump(&utils);

    let result = utils.check_file_signature("bin/game").await;

    pump.abort();
    assert!(
        matches!(result, Err(UtilsError::CallFailed { call: "check_file_signature", .. })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_check_file_signature_empty_path_is_invalid_call() {
    let (utils, _) = setup(1);

    let result = utils.check_file_signature("").await;

    assert!(matches!(result, Err(UtilsError::InvalidCall(_))));
    assert_eq!(utils.call_results().pending(), 0);
}

#[tokio::test]
async fn test_unpumped_call_stays_pending() {
    let (utils, _) = setup(1);

    let outcome = tokio::time::timeout(
        Duration::from_millis(20),
        utils.check_file_signature("bin/game"),
    )
    .await;

    assert!(outcome.is_err(), "nothing drives the call, so it must not resolve");
    assert_eq!(utils.call_results().pending(), 1);
}

#[cfg(unix)]
#[tokio::test]
async fn test_check_file_signature_non_utf8_path_is_invalid_call() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (utils, native) = setup(1);
    let path = std::path::Path::new(OsStr::from_bytes(b"bin/g\xffame"));

    let result = utils.check_file_signature(path).await;

    assert!(matches!(result, Err(UtilsError::InvalidCall(_))), "got {result:?}");
    assert_eq!(native.outstanding_calls(), 0);
    assert_eq!(utils.call_results().pending(), 0);
}
