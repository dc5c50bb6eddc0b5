use kudos_sync::retry::{retry, with_deadline};
use kudos_sync::{RetryPolicy, SyncError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const POLICY: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    base_delay_ms: 100,
    max_delay_ms: 400,
};

#[tokio::test(start_paused = true)]
async fn transient_errors_are_retried_until_success() {
    let calls = AtomicUsize::new(0);
    let counter = &calls;
    let value = retry(&POLICY, Duration::from_secs(1), "read", || async move {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(SyncError::Network("connection reset".into()))
        } else {
            Ok(7)
        }
    })
    .await
    .unwrap();

    assert_eq!(value, 7);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let calls = AtomicUsize::new(0);
    let counter = &calls;
    let err = retry(&POLICY, Duration::from_secs(1), "read", || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(SyncError::Http {
            status: 503,
            body: String::new(),
        })
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Http { status: 503, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn permanent_errors_are_not_retried() {
    let calls = AtomicUsize::new(0);
    let counter = &calls;
    let err = retry(&POLICY, Duration::from_secs(1), "read", || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<(), _>(SyncError::Http {
            status: 404,
            body: "not found".into(),
        })
    })
    .await
    .unwrap_err();

    assert!(!err.is_transient());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_call_times_out() {
    let err = with_deadline(Duration::from_secs(2), async {
        std::future::pending::<()>().await;
        Ok(())
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SyncError::Timeout(d) if d == Duration::from_secs(2)));
    assert!(err.is_transient());
}

#[tokio::test(start_paused = true)]
async fn each_attempt_gets_a_fresh_deadline() {
    let calls = AtomicUsize::new(0);
    let counter = &calls;
    let value = retry(&POLICY, Duration::from_secs(1), "read", || async move {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok("done")
    })
    .await
    .unwrap();

    assert_eq!(value, "done");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn transient_classification() {
    assert!(SyncError::Http { status: 429, body: String::new() }.is_transient());
    assert!(SyncError::Http { status: 500, body: String::new() }.is_transient());
    assert!(!SyncError::Http { status: 400, body: String::new() }.is_transient());
    assert!(!SyncError::Config("bad".into()).is_transient());
    assert!(SyncError::Chain(kudos_chain::ChainError::transient("busy")).is_transient());
    assert!(!SyncError::Chain(kudos_chain::ChainError::Reverted("nope".into())).is_transient());
}
