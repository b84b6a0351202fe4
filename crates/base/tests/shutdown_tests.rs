use base::Shutdown;
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
async fn test_wait_returns_after_trigger() {
    let shutdown = Shutdown::new();
    let waiter = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.wait().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    shutdown.trigger();
    timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter did not wake")
        .expect("waiter panicked");
    assert!(shutdown.is_triggered());
}

#[tokio::test]
async fn test_wait_after_trigger_is_immediate() {
    let shutdown = Shutdown::new();
    shutdown.trigger();
    shutdown.trigger();
    timeout(Duration::from_millis(100), shutdown.wait())
        .await
        .expect("wait should not block once triggered");
}
