use super::*;
use tokio::time::{advance, sleep};

#[tokio::test(start_paused = true)]
async fn notification_expires_after_ttl() {
    let mut center = NotificationCenter::default();
    assert_eq!(center.ttl(), Duration::from_secs(3));

    center.notify("Product added successfully");
    assert_eq!(
        center.current().as_deref(),
        Some("Product added successfully")
    );

    sleep(Duration::from_millis(2_900)).await;
    assert!(center.current().is_some());

    sleep(Duration::from_millis(200)).await;
    assert!(center.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn newer_notification_restarts_the_clock() {
    let mut center = NotificationCenter::default();
    center.notify("A");
    sleep(Duration::from_millis(800)).await;
    center.notify("B");

    // Past the first message's deadline, the second one is still visible.
    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(center.current().as_deref(), Some("B"));

    sleep(Duration::from_millis(600)).await;
    assert!(center.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn superseded_timer_never_clears_newer_message() {
    let mut center = NotificationCenter::new(Duration::from_secs(3));
    center.notify("A");
    sleep(Duration::from_secs(2)).await;
    center.notify("B");

    sleep(Duration::from_millis(1_500)).await;
    // Slot content, not just the expiry filter, must still hold "B".
    let slot = center.slot();
    assert_eq!(
        slot.current.as_ref().map(|n| n.message.as_str()),
        Some("B")
    );
}

#[tokio::test(start_paused = true)]
async fn scheduled_clear_empties_the_slot() {
    let mut center = NotificationCenter::new(Duration::from_secs(3));
    center.notify("A");
    sleep(Duration::from_millis(3_100)).await;
    tokio::task::yield_now().await;
    assert!(center.slot().current.is_none());
}

#[tokio::test(start_paused = true)]
async fn dismiss_clears_immediately() {
    let mut center = NotificationCenter::default();
    center.notify("A");
    center.dismiss();
    assert!(center.current().is_none());

    advance(Duration::from_secs(5)).await;
    assert!(center.current().is_none());
}

#[test]
fn notify_outside_runtime_still_sets_message() {
    let mut center = NotificationCenter::new(Duration::from_secs(60));
    center.notify("offline");
    assert_eq!(center.current().as_deref(), Some("offline"));
}

#[tokio::test(start_paused = true)]
async fn huge_ttl_is_clamped_instead_of_overflowing() {
    let mut center = NotificationCenter::new(Duration::from_millis(u64::MAX));
    center.notify("sticky");
    advance(Duration::from_secs(3_600)).await;
    assert_eq!(center.current().as_deref(), Some("sticky"));
}
