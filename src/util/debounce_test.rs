use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn bump(count: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
    let count = Arc::clone(count);
    move || {
        count.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn fires_once_after_delay() {
    let count = counter();
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    debouncer.schedule(bump(&count));

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(debouncer.is_pending());

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn burst_within_window_fires_once() {
    let count = counter();
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    for _ in 0..6 {
        debouncer.schedule(bump(&count));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_prevents_firing() {
    let count = counter();
    let mut debouncer = Debouncer::new(Duration::from_millis(500));
    debouncer.schedule(bump(&count));
    assert!(debouncer.cancel());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!debouncer.cancel());
}

#[tokio::test(start_paused = true)]
async fn reschedule_does_not_interrupt_started_work() {
    let count = counter();
    let mut debouncer = Debouncer::new(Duration::from_millis(500));

    let slow = Arc::clone(&count);
    debouncer.schedule(move || async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        slow.fetch_add(1, Ordering::SeqCst);
    });
    tokio::time::sleep(Duration::from_millis(600)).await;

    debouncer.schedule(bump(&count));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn drop_cancels_pending_timer() {
    let count = counter();
    {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        debouncer.schedule(bump(&count));
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}
