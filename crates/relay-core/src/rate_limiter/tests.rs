//! Tests for admission control

use super::*;
use crate::config::{ModelTarget, ProviderKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

fn target(name: &str) -> ModelTarget {
    ModelTarget::new(name, ProviderKind::OpenAi, "gpt-4o-mini")
}

#[tokio::test(start_paused = true)]
async fn test_window_admits_up_to_limit() {
    let window = SlidingWindow::per_minute(2);
    assert!(window.try_record().is_ok());
    assert!(window.try_record().is_ok());

    let wait = window.try_record().unwrap_err();
    assert_eq!(wait, Duration::from_secs(60));
    assert_eq!(window.current_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_window_slides() {
    let window = SlidingWindow::new(1, Duration::from_secs(10));
    assert!(window.try_record().is_ok());

    tokio::time::advance(Duration::from_secs(4)).await;
    assert_eq!(window.try_record().unwrap_err(), Duration::from_secs(6));

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(window.try_record().is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_unlimited_target_always_admitted() {
    let guard = RateGuard::new();
    let target = target("free");
    for _ in 0..100 {
        assert!(guard.admit(&target).is_allowed());
    }
    assert_eq!(guard.window_count("free"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rpm_rejection_carries_hint() {
    let guard = RateGuard::new();
    let target = target("b").with_rpm(1);

    assert!(guard.admit(&target).is_allowed());
    match guard.admit(&target) {
        Admission::Rejected {
            reason,
            retry_after,
        } => {
            assert_eq!(reason, RejectReason::RateLimit);
            assert_eq!(retry_after, Some(Duration::from_secs(60)));
        }
        Admission::Allowed(_) => panic!("second request should be rejected"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_limits_are_per_target() {
    let guard = RateGuard::new();
    let a = target("a").with_rpm(1);
    let b = target("b").with_rpm(1);

    assert!(guard.admit(&a).is_allowed());
    assert!(!guard.admit(&a).is_allowed());
    assert!(guard.admit(&b).is_allowed());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_slot_released_on_drop() {
    let guard = RateGuard::new();
    let target = target("c").with_max_concurrent(1);

    let first = guard.admit(&target);
    assert!(first.is_allowed());
    assert_eq!(guard.in_flight("c"), 1);

    match guard.admit(&target) {
        Admission::Rejected { reason, .. } => assert_eq!(reason, RejectReason::Concurrency),
        Admission::Allowed(_) => panic!("slot should be taken"),
    }

    drop(first);
    assert_eq!(guard.in_flight("c"), 0);
    assert!(guard.admit(&target).is_allowed());
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_rejection_does_not_charge_window() {
    let guard = RateGuard::new();
    let target = target("d").with_rpm(5).with_max_concurrent(1);

    let _held = guard.admit(&target);
    assert!(!guard.admit(&target).is_allowed());
    assert_eq!(guard.window_count("d"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_never_exceed_rpm() {
    let guard = Arc::new(RateGuard::new());
    let target = target("shared").with_rpm(10);
    let start = Arc::new(Barrier::new(32));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let guard = guard.clone();
        let target = target.clone();
        let start = start.clone();
        handles.push(tokio::spawn(async move {
            start.wait().await;
            guard.admit(&target).is_allowed()
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 10);
    assert_eq!(guard.window_count("shared"), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_respect_slot_pool() {
    let guard = Arc::new(RateGuard::new());
    let target = target("slots").with_max_concurrent(3);
    let start = Arc::new(Barrier::new(16));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let guard = guard.clone();
        let target = target.clone();
        let start = start.clone();
        handles.push(tokio::spawn(async move {
            start.wait().await;
            guard.admit(&target)
        }));
    }

    let mut held = Vec::new();
    for handle in handles {
        held.push(handle.await.unwrap());
    }
    let admitted = held.iter().filter(|admission| admission.is_allowed()).count();
    assert_eq!(admitted, 3);
    assert_eq!(guard.in_flight("slots"), 3);

    drop(held);
    assert_eq!(guard.in_flight("slots"), 0);
}
