// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::make_test_record;
use yare::parameterized;

fn report() -> FailureReport {
    FailureReport {
        error: "remote rejected operation: no".into(),
        message: "This change could not be saved.".into(),
        recoverable: false,
    }
}

#[parameterized(
    queued = { SyncEvent::Queued(make_test_record(1)), SyncEventKind::Queued, true },
    started = { SyncEvent::Started, SyncEventKind::Started, false },
    synced = { SyncEvent::Synced(make_test_record(1)), SyncEventKind::Synced, true },
    failed = { SyncEvent::Failed { record: make_test_record(1), report: report() }, SyncEventKind::Failed, true },
    completed = { SyncEvent::Completed(FlushSummary::default()), SyncEventKind::Completed, false },
    cleared = { SyncEvent::Cleared, SyncEventKind::Cleared, false },
)]
fn event_kind_and_record(event: SyncEvent, kind: SyncEventKind, has_record: bool) {
    assert_eq!(event.kind(), kind);
    assert_eq!(event.record().is_some(), has_record);
}

#[test]
fn publish_without_subscribers_is_fine() {
    let notifier = EventNotifier::new(4);
    notifier.publish(SyncEvent::Started);
    assert_eq!(notifier.subscriber_count(), 0);
}

#[test]
fn every_subscriber_sees_events_in_order() {
    let notifier = EventNotifier::new(8);
    let mut a = notifier.subscribe();
    let mut b = notifier.subscribe();

    notifier.publish(SyncEvent::Started);
    notifier.publish(SyncEvent::Completed(FlushSummary { succeeded: 1, ..Default::default() }));

    for rx in [&mut a, &mut b] {
        let kinds: Vec<_> = rx.drain().iter().map(SyncEvent::kind).collect();
        assert_eq!(kinds, vec![SyncEventKind::Started, SyncEventKind::Completed]);
    }
}

#[test]
fn subscriber_only_sees_later_events() {
    let notifier = EventNotifier::new(8);
    notifier.publish(SyncEvent::Cleared);
    let mut rx = notifier.subscribe();
    assert!(rx.try_recv().is_none());
}

#[test]
fn lagging_subscriber_skips_oldest() {
    let notifier = EventNotifier::new(2);
    let mut rx = notifier.subscribe();

    notifier.publish(SyncEvent::Queued(make_test_record(1)));
    notifier.publish(SyncEvent::Queued(make_test_record(2)));
    notifier.publish(SyncEvent::Queued(make_test_record(3)));

    let ids: Vec<_> = rx.drain().iter().filter_map(|e| e.record().map(|r| r.id.wall_ms)).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn recv_kind_filters() {
    let notifier = EventNotifier::new(8);
    let mut rx = notifier.subscribe();

    notifier.publish(SyncEvent::Started);
    notifier.publish(SyncEvent::Synced(make_test_record(7)));
    notifier.publish(SyncEvent::Completed(FlushSummary { succeeded: 1, ..Default::default() }));

    let event = rx.recv_kind(SyncEventKind::Completed).await.unwrap();
    assert_eq!(event, SyncEvent::Completed(FlushSummary { succeeded: 1, ..Default::default() }));
}

#[tokio::test]
async fn recv_ends_when_notifier_dropped() {
    let notifier = EventNotifier::new(8);
    let mut rx = notifier.subscribe();
    drop(notifier);
    assert!(rx.recv().await.is_none());
}
