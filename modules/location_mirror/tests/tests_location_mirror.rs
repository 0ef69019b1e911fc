// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::{
    address::PageAddress,
    position::{PositionError, PositionSample, WatchId},
};
use geolocation::{
    WatchOptions,
    scripted_source::{ScriptStep, ScriptedLocationSource},
};
use location_mirror::{
    LocationMirror, address_bar::MemoryAddressBar, notice::Notice,
    test_helper::RecordingNotices,
};
use module_core::{
    Event, EventBus, EventKind, EventKindType, Module, PositionFailure, PositionUpdate,
    payload_ref,
    test_helper::{expect_no_event, stop_module, wait_for_event},
};
use std::{sync::Arc, time::Duration};

const TIMEOUT_MS: u64 = 100;
const STEP_INTERVAL_MS: u64 = 5;

struct Mirror {
    handle: tokio::task::JoinHandle<Result<(), ()>>,
    address_bar: MemoryAddressBar,
    notices: RecordingNotices,
}

fn wait_duration() -> Duration {
    Duration::from_millis(TIMEOUT_MS)
}

fn create_module(eb: &EventBus, source: ScriptedLocationSource, address: &str) -> Mirror {
    let address_bar = MemoryAddressBar::new(PageAddress::parse(address));
    let notices = RecordingNotices::default();
    let mut mirror = LocationMirror::new(
        eb.context(),
        source,
        address_bar.clone(),
        notices.clone(),
    );
    let handle = tokio::spawn(async move { mirror.run().await });
    Mirror {
        handle,
        address_bar,
        notices,
    }
}

fn script(steps: Vec<ScriptStep>) -> ScriptedLocationSource {
    ScriptedLocationSource::new(steps, Duration::from_millis(STEP_INTERVAL_MS))
}

fn sample(latitude: f64, longitude: f64) -> ScriptStep {
    ScriptStep::Sample(PositionSample::new(latitude, longitude))
}

fn request_tracking(eb: &EventBus) {
    eb.publish(&Event {
        kind: EventKind::StartTrackingRequestEvent,
    });
}

async fn next_address(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> String {
    let event = wait_for_event(rx, wait_duration(), EventKindType::AddressChangedEvent).await;
    payload_ref!(event.kind, EventKind::AddressChangedEvent)
        .unwrap()
        .to_string()
}

#[tokio::test]
#[test_log::test]
async fn mirror_samples_into_query() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![sample(48.8566, 2.3522), sample(40.7128, -74.0060)]);
    let mut mirror = create_module(&eb, source, "/track?foo=bar");

    request_tracking(&eb);

    assert_eq!(
        next_address(&mut rx).await,
        "/track?foo=bar&lat=48.8566&lon=2.3522"
    );
    assert_eq!(
        next_address(&mut rx).await,
        "/track?foo=bar&lat=40.7128&lon=-74.006"
    );
    assert_eq!(
        mirror.address_bar.address().to_string(),
        "/track?foo=bar&lat=40.7128&lon=-74.006"
    );
    assert_eq!(mirror.address_bar.len(), 1);

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn replace_keeps_history_length() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![sample(1.0, 2.0)]);
    let mut mirror = create_module(&eb, source, "/");
    mirror.address_bar.push(PageAddress::parse("/track?page=2#top"));
    assert_eq!(mirror.address_bar.len(), 2);

    request_tracking(&eb);

    assert_eq!(next_address(&mut rx).await, "/track?page=2&lat=1&lon=2#top");
    assert_eq!(mirror.address_bar.len(), 2);

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn failure_keeps_previous_coordinates() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![
        sample(48.8566, 2.3522),
        ScriptStep::Failure(PositionError::Timeout),
    ]);
    let mut mirror = create_module(&eb, source, "/track?foo=bar");

    request_tracking(&eb);

    assert_eq!(
        next_address(&mut rx).await,
        "/track?foo=bar&lat=48.8566&lon=2.3522"
    );
    wait_for_event(&mut rx, wait_duration(), EventKindType::PositionErrorEvent).await;
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::AddressChangedEvent,
    )
    .await;

    assert_eq!(
        mirror.address_bar.address().to_string(),
        "/track?foo=bar&lat=48.8566&lon=2.3522"
    );
    assert_eq!(
        mirror.notices.notices(),
        vec![Notice::SampleFailed(PositionError::Timeout)]
    );

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn failure_before_first_sample_leaves_address_untouched() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![ScriptStep::Failure(PositionError::PermissionDenied)]);
    let mut mirror = create_module(&eb, source, "/track?foo=bar");

    request_tracking(&eb);

    wait_for_event(&mut rx, wait_duration(), EventKindType::PositionErrorEvent).await;
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::AddressChangedEvent,
    )
    .await;
    let address = mirror.address_bar.address();
    assert!(!address.query().contains("lat"));
    assert!(!address.query().contains("lon"));
    assert_eq!(
        mirror.notices.notices(),
        vec![Notice::SampleFailed(PositionError::PermissionDenied)]
    );
    assert!(!mirror.handle.is_finished());

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn last_sample_wins_despite_failures() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![
        sample(10.0, 20.0),
        ScriptStep::Failure(PositionError::PositionUnavailable),
        sample(11.5, 21.5),
        ScriptStep::Failure(PositionError::Timeout),
        sample(12.25, -22.75),
    ]);
    let mut mirror = create_module(&eb, source, "/run?user=7");

    request_tracking(&eb);

    next_address(&mut rx).await;
    next_address(&mut rx).await;
    assert_eq!(
        next_address(&mut rx).await,
        "/run?user=7&lat=12.25&lon=-22.75"
    );
    assert_eq!(
        mirror.address_bar.address().to_string(),
        "/run?user=7&lat=12.25&lon=-22.75"
    );
    assert_eq!(
        mirror.notices.notices(),
        vec![
            Notice::SampleFailed(PositionError::PositionUnavailable),
            Notice::SampleFailed(PositionError::Timeout),
        ]
    );

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn missing_capability_creates_no_watch() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = ScriptedLocationSource::unavailable();
    let observer = source.clone();
    let mut mirror = create_module(&eb, source, "/track?foo=bar");

    request_tracking(&eb);

    wait_for_event(
        &mut rx,
        wait_duration(),
        EventKindType::CapabilityUnavailableEvent,
    )
    .await;
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::AddressChangedEvent,
    )
    .await;
    assert_eq!(observer.active_watches(), 0);
    assert!(observer.registrations().is_empty());
    assert_eq!(mirror.address_bar.address().to_string(), "/track?foo=bar");
    assert_eq!(mirror.notices.notices(), vec![Notice::CapabilityUnavailable]);

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn repeated_start_registers_single_watch() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![sample(1.0, 1.0)]);
    let observer = source.clone();
    let mut mirror = create_module(&eb, source, "/");

    request_tracking(&eb);
    request_tracking(&eb);
    request_tracking(&eb);

    wait_for_event(&mut rx, wait_duration(), EventKindType::TrackingStartedEvent).await;
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::TrackingStartedEvent,
    )
    .await;
    assert_eq!(observer.active_watches(), 1);
    assert_eq!(observer.registrations(), vec![WatchOptions::default()]);

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn stop_clears_watch_and_ignores_late_samples() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = script(vec![sample(5.0, 6.0)]);
    let observer = source.clone();
    let mut mirror = create_module(&eb, source, "/");

    request_tracking(&eb);
    let started = wait_for_event(&mut rx, wait_duration(), EventKindType::TrackingStartedEvent).await;
    let watch_id = *payload_ref!(started.kind, EventKind::TrackingStartedEvent).unwrap();
    assert_eq!(next_address(&mut rx).await, "/?lat=5&lon=6");

    eb.publish(&Event {
        kind: EventKind::StopTrackingRequestEvent,
    });
    let stopped = wait_for_event(&mut rx, wait_duration(), EventKindType::TrackingStoppedEvent).await;
    assert_eq!(
        payload_ref!(stopped.kind, EventKind::TrackingStoppedEvent),
        Some(&watch_id)
    );
    assert_eq!(observer.active_watches(), 0);

    eb.publish(&Event {
        kind: EventKind::PositionEvent(Arc::new(PositionUpdate {
            watch_id,
            sample: PositionSample::new(7.0, 8.0),
        })),
    });
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::AddressChangedEvent,
    )
    .await;
    assert_eq!(mirror.address_bar.address().to_string(), "/?lat=5&lon=6");

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn events_of_unknown_watches_are_ignored() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let mut mirror = create_module(&eb, script(vec![]), "/track");

    eb.publish(&Event {
        kind: EventKind::PositionEvent(Arc::new(PositionUpdate {
            watch_id: WatchId(99),
            sample: PositionSample::new(1.0, 2.0),
        })),
    });
    eb.publish(&Event {
        kind: EventKind::PositionErrorEvent(Arc::new(PositionFailure {
            watch_id: WatchId(99),
            error: PositionError::Timeout,
        })),
    });
    expect_no_event(
        &mut rx,
        Duration::from_millis(50),
        EventKindType::AddressChangedEvent,
    )
    .await;
    assert_eq!(mirror.address_bar.address().to_string(), "/track");
    assert!(mirror.notices.notices().is_empty());

    stop_module(&eb, &mut mirror.handle).await;
}

#[tokio::test]
#[test_log::test]
async fn quit_clears_active_watch() {
    let eb = EventBus::default();
    let mut rx = eb.subscribe();
    let source = ScriptedLocationSource::walk(1000, Duration::from_millis(STEP_INTERVAL_MS));
    let observer = source.clone();
    let mut mirror = create_module(&eb, source, "/");

    request_tracking(&eb);
    wait_for_event(&mut rx, wait_duration(), EventKindType::TrackingStartedEvent).await;
    assert_eq!(observer.active_watches(), 1);

    stop_module(&eb, &mut mirror.handle).await;
    assert_eq!(observer.active_watches(), 0);
}
