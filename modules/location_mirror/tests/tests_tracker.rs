// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::address::PageAddress;
use geolocation::{PositionSink, WatchOptions, scripted_source::ScriptedLocationSource};
use location_mirror::{
    address_bar::{AddressBar, MemoryAddressBar},
    tracker::{StartOutcome, Tracker, TrackerError, TrackerState},
};
use module_core::EventBus;
use std::time::Duration;

fn create_tracker(eb: &EventBus, source: ScriptedLocationSource) -> Tracker<ScriptedLocationSource> {
    Tracker::new(
        source,
        WatchOptions::default(),
        PositionSink::new(eb.sender()),
    )
}

#[test]
fn start_without_capability_fails() {
    let eb = EventBus::default();
    let source = ScriptedLocationSource::unavailable();
    let mut tracker = create_tracker(&eb, source.clone());

    assert_eq!(tracker.start(), Err(TrackerError::CapabilityUnavailable));
    assert_eq!(tracker.state(), TrackerState::NotStarted);
    assert_eq!(source.active_watches(), 0);
}

#[test]
fn stop_without_watch_is_noop() {
    let eb = EventBus::default();
    let mut tracker = create_tracker(&eb, ScriptedLocationSource::walk(1, Duration::from_millis(1)));
    assert_eq!(tracker.stop(), None);
    assert!(!tracker.is_tracking());
}

#[tokio::test]
#[test_log::test]
async fn start_is_idempotent() {
    let eb = EventBus::default();
    let source = ScriptedLocationSource::walk(1, Duration::from_millis(1));
    let mut tracker = create_tracker(&eb, source.clone());

    let first = tracker.start().unwrap();
    let StartOutcome::Started(id) = first else {
        panic!("First start didn't register a watch: {first:?}");
    };
    assert_eq!(tracker.start(), Ok(StartOutcome::AlreadyTracking(id)));
    assert_eq!(tracker.state(), TrackerState::Tracking(id));
    assert_eq!(source.active_watches(), 1);
    assert_eq!(source.registrations().len(), 1);
}

#[tokio::test]
#[test_log::test]
async fn watch_uses_configured_options() {
    let eb = EventBus::default();
    let source = ScriptedLocationSource::walk(1, Duration::from_millis(1));
    let options = WatchOptions {
        enable_high_accuracy: false,
        maximum_age: Duration::from_secs(1),
        timeout: Duration::from_millis(250),
    };
    let mut tracker = Tracker::new(source.clone(), options, PositionSink::new(eb.sender()));
    tracker.start().unwrap();
    assert_eq!(tracker.options(), &options);
    assert_eq!(source.registrations(), vec![options]);
}

#[tokio::test]
#[test_log::test]
async fn restart_after_stop_registers_new_watch() {
    let eb = EventBus::default();
    let source = ScriptedLocationSource::walk(1, Duration::from_millis(1));
    let mut tracker = create_tracker(&eb, source.clone());

    let first = tracker.start().unwrap().watch_id();
    assert_eq!(tracker.stop(), Some(first));
    assert_eq!(source.active_watches(), 0);
    assert_eq!(tracker.active_watch(), None);

    let second = tracker.start().unwrap();
    assert!(matches!(second, StartOutcome::Started(id) if id != first));
    assert_eq!(source.active_watches(), 1);
}

#[test]
fn memory_address_bar_replaces_current_entry() {
    let mut address_bar = MemoryAddressBar::new(PageAddress::parse("/a"));
    address_bar.push(PageAddress::parse("/b?x=1"));
    address_bar
        .replace(&PageAddress::parse("/b?x=1&lat=1&lon=2"))
        .unwrap();
    assert_eq!(address_bar.len(), 2);
    assert_eq!(
        address_bar.current().unwrap().to_string(),
        "/b?x=1&lat=1&lon=2"
    );
}

#[test]
fn memory_address_bar_clones_share_history() {
    let address_bar = MemoryAddressBar::new(PageAddress::parse("/"));
    let mut writer = address_bar.clone();
    writer.replace(&PageAddress::parse("/?lat=3&lon=4")).unwrap();
    assert_eq!(address_bar.address().to_string(), "/?lat=3&lon=4");
}
