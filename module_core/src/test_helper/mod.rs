// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{Event, EventBus, EventKind, EventKindType};
use tokio::time::timeout;
use tracing::debug;

/// Sends a quit signal to a running module and waits for it to stop gracefully.
///
/// This function publishes a [`QuitEvent`](EventKind::QuitEvent) through the given [`EventBus`],
/// signaling the target module to terminate. It then waits for the module's task
/// to complete within a fixed timeout.
///
/// # Panics
/// This function panics if:
/// - The module does not stop within the timeout.
/// - The task returns an error (`Err(())`).
pub async fn stop_module(
    event_bus: &EventBus,
    handle: &mut tokio::task::JoinHandle<Result<(), ()>>,
) {
    event_bus.publish(&Event {
        kind: EventKind::QuitEvent,
    });
    timeout(std::time::Duration::from_millis(100), handle)
        .await
        .expect("Module doesn't handle quit event in timeout")
        .expect("Module task panicked")
        .expect("Module returned an error");
}

/// Waits for an [`Event`] of the given type to be received on `rx` within
/// `duration`.
///
/// The total waiting time is divided into ten polling steps so the function
/// stays responsive. Events of other types are skipped.
///
/// # Panics
///
/// This function panics if no matching event is received within `duration`.
pub async fn wait_for_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    duration: std::time::Duration,
    exp_event: EventKindType,
) -> Event {
    let step_duration = duration / 10;
    for _ in 0..10 {
        let deadline = tokio::time::Instant::now() + step_duration;
        while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
            debug!("wait_for_event received {:?}", event.event_type());
            if event.event_type() == exp_event {
                return event;
            }
        }
    }
    panic!("Failed to receive event of type {:?}", exp_event);
}

/// Asserts that no [`Event`] of the given type is received on `rx` within
/// `duration`.
///
/// # Panics
///
/// This function panics if a matching event arrives before `duration` elapses.
pub async fn expect_no_event(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    duration: std::time::Duration,
    unexpected: EventKindType,
) {
    let deadline = tokio::time::Instant::now() + duration;
    while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        if event.event_type() == unexpected {
            panic!("Received unexpected event {:?}", event);
        }
    }
}
