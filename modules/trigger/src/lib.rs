// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Trigger Modul
//!
//! Turns page lifecycle and click events into tracking requests.

use async_trait::async_trait;
use module_core::{EventKind, Module, ModuleCtx};
use std::{collections::HashMap, fmt, str::FromStr};
use thiserror::Error;
use tracing::{debug, error, info};

/// Default identifier of the element that starts tracking in click mode.
pub const DEFAULT_START_ELEMENT: &str = "start-tracking";

/// What the user asks for by activating an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    StartTracking,
    StopTracking,
}

impl Intent {
    fn event_kind(&self) -> EventKind {
        match self {
            Intent::StartTracking => EventKind::StartTrackingRequestEvent,
            Intent::StopTracking => EventKind::StopTrackingRequestEvent,
        }
    }
}

/// When tracking starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Start once the page reports that its document is ready.
    PageReady,
    /// Start as soon as the trigger runs.
    Immediate,
    /// Start the first time the element with the given id is clicked.
    Click(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown trigger mode '{0}', expected page-ready, immediate or click[:<element id>]")]
pub struct UnknownTriggerMode(String);

impl FromStr for TriggerMode {
    type Err = UnknownTriggerMode;

    /// Parses `page-ready`, `immediate`, `click` or `click:<element id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page-ready" => Ok(TriggerMode::PageReady),
            "immediate" => Ok(TriggerMode::Immediate),
            "click" => Ok(TriggerMode::Click(DEFAULT_START_ELEMENT.to_string())),
            _ => match s.strip_prefix("click:") {
                Some(id) if !id.is_empty() => Ok(TriggerMode::Click(id.to_string())),
                _ => Err(UnknownTriggerMode(s.to_string())),
            },
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerMode::PageReady => write!(f, "page-ready"),
            TriggerMode::Immediate => write!(f, "immediate"),
            TriggerMode::Click(id) => write!(f, "click:{id}"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Route {
    intent: Intent,
    once: bool,
    fired: bool,
}

/// Maps element identifiers to the intent a click on them expresses.
#[derive(Clone, Debug, Default)]
pub struct DispatchTable {
    routes: HashMap<String, Route>,
}

impl DispatchTable {
    pub fn new() -> Self {
        DispatchTable::default()
    }

    /// Routes every click on `element_id` to `intent`.
    pub fn register(&mut self, element_id: &str, intent: Intent) {
        self.insert(element_id, intent, false);
    }

    /// Routes only the first click on `element_id` to `intent`.
    pub fn register_once(&mut self, element_id: &str, intent: Intent) {
        self.insert(element_id, intent, true);
    }

    fn insert(&mut self, element_id: &str, intent: Intent, once: bool) {
        self.routes.insert(
            element_id.to_string(),
            Route {
                intent,
                once,
                fired: false,
            },
        );
    }

    /// Returns the intent of a click on `element_id`, if any.
    pub fn dispatch(&mut self, element_id: &str) -> Option<Intent> {
        let route = self.routes.get_mut(element_id)?;
        if route.once && route.fired {
            return None;
        }
        route.fired = true;
        Some(route.intent)
    }
}

/// The `Trigger` module publishes tracking requests according to its
/// [`TriggerMode`] and the routes of its [`DispatchTable`].
pub struct Trigger {
    ctx: ModuleCtx,
    mode: TriggerMode,
    table: DispatchTable,
    started: bool,
}

impl Trigger {
    pub fn new(ctx: ModuleCtx, mode: TriggerMode) -> Self {
        let mut table = DispatchTable::new();
        if let TriggerMode::Click(id) = &mode {
            table.register_once(id, Intent::StartTracking);
        }
        Trigger {
            ctx,
            mode,
            table,
            started: false,
        }
    }

    /// Adds a route, e.g. an element that stops tracking.
    pub fn with_route(mut self, element_id: &str, intent: Intent) -> Self {
        self.table.register(element_id, intent);
        self
    }

    fn request(&mut self, intent: Intent) {
        info!("Requesting {:?}", intent);
        if let Err(e) = self.ctx.publish_event(intent.event_kind()) {
            error!("Failed to publish {:?}. Error: {e}", intent);
        }
    }

    fn on_page_ready(&mut self) {
        if self.mode == TriggerMode::PageReady && !self.started {
            self.started = true;
            self.request(Intent::StartTracking);
        }
    }

    fn on_click(&mut self, element_id: &str) {
        match self.table.dispatch(element_id) {
            Some(intent) => self.request(intent),
            None => debug!("No route for clicked element '{element_id}'"),
        }
    }
}

#[async_trait]
impl Module for Trigger {
    async fn run(&mut self) -> Result<(), ()> {
        if self.mode == TriggerMode::Immediate {
            self.started = true;
            self.request(Intent::StartTracking);
        }
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => {
                            match event.kind {
                                EventKind::QuitEvent => run = false,
                                EventKind::PageReadyEvent => self.on_page_ready(),
                                EventKind::ElementClickedEvent(id) => self.on_click(&id),
                                _ => (),
                            }
                        }
                        Err(e) => error!("Failed to receive event in module Trigger. Error: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
}
