// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use clap::{CommandFactory, Parser};
use common::address::PageAddress;
use geolocation::{
    WatchOptions, samples_file::read_samples_from_file,
    scripted_source::ScriptedLocationSource,
};
use location_mirror::{LocationMirror, address_bar::MemoryAddressBar, notice::LogNotices};
use module_core::{Event, EventBus, EventKind, Module};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::broadcast::{Sender, error::RecvError};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use trigger::{Intent, Trigger, TriggerMode};

/// Mirrors simulated device positions into the query string of a page address.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address of the page before tracking starts.
    #[arg(short, long, default_value = "/")]
    address: PageAddress,
    /// CSV file with `latitude,longitude[,accuracy]` samples to replay.
    #[arg(short, long)]
    samples: Option<PathBuf>,
    /// Simulate a walk of the given number of samples.
    #[arg(short, long)]
    walk: Option<usize>,
    /// Interval between two samples in milliseconds.
    #[arg(short, long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,
    /// Time a sample may take before the watch reports a timeout, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,
    /// When tracking starts: page-ready, immediate or click[:<element id>].
    #[arg(short, long, default_value = "page-ready")]
    trigger: TriggerMode,
    /// Element ids to click once the page is ready, in order.
    #[arg(short, long)]
    click: Vec<String>,
    /// Delay before each click in milliseconds.
    #[arg(long, default_value_t = 0)]
    click_after_ms: u64,
    /// Element id whose clicks stop tracking.
    #[arg(long)]
    stop_element: Option<String>,
    /// Simulate a host without location capability.
    #[arg(long)]
    no_geolocation: bool,
}

fn create_source(cli: &Cli) -> Result<ScriptedLocationSource, ()> {
    let interval = Duration::from_millis(cli.interval_ms);
    if cli.no_geolocation {
        Ok(ScriptedLocationSource::unavailable())
    } else if let Some(file_path) = &cli.samples {
        let samples = read_samples_from_file(file_path).map_err(|e| {
            error!("Failed to read samples from {}. Error: {e}", file_path.display());
        })?;
        Ok(ScriptedLocationSource::from_samples(&samples, interval))
    } else if let Some(count) = cli.walk {
        Ok(ScriptedLocationSource::walk(count, interval))
    } else {
        error!("No position source specified. Use --samples, --walk or --no-geolocation");
        let _ = Cli::command().print_help();
        Err(())
    }
}

fn install_quit_handler(eb: &EventBus) -> Result<(), ()> {
    let sender = eb.sender();
    ctrlc::set_handler(move || {
        let _ = sender.send(Event {
            kind: EventKind::QuitEvent,
        });
    })
    .map_err(|e| error!("Failed to install the Ctrl-C handler. Error: {e}"))
}

/// Publishes a click on every element in order, waiting `delay` before each.
async fn publish_clicks(sender: Sender<Event>, element_ids: Vec<String>, delay: Duration) {
    for element_id in element_ids {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!("Clicking '{element_id}'");
        let _ = sender.send(Event {
            kind: EventKind::ElementClickedEvent(Arc::from(element_id.as_str())),
        });
    }
}

async fn print_addresses(mut receiver: tokio::sync::broadcast::Receiver<Event>) -> Result<(), ()> {
    loop {
        match receiver.recv().await {
            Ok(event) => match event.kind {
                EventKind::AddressChangedEvent(address) => println!("{address}"),
                EventKind::QuitEvent => return Ok(()),
                _ => (),
            },
            Err(RecvError::Lagged(skipped)) => {
                error!("Address printer skipped {skipped} events");
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = create_source(&cli)?;
    let eb = EventBus::default();
    let options = WatchOptions {
        timeout: Duration::from_millis(cli.timeout_ms),
        ..Default::default()
    };
    let mut mirror = LocationMirror::with_options(
        eb.context(),
        source,
        options,
        MemoryAddressBar::new(cli.address.clone()),
        LogNotices,
    );
    let mut trigger = Trigger::new(eb.context(), cli.trigger.clone());
    if let Some(element_id) = &cli.stop_element {
        trigger = trigger.with_route(element_id, Intent::StopTracking);
    }
    let printer = print_addresses(eb.subscribe());
    install_quit_handler(&eb)?;

    eb.publish(&Event {
        kind: EventKind::PageReadyEvent,
    });
    let clicks = publish_clicks(
        eb.sender(),
        cli.click.clone(),
        Duration::from_millis(cli.click_after_ms),
    );

    info!("Starting modules with trigger {}...", cli.trigger);
    let (mirror_result, trigger_result, printer_result, ()) =
        tokio::join!(mirror.run(), trigger.run(), printer, clicks);
    mirror_result.and(trigger_result).and(printer_result)
}
