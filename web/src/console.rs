// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use tracing_subscriber::{filter::LevelFilter, prelude::*};
use tracing_web::MakeWebConsoleWriter;

/// Routes `tracing` output to the browser console, `error!` to
/// `console.error`, `warn!` to `console.warn` and so on.
pub fn init_logging() {
    // No clock on wasm32-unknown-unknown.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());
    let _ = tracing_subscriber::registry()
        .with(LevelFilter::INFO)
        .with(console_layer)
        .try_init();
}
