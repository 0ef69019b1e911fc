// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::address::PageAddress;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("the current address could not be read: {0}")]
    Unreadable(String),
    #[error("the address replacement was rejected: {0}")]
    Rejected(String),
}

/// Access to the address of the current page.
pub trait AddressBar {
    /// Returns the address that is currently displayed.
    fn current(&self) -> Result<PageAddress, AddressError>;

    /// Replaces the current history entry with `address` without navigating
    /// and without adding a new history entry.
    fn replace(&mut self, address: &PageAddress) -> Result<(), AddressError>;
}

#[derive(Debug)]
struct History {
    entries: Vec<PageAddress>,
    current: usize,
}

/// An in-memory session history.
///
/// Clones share the same history, so a host can keep a handle to observe the
/// address while the location mirror owns another one.
#[derive(Clone, Debug)]
pub struct MemoryAddressBar {
    history: Arc<RwLock<History>>,
}

impl MemoryAddressBar {
    /// Creates a history with `initial` as its only entry.
    pub fn new(initial: PageAddress) -> Self {
        MemoryAddressBar {
            history: Arc::new(RwLock::new(History {
                entries: vec![initial],
                current: 0,
            })),
        }
    }

    /// Navigates to `address`: entries after the current one are dropped and
    /// a new entry is pushed.
    pub fn push(&self, address: PageAddress) {
        let mut history = self
            .history
            .write()
            .unwrap_or_else(|history| history.into_inner());
        let next = history.current + 1;
        history.entries.truncate(next);
        history.entries.push(address);
        history.current = next;
    }

    /// Number of entries in the history.
    pub fn len(&self) -> usize {
        self.read(|history| history.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the address of the current entry.
    pub fn address(&self) -> PageAddress {
        self.read(|history| history.entries[history.current].clone())
    }

    fn read<T>(&self, f: impl FnOnce(&History) -> T) -> T {
        let history = self
            .history
            .read()
            .unwrap_or_else(|history| history.into_inner());
        f(&history)
    }
}

impl AddressBar for MemoryAddressBar {
    fn current(&self) -> Result<PageAddress, AddressError> {
        Ok(self.address())
    }

    fn replace(&mut self, address: &PageAddress) -> Result<(), AddressError> {
        let mut history = self
            .history
            .write()
            .unwrap_or_else(|history| history.into_inner());
        let current = history.current;
        history.entries[current] = address.clone();
        Ok(())
    }
}
