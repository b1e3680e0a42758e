//! Shared test utilities for portal integration tests.
//!
//! This module provides:
//! - `TestHarness` for a fresh record store over in-memory storage and a
//!   pinned clock
//! - Draft builders for each domain

#![allow(dead_code)]

pub mod builders;

pub use builders::*;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use portal::{Clock, FixedClock, MemoryStore, RecordStore};

/// Isolated record store with a controllable clock.
pub struct TestHarness {
    pub store: RecordStore<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

impl TestHarness {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(Self::epoch()));
        let store = RecordStore::new(MemoryStore::new()).with_clock(clock.clone());
        Self { store, clock }
    }

    /// The instant every harness starts at.
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Moves the clock forward so successive writes get distinct timestamps.
    pub fn tick(&self) {
        self.clock.advance(Duration::seconds(1));
    }
}
