// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Polling scheduler: the Idle/Active lifecycle of periodic fetches.
//!
//! The scheduler owns the ticker task and the bookkeeping that decides
//! whether a tick may start a fetch and whether a fetch result may be
//! applied. It never touches the store itself.
//!
//! Every `start` opens a new generation. Ticks and fetch results carry the
//! generation they were issued under, and anything from an older generation
//! is dropped. At most one fetch is in flight at a time, across generations.
//! A tick skipped because an older generation's fetch was still running is
//! remembered, and handed out again by
//! [`take_deferred`](PollScheduler::take_deferred) once that fetch finishes,
//! so a restart never waits a full interval for its first fetch.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Polling lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
}

/// Permission to run one fetch, returned by [`PollScheduler::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a successful fetch means for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The store grew past the last observed count.
    pub new_messages: bool,
    /// The previous fetch had failed.
    pub recovered: bool,
}

/// Fixed-interval poll driver with skip-if-busy semantics.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    state: PollState,
    generation: u64,
    in_flight: Option<u64>,
    /// Generation whose tick was skipped behind an older generation's fetch.
    deferred: Option<u64>,
    ticker: Option<JoinHandle<()>>,
    last_observed_count: usize,
    last_fetch_failed: bool,
    completed_fetches: u64,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        PollScheduler {
            interval,
            state: PollState::Idle,
            generation: 0,
            in_flight: None,
            deferred: None,
            ticker: None,
            last_observed_count: 0,
            last_fetch_failed: false,
            completed_fetches: 0,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PollState::Active
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while a fetch has been started and not finished.
    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_observed_count(&self) -> usize {
        self.last_observed_count
    }

    pub fn last_fetch_failed(&self) -> bool {
        self.last_fetch_failed
    }

    /// Number of fetch results applied, successful or not.
    pub fn completed_fetches(&self) -> u64 {
        self.completed_fetches
    }

    /// Moves Idle to Active and arms the ticker.
    ///
    /// The first tick fires immediately. Calling this while Active does
    /// nothing and returns false.
    pub fn start(&mut self, ticks: mpsc::UnboundedSender<u64>) -> bool {
        if self.is_active() {
            return false;
        }
        self.generation += 1;
        self.state = PollState::Active;

        let generation = self.generation;
        let period = self.interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if ticks.send(generation).is_err() {
                    break;
                }
            }
        }));

        info!(generation, interval_ms = period.as_millis() as u64, "polling started");
        true
    }

    /// Moves Active to Idle and cancels the ticker.
    ///
    /// An in-flight fetch is not cancelled, but its result will be refused by
    /// [`finish_fetch`](Self::finish_fetch). Returns false if already Idle.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.generation += 1;
        self.state = PollState::Idle;
        info!(generation = self.generation, "polling stopped");
        true
    }

    /// Handles a tick. Returns a ticket if a fetch should start now.
    pub fn on_tick(&mut self, generation: u64) -> Option<FetchTicket> {
        if !self.is_active() || generation != self.generation {
            debug!(generation, current = self.generation, "stale tick dropped");
            return None;
        }
        if let Some(running) = self.in_flight {
            if running != generation {
                self.deferred = Some(generation);
            }
            debug!(generation, running, "fetch still in flight, tick skipped");
            return None;
        }
        self.in_flight = Some(generation);
        Some(FetchTicket { generation })
    }

    /// Marks the fetch for `ticket` finished.
    ///
    /// Returns true if its result may be applied, which is only the case if
    /// polling is still Active under the same generation.
    pub fn finish_fetch(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        let live = self.is_active() && ticket.generation == self.generation;
        if !live {
            debug!(generation = ticket.generation, "late fetch result dropped");
        }
        live
    }

    /// Returns a ticket for a tick deferred behind an older fetch, if it is
    /// still current and nothing is in flight any more.
    pub fn take_deferred(&mut self) -> Option<FetchTicket> {
        let generation = self.deferred.take()?;
        if !self.is_active() || generation != self.generation || self.in_flight.is_some() {
            return None;
        }
        debug!(generation, "running deferred fetch");
        self.in_flight = Some(generation);
        Some(FetchTicket { generation })
    }

    /// Records an applied fetch and the store size after it.
    pub fn record_success(&mut self, new_count: usize) -> TickReport {
        let report = TickReport {
            new_messages: new_count > self.last_observed_count,
            recovered: self.last_fetch_failed,
        };
        self.last_observed_count = new_count;
        self.last_fetch_failed = false;
        self.completed_fetches += 1;
        report
    }

    /// Records a failed fetch. Returns true if the previous one succeeded.
    pub fn record_failure(&mut self) -> bool {
        let first = !self.last_fetch_failed;
        self.last_fetch_failed = true;
        self.completed_fetches += 1;
        first
    }

    /// Overrides the observed count, e.g. after an import replaced the store.
    pub fn observe(&mut self, count: usize) {
        self.last_observed_count = count;
    }

    /// Clears the per-conversation bookkeeping. Lifecycle state is kept.
    pub fn reset(&mut self) {
        self.last_observed_count = 0;
        self.last_fetch_failed = false;
        self.completed_fetches = 0;
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
