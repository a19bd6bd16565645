// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Order-offer simulator.
//!
//! Drives the dashboard's availability/order cycle: while a partner is
//! online and idle, an offer appears after a fixed delay, counts down
//! from 30 seconds, and either expires, is rejected, or is accepted and
//! later completed. All timing runs on cancellable tokio tasks owned by
//! the state machine; every transition cancels the timer of the state
//! being left, and a generation counter makes any timer that already
//! fired inert once the state has moved on.
//!
//! Legal transitions (and no others):
//!   idle --arm delay, while available--> offered
//!   offered --countdown 0--> idle           (missed)
//!   offered --reject--> idle
//!   offered --accept--> active
//!   active --complete--> completed
//!   completed --reset delay--> idle         (availability forced true)

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::AbortHandle;

use crate::error::AppError;
use crate::services::notify::{Notification, Notifier};

/// Delay before a new offer appears while online and idle.
pub const ARM_DELAY: Duration = Duration::from_secs(5);
/// Delay between delivery completion and returning to idle.
pub const RESET_DELAY: Duration = Duration::from_millis(1500);
/// Seconds a partner has to react to an offer.
pub const COUNTDOWN_START: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferState {
    Idle,
    Offered,
    Active,
    Completed,
}

impl OfferState {
    fn name(self) -> &'static str {
        match self {
            OfferState::Idle => "idle",
            OfferState::Offered => "offered",
            OfferState::Active => "active",
            OfferState::Completed => "completed",
        }
    }
}

/// The simulated job presented to an available partner.
#[derive(Debug, Clone, Serialize)]
pub struct OfferDetails {
    pub amount: f64,
    pub restaurant_name: String,
    pub pickup: String,
    pub drop_location: String,
    pub eta_minutes: u32,
    pub distance_km: f64,
}

impl OfferDetails {
    fn mock() -> Self {
        Self {
            amount: 85.0,
            restaurant_name: "Hotel Saravana Bhavan".to_string(),
            pickup: "Anna Nagar".to_string(),
            drop_location: "Green Park Apts".to_string(),
            eta_minutes: 25,
            distance_km: 4.2,
        }
    }
}

/// Read-only view of the simulator for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OfferSnapshot {
    pub state: OfferState,
    pub availability: bool,
    /// Remaining seconds; only present while an offer is pending
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<OfferDetails>,
}

struct Inner {
    state: OfferState,
    availability: bool,
    countdown: u32,
    /// The single live timer, if any (arm, countdown, or reset)
    timer: Option<AbortHandle>,
    /// Bumped on every transition; a timer acts only if the generation
    /// it was spawned under is still current
    generation: u64,
}

#[derive(Clone)]
pub struct OfferSimulator {
    inner: Arc<Mutex<Inner>>,
    notifier: Arc<dyn Notifier>,
}

impl OfferSimulator {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: OfferState::Idle,
                availability: false,
                countdown: COUNTDOWN_START,
                timer: None,
                generation: 0,
            })),
            notifier,
        }
    }

    pub fn snapshot(&self) -> OfferSnapshot {
        let inner = self.lock();
        OfferSnapshot {
            state: inner.state,
            availability: inner.availability,
            countdown_seconds: (inner.state == OfferState::Offered).then_some(inner.countdown),
            offer: matches!(inner.state, OfferState::Offered | OfferState::Active)
                .then(OfferDetails::mock),
        }
    }

    /// Toggle availability.
    ///
    /// Going offline cancels a pending arm timer but never interrupts an
    /// offer or delivery that is already underway.
    pub fn set_availability(&self, online: bool) {
        let mut inner = self.lock();
        inner.availability = online;

        if inner.state != OfferState::Idle {
            return;
        }

        if online {
            if inner.timer.is_none() {
                self.spawn_arm_timer(&mut inner);
            }
        } else {
            Self::cancel_timer(&mut inner);
        }
    }

    /// Accept the pending offer.
    pub fn accept(&self) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.state != OfferState::Offered {
            return Err(AppError::InvalidTransition {
                action: "accept",
                state: inner.state.name(),
            });
        }

        Self::cancel_timer(&mut inner);
        inner.state = OfferState::Active;
        self.notifier
            .notify(Notification::success("Order Accepted!", None));
        Ok(())
    }

    /// Reject the pending offer and return to idle.
    pub fn reject(&self) -> Result<(), AppError> {
        let mut inner = self.lock();
        if inner.state != OfferState::Offered {
            return Err(AppError::InvalidTransition {
                action: "reject",
                state: inner.state.name(),
            });
        }

        self.notifier
            .notify(Notification::info("Order Rejected", None));
        self.enter_idle(&mut inner);
        Ok(())
    }

    /// Mark the active delivery as delivered.
    ///
    /// Returns the delivered offer's details so the caller can record an
    /// order for it. After the reset delay, the simulator returns to
    /// idle with availability forced back on.
    pub fn complete(&self) -> Result<OfferDetails, AppError> {
        let mut inner = self.lock();
        if inner.state != OfferState::Active {
            return Err(AppError::InvalidTransition {
                action: "complete",
                state: inner.state.name(),
            });
        }

        Self::cancel_timer(&mut inner);
        inner.state = OfferState::Completed;
        self.notifier
            .notify(Notification::success("Delivery Completed!", None));

        let generation = inner.generation;
        let sim = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            let mut inner = sim.lock();
            if inner.generation != generation || inner.state != OfferState::Completed {
                return;
            }
            // The only transition that also mutates availability
            inner.availability = true;
            sim.enter_idle(&mut inner);
        });
        inner.timer = Some(handle.abort_handle());

        Ok(OfferDetails::mock())
    }

    // ─── Transitions ─────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Cancel the live timer (if any) and invalidate timers already fired.
    fn cancel_timer(inner: &mut Inner) {
        if let Some(handle) = inner.timer.take() {
            handle.abort();
        }
        inner.generation += 1;
    }

    /// Leave the current state for idle, re-arming if available.
    fn enter_idle(&self, inner: &mut Inner) {
        Self::cancel_timer(inner);
        inner.state = OfferState::Idle;
        inner.countdown = COUNTDOWN_START;
        if inner.availability {
            self.spawn_arm_timer(inner);
        }
    }

    /// Arm the offer timer; fires only if still idle and available.
    fn spawn_arm_timer(&self, inner: &mut Inner) {
        let generation = inner.generation;
        let sim = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ARM_DELAY).await;
            let mut inner = sim.lock();
            if inner.generation != generation
                || inner.state != OfferState::Idle
                || !inner.availability
            {
                return;
            }
            sim.enter_offered(&mut inner);
        });
        inner.timer = Some(handle.abort_handle());
    }

    /// Present a new offer and start its countdown.
    fn enter_offered(&self, inner: &mut Inner) {
        Self::cancel_timer(inner);
        inner.state = OfferState::Offered;
        inner.countdown = COUNTDOWN_START;
        self.notifier.notify(Notification::info(
            "New Order Request!",
            Some("Pickup from Anna Nagar"),
        ));

        let generation = inner.generation;
        let sim = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut inner = sim.lock();
                if inner.generation != generation || inner.state != OfferState::Offered {
                    return;
                }
                inner.countdown = inner.countdown.saturating_sub(1);
                if inner.countdown == 0 {
                    sim.notifier.notify(Notification::error("Order Missed", None));
                    sim.enter_idle(&mut inner);
                    return;
                }
            }
        });
        inner.timer = Some(handle.abort_handle());
    }

    #[cfg(test)]
    fn timer_live(&self) -> bool {
        self.lock().timer.is_some()
    }
}

/// Per-partner simulators, created on first dashboard use.
pub struct SimulatorRegistry {
    simulators: DashMap<String, OfferSimulator>,
    notifier: Arc<dyn Notifier>,
}

impl SimulatorRegistry {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            simulators: DashMap::new(),
            notifier,
        }
    }

    pub fn for_partner(&self, partner_id: &str) -> OfferSimulator {
        self.simulators
            .entry(partner_id.to_string())
            .or_insert_with(|| OfferSimulator::new(self.notifier.clone()))
            .clone()
    }
}
