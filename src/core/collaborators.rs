//! Narrow interfaces the engine consumes from the surrounding game, with null-object
//! defaults so a missing collaborator never needs a runtime presence check.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::rules::reward::Reward;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacilityInfo {
    pub unlocked: bool,
    pub level: u32,
    pub name: String,
}

pub trait FacilityProvider: Send + Sync {
    fn facility_info(&self, facility_id: &str) -> Option<FacilityInfo>;
}

pub trait RewardSink: Send + Sync {
    fn apply_reward(&self, reward: &Reward);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
}

pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str);
}

/// Timestamp source for history entries.
pub trait Clock: Send + Sync {
    fn timestamp(&self) -> u64;
}

/// Stand-in when no facility system is wired up: every facility is open at any level.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFacilities;

impl FacilityProvider for OpenFacilities {
    fn facility_info(&self, facility_id: &str) -> Option<FacilityInfo> {
        Some(FacilityInfo {
            unlocked: true,
            level: u32::MAX,
            name: facility_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullRewardSink;

impl RewardSink for NullRewardSink {
    fn apply_reward(&self, _reward: &Reward) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NotificationKind, _title: &str, _message: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullClock;

impl Clock for NullClock {
    fn timestamp(&self) -> u64 {
        0
    }
}

/// Map-backed facility provider. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct FacilityRegistry(Arc<RwLock<HashMap<String, FacilityInfo>>>);

impl FacilityRegistry {
    pub fn unlock(&self, facility_id: &str, name: &str, level: u32) {
        let mut table = self.0.write().unwrap_or_else(PoisonError::into_inner);
        table.insert(
            facility_id.to_string(),
            FacilityInfo {
                unlocked: true,
                level,
                name: name.to_string(),
            },
        );
    }

    pub fn lock_facility(&self, facility_id: &str) {
        let mut table = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(info) = table.get_mut(facility_id) {
            info.unlocked = false;
        }
    }
}

impl FacilityProvider for FacilityRegistry {
    fn facility_info(&self, facility_id: &str) -> Option<FacilityInfo> {
        let table = self.0.read().unwrap_or_else(PoisonError::into_inner);
        table.get(facility_id).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    pub gold: i64,
    pub reputation: i64,
    pub rewards_applied: u64,
}

/// Reward sink that keeps running totals. Clones share the same totals.
#[derive(Debug, Clone, Default)]
pub struct Ledger(Arc<Mutex<LedgerTotals>>);

impl Ledger {
    pub fn totals(&self) -> LedgerTotals {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RewardSink for Ledger {
    fn apply_reward(&self, reward: &Reward) {
        let mut totals = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        totals.gold += reward.gold;
        totals.reputation += reward.reputation_delta;
        totals.rewards_applied += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Notifier that records every message until drained. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog(Arc<Mutex<Vec<Notification>>>);

impl NotificationLog {
    pub fn drain(&self) -> Vec<Notification> {
        let mut entries = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *entries)
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, kind: NotificationKind, title: &str, message: &str) {
        let mut entries = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(Notification {
            kind,
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}

/// Everything the engine talks to outside itself.
pub struct Collaborators {
    pub facilities: Box<dyn FacilityProvider>,
    pub rewards: Box<dyn RewardSink>,
    pub notifier: Box<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            facilities: Box::new(OpenFacilities),
            rewards: Box::new(NullRewardSink),
            notifier: Box::new(NullNotifier),
            clock: Box::new(NullClock),
        }
    }
}

impl Collaborators {
    pub fn with_facilities(mut self, facilities: impl FacilityProvider + 'static) -> Self {
        self.facilities = Box::new(facilities);
        self
    }

    pub fn with_rewards(mut self, rewards: impl RewardSink + 'static) -> Self {
        self.rewards = Box::new(rewards);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }
}
