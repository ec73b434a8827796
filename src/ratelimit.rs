//! Per-side fire-rate limiting: the cooldown clock and the skip ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{common::GameError, config::MatchConfig, side::SideId};

/// How long a side waits between shots, and whether waiting is enforced at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub cooldown: TimeDelta,
    pub bypass: bool,
}

impl CooldownPolicy {
    pub fn from_minutes(minutes: u64, bypass: bool) -> Self {
        let minutes = i64::try_from(minutes).unwrap_or(i64::MAX / 60_000);
        Self {
            cooldown: TimeDelta::try_minutes(minutes).unwrap_or(TimeDelta::MAX),
            bypass,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::from_minutes(config.cooldown_minutes, config.bypass_cooldown)
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::from_minutes(crate::config::COOLDOWN_MINUTES, false)
    }
}

/// Timestamp of each side's last cooldown-counted shot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CooldownClock {
    last_shot: BTreeMap<SideId, DateTime<Utc>>,
}

impl CooldownClock {
    pub fn last_shot(&self, side: &SideId) -> Option<DateTime<Utc>> {
        self.last_shot.get(side).copied()
    }

    pub fn stamp(&mut self, side: &SideId, at: DateTime<Utc>) {
        self.last_shot.insert(side.clone(), at);
    }

    /// Time left before `side` may fire again, or `None` if it may fire now.
    pub fn remaining(&self, side: &SideId, cooldown: TimeDelta, now: DateTime<Utc>) -> Option<TimeDelta> {
        let last = self.last_shot(side)?;
        let elapsed = now - last;
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}

/// One side's skip tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipAccount {
    pub balance: u32,
    pub armed: bool,
}

/// Skip token balances and armed flags for every side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipLedger {
    accounts: BTreeMap<SideId, SkipAccount>,
}

impl SkipLedger {
    pub fn account(&self, side: &SideId) -> SkipAccount {
        self.accounts.get(side).copied().unwrap_or_default()
    }

    pub fn balance(&self, side: &SideId) -> u32 {
        self.account(side).balance
    }

    pub fn is_armed(&self, side: &SideId) -> bool {
        self.account(side).armed
    }

    pub fn credit(&mut self, side: &SideId) -> u32 {
        let account = self.accounts.entry(side.clone()).or_default();
        account.balance = account.balance.saturating_add(1);
        account.balance
    }

    /// Arm a skip for the next shot. Arming twice is a no-op.
    pub fn arm(&mut self, side: &SideId) -> Result<(), GameError> {
        let account = self.accounts.entry(side.clone()).or_default();
        if account.balance == 0 {
            return Err(GameError::NoSkipTokens(side.clone()));
        }
        account.armed = true;
        Ok(())
    }

    /// Returns `true` if an armed skip with a positive balance is ready to spend.
    pub fn ready(&self, side: &SideId) -> bool {
        let account = self.account(side);
        account.armed && account.balance > 0
    }

    /// Spend the armed skip. Returns `false` and changes nothing if none is ready.
    pub fn consume(&mut self, side: &SideId) -> bool {
        match self.accounts.get_mut(side) {
            Some(account) if account.armed && account.balance > 0 => {
                account.balance -= 1;
                account.armed = false;
                true
            }
            _ => false,
        }
    }
}

/// Persisted limiter state, owned by the host rather than kept in globals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimiterState {
    pub cooldowns: CooldownClock,
    pub skips: SkipLedger,
}

/// Verdict for a pending shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotPermit {
    /// Cooldown satisfied or bypassed.
    Allowed,
    /// Cooldown ignored because an armed skip will be spent.
    Skip,
    Wait(TimeDelta),
}

#[derive(Debug, Clone, Default)]
pub struct RateLimiter {
    policy: CooldownPolicy,
    state: LimiterState,
}

impl RateLimiter {
    pub fn new(policy: CooldownPolicy) -> Self {
        Self::with_state(policy, LimiterState::default())
    }

    pub fn with_state(policy: CooldownPolicy, state: LimiterState) -> Self {
        Self { policy, state }
    }

    pub fn policy(&self) -> CooldownPolicy {
        self.policy
    }

    pub fn state(&self) -> &LimiterState {
        &self.state
    }

    pub fn skips(&self) -> &SkipLedger {
        &self.state.skips
    }

    pub fn skips_mut(&mut self) -> &mut SkipLedger {
        &mut self.state.skips
    }

    /// Pure cooldown check, ignoring skips.
    pub fn can_shoot(&self, side: &SideId, now: DateTime<Utc>) -> ShotPermit {
        if self.policy.bypass {
            return ShotPermit::Allowed;
        }
        match self.state.cooldowns.remaining(side, self.policy.cooldown, now) {
            Some(wait) => ShotPermit::Wait(wait),
            None => ShotPermit::Allowed,
        }
    }

    /// Cooldown check with the skip override applied. An armed skip is
    /// spent on the next shot even when the cooldown has already elapsed.
    pub fn permit(&self, side: &SideId, now: DateTime<Utc>) -> ShotPermit {
        if self.policy.bypass {
            return ShotPermit::Allowed;
        }
        if self.state.skips.ready(side) {
            return ShotPermit::Skip;
        }
        self.can_shoot(side, now)
    }

    /// Like [`RateLimiter::permit`], but a pending wait becomes `OnCooldown`.
    pub fn check(&self, side: &SideId, now: DateTime<Utc>) -> Result<ShotPermit, GameError> {
        match self.permit(side, now) {
            ShotPermit::Wait(remaining) => Err(GameError::OnCooldown { remaining }),
            permit => Ok(permit),
        }
    }

    /// Book a shot that went through. Returns `true` if a skip was spent,
    /// in which case the cooldown clock is left where it was.
    pub fn record(&mut self, side: &SideId, permit: ShotPermit, now: DateTime<Utc>) -> bool {
        match permit {
            ShotPermit::Skip => self.state.skips.consume(side),
            ShotPermit::Allowed | ShotPermit::Wait(_) => {
                self.state.cooldowns.stamp(side, now);
                false
            }
        }
    }
}
