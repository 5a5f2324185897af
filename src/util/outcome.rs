use serde::Serialize;
use strum_macros::Display;
use tracing::warn;

/// Secondary work triggered by a primary action. None of it may fail the
/// primary action, so each one is reported instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SideEffect {
    Email,
    EventLog,
    FollowUps,
    ObjectCleanup,
    AccessLog,
    Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum EffectStatus {
    Done,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffectReport {
    pub effect: SideEffect,
    #[serde(flatten)]
    pub status: EffectStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOutcome<T> {
    pub data: T,
    pub side_effects: Vec<SideEffectReport>,
}

impl<T> ServiceOutcome<T> {
    pub fn new(data: T) -> Self {
        ServiceOutcome {
            data,
            side_effects: Vec::new(),
        }
    }

    pub fn done(&mut self, effect: SideEffect) {
        self.side_effects.push(SideEffectReport {
            effect,
            status: EffectStatus::Done,
        });
    }

    pub fn skipped<S: Into<String>>(&mut self, effect: SideEffect, reason: S) {
        self.side_effects.push(SideEffectReport {
            effect,
            status: EffectStatus::Skipped(reason.into()),
        });
    }

    pub fn failed<S: Into<String>>(&mut self, effect: SideEffect, reason: S) {
        let reason = reason.into();
        warn!(%effect, %reason, "Side effect failed");
        self.side_effects.push(SideEffectReport {
            effect,
            status: EffectStatus::Failed(reason),
        });
    }

    /// Records the result of a best-effort step
    pub fn record<E: std::fmt::Display>(&mut self, effect: SideEffect, result: Result<(), E>) {
        match result {
            Ok(()) => self.done(effect),
            Err(e) => self.failed(effect, e.to_string()),
        }
    }

    pub fn absorb<U>(&mut self, other: ServiceOutcome<U>) -> U {
        self.side_effects.extend(other.side_effects);
        other.data
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceOutcome<U> {
        ServiceOutcome {
            data: f(self.data),
            side_effects: self.side_effects,
        }
    }

    pub fn status_of(&self, effect: SideEffect) -> Option<&EffectStatus> {
        self.side_effects
            .iter()
            .rev()
            .find(|r| r.effect == effect)
            .map(|r| &r.status)
    }
}
