//! Ordered fallback strategies with early exit

use lts_errors::Error;
use lts_events::{AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent};
use lts_types::DependencyKind;
use std::fmt;

/// What a single tier produced
#[derive(Debug)]
pub enum TierOutcome<T> {
    /// The tier produced a usable value; later tiers are not run
    Found(T),
    /// The tier did not apply, with the reason
    Skipped(String),
}

/// Value produced by the winning tier
#[derive(Debug)]
pub struct Resolved<K, T> {
    pub tier: K,
    /// 1-based position of the winning tier
    pub attempt: usize,
    pub value: T,
}

/// Runs tiers in order until one finds a value.
///
/// Skipped and failed tiers fall through to the next one. Fatal errors
/// (see [`Error::is_fatal`]) stop the chain and are returned as is. The error
/// of the last failing tier is kept for the caller's final report.
pub struct StrategyChain<'a, K> {
    dependency: DependencyKind,
    tiers: &'a [K],
    tx: &'a EventSender,
    last_error: Option<Error>,
}

impl<'a, K> StrategyChain<'a, K>
where
    K: Copy + fmt::Display,
{
    pub fn new(dependency: DependencyKind, tiers: &'a [K], tx: &'a EventSender) -> Self {
        Self {
            dependency,
            tiers,
            tx,
            last_error: None,
        }
    }

    /// Evaluate tiers in order with `run`.
    ///
    /// Returns `Ok(None)` once every tier was skipped or failed.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error produced by a tier.
    pub async fn run<T, F>(&mut self, mut run: F) -> Result<Option<Resolved<K, T>>, Error>
    where
        F: AsyncFnMut(K) -> Result<TierOutcome<T>, Error>,
    {
        for (index, &tier) in self.tiers.iter().enumerate() {
            let attempt = index + 1;
            tracing::debug!(dependency = %self.dependency, %tier, attempt, "trying tier");
            self.tx.emit(AppEvent::Install(InstallEvent::TierStarted {
                dependency: self.dependency,
                tier: tier.to_string(),
                attempt,
            }));

            match run(tier).await {
                Ok(TierOutcome::Found(value)) => {
                    return Ok(Some(Resolved {
                        tier,
                        attempt,
                        value,
                    }));
                }
                Ok(TierOutcome::Skipped(reason)) => {
                    tracing::info!(dependency = %self.dependency, %tier, %reason, "tier skipped");
                    self.tx.emit_tier_skipped(self.dependency, tier.to_string(), reason);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!(dependency = %self.dependency, %tier, error = %err, "tier failed");
                    self.tx.emit(AppEvent::Install(InstallEvent::TierFailed {
                        dependency: self.dependency,
                        tier: tier.to_string(),
                        failure: FailureContext::from_error(&err),
                    }));
                    self.last_error = Some(err);
                }
            }
        }

        Ok(None)
    }

    /// Error of the most recent failing tier, if any tier failed
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
