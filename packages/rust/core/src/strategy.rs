//! Strategy and validator traits shared by every cascade.

use async_trait::async_trait;

use smartbuy_shared::{Provenance, StrategyResult};

/// One estimation attempt with its own failure mode.
///
/// Strategies are tried in the order a [`Cascade`](crate::Cascade) declares
/// them; the last one in every cascade must always succeed.
#[async_trait]
pub trait Strategy<R, T, S>: Send + Sync
where
    R: Sync,
    T: Send,
    S: Provenance,
{
    /// Human-readable strategy name for tracing.
    fn name(&self) -> &str;

    /// Provenance tag stamped on results this strategy produces.
    fn source(&self) -> S;

    /// Produce candidate items for `request`, or declare why it cannot.
    async fn attempt(&self, request: &R) -> StrategyResult<Vec<T>>;
}

/// Per-domain gate applied to every strategy's output before acceptance.
///
/// A validator may reshape the items (drop bad records, pad a short set)
/// and returns the accepted items, or an error that makes the cascade fall
/// through to the next strategy.
pub trait Validator<R, T, S>: Send + Sync
where
    S: Provenance,
{
    fn validate(&self, request: &R, source: S, items: Vec<T>) -> StrategyResult<Vec<T>>;
}

/// Blanket impl so plain closures can serve as validators in tests and
/// small cascades.
impl<R, T, S, F> Validator<R, T, S> for F
where
    S: Provenance,
    F: Fn(&R, S, Vec<T>) -> StrategyResult<Vec<T>> + Send + Sync,
{
    fn validate(&self, request: &R, source: S, items: Vec<T>) -> StrategyResult<Vec<T>> {
        self(request, source, items)
    }
}
