//! Ordered, short-circuiting strategy cascade.
//!
//! A [`Cascade`] tries its strategies one after another. The first output
//! its validator accepts is annotated and returned; every strategy error and
//! every validator rejection is logged and skipped. Strategies never run in
//! parallel.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use smartbuy_shared::{CascadeResult, Provenance, Result, SmartBuyError, StrategyError};

use crate::annotate::annotate;
use crate::strategy::{Strategy, Validator};

// ---------------------------------------------------------------------------
// Attempt diagnostics
// ---------------------------------------------------------------------------

/// How a single strategy attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Output passed the validator and became the result.
    Accepted { items: usize },
    /// The validator refused the output.
    Rejected,
    /// The strategy itself reported an error.
    Failed,
}

impl AttemptOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Diagnostic record of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: String,
    pub outcome: AttemptOutcome,
    /// Failure reason, absent for the accepted attempt.
    pub reason: Option<String>,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.outcome, &self.reason) {
            (AttemptOutcome::Accepted { items }, _) => {
                write!(f, "{}: accepted ({items} items)", self.strategy)
            }
            (outcome, Some(reason)) => write!(f, "{}: {} ({reason})", self.strategy, outcome.label()),
            (outcome, None) => write!(f, "{}: {}", self.strategy, outcome.label()),
        }
    }
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

/// An ordered list of strategies gated by one validator.
pub struct Cascade<R, T, S>
where
    R: Sync,
    T: Send,
    S: Provenance,
{
    name: &'static str,
    strategies: Vec<Box<dyn Strategy<R, T, S>>>,
    validator: Box<dyn Validator<R, T, S>>,
}

impl<R, T, S> Cascade<R, T, S>
where
    R: Sync,
    T: Send,
    S: Provenance,
{
    /// Build a cascade. Fails if `strategies` is empty.
    pub fn new(
        name: &'static str,
        strategies: Vec<Box<dyn Strategy<R, T, S>>>,
        validator: Box<dyn Validator<R, T, S>>,
    ) -> Result<Self> {
        if strategies.is_empty() {
            return Err(SmartBuyError::cascade(format!(
                "{name}: a cascade needs at least one strategy"
            )));
        }
        Ok(Self {
            name,
            strategies,
            validator,
        })
    }

    /// Cascade name used in logs.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Strategy names in execution order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the cascade and return the first accepted result.
    ///
    /// Only returns an error when the terminal strategy fails too, which a
    /// correctly assembled cascade never allows.
    pub async fn run(&self, request: &R) -> Result<CascadeResult<T, S>> {
        self.run_with_attempts(request).await.map(|(result, _)| result)
    }

    /// Like [`run`](Self::run), also returning one [`Attempt`] per strategy tried.
    #[instrument(skip_all, fields(cascade = self.name, run_id = %Uuid::now_v7()))]
    pub async fn run_with_attempts(
        &self,
        request: &R,
    ) -> Result<(CascadeResult<T, S>, Vec<Attempt>)> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let source = strategy.source();
            let outcome = match strategy.attempt(request).await {
                Ok(items) => self.validator.validate(request, source, items),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(items) => {
                    info!(
                        strategy = strategy.name(),
                        outcome = "accepted",
                        items = items.len(),
                        source = source.label(),
                        "strategy accepted"
                    );
                    attempts.push(Attempt {
                        strategy: strategy.name().to_string(),
                        outcome: AttemptOutcome::Accepted { items: items.len() },
                        reason: None,
                    });
                    return Ok((annotate(items, source), attempts));
                }
                Err(e) => {
                    let outcome = match e {
                        StrategyError::Rejected(_) => AttemptOutcome::Rejected,
                        _ => AttemptOutcome::Failed,
                    };
                    warn!(
                        strategy = strategy.name(),
                        outcome = outcome.label(),
                        kind = e.kind(),
                        reason = %e,
                        "strategy fell through"
                    );
                    attempts.push(Attempt {
                        strategy: strategy.name().to_string(),
                        outcome,
                        reason: Some(e.to_string()),
                    });
                }
            }
        }

        Err(SmartBuyError::cascade(format!(
            "{}: all {} strategies failed, the terminal strategy must always succeed",
            self.name,
            self.strategies.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use smartbuy_shared::{MaterialSource, StrategyResult};

    use super::*;

    /// Strategy returning a fixed outcome and counting its calls.
    struct Fixed {
        name: &'static str,
        source: MaterialSource,
        outcome: StrategyResult<Vec<u32>>,
        calls: Arc<AtomicUsize>,
    }

    impl Fixed {
        fn boxed(
            name: &'static str,
            source: MaterialSource,
            outcome: StrategyResult<Vec<u32>>,
        ) -> (Box<dyn Strategy<(), u32, MaterialSource>>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = Self {
                name,
                source,
                outcome,
                calls: calls.clone(),
            };
            (Box::new(strategy), calls)
        }
    }

    #[async_trait]
    impl Strategy<(), u32, MaterialSource> for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn source(&self) -> MaterialSource {
            self.source
        }

        async fn attempt(&self, _request: &()) -> StrategyResult<Vec<u32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn at_least_two(_: &(), _: MaterialSource, items: Vec<u32>) -> StrategyResult<Vec<u32>> {
        if items.len() >= 2 {
            Ok(items)
        } else {
            Err(StrategyError::Rejected(format!("{} items", items.len())))
        }
    }

    #[tokio::test]
    async fn first_accepted_strategy_short_circuits() {
        let (model, _) = Fixed::boxed("model", MaterialSource::Model, Ok(vec![1, 2, 3]));
        let (rule, rule_calls) = Fixed::boxed("rule", MaterialSource::Rule, Ok(vec![4, 5]));

        let cascade = Cascade::new("test", vec![model, rule], Box::new(at_least_two)).unwrap();
        let (result, attempts) = cascade.run_with_attempts(&()).await.unwrap();

        assert_eq!(result.source(), MaterialSource::Model);
        assert_eq!(result.items(), &[1, 2, 3]);
        assert_eq!(rule_calls.load(Ordering::SeqCst), 0);
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Accepted { items: 3 });
    }

    #[tokio::test]
    async fn strategy_error_falls_through() {
        let (model, _) = Fixed::boxed(
            "model",
            MaterialSource::Model,
            Err(StrategyError::SourceUnavailable("no model loaded".into())),
        );
        let (rule, _) = Fixed::boxed("rule", MaterialSource::Rule, Ok(vec![4, 5]));

        let cascade = Cascade::new("test", vec![model, rule], Box::new(at_least_two)).unwrap();
        let (result, attempts) = cascade.run_with_attempts(&()).await.unwrap();

        assert_eq!(result.source(), MaterialSource::Rule);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Failed);
        assert!(attempts[0].reason.as_deref().unwrap().contains("no model loaded"));
    }

    #[tokio::test]
    async fn validator_rejection_falls_through() {
        let (model, _) = Fixed::boxed("model", MaterialSource::Model, Ok(vec![1]));
        let (rule, _) = Fixed::boxed("rule", MaterialSource::Rule, Ok(vec![4, 5]));

        let cascade = Cascade::new("test", vec![model, rule], Box::new(at_least_two)).unwrap();
        let (result, attempts) = cascade.run_with_attempts(&()).await.unwrap();

        assert_eq!(result.source(), MaterialSource::Rule);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Rejected);
        assert_eq!(attempts[0].to_string(), "model: rejected (rejected by validator: 1 items)");
        assert_eq!(attempts[1].to_string(), "rule: accepted (2 items)");
    }

    #[tokio::test]
    async fn every_failure_kind_is_recovered() {
        let failures = [
            StrategyError::SourceUnavailable("down".into()),
            StrategyError::Timeout { secs: 1 },
            StrategyError::MalformedInput("bad".into()),
            StrategyError::EmptyResult("none".into()),
        ];
        let mut strategies = Vec::new();
        for failure in failures {
            strategies.push(Fixed::boxed("flaky", MaterialSource::Model, Err(failure)).0);
        }
        strategies.push(Fixed::boxed("floor", MaterialSource::Synthetic, Ok(vec![7, 8])).0);

        let cascade = Cascade::new("test", strategies, Box::new(at_least_two)).unwrap();
        let (result, attempts) = cascade.run_with_attempts(&()).await.unwrap();

        assert_eq!(result.source(), MaterialSource::Synthetic);
        assert_eq!(attempts.len(), 5);
    }

    #[test]
    fn empty_cascade_is_a_config_error() {
        let err = Cascade::<(), u32, MaterialSource>::new("empty", vec![], Box::new(at_least_two))
            .err()
            .expect("empty cascade must fail");
        assert!(matches!(err, SmartBuyError::Cascade { .. }));
    }

    #[tokio::test]
    async fn failing_terminal_strategy_is_reported() {
        let (only, _) = Fixed::boxed(
            "broken",
            MaterialSource::Synthetic,
            Err(StrategyError::EmptyResult("nothing".into())),
        );
        let cascade = Cascade::new("test", vec![only], Box::new(at_least_two)).unwrap();

        let err = cascade.run(&()).await.unwrap_err();
        assert!(err.to_string().contains("terminal strategy"));
    }

    #[test]
    fn strategy_names_in_order() {
        let (a, _) = Fixed::boxed("model", MaterialSource::Model, Ok(vec![]));
        let (b, _) = Fixed::boxed("rule", MaterialSource::Rule, Ok(vec![]));
        let cascade = Cascade::new("materials", vec![a, b], Box::new(at_least_two)).unwrap();
        assert_eq!(cascade.name(), "materials");
        assert_eq!(cascade.strategy_names(), vec!["model", "rule"]);
    }
}
