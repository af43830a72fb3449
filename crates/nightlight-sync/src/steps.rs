//! Named-step sequencing over a mutable per-run state
//!
//! Publishing and deleting are both a fixed list of store calls; they only
//! differ in what happens after a failure. A [`StepPlan`] captures the list,
//! a [`FailurePolicy`] captures the difference.

use futures::future::BoxFuture;
use nightlight_core::error::{NightlightError, Result};
use std::fmt;

/// A single step: borrows the run state for the duration of its future
pub type StepFn<S> = for<'a> fn(&'a mut S) -> BoxFuture<'a, Result<()>>;

/// What to do after a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Skip every remaining step
    StopOnFirstFailure,
    /// Log the failure and carry on with the next step
    ContinueOnFailure,
}

struct Step<S> {
    name: &'static str,
    run: StepFn<S>,
}

/// A failed step and its error
#[derive(Debug)]
pub struct StepFailure {
    pub step: &'static str,
    pub error: NightlightError,
}

/// Outcome of running a plan
#[derive(Debug, Default)]
pub struct StepReport {
    /// Steps that succeeded, in execution order
    pub completed: Vec<&'static str>,
    /// Steps that failed, in execution order
    pub failures: Vec<StepFailure>,
}

impl StepReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// First failure as an error, if any
    pub fn into_result(self) -> Result<()> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(()),
        }
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} step(s) completed, {} failed",
            self.completed.len(),
            self.failures.len()
        )
    }
}

/// Ordered list of named steps with a failure policy
pub struct StepPlan<S> {
    label: &'static str,
    policy: FailurePolicy,
    steps: Vec<Step<S>>,
}

impl<S: Send> StepPlan<S> {
    pub fn new(label: &'static str, policy: FailurePolicy) -> Self {
        Self {
            label,
            policy,
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn step(mut self, name: &'static str, run: StepFn<S>) -> Self {
        self.steps.push(Step { name, run });
        self
    }

    /// Run the steps in order against `state`
    pub async fn run(&self, state: &mut S) -> StepReport {
        let mut report = StepReport::default();

        for step in &self.steps {
            match (step.run)(state).await {
                Ok(()) => {
                    tracing::debug!(plan = self.label, step = step.name, "Step completed");
                    report.completed.push(step.name);
                }
                Err(error) => {
                    tracing::error!(
                        plan = self.label,
                        step = step.name,
                        error = %error,
                        "Step failed"
                    );
                    report.failures.push(StepFailure {
                        step: step.name,
                        error,
                    });

                    if self.policy == FailurePolicy::StopOnFirstFailure {
                        break;
                    }
                }
            }
        }

        report
    }
}
