//! Step bookkeeping for one adapter run

use refinery_domain::ProcessingStep;
use serde_json::Value;
use tracing::warn;

pub(crate) const VALIDATE: &str = "validate";
pub(crate) const CHUNK: &str = "chunk";
pub(crate) const PROCESS: &str = "process";
pub(crate) const COMBINE: &str = "combine";

/// The steps of one run, addressed by id
///
/// Invalid transitions are logged and ignored so bookkeeping can never fail
/// a run.
#[derive(Debug, Clone)]
pub(crate) struct StepTracker {
    steps: Vec<ProcessingStep>,
}

impl StepTracker {
    /// validate → chunk → process → combine
    pub(crate) fn standard() -> Self {
        Self {
            steps: vec![
                ProcessingStep::new(VALIDATE, "Validate input"),
                ProcessingStep::new(CHUNK, "Chunk input").depends_on(VALIDATE),
                ProcessingStep::new(PROCESS, "Process chunks").depends_on(CHUNK),
                ProcessingStep::new(COMBINE, "Combine results").depends_on(PROCESS),
            ],
        }
    }

    pub(crate) fn start(&mut self, id: &str) {
        self.apply(id, |step| step.start());
    }

    pub(crate) fn complete(&mut self, id: &str, result: Option<Value>) {
        self.apply(id, |step| step.complete(result));
    }

    pub(crate) fn fail(&mut self, id: &str, error: &str) {
        self.apply(id, |step| step.fail(error));
    }

    pub(crate) fn into_steps(self) -> Vec<ProcessingStep> {
        self.steps
    }

    fn apply<F>(&mut self, id: &str, f: F)
    where
        F: FnOnce(&mut ProcessingStep) -> Result<(), String>,
    {
        match self.steps.iter_mut().find(|s| s.id == id) {
            Some(step) => {
                if let Err(e) = f(step) {
                    warn!("Step '{}': {}", id, e);
                }
            }
            None => warn!("Unknown step '{}'", id),
        }
    }
}
