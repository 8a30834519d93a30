//! Processing steps - progress bookkeeping for a run

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a processing step
///
/// Transitions are monotonic: `Pending → Processing → Completed | Failed`.
/// A step may also fail or complete directly from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not started
    Pending,
    /// Running
    Processing,
    /// Done
    Completed,
    /// Done with an error
    Failed,
}

impl StepStatus {
    /// Whether the step has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            StepStatus::Pending => 0,
            StepStatus::Processing => 1,
            StepStatus::Completed | StepStatus::Failed => 2,
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepStatus::Pending => "pending",
            StepStatus::Processing => "processing",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One named step of a processing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    /// Step identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Current status
    pub status: StepStatus,

    /// Progress in percent (0..=100)
    pub progress: u8,

    /// Error message when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Ids of steps that must complete first
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Step output, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl ProcessingStep {
    /// Create a pending step
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: StepStatus::Pending,
            progress: 0,
            error: None,
            dependencies: Vec::new(),
            result: None,
        }
    }

    /// Declare a dependency on another step
    pub fn depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.dependencies.push(step_id.into());
        self
    }

    /// Move to a new status
    ///
    /// Fails if the transition would go backwards or leave a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use refinery_domain::{ProcessingStep, StepStatus};
    ///
    /// let mut step = ProcessingStep::new("chunk", "Chunk input");
    /// assert!(step.transition(StepStatus::Processing).is_ok());
    /// assert!(step.transition(StepStatus::Pending).is_err());
    /// ```
    pub fn transition(&mut self, to: StepStatus) -> Result<(), String> {
        if self.status.is_terminal() || to.rank() < self.status.rank() {
            return Err(format!(
                "Step '{}' cannot move from {} to {}",
                self.id, self.status, to
            ));
        }
        self.status = to;
        Ok(())
    }

    /// Mark the step as running
    pub fn start(&mut self) -> Result<(), String> {
        self.transition(StepStatus::Processing)
    }

    /// Update progress; values above 100 are clamped
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Mark the step as completed with an optional output
    pub fn complete(&mut self, result: Option<serde_json::Value>) -> Result<(), String> {
        self.transition(StepStatus::Completed)?;
        self.progress = 100;
        self.result = result;
        Ok(())
    }

    /// Mark the step as failed
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), String> {
        self.transition(StepStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = StepStatus> {
        prop_oneof![
            Just(StepStatus::Pending),
            Just(StepStatus::Processing),
            Just(StepStatus::Completed),
            Just(StepStatus::Failed),
        ]
    }

    proptest! {
        /// Property: no sequence of transitions ever moves a step backwards
        #[test]
        fn test_status_never_regresses(seq in proptest::collection::vec(status_strategy(), 0..16)) {
            let mut step = ProcessingStep::new("s", "S");
            let mut prev = step.status;
            for to in seq {
                let _ = step.transition(to);
                prop_assert!(step.status.rank() >= prev.rank());
                if prev.is_terminal() {
                    prop_assert_eq!(step.status, prev);
                }
                prev = step.status;
            }
        }
    }
}
