//! Run state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Run has not started
    Pending,
    /// Steps are executing
    Running,
    /// Every enabled step succeeded
    Completed,
    /// A step failed or the run was aborted
    Failed,
}

/// Outcome of one executed step
///
/// A `params_list` step produces a single aggregate result covering all of
/// its iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub job: String,
    pub success: bool,
    pub message: Option<String>,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl StepResult {
    pub fn new(
        name: impl Into<String>,
        job: impl Into<String>,
        success: bool,
        message: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            job: job.into(),
            success,
            message,
            duration,
        }
    }
}

/// Aggregate statistics for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    pub started_at: Option<DateTime<Utc>>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Reason the run was aborted, if it was
    pub error: Option<String>,

    /// Steps in the pipeline, enabled or not
    pub total: usize,

    /// Steps that produced a result
    pub completed: usize,

    pub successful: usize,

    pub failed: usize,

    pub skipped: usize,

    /// Results in execution order
    pub results: Vec<StepResult>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
            total: 0,
            completed: 0,
            successful: 0,
            failed: 0,
            skipped: 0,
            results: Vec::new(),
        }
    }

    /// Mark run as started
    pub fn start(&mut self, total: usize) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.total = total;
    }

    /// Append a step result and update the counters
    pub fn record(&mut self, result: StepResult) {
        self.completed += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Mark run as completed; a recorded failure still makes it failed
    pub fn complete(&mut self) {
        self.status = if self.failed > 0 {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Completed
        };
        self.finished_at = Some(Utc::now());
    }

    /// Mark run as aborted
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.error = Some(reason.into());
        self.finished_at = Some(Utc::now());
    }

    /// Whether the process should exit non-zero
    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed || self.failed > 0 || self.error.is_some()
    }

    /// Wall-clock time between start and finish
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Progress as a fraction of steps accounted for (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.completed + self.skipped) as f64 / self.total as f64
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
