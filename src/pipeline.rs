//! Pipeline driver.
//!
//! Sequences enumeration → staleness resolution → transcoding → aggregation:
//!
//! ```text
//! Idle → Enumerating(thumbnail) → Enumerating(gallery) → Aggregating → Done
//!                 └──────────────────────┴──→ Failed (content root unreadable)
//! ```
//!
//! Each scan's candidates are collected eagerly and then run on a bounded
//! rayon pool. Every candidate produces a [`JobResult`]; results are tallied
//! into the [`BuildReport`] after the parallel collect, so no counter is
//! shared between workers. A failing job is recorded and the batch moves on.
//!
//! Progress is reported through an optional channel of [`PipelineEvent`]s;
//! see [`output::format_event`](crate::output::format_event).

use crate::config::{PipelineConfig, effective_threads};
use crate::imaging::{self, Codec, ImageBackend, RustBackend};
use crate::jobs::{self, AssetCandidate, JobClass, RegenerationJob, ScanOutcome, ScanWarning};
use crate::probe::ProbeError;
use crate::report::{self, BuildReport, ClassStats, JobFailure};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Instant;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Content root {path} is unreadable: {source}")]
    ContentRoot {
        path: PathBuf,
        #[source]
        source: ProbeError,
    },
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Enumerating(JobClass),
    Aggregating,
    Done,
    Failed,
}

impl Stage {
    /// The stage that follows on success; `None` once terminal.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::Enumerating(JobClass::Thumbnail)),
            Stage::Enumerating(JobClass::Thumbnail) => Some(Stage::Enumerating(JobClass::Gallery)),
            Stage::Enumerating(JobClass::Gallery) => Some(Stage::Aggregating),
            Stage::Aggregating => Some(Stage::Done),
            Stage::Done | Stage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

/// Per-derivative result inside a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    Encoded,
    Fresh,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub codec: Codec,
    pub path: PathBuf,
    pub status: TargetStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Every derivative was fresh; nothing ran.
    Fresh,
    /// At least one derivative was regenerated (or attempted).
    Regenerated(Vec<TargetOutcome>),
    /// Staleness could not be determined, e.g. the source vanished mid-run.
    Unresolved(String),
}

/// Outcome of one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub class: JobClass,
    pub label: String,
    pub source: PathBuf,
    pub outcome: JobOutcome,
}

/// Progress events, in the order the driver produces them.
///
/// `JobFinished` events within one scan arrive in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StageEntered(Stage),
    Warning(ScanWarning),
    JobFinished(JobResult),
}

fn emit(events: &Option<Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is printing
        let _ = tx.send(event);
    }
}

/// Run the full pipeline with the pure Rust backend.
pub fn run(
    root: &Path,
    config: &PipelineConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<BuildReport, PipelineError> {
    run_with_backend(&RustBackend::new(), root, config, events)
}

/// Run the full pipeline using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    root: &Path,
    config: &PipelineConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<BuildReport, PipelineError> {
    let start = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(effective_threads(&config.processing))
        .build()
        .map_err(|e| PipelineError::ThreadPool(e.to_string()))?;

    let mut report = BuildReport::default();
    let mut stage = Stage::Idle;

    while let Some(next) = stage.next() {
        stage = next;
        emit(&events, PipelineEvent::StageEntered(stage));

        match stage {
            Stage::Enumerating(class) => {
                let scan = match scan_class(root, config, class) {
                    Ok(scan) => scan,
                    Err(source) => {
                        emit(&events, PipelineEvent::StageEntered(Stage::Failed));
                        return Err(PipelineError::ContentRoot {
                            path: root.to_path_buf(),
                            source,
                        });
                    }
                };

                for warning in scan.warnings {
                    emit(&events, PipelineEvent::Warning(warning.clone()));
                    report.record_warning(warning);
                }

                let results: Vec<JobResult> = pool.install(|| {
                    scan.candidates
                        .par_iter()
                        .map(|candidate| {
                            let result = run_candidate(backend, candidate);
                            emit(&events, PipelineEvent::JobFinished(result.clone()));
                            result
                        })
                        .collect()
                });

                for result in &results {
                    tally(&mut report, result);
                }
            }
            Stage::Aggregating => {
                report.derived = report::count_derived(root, config);
                report.elapsed = start.elapsed();
            }
            Stage::Idle | Stage::Done | Stage::Failed => {}
        }
    }

    Ok(report)
}

fn scan_class(
    root: &Path,
    config: &PipelineConfig,
    class: JobClass,
) -> Result<ScanOutcome, ProbeError> {
    match class {
        JobClass::Thumbnail => jobs::enumerate_thumbnails(root, config),
        JobClass::Gallery => jobs::enumerate_gallery(root, config),
    }
}

/// Resolve and, where stale, transcode every derivative of one candidate.
fn run_candidate(backend: &impl ImageBackend, candidate: &AssetCandidate) -> JobResult {
    let outcome = match jobs::resolve(candidate) {
        Ok(None) => JobOutcome::Fresh,
        Ok(Some(job)) => JobOutcome::Regenerated(execute(backend, candidate, &job)),
        Err(e) => JobOutcome::Unresolved(e.to_string()),
    };

    JobResult {
        class: candidate.class,
        label: candidate.source.label.clone(),
        source: candidate.source.path.clone(),
        outcome,
    }
}

fn execute(
    backend: &impl ImageBackend,
    candidate: &AssetCandidate,
    job: &RegenerationJob,
) -> Vec<TargetOutcome> {
    candidate
        .targets
        .iter()
        .map(|target| {
            let status = if job.targets.contains(target) {
                match imaging::transcode(
                    backend,
                    &job.source.path,
                    &target.path,
                    target.codec,
                    &job.profile,
                ) {
                    Ok(()) => TargetStatus::Encoded,
                    Err(e) => TargetStatus::Failed(e.to_string()),
                }
            } else {
                TargetStatus::Fresh
            };
            TargetOutcome {
                codec: target.codec,
                path: target.path.clone(),
                status,
            }
        })
        .collect()
}

fn tally(report: &mut BuildReport, result: &JobResult) {
    let mut delta = ClassStats::default();

    match &result.outcome {
        JobOutcome::Fresh => delta.skipped = 1,
        JobOutcome::Unresolved(message) => {
            delta.failed = 1;
            report.failures.push(JobFailure {
                class: result.class,
                path: result.source.clone(),
                message: message.clone(),
            });
        }
        JobOutcome::Regenerated(targets) => {
            let mut any_failed = false;
            for target in targets {
                match &target.status {
                    TargetStatus::Encoded => delta.encoded += 1,
                    TargetStatus::Fresh => {}
                    TargetStatus::Failed(message) => {
                        any_failed = true;
                        report.failures.push(JobFailure {
                            class: result.class,
                            path: target.path.clone(),
                            message: message.clone(),
                        });
                    }
                }
            }
            if any_failed {
                delta.failed = 1;
            } else {
                delta.processed = 1;
            }
        }
    }

    report.stats_mut(result.class).merge(delta);
}

/// What a build would do, without transcoding anything.
#[derive(Debug, Default)]
pub struct Plan {
    pub jobs: Vec<RegenerationJob>,
    /// Sources whose derivatives are all fresh.
    pub fresh: usize,
    pub warnings: Vec<ScanWarning>,
    /// Sources whose staleness could not be determined.
    pub unresolved: Vec<JobFailure>,
}

/// Enumerate and resolve both scans (dry run).
pub fn plan(root: &Path, config: &PipelineConfig) -> Result<Plan, PipelineError> {
    let mut plan = Plan::default();

    for class in [JobClass::Thumbnail, JobClass::Gallery] {
        let scan = scan_class(root, config, class).map_err(|source| PipelineError::ContentRoot {
            path: root.to_path_buf(),
            source,
        })?;
        plan.warnings.extend(scan.warnings);

        for candidate in &scan.candidates {
            match jobs::resolve(candidate) {
                Ok(Some(job)) => plan.jobs.push(job),
                Ok(None) => plan.fresh += 1,
                Err(e) => plan.unresolved.push(JobFailure {
                    class,
                    path: candidate.source.path.clone(),
                    message: e.to_string(),
                }),
            }
        }
    }

    Ok(plan)
}
