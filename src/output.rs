//! CLI output formatting for pipeline progress and results.
//!
//! # Output Format
//!
//! ## Build
//!
//! Only work that happened is listed; fresh sources stay silent.
//!
//! ```text
//! Thumbnails
//!     alpha
//!         AVIF: encoded
//!         WebP: encoded
//!     gamma: no thumbnail source
//! Gallery
//!     alpha/a.jpg
//!         AVIF: fresh
//!         WebP: encoded
//!
//! Thumbnails: 1 processed, 3 skipped, 0 failed
//! Gallery: 1 processed, 12 skipped, 0 failed
//! Missing thumbnails: gamma
//! Derived files: 17 AVIF, 17 WebP
//! Finished in 0.84s
//! ```
//!
//! ## Check
//!
//! ```text
//! Stale
//!     alpha (thumbnail)
//!         WebP → alpha/thumbnail.webp
//! Fresh: 15 sources
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that does the I/O. Problems (failed
//! jobs, scan warnings) go to stderr, everything else to stdout.

use crate::jobs::{JobClass, ScanWarning};
use crate::pipeline::{JobOutcome, JobResult, PipelineEvent, Plan, Stage, TargetStatus};
use crate::report::BuildReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `root` when it lives underneath it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn section_title(class: JobClass) -> &'static str {
    match class {
        JobClass::Thumbnail => "Thumbnails",
        JobClass::Gallery => "Gallery",
    }
}

fn format_warning(warning: &ScanWarning) -> String {
    match warning {
        ScanWarning::MissingThumbnail { project } => {
            format!("{}{}: no thumbnail source", indent(1), project)
        }
        ScanWarning::UnreadableDirectory { path, message } => {
            format!("{}{}: unreadable ({})", indent(1), path.display(), message)
        }
    }
}

fn format_job(result: &JobResult) -> Vec<String> {
    match &result.outcome {
        JobOutcome::Fresh => Vec::new(),
        JobOutcome::Unresolved(message) => vec![
            format!("{}{}", indent(1), result.label),
            format!("{}error: {}", indent(2), message),
        ],
        JobOutcome::Regenerated(targets) => {
            let mut lines = vec![format!("{}{}", indent(1), result.label)];
            for target in targets {
                let status = match &target.status {
                    TargetStatus::Encoded => "encoded".to_string(),
                    TargetStatus::Fresh => "fresh".to_string(),
                    TargetStatus::Failed(message) => format!("failed ({message})"),
                };
                lines.push(format!("{}{}: {}", indent(2), target.codec, status));
            }
            lines
        }
    }
}

/// Format a single progress event as display lines.
pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::StageEntered(Stage::Enumerating(class)) => {
            vec![section_title(*class).to_string()]
        }
        PipelineEvent::StageEntered(_) => Vec::new(),
        PipelineEvent::Warning(warning) => vec![format_warning(warning)],
        PipelineEvent::JobFinished(result) => format_job(result),
    }
}

/// Whether an event reports something that went wrong.
fn is_problem(event: &PipelineEvent) -> bool {
    match event {
        PipelineEvent::Warning(_) => true,
        PipelineEvent::JobFinished(result) => match &result.outcome {
            JobOutcome::Unresolved(_) => true,
            JobOutcome::Regenerated(targets) => targets
                .iter()
                .any(|t| matches!(t.status, TargetStatus::Failed(_))),
            JobOutcome::Fresh => false,
        },
        PipelineEvent::StageEntered(_) => false,
    }
}

/// Print one progress event.
pub fn print_event(event: &PipelineEvent) {
    let problem = is_problem(event);
    for line in format_event(event) {
        if problem {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Format the end-of-run summary.
pub fn format_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![String::new()];

    for (class, stats) in [
        (JobClass::Thumbnail, &report.thumbnails),
        (JobClass::Gallery, &report.gallery),
    ] {
        lines.push(format!(
            "{}: {} processed, {} skipped, {} failed",
            section_title(class),
            stats.processed,
            stats.skipped,
            stats.failed
        ));
    }

    if !report.missing_thumbnails.is_empty() {
        lines.push(format!(
            "Missing thumbnails: {}",
            report.missing_thumbnails.join(", ")
        ));
    }

    lines.push(format!(
        "Derived files: {} AVIF, {} WebP",
        report.derived.avif, report.derived.webp
    ));
    lines.push(format!("Finished in {:.2}s", report.elapsed.as_secs_f64()));
    lines
}

/// Format the failure list (empty for a clean run).
pub fn format_failures(report: &BuildReport) -> Vec<String> {
    if report.failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("{} derivative(s) failed:", report.failures.len())];
    for failure in &report.failures {
        lines.push(format!(
            "{}[{}] {}: {}",
            indent(1),
            failure.class,
            failure.path.display(),
            failure.message
        ));
    }
    lines
}

/// Print the summary to stdout and any failures to stderr.
pub fn print_report(report: &BuildReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
    for line in format_failures(report) {
        eprintln!("{}", line);
    }
}

/// Format a dry-run plan. Paths are shown relative to `root`.
pub fn format_plan(plan: &Plan, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !plan.jobs.is_empty() {
        lines.push("Stale".to_string());
        for job in &plan.jobs {
            lines.push(format!("{}{} ({})", indent(1), job.source.label, job.class));
            for target in &job.targets {
                lines.push(format!(
                    "{}{} \u{2192} {}",
                    indent(2),
                    target.codec,
                    relative(&target.path, root)
                ));
            }
        }
    }

    lines.push(format!("Fresh: {} sources", plan.fresh));

    for warning in &plan.warnings {
        lines.push(format_warning(warning).trim_start().to_string());
    }
    for failure in &plan.unresolved {
        lines.push(format!(
            "Unresolved: {}: {}",
            relative(&failure.path, root),
            failure.message
        ));
    }
    lines
}

pub fn print_plan(plan: &Plan, root: &Path) {
    for line in format_plan(plan, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Codec, EncodeProfile, Footprint, Quality};
    use crate::jobs::{DerivedTarget, RegenerationJob, SourceImage};
    use crate::pipeline::TargetOutcome;
    use crate::report::{ClassStats, CodecCounts, JobFailure};
    use std::path::PathBuf;
    use std::time::Duration;

    fn job_result(outcome: JobOutcome) -> JobResult {
        JobResult {
            class: JobClass::Gallery,
            label: "alpha/a.jpg".to_string(),
            source: PathBuf::from("/c/alpha/images/a.jpg"),
            outcome,
        }
    }

    fn target(codec: Codec, status: TargetStatus) -> TargetOutcome {
        TargetOutcome {
            codec,
            path: PathBuf::from(format!("/c/alpha/images/a_thumb.{}", codec.extension())),
            status,
        }
    }

    // =========================================================================
    // Event formatting
    // =========================================================================

    #[test]
    fn enumerating_stage_prints_section_title() {
        let lines = format_event(&PipelineEvent::StageEntered(Stage::Enumerating(
            JobClass::Thumbnail,
        )));
        assert_eq!(lines, vec!["Thumbnails"]);
        assert!(format_event(&PipelineEvent::StageEntered(Stage::Done)).is_empty());
    }

    #[test]
    fn fresh_job_is_silent() {
        let event = PipelineEvent::JobFinished(job_result(JobOutcome::Fresh));
        assert!(format_event(&event).is_empty());
        assert!(!is_problem(&event));
    }

    #[test]
    fn regenerated_job_lists_each_codec() {
        let event = PipelineEvent::JobFinished(job_result(JobOutcome::Regenerated(vec![
            target(Codec::Avif, TargetStatus::Fresh),
            target(Codec::WebP, TargetStatus::Encoded),
        ])));
        let lines = format_event(&event);
        assert_eq!(lines[0], "    alpha/a.jpg");
        assert_eq!(lines[1], "        AVIF: fresh");
        assert_eq!(lines[2], "        WebP: encoded");
        assert!(!is_problem(&event));
    }

    #[test]
    fn failed_target_is_a_problem() {
        let event = PipelineEvent::JobFinished(job_result(JobOutcome::Regenerated(vec![
            target(Codec::Avif, TargetStatus::Failed("corrupt".into())),
            target(Codec::WebP, TargetStatus::Encoded),
        ])));
        let lines = format_event(&event);
        assert_eq!(lines[1], "        AVIF: failed (corrupt)");
        assert!(is_problem(&event));
    }

    #[test]
    fn unresolved_job_shows_error() {
        let event = PipelineEvent::JobFinished(job_result(JobOutcome::Unresolved(
            "gone".into(),
        )));
        assert_eq!(format_event(&event), vec!["    alpha/a.jpg", "        error: gone"]);
        assert!(is_problem(&event));
    }

    #[test]
    fn missing_thumbnail_warning() {
        let event = PipelineEvent::Warning(ScanWarning::MissingThumbnail {
            project: "gamma".into(),
        });
        assert_eq!(format_event(&event), vec!["    gamma: no thumbnail source"]);
        assert!(is_problem(&event));
    }

    // =========================================================================
    // Report formatting
    // =========================================================================

    fn sample_report() -> BuildReport {
        BuildReport {
            thumbnails: ClassStats {
                processed: 1,
                skipped: 3,
                failed: 0,
                encoded: 2,
            },
            gallery: ClassStats {
                processed: 2,
                skipped: 10,
                failed: 1,
                encoded: 3,
            },
            missing_thumbnails: vec!["gamma".into(), "delta".into()],
            warnings: Vec::new(),
            failures: vec![JobFailure {
                class: JobClass::Gallery,
                path: PathBuf::from("/c/alpha/images/bad_thumb.avif"),
                message: "Failed to decode".into(),
            }],
            derived: CodecCounts { avif: 17, webp: 16 },
            elapsed: Duration::from_millis(1234),
        }
    }

    #[test]
    fn report_lists_counts_and_timing() {
        let lines = format_report(&sample_report());
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Thumbnails: 1 processed, 3 skipped, 0 failed");
        assert_eq!(lines[2], "Gallery: 2 processed, 10 skipped, 1 failed");
        assert_eq!(lines[3], "Missing thumbnails: gamma, delta");
        assert_eq!(lines[4], "Derived files: 17 AVIF, 16 WebP");
        assert_eq!(lines[5], "Finished in 1.23s");
    }

    #[test]
    fn report_omits_missing_line_when_none() {
        let lines = format_report(&BuildReport::default());
        assert!(!lines.iter().any(|l| l.starts_with("Missing")));
        assert_eq!(lines.last().unwrap(), "Finished in 0.00s");
    }

    #[test]
    fn failures_are_listed_with_class() {
        let lines = format_failures(&sample_report());
        assert_eq!(lines[0], "1 derivative(s) failed:");
        assert_eq!(
            lines[1],
            "    [gallery] /c/alpha/images/bad_thumb.avif: Failed to decode"
        );
        assert!(format_failures(&BuildReport::default()).is_empty());
    }

    // =========================================================================
    // Plan formatting
    // =========================================================================

    #[test]
    fn plan_shows_relative_targets() {
        let profile = EncodeProfile {
            footprint: Footprint::new(300, 400),
            avif_quality: Quality::new(75),
            webp_quality: Quality::new(80),
            avif_speed: 6,
        };
        let plan = Plan {
            jobs: vec![RegenerationJob {
                class: JobClass::Thumbnail,
                source: SourceImage {
                    project: "alpha".into(),
                    path: PathBuf::from("/c/alpha/thumbnail.jpg"),
                    label: "alpha".into(),
                },
                profile,
                targets: vec![DerivedTarget {
                    codec: Codec::WebP,
                    path: PathBuf::from("/c/alpha/thumbnail.webp"),
                }],
            }],
            fresh: 4,
            warnings: vec![ScanWarning::MissingThumbnail {
                project: "gamma".into(),
            }],
            unresolved: Vec::new(),
        };

        let lines = format_plan(&plan, Path::new("/c"));
        assert_eq!(
            lines,
            vec![
                "Stale",
                "    alpha (thumbnail)",
                "        WebP \u{2192} alpha/thumbnail.webp",
                "Fresh: 4 sources",
                "gamma: no thumbnail source",
            ]
        );
    }

    #[test]
    fn empty_plan_only_counts_fresh() {
        let lines = format_plan(&Plan::default(), Path::new("/c"));
        assert_eq!(lines, vec!["Fresh: 0 sources"]);
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }
}
