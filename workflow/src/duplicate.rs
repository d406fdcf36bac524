//! Duplicate-scan simulator: a cross-region search for an existing registration.
//!
//! The scan visits every regional partition in turn, then analyses the
//! candidates. Progress runs to `scan_phase_ceiling` (70 %) over the partition
//! sweep and to 100 % over the analysis. The verdict is drawn at the end.

use crate::progress::{progress_steps, ProgressEvent, ProgressFeed};
use crate::spans;
use std::time::Duration;
use tracing::Instrument;
use vvp_types::{DuplicateCheckResult, DuplicateVerdict, RandomSource, VoterRecord, WorkflowParams};

/// Scan every partition, analyse, and produce a verdict.
pub async fn run_scan(
    record: &VoterRecord,
    random: &dyn RandomSource,
    params: &WorkflowParams,
    feed: &ProgressFeed,
) -> DuplicateCheckResult {
    let partitions = params.scan_partitions.max(1);
    let span = spans::duplicate_scan_span(&record.binding.region, partitions);

    async {
        let mut records_checked: u64 = 0;
        for scanned in 1..=partitions {
            tokio::time::sleep(Duration::from_millis(params.scan_partition_ms)).await;
            records_checked += random.range(params.scan_records_min, params.scan_records_max);
            let progress = scan_progress(scanned, partitions, params.scan_phase_ceiling);
            feed.emit(ProgressEvent::ScanProgress {
                partitions_scanned: scanned,
                records_checked,
                progress,
            });
        }
        tracing::debug!(records_checked, "partition sweep finished");

        for progress in progress_steps(params.scan_phase_ceiling, params.analysis_increment) {
            tokio::time::sleep(Duration::from_millis(params.analysis_step_ms)).await;
            feed.emit(ProgressEvent::AnalysisProgress { progress });
        }

        let verdict = draw_verdict(random, params);
        let result = build_result(verdict, record, records_checked, partitions, params);
        feed.emit(ProgressEvent::ScanFinished {
            verdict,
            confidence_score: result.confidence_score,
        });
        result
    }
    .instrument(span)
    .await
}

/// Progress after `scanned` of `total` partitions, scaled to `ceiling`.
pub fn scan_progress(scanned: u32, total: u32, ceiling: u8) -> u8 {
    let total = total.max(1) as u64;
    let scanned = (scanned as u64).min(total);
    (scanned * ceiling as u64 / total) as u8
}

pub fn draw_verdict(random: &dyn RandomSource, params: &WorkflowParams) -> DuplicateVerdict {
    if random.chance(params.clear_probability) {
        DuplicateVerdict::Clear
    } else {
        DuplicateVerdict::Flagged
    }
}

/// Fixed-policy result for a verdict. A real matcher would derive the
/// confidence from similarity scores.
pub fn build_result(
    verdict: DuplicateVerdict,
    record: &VoterRecord,
    records_checked: u64,
    partitions_scanned: u32,
    params: &WorkflowParams,
) -> DuplicateCheckResult {
    match verdict {
        DuplicateVerdict::Clear => DuplicateCheckResult {
            verdict,
            confidence_score: params.clear_confidence,
            reason: None,
            matched_record_count: 0,
            records_checked,
            partitions_scanned,
        },
        DuplicateVerdict::Flagged => DuplicateCheckResult {
            verdict,
            confidence_score: params.flagged_confidence,
            reason: Some(format!(
                "partial name match for {:?} found in another region's voter roll",
                record.full_name
            )),
            matched_record_count: 1,
            records_checked,
            partitions_scanned,
        },
    }
}
