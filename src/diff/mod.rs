//! Diff pipeline
//!
//! The stages, in data-flow order:
//!
//! - `lines`: byte buffer → terminator-stripped line views (binary check)
//! - `compare`: line equality and hashing under the comparison flags
//! - `classify`: lines → compact equivalence ids
//! - `compress`: trim and collapse lines that cannot match the other side
//! - `engine`: the O(ND) middle-snake diff over the compressed ids
//! - `shift`: slide change runs for readability
//! - `report`: group changes into hunks with context
//! - `intraline`: the same machinery at rune granularity for MODIFY pairs
//!
//! `diff` wires the stages together for one pair of line sequences; the
//! engine is only invoked when compression leaves real work behind.

pub mod classify;
pub mod compare;
pub mod compress;
pub mod engine;
pub mod intraline;
pub mod lines;
pub mod report;
pub mod shift;

use bytes::Bytes;

use crate::config::{CompareFlags, DiffConfig};
use classify::classify_lines;
use compare::LineComparator;
use compress::{compress_equiv_ids, expand_change_list};
pub use engine::diff_ids;
use report::{DiffSink, Hunk, HunkCollector, report_diff};
use shift::shift_boundaries;

/// Collected result of a diff: the hunks in order plus whether anything
/// changed at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffReport {
    pub hunks: Vec<Hunk>,
    pub changed: bool,
}

/// Compare two line sequences and stream the grouped ops into `sink`, one
/// call per hunk. Returns whether any change op was emitted.
pub fn diff(lines1: &[Bytes], lines2: &[Bytes], cfg: &DiffConfig, sink: &mut dyn DiffSink) -> bool {
    let comparator = LineComparator::new(cfg.flags);
    let (mut info1, mut info2, max_id_a, max_id_b) = classify_lines(
        lines1,
        lines2,
        comparator,
        cfg.flags.contains(CompareFlags::IGNORE_BLANK_LINES),
    );

    compress_equiv_ids(&mut info1, &mut info2, max_id_a, max_id_b);

    // compression resolves pure insert/delete/substitution cases on its own;
    // the engine only sees inputs with real matching structure left
    if !info1.zids.is_empty() && !info2.zids.is_empty() {
        let (zchange1, zchange2) = diff_ids(&info1.zids, &info2.zids);
        expand_change_list(&mut info1, &zchange1);
        expand_change_list(&mut info2, &zchange2);
    }

    shift_boundaries(&info1.ids, &mut info1.change, None);
    shift_boundaries(&info2.ids, &mut info2.change, None);

    report_diff(
        sink,
        &info1.ids,
        &info2.ids,
        &info1.change,
        &info2.change,
        cfg.context_lines,
    )
}

/// `diff` with the hunks collected into memory.
pub fn diff_to_report(lines1: &[Bytes], lines2: &[Bytes], cfg: &DiffConfig) -> DiffReport {
    let mut collector = HunkCollector::default();
    let changed = diff(lines1, lines2, cfg, &mut collector);
    DiffReport {
        hunks: collector.into_hunks(),
        changed,
    }
}

/// Compare two whole byte buffers: identical buffers short-circuit to an
/// unchanged report, otherwise both are split into lines and diffed.
/// Fails with [`lines::BinaryInput`] when either buffer has a NUL byte in
/// its header; no partial result is produced.
pub fn diff_buffers(data1: &Bytes, data2: &Bytes, cfg: &DiffConfig) -> anyhow::Result<DiffReport> {
    if data1 == data2 {
        return Ok(DiffReport::default());
    }

    let lines1 = lines::split_lines(data1)?;
    let lines2 = lines::split_lines(data2)?;

    Ok(diff_to_report(&lines1, &lines2, cfg))
}
