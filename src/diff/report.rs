use derive_new::new;

use super::classify::LineId;

/// Kind of a reported diff region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOpKind {
    /// Unchanged context lines present on both sides
    Same,
    /// Lines replaced by other lines
    Modify,
    /// Lines present only on side B
    Insert,
    /// Lines present only on side A
    Remove,
}

/// One diff region: a kind plus a half-open line range on each side
/// (`end >= start` on both). For `Insert` the side-A range is empty, for
/// `Remove` the side-B range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct DiffOp {
    pub kind: DiffOpKind,
    pub start1: usize,
    pub end1: usize,
    pub start2: usize,
    pub end2: usize,
}

/// Consumer of grouped diff ops. One call per hunk, ops in order; renderers
/// implement this to stream output without buffering the whole diff.
pub trait DiffSink {
    fn diff_lines(&mut self, ops: &[DiffOp]);
}

/// A contiguous group of ops reported together, with leading and trailing
/// unchanged context attached.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Hunk {
    ops: Vec<DiffOp>,
}

impl Hunk {
    pub fn ops(&self) -> &[DiffOp] {
        &self.ops
    }

    /// Hunk extent on side A, from the first op's start to the last op's end.
    pub fn range1(&self) -> (usize, usize) {
        match (self.ops.first(), self.ops.last()) {
            (Some(first), Some(last)) => (first.start1, last.end1),
            _ => (0, 0),
        }
    }

    pub fn range2(&self) -> (usize, usize) {
        match (self.ops.first(), self.ops.last()) {
            (Some(first), Some(last)) => (first.start2, last.end2),
            _ => (0, 0),
        }
    }
}

/// Sink that collects hunks into memory.
#[derive(Debug, Default)]
pub struct HunkCollector {
    hunks: Vec<Hunk>,
}

impl HunkCollector {
    pub fn into_hunks(self) -> Vec<Hunk> {
        self.hunks
    }
}

impl DiffSink for HunkCollector {
    fn diff_lines(&mut self, ops: &[DiffOp]) {
        self.hunks.push(Hunk::new(ops.to_vec()));
    }
}

// Find the end of the change run starting at `start`, then trim leading and
// trailing id-0 (blank-class) lines off the reported segment. Returns
// (run end, segment start, segment end); the segment may be empty.
fn next_change_segment(start: usize, change: &[bool], data: &[LineId]) -> (usize, usize, usize) {
    let mut end = start + 1;
    while end < change.len() && change[end] {
        end += 1;
    }

    let mut i = start;
    let mut j = end;
    while i < end && data[i] == 0 {
        i += 1;
    }
    while j > i && data[j - 1] == 0 {
        j -= 1;
    }

    (end, i, j)
}

// Op buffer that groups changes into hunks: a change further than
// 2*context from the previous op (on both sides) closes the hunk with
// trailing context and opens a new one with leading context; anything
// nearer merges, reporting the whole unchanged gap so that ops within a
// hunk stay contiguous.
struct HunkBuffer<'a> {
    sink: &'a mut dyn DiffSink,
    ops: Vec<DiffOp>,
    context: usize,
}

impl HunkBuffer<'_> {
    fn new(sink: &mut dyn DiffSink, context: usize) -> HunkBuffer<'_> {
        HunkBuffer {
            sink,
            ops: Vec::with_capacity(16),
            context,
        }
    }

    fn last_ends(&self) -> (usize, usize) {
        self.ops.last().map_or((0, 0), |op| (op.end1, op.end2))
    }

    fn push(&mut self, op: DiffOp) {
        let (last1, last2) = self.last_ends();
        let gap1 = op.start1 - last1;
        let gap2 = op.start2 - last2;

        if !self.ops.is_empty() && gap1 > self.context * 2 && gap2 > self.context * 2 {
            self.flush(last1, last2, op.start1, op.start2);
            let c1 = last1.max(op.start1.saturating_sub(self.context));
            let c2 = last2.max(op.start2.saturating_sub(self.context));
            if c1 < op.start1 || c2 < op.start2 {
                self.ops
                    .push(DiffOp::new(DiffOpKind::Same, c1, op.start1, c2, op.start2));
            }
        } else if self.ops.is_empty() {
            let c1 = op.start1.saturating_sub(self.context);
            let c2 = op.start2.saturating_sub(self.context);
            if c1 < op.start1 || c2 < op.start2 {
                self.ops
                    .push(DiffOp::new(DiffOpKind::Same, c1, op.start1, c2, op.start2));
            }
        } else if gap1 > 0 || gap2 > 0 {
            // merged into the open hunk: report the whole connecting gap
            self.ops
                .push(DiffOp::new(DiffOpKind::Same, last1, op.start1, last2, op.start2));
        }

        self.ops.push(op);
    }

    // Close the open hunk with up to `context` trailing unchanged lines,
    // bounded by the next change (or the end of both inputs).
    fn flush(&mut self, last1: usize, last2: usize, bound1: usize, bound2: usize) {
        let e1 = bound1.min(last1 + self.context);
        let e2 = bound2.min(last2 + self.context);
        if e1 > last1 || e2 > last2 {
            self.ops
                .push(DiffOp::new(DiffOpKind::Same, last1, e1, last2, e2));
        }
        self.sink.diff_lines(&self.ops);
        self.ops.clear();
    }

    fn finish(&mut self, len1: usize, len2: usize) {
        if self.ops.is_empty() {
            return;
        }
        let (last1, last2) = self.last_ends();
        self.flush(last1, last2, len1, len2);
    }
}

/// Walk the two change bitmaps in lockstep and emit grouped ops.
///
/// Matching positions advance both sides; a change on both sides becomes
/// MODIFY (or REMOVE/INSERT when one side's segment is all blank-class
/// lines and trims away); a one-sided change becomes REMOVE or INSERT with
/// an empty range on the other side. Returns whether any op was emitted.
pub fn report_diff(
    sink: &mut dyn DiffSink,
    data1: &[LineId],
    data2: &[LineId],
    change1: &[bool],
    change2: &[bool],
    context_lines: usize,
) -> bool {
    let len1 = change1.len();
    let len2 = change2.len();
    let mut i1 = 0;
    let mut i2 = 0;
    let mut buffer = HunkBuffer::new(sink, context_lines);
    let mut changed = false;

    while i1 < len1 || i2 < len2 {
        if i1 < len1 && i2 < len2 && !change1[i1] && !change2[i2] {
            i1 += 1;
            i2 += 1;
        } else if i1 < len1 && i2 < len2 && change1[i1] && change2[i2] {
            let (n1, m1start, m1end) = next_change_segment(i1, change1, data1);
            let (n2, m2start, m2end) = next_change_segment(i2, change2, data2);
            i1 = n1;
            i2 = n2;

            let kind = if m1start < m1end && m2start < m2end {
                Some(DiffOpKind::Modify)
            } else if m1start < m1end {
                Some(DiffOpKind::Remove)
            } else if m2start < m2end {
                Some(DiffOpKind::Insert)
            } else {
                None
            };
            if let Some(kind) = kind {
                buffer.push(DiffOp::new(kind, m1start, m1end, m2start, m2end));
                changed = true;
            }
        } else if i1 < len1 && change1[i1] {
            let (n1, m1start, m1end) = next_change_segment(i1, change1, data1);
            i1 = n1;
            if m1start < m1end {
                buffer.push(DiffOp::new(DiffOpKind::Remove, m1start, m1end, i2, i2));
                changed = true;
            }
        } else if i2 < len2 && change2[i2] {
            let (n2, m2start, m2end) = next_change_segment(i2, change2, data2);
            i2 = n2;
            if m2start < m2end {
                buffer.push(DiffOp::new(DiffOpKind::Insert, i1, i1, m2start, m2end));
                changed = true;
            }
        } else {
            unreachable!("change bitmaps out of step");
        }
    }

    buffer.finish(len1, len2);
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn collect(
        data1: &[LineId],
        data2: &[LineId],
        change1: &[bool],
        change2: &[bool],
        context: usize,
    ) -> (Vec<Hunk>, bool) {
        let mut collector = HunkCollector::default();
        let changed = report_diff(&mut collector, data1, data2, change1, change2, context);
        (collector.into_hunks(), changed)
    }

    fn same(s1: usize, e1: usize, s2: usize, e2: usize) -> DiffOp {
        DiffOp::new(DiffOpKind::Same, s1, e1, s2, e2)
    }

    #[test]
    fn no_changes_emit_no_ops() {
        let data = [1, 2, 3];
        let change = [false, false, false];
        let (hunks, changed) = collect(&data, &data, &change, &change, 3);
        assert!(hunks.is_empty());
        assert!(!changed);
    }

    #[test]
    fn double_sided_change_becomes_modify_with_context() {
        let data1 = [1, 2, 3];
        let data2 = [1, 4, 3];
        let change = [false, true, false];
        let (hunks, changed) = collect(&data1, &data2, &change, &change, 3);

        assert!(changed);
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0].ops(),
            &[
                same(0, 1, 0, 1),
                DiffOp::new(DiffOpKind::Modify, 1, 2, 1, 2),
                same(2, 3, 2, 3),
            ]
        );
    }

    #[test]
    fn one_sided_change_keeps_an_empty_range_on_the_other_side() {
        let data1 = [1, 2, 3, 4, 5];
        let data2 = [1, 3, 4, 5];
        let change1 = [false, true, false, false, false];
        let change2 = [false; 4];
        let (hunks, _) = collect(&data1, &data2, &change1, &change2, 3);

        assert_eq!(
            hunks[0].ops(),
            &[
                same(0, 1, 0, 1),
                DiffOp::new(DiffOpKind::Remove, 1, 2, 1, 1),
                same(2, 5, 1, 4),
            ]
        );
    }

    #[test]
    fn distant_changes_split_into_two_hunks() {
        // changes at line 2 and line 13, ten unchanged lines apart
        let n = 20;
        let data1: Vec<LineId> = (0..n as LineId).map(|i| i + 1).collect();
        let mut data2 = data1.clone();
        data2[2] = 100;
        data2[13] = 101;
        let mut change = vec![false; n];
        change[2] = true;
        change[13] = true;

        let (hunks, _) = collect(&data1, &data2, &change, &change, 3);
        assert_eq!(hunks.len(), 2);
        assert_eq!(
            hunks[0].ops(),
            &[
                same(0, 2, 0, 2),
                DiffOp::new(DiffOpKind::Modify, 2, 3, 2, 3),
                same(3, 6, 3, 6),
            ]
        );
        assert_eq!(
            hunks[1].ops(),
            &[
                same(10, 13, 10, 13),
                DiffOp::new(DiffOpKind::Modify, 13, 14, 13, 14),
                same(14, 17, 14, 17),
            ]
        );
    }

    #[test]
    fn near_changes_merge_and_report_the_whole_gap() {
        let n = 20;
        let data1: Vec<LineId> = (0..n as LineId).map(|i| i + 1).collect();
        let mut data2 = data1.clone();
        data2[2] = 100;
        data2[13] = 101;
        let mut change = vec![false; n];
        change[2] = true;
        change[13] = true;

        let (hunks, _) = collect(&data1, &data2, &change, &change, 5);
        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0].ops(),
            &[
                same(0, 2, 0, 2),
                DiffOp::new(DiffOpKind::Modify, 2, 3, 2, 3),
                same(3, 13, 3, 13),
                DiffOp::new(DiffOpKind::Modify, 13, 14, 13, 14),
                same(14, 19, 14, 19),
            ]
        );
    }

    #[test]
    fn zero_context_separates_hunks_at_any_gap() {
        let data1 = [1, 2, 3, 4, 5];
        let data2 = [1, 9, 3, 8, 5];
        let change = [false, true, false, true, false];
        let (hunks, _) = collect(&data1, &data2, &change, &change, 0);

        assert_eq!(hunks.len(), 2);
        assert_eq!(
            hunks[0].ops(),
            &[DiffOp::new(DiffOpKind::Modify, 1, 2, 1, 2)]
        );
        assert_eq!(
            hunks[1].ops(),
            &[DiffOp::new(DiffOpKind::Modify, 3, 4, 3, 4)]
        );
    }

    #[test]
    fn adjacent_changes_with_zero_context_stay_in_one_hunk() {
        let data1 = [1, 2, 3];
        let data2 = [1, 9, 8];
        let change1 = [false, true, true];
        let change2 = [false, true, true];
        let (hunks, _) = collect(&data1, &data2, &change1, &change2, 0);

        assert_eq!(hunks.len(), 1);
        assert_eq!(
            hunks[0].ops(),
            &[DiffOp::new(DiffOpKind::Modify, 1, 3, 1, 3)]
        );
    }

    #[test]
    fn blank_class_only_segments_are_skipped() {
        // the changed line has the blank class id on side A and nothing on
        // side B, so no op may be reported
        let data1 = [1, 0, 2];
        let data2 = [1, 2];
        let change1 = [false, true, false];
        let change2 = [false, false];
        let (hunks, changed) = collect(&data1, &data2, &change1, &change2, 3);

        assert!(hunks.is_empty());
        assert!(!changed);
    }

    #[test]
    fn blank_edges_are_trimmed_from_reported_segments() {
        // change run on side A is [blank, real, blank]; only the real line
        // is reported, as a MODIFY against side B's changed line
        let data1 = [7, 0, 3, 0, 8];
        let data2 = [7, 4, 8];
        let change1 = [false, true, true, true, false];
        let change2 = [false, true, false];
        let (hunks, _) = collect(&data1, &data2, &change1, &change2, 1);

        assert_eq!(
            hunks[0].ops(),
            &[
                same(1, 2, 0, 1),
                DiffOp::new(DiffOpKind::Modify, 2, 3, 1, 2),
                same(3, 4, 2, 3),
            ]
        );
    }

    #[test]
    fn hunk_extent_comes_from_first_and_last_op() {
        let hunk = Hunk::new(vec![
            same(0, 2, 0, 2),
            DiffOp::new(DiffOpKind::Modify, 2, 3, 2, 3),
            same(3, 5, 3, 5),
        ]);
        assert_eq!(hunk.range1(), (0, 5));
        assert_eq!(hunk.range2(), (0, 5));
    }
}
