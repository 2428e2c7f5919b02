use bytes::Bytes;
use linediff::{DiffOp, DiffOpKind, DiffReport};

pub fn doc(lines: &[&str]) -> Vec<Bytes> {
    lines
        .iter()
        .map(|line| Bytes::copy_from_slice(line.as_bytes()))
        .collect()
}

/// All ops of a report in emission order.
pub fn flat_ops(report: &DiffReport) -> Vec<DiffOp> {
    report
        .hunks
        .iter()
        .flat_map(|hunk| hunk.ops().iter().copied())
        .collect()
}

/// Rebuild both inputs from the op stream. Only meaningful when the
/// configured context is wide enough that the ops tile both inputs
/// completely (context >= input length).
pub fn reconstruct(
    report: &DiffReport,
    lines1: &[Bytes],
    lines2: &[Bytes],
) -> (Vec<Bytes>, Vec<Bytes>) {
    let mut side1 = Vec::new();
    let mut side2 = Vec::new();

    for op in flat_ops(report) {
        match op.kind {
            DiffOpKind::Same | DiffOpKind::Modify => {
                side1.extend_from_slice(&lines1[op.start1..op.end1]);
                side2.extend_from_slice(&lines2[op.start2..op.end2]);
            }
            DiffOpKind::Remove => side1.extend_from_slice(&lines1[op.start1..op.end1]),
            DiffOpKind::Insert => side2.extend_from_slice(&lines2[op.start2..op.end2]),
        }
    }

    (side1, side2)
}

/// Changed-line totals over the op stream: (side A, side B).
pub fn changed_line_counts(report: &DiffReport) -> (usize, usize) {
    let mut count1 = 0;
    let mut count2 = 0;
    for op in flat_ops(report) {
        match op.kind {
            DiffOpKind::Same => {}
            DiffOpKind::Remove => count1 += op.end1 - op.start1,
            DiffOpKind::Insert => count2 += op.end2 - op.start2,
            DiffOpKind::Modify => {
                count1 += op.end1 - op.start1;
                count2 += op.end2 - op.start2;
            }
        }
    }
    (count1, count2)
}

/// Reference LCS length by dynamic programming, for minimality checks.
pub fn lcs_len(a: &[Bytes], b: &[Bytes]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut prev = 0;
        for (j, y) in b.iter().enumerate() {
            let up_left = prev;
            prev = row[j + 1];
            row[j + 1] = if x == y {
                up_left + 1
            } else {
                row[j + 1].max(row[j])
            };
        }
    }
    row[b.len()]
}
