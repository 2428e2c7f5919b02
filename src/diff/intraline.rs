use crate::config::CompareFlags;

use super::classify::LineId;
use super::compare::{decode_rune, fold_rune};
use super::engine::diff_ids;
use super::report::{DiffOp, DiffOpKind};
use super::shift::{rune_boundary_score, shift_boundaries};

/// Within-line changes for one line: `pos` holds the byte offset of every
/// rune plus one trailing end offset, so rune `i` spans `pos[i]..pos[i + 1]`;
/// `change[i]` is true where that rune differs from the paired line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuneChanges {
    pub pos: Vec<usize>,
    pub change: Vec<bool>,
}

impl RuneChanges {
    /// Byte range of rune `i` within the line.
    pub fn byte_range(&self, i: usize) -> std::ops::Range<usize> {
        self.pos[i]..self.pos[i + 1]
    }
}

/// Split a line into rune byte positions and comparison values. A rune's
/// comparison value is its (possibly case-folded) code point, so the values
/// double as equivalence ids for the diff engine. ASCII bytes take the short
/// path; multi-byte runes fold only under Unicode rules.
pub fn split_runes(line: &[u8], flags: CompareFlags) -> (Vec<usize>, Vec<LineId>) {
    let ignore_case = flags.contains(CompareFlags::IGNORE_CASE);
    let unicode = flags.contains(CompareFlags::UNICODE);

    let mut pos = Vec::with_capacity(line.len() + 1);
    let mut cmp = Vec::with_capacity(line.len());

    let mut i = 0;
    while i < line.len() {
        pos.push(i);
        let b = line[i];
        let value = if b < 0x80 {
            i += 1;
            if ignore_case {
                if unicode {
                    fold_rune(b as char) as LineId
                } else {
                    b.to_ascii_lowercase() as LineId
                }
            } else {
                b as LineId
            }
        } else {
            let (r, size) = decode_rune(&line[i..]);
            i += size;
            let r = if ignore_case && unicode { fold_rune(r) } else { r };
            r as LineId
        };
        cmp.push(value);
    }
    pos.push(i);

    (pos, cmp)
}

/// Diff one MODIFY line pair at rune granularity: the engine runs directly
/// on the rune comparison values, then the boundary shifter slides the
/// change runs toward whitespace and bracket edges for readability.
pub fn diff_pair(line1: &[u8], line2: &[u8], flags: CompareFlags) -> (RuneChanges, RuneChanges) {
    let (pos1, cmp1) = split_runes(line1, flags);
    let (pos2, cmp2) = split_runes(line2, flags);

    let (mut change1, mut change2) = diff_ids(&cmp1, &cmp2);

    shift_boundaries(&cmp1, &mut change1, Some(rune_boundary_score));
    shift_boundaries(&cmp2, &mut change2, Some(rune_boundary_score));

    (
        RuneChanges {
            pos: pos1,
            change: change1,
        },
        RuneChanges {
            pos: pos2,
            change: change2,
        },
    )
}

/// Pair the lines of a MODIFY op one-for-one up to the shorter side. Excess
/// lines fall through as a REMOVE or INSERT remainder for the renderer.
pub fn modify_pairs(op: &DiffOp) -> (Vec<(usize, usize)>, Option<DiffOp>, Option<DiffOp>) {
    let n = (op.end1 - op.start1).min(op.end2 - op.start2);
    let pairs = (0..n).map(|k| (op.start1 + k, op.start2 + k)).collect();

    let remove = (op.start1 + n < op.end1).then(|| {
        DiffOp::new(DiffOpKind::Remove, op.start1 + n, op.end1, op.end2, op.end2)
    });
    let insert = (op.start2 + n < op.end2).then(|| {
        DiffOp::new(DiffOpKind::Insert, op.end1, op.end1, op.start2 + n, op.end2)
    });

    (pairs, remove, insert)
}
