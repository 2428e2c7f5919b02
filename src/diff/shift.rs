use super::classify::LineId;

/// Scores a boundary pair `(first, last)` of a candidate run position;
/// higher is better. Used at rune granularity to prefer breaking changes at
/// whitespace or brackets.
pub type BoundaryScore = fn(LineId, LineId) -> i32;

/// Edge score of a single rune: whitespace makes the best change boundary,
/// brackets and quotes a decent one.
pub fn rune_edge_score(r: char) -> i32 {
    match r {
        ' ' | '\t' | '\x0b' | '\x0c' => 100,
        '<' | '>' | '(' | ')' | '[' | ']' | '\'' | '"' => 40,
        _ => 0,
    }
}

/// Boundary score for a shifted run: sum of the edge scores of its first
/// and last comparison values.
pub fn rune_boundary_score(r1: LineId, r2: LineId) -> i32 {
    let s1 = u32::try_from(r1).ok().and_then(char::from_u32).map_or(0, rune_edge_score);
    let s2 = u32::try_from(r2).ok().and_then(char::from_u32).map_or(0, rune_edge_score);
    s1 + s2
}

// Move the run [start, end) by offset positions; the changed-entry count is
// invariant.
fn do_shift_boundary(mut start: usize, mut end: usize, mut offset: isize, change: &mut [bool]) {
    if offset < 0 {
        while offset != 0 {
            start -= 1;
            end -= 1;
            offset += 1;
            change[start] = true;
            change[end] = false;
        }
    } else {
        while offset != 0 {
            change[start] = false;
            change[end] = true;
            start += 1;
            end += 1;
            offset -= 1;
        }
    }
}

// Determine how far the run starting at `start` can slide up or down, and
// whether sliding that far merges it into a neighboring run (or pushes it
// against the start/end of the list).
fn find_shift_boundary(
    start: usize,
    data: &[LineId],
    change: &[bool],
) -> (usize, usize, usize, bool, bool) {
    let dlen = data.len();
    let mut end = start + 1;
    while end < dlen && change[end] {
        end += 1;
    }

    let mut up = 0;
    while start > up && !change[start - up - 1] && data[start - up - 1] == data[end - up - 1] {
        up += 1;
    }

    let mut down = 0;
    while end + down < dlen && !change[end + down] && data[end + down] == data[start + down] {
        down += 1;
    }

    let up_merge = start - up == 0 || change[start - up - 1];
    let down_merge = end + down == dlen || change[end + down];

    (end, up, down, up_merge, down_merge)
}

/// Slide each change run within its slack to make the result more readable:
/// merging with an adjacent run wins, otherwise the position with the best
/// boundary score (ties keep the run where it is). The run starting at
/// index 0 never shifts. Line-granularity callers pass no score function,
/// so whole-line runs only move to merge.
///
/// A run that moves can expose new slack or a new merge for a neighbor, so
/// the sweep repeats until a full pass leaves the bitmap unchanged; calling
/// the shifter again on its own output is a no-op.
pub fn shift_boundaries(data: &[LineId], change: &mut [bool], boundary_score: Option<BoundaryScore>) {
    loop {
        let before = change.to_vec();
        shift_boundaries_pass(data, change, boundary_score);
        if change == before.as_slice() {
            break;
        }
    }
}

// One left-to-right sweep over the change runs.
fn shift_boundaries_pass(
    data: &[LineId],
    change: &mut [bool],
    boundary_score: Option<BoundaryScore>,
) {
    let clen = change.len();
    let mut start = 0;

    while start < clen {
        // find the next run of changes
        while start < clen && !change[start] {
            start += 1;
        }
        if start >= clen {
            break;
        }

        let (end, mut up, mut down, up_merge, down_merge) =
            find_shift_boundary(start, data, change);

        if start == 0 {
            up = 0;
            down = 0;
        }

        if up > 0 && up_merge {
            do_shift_boundary(start, end, -(up as isize), change);
            // restart from the head of the merged run so chained merges
            // keep collapsing
            let mut nstart = start - up;
            while nstart > 0 && change[nstart - 1] {
                nstart -= 1;
            }
            if nstart > 0 {
                start = nstart;
            }
        } else if down > 0 && down_merge {
            do_shift_boundary(start, end, down as isize, change);
            start += down;
        } else if (up > 0 || down > 0) && let Some(score) = boundary_score {
            let mut offset: isize = 0;
            let mut best_score = score(data[start], data[end - 1]);
            let mut i = -(up as isize);
            while i <= down as isize {
                if i != 0 {
                    let candidate = score(
                        data[(start as isize + i) as usize],
                        data[(end as isize + i - 1) as usize],
                    );
                    if candidate > best_score {
                        offset = i;
                        best_score = candidate;
                    }
                }
                i += 1;
            }
            if offset != 0 {
                do_shift_boundary(start, end, offset, change);
            }
            start = end;
            if offset > 0 {
                start += offset as usize;
            }
        } else {
            start = end;
        }
    }
}
