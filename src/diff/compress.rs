use super::classify::{LineId, LinesData};

/// Compress both id sequences before running the diff engine.
///
/// Lines whose id does not occur on the other side can never match: the
/// matching prefix and suffix are trimmed off in lockstep (marking
/// one-sided-unique lines as changed on the way), and within the remaining
/// range every run of such lines collapses into a single entry carrying a
/// fresh negative sentinel id, so that no two compressed runs ever compare
/// equal. `zcount` records how many original lines each entry stands for.
///
/// When the trim empties one side's range the comparison is already decided:
/// the other side's remainder is marked changed and both `zids` stay empty,
/// signalling that no engine call is needed.
pub fn compress_equiv_ids(
    info1: &mut LinesData,
    info2: &mut LinesData,
    max_id1: LineId,
    max_id2: LineId,
) {
    let len1 = info1.ids.len();
    let len2 = info2.ids.len();

    let mut has_ids1 = vec![false; (max_id1 + 1) as usize];
    let mut has_ids2 = vec![false; (max_id2 + 1) as usize];
    for &v in &info1.ids {
        has_ids1[v as usize] = true;
    }
    for &v in &info2.ids {
        has_ids2[v as usize] = true;
    }

    // walk the heads in lockstep: identical pairs advance both sides,
    // one-sided-unique lines are marked changed and skipped; stop at the
    // first mismatch of two ids that occur on both sides
    let mut i1 = 0;
    let mut i2 = 0;
    while i1 < len1 && i2 < len2 {
        let v1 = info1.ids[i1];
        let v2 = info2.ids[i2];
        if v1 > max_id2 || !has_ids2[v1 as usize] {
            info1.change[i1] = true;
            i1 += 1;
        } else if v2 > max_id1 || !has_ids1[v2 as usize] {
            info2.change[i2] = true;
            i2 += 1;
        } else if v1 == v2 {
            i1 += 1;
            i2 += 1;
        } else {
            break;
        }
    }

    // same from the tails
    let mut j1 = len1;
    let mut j2 = len2;
    while i1 < j1 && i2 < j2 {
        let v1 = info1.ids[j1 - 1];
        let v2 = info2.ids[j2 - 1];
        if v1 > max_id2 || !has_ids2[v1 as usize] {
            j1 -= 1;
            info1.change[j1] = true;
        } else if v2 > max_id1 || !has_ids1[v2 as usize] {
            j2 -= 1;
            info2.change[j2] = true;
        } else if v1 == v2 {
            j1 -= 1;
            j2 -= 1;
        } else {
            break;
        }
    }

    // one range is empty: everything left on the other side is changed and
    // the engine has nothing to do
    if i1 == j1 {
        for change in &mut info2.change[i2..j2] {
            *change = true;
        }
        return;
    }
    if i2 == j2 {
        for change in &mut info1.change[i1..j1] {
            *change = true;
        }
        return;
    }

    info1.zids_start = i1;
    info1.zids_end = j1;
    info2.zids_start = i2;
    info2.zids_end = j2;

    let mut next_sentinel = -(max_id1.max(max_id2) + 1);
    for (info, has_other, max_other) in [
        (&mut *info1, &has_ids2, max_id2),
        (&mut *info2, &has_ids1, max_id1),
    ] {
        let mut zids = Vec::with_capacity(info.zids_end - info.zids_start);
        let mut zcount = Vec::with_capacity(info.zids_end - info.zids_start);
        let mut last_excluded = false;

        for &v in &info.ids[info.zids_start..info.zids_end] {
            let excluded = v > max_other || !has_other[v as usize];
            if excluded && last_excluded {
                if let Some(last) = zcount.last_mut() {
                    *last += 1;
                }
            } else if excluded {
                zids.push(next_sentinel);
                next_sentinel -= 1;
                zcount.push(1);
            } else {
                zids.push(v);
                zcount.push(1);
            }
            last_excluded = excluded;
        }

        debug_assert_eq!(
            zcount.iter().sum::<usize>(),
            info.zids_end - info.zids_start
        );

        info.zids = zids;
        info.zcount = zcount;
    }
}

/// Reverse of the compression for the engine's result: re-inflate the
/// compressed change bitmap onto the original line index space, each entry
/// expanding to `zcount` lines. Entries marked changed during compression
/// are left untouched.
pub fn expand_change_list(info: &mut LinesData, zchange: &[bool]) {
    let change = &mut info.change[info.zids_start..];
    let mut n = 0;
    for (i, &count) in info.zcount.iter().enumerate() {
        if zchange[i] {
            for c in &mut change[n..n + count] {
                *c = true;
            }
        }
        n += count;
    }
}
