use crc32fast::Hasher;

use crate::config::CompareFlags;

/// ASCII whitespace set used when `UNICODE` is off. Line terminators are
/// never part of a line, so `\n`/`\r` are not included.
pub(crate) fn is_space_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
}

/// Decode one UTF-8 code point; invalid sequences decode as the replacement
/// character with width 1, matching the byte-at-a-time folding of the hash.
pub(crate) fn decode_rune(s: &[u8]) -> (char, usize) {
    let b = s[0];
    if b < 0x80 {
        return (b as char, 1);
    }
    let width = match b {
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return (char::REPLACEMENT_CHARACTER, 1),
    };
    if s.len() < width {
        return (char::REPLACEMENT_CHARACTER, 1);
    }
    match std::str::from_utf8(&s[..width]) {
        Ok(t) => (
            t.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER),
            width,
        ),
        Err(_) => (char::REPLACEMENT_CHARACTER, 1),
    }
}

/// Single-rune lower-case fold. `char::to_lowercase` can expand to several
/// runes for a handful of code points; the first one keeps the fold a
/// rune-to-rune map so that compare and hash stay in agreement.
pub(crate) fn fold_rune(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn skip_space_byte(line: &[u8], mut i: usize) -> usize {
    while i < line.len() && is_space_byte(line[i]) {
        i += 1;
    }
    i
}

fn next_byte_nonspace(line: &[u8], i: usize) -> (u8, usize) {
    (line[i], skip_space_byte(line, i + 1))
}

// Next byte plus whether a whitespace run follows it; a run that ends the
// line does not count as a following space.
fn next_byte_xspace(line: &[u8], i: usize) -> (u8, bool, usize) {
    let b = line[i];
    let mut i = i + 1;
    let mut space_after = false;
    while i < line.len() && is_space_byte(line[i]) {
        space_after = true;
        i += 1;
    }
    if space_after && i >= line.len() {
        space_after = false;
    }
    (b, space_after, i)
}

fn skip_space_rune(line: &[u8], mut i: usize) -> usize {
    while i < line.len() {
        let (r, size) = decode_rune(&line[i..]);
        if !r.is_whitespace() {
            return i;
        }
        i += size;
    }
    i
}

fn next_rune_nonspace(line: &[u8], i: usize) -> (char, usize) {
    let (r, size) = decode_rune(&line[i..]);
    (r, skip_space_rune(line, i + size))
}

fn next_rune_xspace(line: &[u8], i: usize) -> (char, bool, usize) {
    let (r, size) = decode_rune(&line[i..]);
    let mut i = i + size;
    let mut space_after = false;
    while i < line.len() {
        let (s, size) = decode_rune(&line[i..]);
        if !s.is_whitespace() {
            break;
        }
        space_after = true;
        i += size;
    }
    if space_after && i >= line.len() {
        space_after = false;
    }
    (r, space_after, i)
}

/// Equality predicate and 32-bit hash over a single line, parameterized by
/// the comparison flags. The two always agree: `equal(a, b)` implies
/// `hash(a) == hash(b)` under the active flags.
///
/// Folding order for both operations: drop all whitespace, else collapse
/// whitespace runs to a single interior space, then fold case. Without any
/// folding flag the exact byte-wise fast path applies.
#[derive(Debug, Clone, Copy)]
pub struct LineComparator {
    flags: CompareFlags,
}

impl LineComparator {
    pub fn new(flags: CompareFlags) -> Self {
        LineComparator { flags }
    }

    pub fn equal(&self, line1: &[u8], line2: &[u8]) -> bool {
        if !self.flags.folds() {
            line1 == line2
        } else if self.flags.contains(CompareFlags::UNICODE) {
            self.equal_unicode(line1, line2)
        } else {
            self.equal_bytes(line1, line2)
        }
    }

    pub fn hash(&self, line: &[u8]) -> u32 {
        if !self.flags.folds() {
            crc32fast::hash(line)
        } else if self.flags.contains(CompareFlags::UNICODE) {
            self.hash_unicode(line)
        } else {
            self.hash_bytes(line)
        }
    }

    fn ignore_case(&self) -> bool {
        self.flags.contains(CompareFlags::IGNORE_CASE)
    }

    fn equal_bytes(&self, line1: &[u8], line2: &[u8]) -> bool {
        if self.flags.contains(CompareFlags::IGNORE_ALL_SPACE) {
            let mut i = skip_space_byte(line1, 0);
            let mut j = skip_space_byte(line2, 0);
            while i < line1.len() && j < line2.len() {
                let (mut v1, ni) = next_byte_nonspace(line1, i);
                let (mut v2, nj) = next_byte_nonspace(line2, j);
                if self.ignore_case() && v1 != v2 {
                    v1 = v1.to_ascii_lowercase();
                    v2 = v2.to_ascii_lowercase();
                }
                if v1 != v2 {
                    return false;
                }
                i = ni;
                j = nj;
            }
            i >= line1.len() && j >= line2.len()
        } else if self.flags.contains(CompareFlags::IGNORE_SPACE_CHANGE) {
            let mut i = skip_space_byte(line1, 0);
            let mut j = skip_space_byte(line2, 0);
            while i < line1.len() && j < line2.len() {
                let (mut v1, space1, ni) = next_byte_xspace(line1, i);
                let (mut v2, space2, nj) = next_byte_xspace(line2, j);
                if self.ignore_case() && v1 != v2 {
                    v1 = v1.to_ascii_lowercase();
                    v2 = v2.to_ascii_lowercase();
                }
                if v1 != v2 || space1 != space2 {
                    return false;
                }
                i = ni;
                j = nj;
            }
            i >= line1.len() && j >= line2.len()
        } else {
            // case fold only, lengths must match byte for byte
            line1.len() == line2.len()
                && line1
                    .iter()
                    .zip(line2)
                    .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
        }
    }

    fn equal_unicode(&self, line1: &[u8], line2: &[u8]) -> bool {
        if self.flags.contains(CompareFlags::IGNORE_ALL_SPACE) {
            let mut i = skip_space_rune(line1, 0);
            let mut j = skip_space_rune(line2, 0);
            while i < line1.len() && j < line2.len() {
                let (mut v1, ni) = next_rune_nonspace(line1, i);
                let (mut v2, nj) = next_rune_nonspace(line2, j);
                if self.ignore_case() && v1 != v2 {
                    v1 = fold_rune(v1);
                    v2 = fold_rune(v2);
                }
                if v1 != v2 {
                    return false;
                }
                i = ni;
                j = nj;
            }
            i >= line1.len() && j >= line2.len()
        } else if self.flags.contains(CompareFlags::IGNORE_SPACE_CHANGE) {
            let mut i = skip_space_rune(line1, 0);
            let mut j = skip_space_rune(line2, 0);
            while i < line1.len() && j < line2.len() {
                let (mut v1, space1, ni) = next_rune_xspace(line1, i);
                let (mut v2, space2, nj) = next_rune_xspace(line2, j);
                if self.ignore_case() && v1 != v2 {
                    v1 = fold_rune(v1);
                    v2 = fold_rune(v2);
                }
                if v1 != v2 || space1 != space2 {
                    return false;
                }
                i = ni;
                j = nj;
            }
            i >= line1.len() && j >= line2.len()
        } else {
            if line1.len() != line2.len() {
                return false;
            }
            let mut i = 0;
            let mut j = 0;
            while i < line1.len() && j < line2.len() {
                let (v1, size1) = decode_rune(&line1[i..]);
                let (v2, size2) = decode_rune(&line2[j..]);
                if v1 != v2 && fold_rune(v1) != fold_rune(v2) {
                    return false;
                }
                i += size1;
                j += size2;
            }
            i >= line1.len() && j >= line2.len()
        }
    }

    fn hash_bytes(&self, line: &[u8]) -> u32 {
        let mut hash = Hasher::new();
        if self.flags.contains(CompareFlags::IGNORE_ALL_SPACE) {
            for &v in line {
                if !is_space_byte(v) {
                    hash.update(&[self.fold_byte(v)]);
                }
            }
        } else if self.flags.contains(CompareFlags::IGNORE_SPACE_CHANGE) {
            // keep a shadow of the state before the collapsed space so that a
            // trailing whitespace run can be dropped again
            let mut last = hash.clone();
            let mut last_space = true;
            for &v in line {
                if is_space_byte(v) {
                    if !last_space {
                        last = hash.clone();
                        hash.update(b" ");
                    }
                    last_space = true;
                } else {
                    hash.update(&[self.fold_byte(v)]);
                    last_space = false;
                }
            }
            if last_space {
                hash = last;
            }
        } else {
            for &v in line {
                hash.update(&[v.to_ascii_lowercase()]);
            }
        }
        hash.finalize()
    }

    fn hash_unicode(&self, line: &[u8]) -> u32 {
        let mut hash = Hasher::new();
        let mut buf = [0u8; 4];
        let mut i = 0;
        if self.flags.contains(CompareFlags::IGNORE_ALL_SPACE) {
            while i < line.len() {
                let (v, size) = decode_rune(&line[i..]);
                i += size;
                if !v.is_whitespace() {
                    hash.update(self.fold_if_case(v).encode_utf8(&mut buf).as_bytes());
                }
            }
        } else if self.flags.contains(CompareFlags::IGNORE_SPACE_CHANGE) {
            let mut last = hash.clone();
            let mut last_space = true;
            while i < line.len() {
                let (v, size) = decode_rune(&line[i..]);
                i += size;
                if v.is_whitespace() {
                    if !last_space {
                        last = hash.clone();
                        hash.update(b" ");
                    }
                    last_space = true;
                } else {
                    hash.update(self.fold_if_case(v).encode_utf8(&mut buf).as_bytes());
                    last_space = false;
                }
            }
            if last_space {
                hash = last;
            }
        } else {
            while i < line.len() {
                let (v, size) = decode_rune(&line[i..]);
                i += size;
                hash.update(fold_rune(v).encode_utf8(&mut buf).as_bytes());
            }
        }
        hash.finalize()
    }

    fn fold_byte(&self, b: u8) -> u8 {
        if self.ignore_case() { b.to_ascii_lowercase() } else { b }
    }

    fn fold_if_case(&self, c: char) -> char {
        if self.ignore_case() { fold_rune(c) } else { c }
    }
}
