use bytes::Bytes;

use super::compare::LineComparator;

/// Signed line id. Positive ids name equivalence classes of lines; id 0 is
/// reserved for the blank-line class (populated only when blank lines are
/// ignored); negative ids are compression sentinels that never match
/// anything.
pub type LineId = i64;

/// Per-side line data flowing through the pipeline.
///
/// `ids` has one entry per original line. `change` is written by the
/// compressor (one-sided-unique lines) and by the diff engine, which only
/// touches `[zids_start, zids_end)`. `zids`/`zcount` are the compressed id
/// sequence actually handed to the engine and the number of original lines
/// behind each entry; `sum(zcount) == zids_end - zids_start`.
#[derive(Debug, Clone, Default)]
pub struct LinesData {
    pub ids: Vec<LineId>,
    pub change: Vec<bool>,
    pub zids: Vec<LineId>,
    pub zcount: Vec<usize>,
    pub zids_start: usize,
    pub zids_end: usize,
}

impl LinesData {
    fn from_ids(ids: Vec<LineId>) -> Self {
        let change = vec![false; ids.len()];
        LinesData {
            ids,
            change,
            ..Default::default()
        }
    }
}

struct EquivEntry {
    id: LineId,
    hash: u32,
    line: Bytes,
    next: Option<usize>,
}

/// Equivalence table mapping lines to compact ids: two lines receive the
/// same id iff the comparator considers them equal. The id space is shared
/// across both sides. Buckets are an explicit power-of-two array with
/// index-linked collision chains, since the 32-bit hash is already computed;
/// on a hash match the comparator confirms equality.
pub struct EquivTable {
    comparator: LineComparator,
    mask: usize,
    buckets: Vec<Option<usize>>,
    entries: Vec<EquivEntry>,
    next_id: LineId,
}

impl EquivTable {
    /// Sized for `expected_lines` total lines across both sides: the
    /// smallest power of two at least twice that, floor 512.
    pub fn for_input(comparator: LineComparator, expected_lines: usize) -> Self {
        let mut buckets = 1usize << 9;
        while buckets < expected_lines * 2 {
            buckets <<= 1;
        }
        EquivTable {
            comparator,
            mask: buckets - 1,
            buckets: vec![None; buckets],
            entries: Vec::with_capacity(expected_lines),
            next_id: 1,
        }
    }

    /// Pre-assign id 0 to the empty line so every blank line classifies to
    /// it; the hunk grouper later skips change regions made only of id-0
    /// lines.
    pub fn seed_blank_class(&mut self) {
        let blank = Bytes::new();
        let hash = self.comparator.hash(&blank);
        let bucket = (hash as usize) & self.mask;
        self.entries.push(EquivEntry {
            id: 0,
            hash,
            line: blank,
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(self.entries.len() - 1);
    }

    pub fn intern(&mut self, line: &Bytes) -> LineId {
        let hash = self.comparator.hash(line);
        let bucket = (hash as usize) & self.mask;

        let mut cursor = self.buckets[bucket];
        while let Some(index) = cursor {
            let entry = &self.entries[index];
            if entry.hash == hash && self.comparator.equal(line, &entry.line) {
                return entry.id;
            }
            cursor = entry.next;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(EquivEntry {
            id,
            hash,
            line: line.clone(),
            next: self.buckets[bucket],
        });
        self.buckets[bucket] = Some(self.entries.len() - 1);
        id
    }

    /// Count of real ids handed out so far (the blank class not included).
    pub fn id_count(&self) -> LineId {
        self.next_id - 1
    }
}

/// Classify both sides into shared ids. Returns the per-side data plus the
/// id watermark after side A and after side B: ids in `(max_id_a, max_id_b]`
/// occur on side B only.
pub fn classify_lines(
    lines1: &[Bytes],
    lines2: &[Bytes],
    comparator: LineComparator,
    ignore_blank_lines: bool,
) -> (LinesData, LinesData, LineId, LineId) {
    let mut table = EquivTable::for_input(comparator, lines1.len() + lines2.len());
    if ignore_blank_lines {
        table.seed_blank_class();
    }

    let ids1: Vec<LineId> = lines1.iter().map(|line| table.intern(line)).collect();
    let max_id_a = table.id_count();
    let ids2: Vec<LineId> = lines2.iter().map(|line| table.intern(line)).collect();
    let max_id_b = table.id_count();

    (
        LinesData::from_ids(ids1),
        LinesData::from_ids(ids2),
        max_id_a,
        max_id_b,
    )
}
