//! Row selection sets.
//!
//! A [`Selection`] is an ordered set of row positions. Small or scattered
//! sets are held as a sorted row list; sets covering a large share of their
//! span are held as a 64-bit word bitmap whose cardinality is kept current
//! on every insert and union, so callers can test for full coverage without
//! rescanning.
//!
//! A list becomes a bitmap once the bitmap needs at most half as many words
//! as the list has rows. A bitmap that grows past twice as many words as
//! rows goes back to a list.

use std::fmt;
use std::ops::Range;

const WORD_BITS: usize = 64;

#[derive(Clone)]
enum Layout {
    /// Sorted, distinct rows.
    List(Vec<usize>),
    /// One bit per row.
    Bitmap { words: Vec<u64>, cardinality: usize },
}

/// Ordered set of row positions.
#[derive(Clone)]
pub struct Selection {
    layout: Layout,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            layout: Layout::List(Vec::new()),
        }
    }
}

impl Selection {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty selection backed by a bitmap wide enough for rows `0..rows`.
    ///
    /// Inserts and unions below `rows` never reallocate or switch layout,
    /// and cost only the rows added. Used for running coverage sets.
    #[must_use]
    pub fn with_universe(rows: usize) -> Self {
        Self {
            layout: Layout::Bitmap {
                words: vec![0; rows.div_ceil(WORD_BITS)],
                cardinality: 0,
            },
        }
    }

    /// Every row in `range`.
    #[must_use]
    pub fn with_range(range: Range<usize>) -> Self {
        if range.is_empty() {
            return Self::new();
        }
        let width = words_for(range.end - 1);
        if width > range.len() {
            return Self {
                layout: Layout::List(range.collect()),
            };
        }
        let cardinality = range.len();
        let mut words = vec![0; width];
        for (word, mask) in range_masks(range) {
            words[word] |= mask;
        }
        Self {
            layout: Layout::Bitmap { words, cardinality },
        }
    }

    /// Selection holding exactly the given rows, in any order.
    pub fn from_rows<I: IntoIterator<Item = usize>>(rows: I) -> Self {
        let mut rows: Vec<usize> = rows.into_iter().collect();
        rows.sort_unstable();
        rows.dedup();
        Self::from_sorted(rows)
    }

    /// Add `row`; returns false if it was already present.
    pub fn insert(&mut self, row: usize) -> bool {
        match &mut self.layout {
            Layout::List(rows) => {
                match rows.last() {
                    Some(&last) if last >= row => match rows.binary_search(&row) {
                        Ok(_) => return false,
                        Err(at) => rows.insert(at, row),
                    },
                    _ => rows.push(row),
                }
                self.promote_if_dense();
                true
            }
            Layout::Bitmap { words, cardinality } => {
                let before = words.len();
                if !set_bit(words, row) {
                    return false;
                }
                *cardinality += 1;
                if words.len() > before {
                    self.demote_if_sparse();
                }
                true
            }
        }
    }

    #[must_use]
    pub fn contains(&self, row: usize) -> bool {
        match &self.layout {
            Layout::List(rows) => rows.binary_search(&row).is_ok(),
            Layout::Bitmap { words, .. } => {
                let (word, bit) = split(row);
                words.get(word).is_some_and(|w| w & (1_u64 << bit) != 0)
            }
        }
    }

    /// Number of selected rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.layout {
            Layout::List(rows) => rows.len(),
            Layout::Bitmap { cardinality, .. } => *cardinality,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether rows are currently held in a bitmap rather than a list.
    #[must_use]
    pub const fn is_dense(&self) -> bool {
        matches!(self.layout, Layout::Bitmap { .. })
    }

    /// Intersection.
    ///
    /// Unless both sides are bitmaps, the smaller side is walked and probed
    /// against the larger one.
    #[must_use]
    pub fn and(&self, other: &Self) -> Self {
        if let (Layout::Bitmap { words: a, .. }, Layout::Bitmap { words: b, .. }) =
            (&self.layout, &other.layout)
        {
            return Self::from_words(a.iter().zip(b).map(|(x, y)| x & y).collect());
        }
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Self::from_sorted(small.iter().filter(|&r| large.contains(r)).collect())
    }

    /// Union.
    #[must_use]
    pub fn or(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.or_assign(other);
        result
    }

    /// In-place union. A bitmap receiver pays only for the rows or words of
    /// `other`.
    pub fn or_assign(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        match &mut self.layout {
            Layout::Bitmap { words, cardinality } => {
                let before = words.len();
                match &other.layout {
                    Layout::List(rows) => {
                        for &row in rows {
                            if set_bit(words, row) {
                                *cardinality += 1;
                            }
                        }
                    }
                    Layout::Bitmap { words: src, .. } => {
                        if src.len() > words.len() {
                            words.resize(src.len(), 0);
                        }
                        for (dst, &add) in words.iter_mut().zip(src) {
                            *cardinality += (add & !*dst).count_ones() as usize;
                            *dst |= add;
                        }
                    }
                }
                if words.len() > before {
                    self.demote_if_sparse();
                }
            }
            Layout::List(rows) => match &other.layout {
                Layout::List(add) => {
                    let merged = merge_union(rows, add);
                    *self = Self::from_sorted(merged);
                }
                Layout::Bitmap { .. } => {
                    let mine = std::mem::take(rows);
                    let mut merged = other.clone();
                    for row in mine {
                        merged.insert(row);
                    }
                    *self = merged;
                }
            },
        }
    }

    /// Rows in `self` that are not in `other`.
    #[must_use]
    pub fn and_not(&self, other: &Self) -> Self {
        match (&self.layout, &other.layout) {
            (Layout::Bitmap { words, .. }, Layout::Bitmap { words: sub, .. }) => Self::from_words(
                words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| w & !sub.get(i).copied().unwrap_or(0))
                    .collect(),
            ),
            (Layout::Bitmap { words, .. }, Layout::List(sub)) => {
                let mut words = words.clone();
                for &row in sub {
                    let (word, bit) = split(row);
                    if let Some(w) = words.get_mut(word) {
                        *w &= !(1_u64 << bit);
                    }
                }
                Self::from_words(words)
            }
            (Layout::List(rows), _) => Self::from_sorted(
                rows.iter()
                    .copied()
                    .filter(|&r| !other.contains(r))
                    .collect(),
            ),
        }
    }

    /// Toggle membership of every row in `range`; rows outside it are kept.
    ///
    /// `done.flip(0..row_count)` is the complement of `done` over a table.
    #[must_use]
    pub fn flip(&self, range: Range<usize>) -> Self {
        let mut words = self.to_words();
        if !range.is_empty() {
            let width = words_for(range.end - 1);
            if width > words.len() {
                words.resize(width, 0);
            }
            for (word, mask) in range_masks(range) {
                words[word] ^= mask;
            }
        }
        Self::from_words(words)
    }

    /// Ascending iterator over selected rows.
    #[must_use]
    pub fn iter(&self) -> SelectionIter<'_> {
        let inner = match &self.layout {
            Layout::List(rows) => IterInner::List(rows.iter()),
            Layout::Bitmap { words, .. } => IterInner::Bitmap(WordBits::new(words)),
        };
        SelectionIter { inner }
    }

    /// Largest selected row.
    #[must_use]
    pub fn max(&self) -> Option<usize> {
        match &self.layout {
            Layout::List(rows) => rows.last().copied(),
            Layout::Bitmap { words, .. } => words
                .iter()
                .enumerate()
                .rev()
                .find(|(_, w)| **w != 0)
                .map(|(i, w)| i * WORD_BITS + (WORD_BITS - 1 - w.leading_zeros() as usize)),
        }
    }

    /// Selected rows as a vector, ascending.
    #[must_use]
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }

    fn from_sorted(rows: Vec<usize>) -> Self {
        match rows.last() {
            Some(&max) if words_for(max) <= rows.len() => Self::bitmap_from_sorted(&rows),
            _ => Self {
                layout: Layout::List(rows),
            },
        }
    }

    fn bitmap_from_sorted(rows: &[usize]) -> Self {
        let mut words = vec![0; rows.last().map_or(0, |&max| words_for(max))];
        for &row in rows {
            set_bit(&mut words, row);
        }
        Self {
            layout: Layout::Bitmap {
                words,
                cardinality: rows.len(),
            },
        }
    }

    fn from_words(mut words: Vec<u64>) -> Self {
        while words.last() == Some(&0) {
            words.pop();
        }
        let cardinality: usize = words.iter().map(|w| w.count_ones() as usize).sum();
        if cardinality == 0 {
            return Self::new();
        }
        let layout = if words.len() <= cardinality {
            Layout::Bitmap { words, cardinality }
        } else {
            Layout::List(WordBits::new(&words).collect())
        };
        Self { layout }
    }

    fn to_words(&self) -> Vec<u64> {
        match &self.layout {
            Layout::Bitmap { words, .. } => words.clone(),
            Layout::List(rows) => {
                let mut words = vec![0; rows.last().map_or(0, |&max| words_for(max))];
                for &row in rows {
                    set_bit(&mut words, row);
                }
                words
            }
        }
    }

    fn promote_if_dense(&mut self) {
        let Layout::List(rows) = &mut self.layout else {
            return;
        };
        let Some(&max) = rows.last() else {
            return;
        };
        if words_for(max) * 2 <= rows.len() {
            let rows = std::mem::take(rows);
            *self = Self::bitmap_from_sorted(&rows);
        }
    }

    fn demote_if_sparse(&mut self) {
        let Layout::Bitmap { words, cardinality } = &self.layout else {
            return;
        };
        if words.len() > cardinality.saturating_mul(2) {
            let rows = WordBits::new(words).collect();
            self.layout = Layout::List(rows);
        }
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Selection {}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = usize;
    type IntoIter = SelectionIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Iteration ──────────────────────────────────────────────────────────────

/// Iterator returned by [`Selection::iter`].
#[derive(Debug, Clone)]
pub struct SelectionIter<'a> {
    inner: IterInner<'a>,
}

#[derive(Debug, Clone)]
enum IterInner<'a> {
    List(std::slice::Iter<'a, usize>),
    Bitmap(WordBits<'a>),
}

impl Iterator for SelectionIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match &mut self.inner {
            IterInner::List(rows) => rows.next().copied(),
            IterInner::Bitmap(bits) => bits.next(),
        }
    }
}

/// Set bit positions of a word slice, ascending.
#[derive(Debug, Clone)]
struct WordBits<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl<'a> WordBits<'a> {
    fn new(words: &'a [u64]) -> Self {
        Self {
            words,
            word_idx: 0,
            current: words.first().copied().unwrap_or(0),
        }
    }
}

impl Iterator for WordBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_idx * WORD_BITS + bit);
            }
            self.word_idx += 1;
            self.current = *self.words.get(self.word_idx)?;
        }
    }
}

// ── Word helpers ───────────────────────────────────────────────────────────

const fn split(row: usize) -> (usize, usize) {
    (row / WORD_BITS, row % WORD_BITS)
}

/// Words needed to hold rows up to and including `max_row`.
const fn words_for(max_row: usize) -> usize {
    max_row / WORD_BITS + 1
}

/// Set `row`, growing `words` as needed; returns true if it was clear.
fn set_bit(words: &mut Vec<u64>, row: usize) -> bool {
    let (word, bit) = split(row);
    if word >= words.len() {
        words.resize(word + 1, 0);
    }
    let mask = 1_u64 << bit;
    let fresh = words[word] & mask == 0;
    words[word] |= mask;
    fresh
}

fn merge_union(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Per-word masks covering `range`, which must be non-empty.
fn range_masks(range: Range<usize>) -> impl Iterator<Item = (usize, u64)> {
    let (first_word, first_bit) = split(range.start);
    let (last_word, last_bit) = split(range.end - 1);
    (first_word..=last_word).map(move |word| {
        let lo = if word == first_word { first_bit } else { 0 };
        let hi = if word == last_word {
            last_bit
        } else {
            WORD_BITS - 1
        };
        let width = hi - lo + 1;
        let mask = if width == WORD_BITS {
            u64::MAX
        } else {
            ((1_u64 << width) - 1) << lo
        };
        (word, mask)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_and_len() {
        let mut s = Selection::new();
        assert!(s.insert(3));
        assert!(!s.insert(3));
        assert!(s.insert(130));
        assert_eq!(s.len(), 2);
        assert!(s.contains(130));
        assert!(!s.contains(4));
        assert_eq!(s.to_vec(), vec![3, 130]);
        assert_eq!(s.max(), Some(130));
    }

    #[test]
    fn with_range_spans_word_boundaries() {
        let s = Selection::with_range(60..200);
        assert_eq!(s.len(), 140);
        assert!(!s.contains(59));
        assert!(s.contains(60));
        assert!(s.contains(199));
        assert!(!s.contains(200));
        assert_eq!(Selection::with_range(5..5).len(), 0);
    }

    #[test]
    fn and_or_and_not() {
        let a = Selection::from_rows([1, 2, 3, 70]);
        let b = Selection::from_rows([2, 3, 4]);
        assert_eq!(a.and(&b).to_vec(), vec![2, 3]);
        assert_eq!(a.or(&b).to_vec(), vec![1, 2, 3, 4, 70]);
        assert_eq!(a.and_not(&b).to_vec(), vec![1, 70]);
        assert_eq!(b.and(&a).len(), 2);
    }

    #[test]
    fn flip_is_complement_within_range() {
        let done = Selection::from_rows([0, 2, 65]);
        let rest = done.flip(0..67);
        assert_eq!(rest.len(), 64);
        assert!(!rest.contains(0));
        assert!(rest.contains(1));
        assert!(rest.contains(66));
        assert!(!rest.contains(65));

        // Rows outside the flipped range are preserved.
        let partial = Selection::from_rows([10, 100]).flip(0..5);
        assert_eq!(partial.to_vec(), vec![0, 1, 2, 3, 4, 10, 100]);
    }

    #[test]
    fn or_assign_tracks_cardinality() {
        let mut done = Selection::new();
        done.or_assign(&Selection::from_rows([1, 5]));
        done.or_assign(&Selection::from_rows([5, 9]));
        assert_eq!(done.len(), 3);
        assert!(Selection::new().is_empty());
        assert_eq!(Selection::new().max(), None);
    }

    #[test]
    fn scattered_rows_stay_a_list() {
        let group = Selection::from_rows([3, 500_000]);
        assert!(!group.is_dense(), "case=scattered_from_rows");
        assert_eq!(group.max(), Some(500_000));

        let mut grown = Selection::new();
        for row in 0..256 {
            grown.insert(row);
        }
        assert!(grown.is_dense(), "case=packed_inserts_promote");
        assert_eq!(grown.len(), 256);
    }

    #[test]
    fn bitmap_spread_out_returns_to_a_list() {
        let mut s = Selection::with_range(0..128);
        assert!(s.is_dense());
        s.insert(1_000_000);
        assert!(!s.is_dense(), "case=demoted_after_far_insert");
        assert_eq!(s.len(), 129);
        assert!(s.contains(127));
        assert!(s.contains(1_000_000));
        assert!(!s.contains(128));
    }

    #[test]
    fn universe_bitmap_counts_unions_incrementally() {
        let mut done = Selection::with_universe(1000);
        assert!(done.is_empty());
        done.or_assign(&Selection::from_rows([1, 999]));
        done.or_assign(&Selection::with_range(0..10));
        done.or_assign(&Selection::from_rows([5]));
        assert!(done.is_dense(), "case=universe_keeps_layout");
        assert_eq!(done.len(), 11);
        assert_eq!(done.flip(0..1000).len(), 989);
    }

    #[test]
    fn equality_ignores_layout() {
        let list = Selection::from_rows([0, 70, 200]);
        let mut bitmap = Selection::with_universe(256);
        bitmap.or_assign(&list);
        assert_ne!(list.is_dense(), bitmap.is_dense());
        assert_eq!(list, bitmap);
        assert_eq!(Selection::with_range(1_000..1_003).to_vec(), vec![1_000, 1_001, 1_002]);
    }

    mod props {
        use std::collections::BTreeSet;

        use proptest::prelude::*;

        use super::super::Selection;

        proptest! {
            #[test]
            fn set_ops_match_btreeset(
                a in proptest::collection::vec(0usize..300, 0..60),
                b in proptest::collection::vec(0usize..300, 0..60),
            ) {
                let sa = Selection::from_rows(a.iter().copied());
                let sb = Selection::from_rows(b.iter().copied());
                let ta: BTreeSet<usize> = a.into_iter().collect();
                let tb: BTreeSet<usize> = b.into_iter().collect();

                let and: Vec<usize> = ta.intersection(&tb).copied().collect();
                let or: Vec<usize> = ta.union(&tb).copied().collect();
                let diff: Vec<usize> = ta.difference(&tb).copied().collect();
                prop_assert_eq!(sa.and(&sb).to_vec(), and, "case=and");
                prop_assert_eq!(sa.or(&sb).to_vec(), or, "case=or");
                prop_assert_eq!(sa.and_not(&sb).to_vec(), diff, "case=and_not");
                prop_assert_eq!(sa.len(), ta.len(), "case=cardinality");
                prop_assert_eq!(sa.flip(0..300).len(), 300 - ta.len(), "case=flip");
            }

            #[test]
            fn mixed_layouts_match_btreeset(
                dense in 0usize..400,
                scattered in proptest::collection::vec(0usize..100_000, 0..40),
                extra in proptest::collection::vec(0usize..2_000, 0..40),
            ) {
                let sa = Selection::with_range(0..dense);
                let mut sb = Selection::new();
                for &row in &scattered {
                    sb.insert(row);
                }
                let mut sc = Selection::with_universe(2_000);
                sc.or_assign(&Selection::from_rows(extra.iter().copied()));
                let ta: BTreeSet<usize> = (0..dense).collect();
                let tb: BTreeSet<usize> = scattered.iter().copied().collect();
                let tc: BTreeSet<usize> = extra.iter().copied().collect();

                for (x, tx, y, ty, case) in [
                    (&sa, &ta, &sb, &tb, "range_scattered"),
                    (&sb, &tb, &sc, &tc, "scattered_universe"),
                    (&sc, &tc, &sa, &ta, "universe_range"),
                ] {
                    let and: Vec<usize> = tx.intersection(ty).copied().collect();
                    let or: Vec<usize> = tx.union(ty).copied().collect();
                    let diff: Vec<usize> = tx.difference(ty).copied().collect();
                    prop_assert_eq!(x.and(y).to_vec(), and, "case=and_{}", case);
                    let mut joined = x.clone();
                    joined.or_assign(y);
                    prop_assert_eq!(joined.len(), or.len(), "case=or_len_{}", case);
                    prop_assert_eq!(joined.to_vec(), or, "case=or_{}", case);
                    prop_assert_eq!(x.and_not(y).to_vec(), diff, "case=and_not_{}", case);
                }
                prop_assert_eq!(sb.clone(), Selection::from_rows(scattered), "case=insert_vs_from_rows");
            }
        }
    }
}
