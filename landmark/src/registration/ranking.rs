//! Win counts for implicit reference selection.

/// Per-image count of pairs in which the image ended up as the target.
///
/// Built as per-thread partial tallies during parallel pair construction and
/// merged afterwards. The winner is the image with the most wins; the first
/// image in input order wins ties.
///
/// Win counts are a majority vote, not a total order: with three or more
/// images whose pairwise scale comparisons are cyclic, the winner need not
/// be the image with the largest absolute scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WinTally {
    wins: Vec<usize>,
}

impl WinTally {
    pub fn new(image_count: usize) -> Self {
        Self {
            wins: vec![0; image_count],
        }
    }

    /// Count one win for `index`.
    #[inline]
    pub fn record(&mut self, index: usize) {
        self.wins[index] += 1;
    }

    /// Add another partial tally into this one.
    pub fn merge(mut self, other: Self) -> Self {
        debug_assert_eq!(self.wins.len(), other.wins.len());
        for (w, o) in self.wins.iter_mut().zip(other.wins) {
            *w += o;
        }
        self
    }

    #[inline]
    pub fn wins(&self) -> &[usize] {
        &self.wins
    }

    /// Index with the most wins, first occurrence on ties. `None` when no
    /// image has won anything.
    pub fn winner(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, &count) in self.wins.iter().enumerate() {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((index, count)),
            }
        }
        best.map(|(index, _)| index)
    }
}
