use crate::{evaluation::Score, r#move::Move, zob_hash::Hash};

/// How a stored score relates to the true value of the position
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Bound {
    /// Every move was searched inside the window
    Exact,
    /// A move caused a beta cutoff, the true value is at least the score
    Lower,
    /// No move raised alpha, the true value is at most the score
    Upper,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct TtEntry {
    pub hash: Hash,
    pub depth: u8,
    pub score: Score,
    pub bound: Bound,
    pub best_move: Option<Move>,
}
impl TtEntry {
    /// Returns the stored score if it can stand in for a search of `depth`
    /// plies with the window (alpha, beta)
    pub fn cutoff(&self, depth: u8, alpha: Score, beta: Score) -> Option<Score> {
        if self.depth < depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

// Each bucket holds a depth-preferred entry and an always-replaced one
pub struct TranspositionTable(Vec<(Option<TtEntry>, Option<TtEntry>)>);
impl TranspositionTable {
    pub fn new(size: usize) -> Self {
        TranspositionTable(vec![(None, None); size.max(1)])
    }

    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|bucket| *bucket = (None, None));
    }

    /// Only returns entries stored for this exact key, never a colliding one
    pub fn probe(&self, hash: Hash) -> Option<TtEntry> {
        let (depth_entry, young_entry) = self.0[self.key_from_hash(hash)];
        [depth_entry, young_entry]
            .into_iter()
            .flatten()
            .find(|entry| entry.hash == hash)
    }

    pub fn store(&mut self, entry: TtEntry) {
        let key = self.key_from_hash(entry.hash);
        let (depth_entry, young_entry) = &mut self.0[key];

        if Self::should_replace(depth_entry, &entry) {
            // Same position searched shallower is worthless
            if depth_entry.map_or(false, |old| old.hash != entry.hash) {
                *young_entry = *depth_entry;
            }
            *depth_entry = Some(entry);
        } else {
            *young_entry = Some(entry);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.iter().map(|(d, y)| d.is_some() as usize + y.is_some() as usize).sum()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn key_from_hash(&self, hash: Hash) -> usize {
        (hash % (self.0.len() as u64)) as usize
    }

    fn should_replace(old_entry: &Option<TtEntry>, new_entry: &TtEntry) -> bool {
        match old_entry {
            None => true,
            Some(old) => old.hash == new_entry.hash || old.depth <= new_entry.depth,
        }
    }
}
impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(1 << 18)
    }
}
