//! Deck store: ordered candidate queue, cursor, and the single rewind slot.
//!
//! Entries are addressed by absolute index. `advance()` vacates the slot under
//! the cursor and hands the candidate to the caller, so a decided candidate is
//! only kept alive by whoever needs it for rollback or rewind. Vacated slots
//! that can no longer be restored are compacted away; `base` keeps absolute
//! indices stable across compaction.

use std::collections::{HashSet, VecDeque};

use swipe_types::{Candidate, CandidateId};

use crate::error::DeckError;

/// The most recent committed pass and where it sat in the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct RewindSlot {
    /// The passed candidate.
    pub candidate: Candidate,
    /// Cursor value before the pass advanced the deck.
    pub index: usize,
}

/// Pure state container; no I/O.
#[derive(Debug, Default)]
pub struct DeckStore {
    slots: VecDeque<Option<Candidate>>,
    base: usize,
    cursor: usize,
    rewind: Option<RewindSlot>,
    known: HashSet<CandidateId>,
}

impl DeckStore {
    /// Empty deck.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute index of the current card.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Absolute length: every candidate ever appended since the last reset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.base + self.slots.len()
    }

    /// True when nothing was ever appended since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Undecided candidates at and after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len() - self.cursor
    }

    /// Cursor reached the tail; more candidates must be fetched.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.len()
    }

    /// Candidate under the cursor, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Candidate> {
        self.slots
            .get(self.cursor - self.base)
            .and_then(Option::as_ref)
    }

    /// Up to `n` candidates starting at the cursor, for pre-rendering.
    #[must_use]
    pub fn peek(&self, n: usize) -> Vec<Candidate> {
        self.slots
            .iter()
            .skip(self.cursor - self.base)
            .filter_map(Option::as_ref)
            .take(n)
            .cloned()
            .collect()
    }

    /// Move past the current card, returning it.
    ///
    /// # Errors
    /// `DeckError::Underflow` when the deck is exhausted.
    pub fn advance(&mut self) -> Result<Candidate, DeckError> {
        let underflow = DeckError::Underflow {
            cursor: self.cursor,
            len: self.len(),
        };
        let candidate = self
            .slots
            .get_mut(self.cursor - self.base)
            .and_then(Option::take)
            .ok_or(underflow)?;
        self.cursor += 1;
        self.compact();
        Ok(candidate)
    }

    /// Append fetched candidates to the tail.
    ///
    /// Ids already seen since the last reset are skipped, so re-delivering a
    /// page is a no-op and decided candidates never come back. Returns how
    /// many candidates were appended.
    pub fn extend(&mut self, candidates: impl IntoIterator<Item = Candidate>) -> usize {
        let mut added = 0;
        for candidate in candidates {
            if self.known.insert(candidate.id.clone()) {
                self.slots.push_back(Some(candidate));
                added += 1;
            }
        }
        added
    }

    /// Put `candidate` back at `index` and move the cursor there.
    ///
    /// Only valid for the slot the most recent `advance()` vacated: the cursor
    /// must sit right after `index` and the slot must be empty.
    ///
    /// # Errors
    /// `DeckError::RewindConflict` for any other cursor/index relationship.
    pub fn rewind_to(&mut self, candidate: Candidate, index: usize) -> Result<(), DeckError> {
        let conflict = DeckError::RewindConflict {
            index,
            cursor: self.cursor,
            len: self.len(),
        };
        if index + 1 != self.cursor || index < self.base {
            return Err(conflict);
        }
        let slot = self.slots.get_mut(index - self.base).ok_or(conflict.clone())?;
        if slot.is_some() {
            return Err(conflict);
        }
        self.known.insert(candidate.id.clone());
        *slot = Some(candidate);
        self.cursor = index;
        Ok(())
    }

    /// Remember a committed pass, replacing any older one.
    pub fn set_rewind_slot(&mut self, candidate: Candidate, index: usize) {
        self.rewind = Some(RewindSlot { candidate, index });
        self.compact();
    }

    /// Forget the remembered pass.
    pub fn clear_rewind_slot(&mut self) {
        self.rewind = None;
        self.compact();
    }

    /// The remembered pass, if any.
    #[must_use]
    pub fn rewind_slot(&self) -> Option<&RewindSlot> {
        self.rewind.as_ref()
    }

    /// Restore the remembered pass. Returns `Ok(None)` when there is nothing to restore.
    ///
    /// # Errors
    /// `DeckError::RewindConflict` if the deck moved since the pass; the slot is kept.
    pub fn rewind(&mut self) -> Result<Option<CandidateId>, DeckError> {
        let Some(slot) = self.rewind.clone() else {
            return Ok(None);
        };
        let candidate_id = slot.candidate.id.clone();
        self.rewind_to(slot.candidate, slot.index)?;
        self.rewind = None;
        Ok(Some(candidate_id))
    }

    /// Drop every candidate, the cursor and the rewind slot.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.base = 0;
        self.cursor = 0;
        self.rewind = None;
        self.known.clear();
    }

    // Keep the slot just behind the cursor (rollback target) and the rewind
    // slot's index; everything vacated before that is gone for good.
    fn compact(&mut self) {
        let mut floor = self.cursor.saturating_sub(1);
        if let Some(slot) = &self.rewind {
            floor = floor.min(slot.index);
        }
        while self.base < floor && matches!(self.slots.front(), Some(None)) {
            self.slots.pop_front();
            self.base += 1;
        }
    }
}
