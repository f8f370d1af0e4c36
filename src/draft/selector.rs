// The draft selector: turns a pool of tags into a displayed sub-draw and
// commits the player's pick.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clan::Clan;

use super::shuffled_take;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Non-fatal draft errors. Every failing operation is a no-op: prior
/// selector state (and the profile record) stays unchanged, and callers log
/// a warning rather than aborting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("clan pool is empty; nothing to draw")]
    EmptyPool,

    #[error("show count must be greater than zero")]
    ZeroShowCount,

    #[error("no sub-draw configured; configure a draw before selecting")]
    NoDrawConfigured,

    #[error("selection index {index} out of range (0-{})", .len.saturating_sub(1))]
    IndexOutOfRange { index: usize, len: usize },

    #[error("a clan was already selected this draft")]
    AlreadySelected,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// A committed pick: the clan and the sub-draw index it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub clan: Clan,
    pub index: usize,
}

/// What happens when `select` is called again after a successful pick.
///
/// The original behavior is `AllowChange` (last write wins); `LockFirstPick`
/// turns a second pick into a non-fatal `AlreadySelected` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReselectPolicy {
    AllowChange,
    LockFirstPick,
}

// ---------------------------------------------------------------------------
// DraftSelector
// ---------------------------------------------------------------------------

/// Owns the current sub-draw and the pick made from it.
///
/// `configure_draw` replaces any previously stored sub-draw (and clears the
/// previous selection, starting a fresh draft); `select` records the pick.
/// Persisting the pick into the profile record is the session's job.
#[derive(Debug)]
pub struct DraftSelector {
    options: Vec<Clan>,
    selection: Option<Selection>,
    policy: ReselectPolicy,
}

impl DraftSelector {
    pub fn new(policy: ReselectPolicy) -> Self {
        DraftSelector {
            options: Vec::new(),
            selection: None,
            policy,
        }
    }

    /// Draw `min(show_count, |pool_tags|)` distinct tags from `pool_tags` in
    /// random order and store them as the current sub-draw.
    ///
    /// An empty `pool_tags` stores an empty sub-draw and reports `EmptyPool`
    /// so the UI can degrade to an empty list; `show_count == 0` is rejected
    /// without touching the stored draw.
    pub fn configure_draw(
        &mut self,
        pool_tags: &[Clan],
        show_count: usize,
        rng: &mut impl Rng,
    ) -> Result<&[Clan], DraftError> {
        if show_count == 0 {
            return Err(DraftError::ZeroShowCount);
        }
        if pool_tags.is_empty() {
            self.options.clear();
            self.selection = None;
            return Err(DraftError::EmptyPool);
        }

        self.options = shuffled_take(pool_tags, show_count, rng);
        self.selection = None;
        Ok(&self.options)
    }

    /// Commit the pick at `index` in the current sub-draw.
    ///
    /// Fails (leaving any prior selection in place) when no draw is
    /// configured, the index is out of range, or a pick was already made
    /// under `LockFirstPick`.
    pub fn select(&mut self, index: usize) -> Result<Clan, DraftError> {
        if self.options.is_empty() {
            return Err(DraftError::NoDrawConfigured);
        }
        if index >= self.options.len() {
            return Err(DraftError::IndexOutOfRange {
                index,
                len: self.options.len(),
            });
        }
        if self.selection.is_some() && self.policy == ReselectPolicy::LockFirstPick {
            return Err(DraftError::AlreadySelected);
        }

        let clan = self.options[index];
        self.selection = Some(Selection { clan, index });
        Ok(clan)
    }

    /// The last configured sub-draw, in display order; empty if none.
    pub fn current_sub_draw(&self) -> &[Clan] {
        &self.options
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn policy(&self) -> ReselectPolicy {
        self.policy
    }

    /// Reinstate a persisted sub-draw and selection (crash recovery).
    pub fn restore_draw(&mut self, options: Vec<Clan>, selection: Option<Selection>) {
        self.options = options;
        self.selection = selection;
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
