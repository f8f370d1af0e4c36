// The configured clan pool: static entries plus stage-1 draws and
// display lookups.

use rand::Rng;

use crate::clan::{Clan, ClanEntry, Rgb};

use super::shuffled_take;

/// The fixed pool of selectable clans, loaded from config before use and
/// read-only thereafter. Typically 10 entries, one per clan.
#[derive(Debug, Clone)]
pub struct ClanPool {
    entries: Vec<ClanEntry>,
}

impl ClanPool {
    pub fn new(entries: Vec<ClanEntry>) -> Self {
        ClanPool { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ClanEntry] {
        &self.entries
    }

    /// The pool's tags in configured order.
    pub fn tags(&self) -> Vec<Clan> {
        self.entries.iter().map(|e| e.clan).collect()
    }

    /// Stage-1 draw: `min(count, len)` distinct tags in random order.
    /// An empty pool yields an empty draw; callers decide whether that is
    /// worth a warning.
    pub fn draw(&self, count: usize, rng: &mut impl Rng) -> Vec<Clan> {
        let tags = self.tags();
        shuffled_take(&tags, count, rng)
    }

    /// Button label for a clan; falls back to the canonical clan name when
    /// the clan has no pool entry.
    pub fn name_for(&self, clan: Clan) -> &str {
        self.entries
            .iter()
            .find(|e| e.clan == clan)
            .map(|e| e.name.as_str())
            .unwrap_or_else(|| clan.as_str())
    }

    /// Preview color for a clan; white when the clan has no pool entry.
    pub fn color_for(&self, clan: Clan) -> Rgb {
        self.entries
            .iter()
            .find(|e| e.clan == clan)
            .map(|e| e.color)
            .unwrap_or(Rgb::WHITE)
    }
}
