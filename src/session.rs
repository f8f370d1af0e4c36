// Parade session: wires the two-stage draw, the profile store, and crash
// recovery together for the UI.

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clan::{Clan, Rgb};
use crate::config::Config;
use crate::draft::pool::ClanPool;
use crate::draft::selector::{DraftSelector, ReselectPolicy, Selection};
use crate::profile::ProfileStore;

/// Key under which the in-progress parade is persisted for crash recovery.
const SESSION_STATE_KEY: &str = "parade_session";

/// One displayed option: the clan plus its configured label and color,
/// resolved once so the UI never touches the pool directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ParadeOption {
    pub clan: Clan,
    pub name: String,
    pub color: Rgb,
}

/// Snapshot persisted after every draw and pick so an interrupted parade
/// resumes with the same options on screen.
#[derive(Debug, Serialize, Deserialize)]
struct SessionSnapshot {
    wave: Vec<Clan>,
    options: Vec<Clan>,
    selection: Option<Selection>,
}

/// A running parade: pool -> wave -> shown options -> committed pick.
pub struct ParadeSession {
    pool: ClanPool,
    selector: DraftSelector,
    store: ProfileStore,
    profile_name: String,
    wave_size: usize,
    show_count: usize,
    wave: Vec<Clan>,
}

impl ParadeSession {
    pub fn new(config: &Config, store: ProfileStore) -> Self {
        let policy = if config.allow_reselect {
            ReselectPolicy::AllowChange
        } else {
            ReselectPolicy::LockFirstPick
        };
        ParadeSession {
            pool: config.pool.clone(),
            selector: DraftSelector::new(policy),
            store,
            profile_name: config.profile_name.clone(),
            wave_size: config.wave_size,
            show_count: config.show_count,
            wave: Vec::new(),
        }
    }

    /// Run both draw stages and persist the resulting state.
    ///
    /// An empty pool degrades to an empty option list with a warning; the
    /// caller renders "nothing to choose" instead of aborting.
    pub fn start(&mut self, rng: &mut impl Rng) -> Result<Vec<ParadeOption>> {
        if self.pool.is_empty() {
            warn!("clan pool is empty; parade starts with nothing to show");
            self.wave.clear();
            self.selector.restore_draw(Vec::new(), None);
            self.persist_snapshot()?;
            return Ok(Vec::new());
        }

        self.wave = self.pool.draw(self.wave_size, rng);
        match self.selector.configure_draw(&self.wave, self.show_count, rng) {
            Ok(shown) => {
                info!(
                    wave = self.wave.len(),
                    shown = shown.len(),
                    "parade draw complete"
                );
            }
            Err(e) => {
                // Unreachable with a validated config, but non-fatal anyway.
                warn!("parade draw failed: {e}");
            }
        }

        self.persist_snapshot()?;
        Ok(self.options())
    }

    /// Commit the pick at `index` and write the clan into the profile.
    ///
    /// Draft errors (no draw, out-of-range index, locked re-pick) are
    /// warnings, not failures: the method returns `Ok(None)` and prior state
    /// stays as it was. Only storage errors propagate.
    pub fn pick(&mut self, index: usize) -> Result<Option<Clan>> {
        let clan = match self.selector.select(index) {
            Ok(clan) => clan,
            Err(e) => {
                warn!("parade pick ignored: {e}");
                return Ok(None);
            }
        };

        self.store
            .assign_clan(&self.profile_name, clan)
            .context("failed to persist clan assignment")?;
        self.persist_snapshot()?;
        info!(clan = %clan, profile = %self.profile_name, "clan assigned");
        Ok(Some(clan))
    }

    /// Reinstate a persisted parade, if one exists. Returns true when a
    /// snapshot was found and restored.
    pub fn restore(&mut self) -> Result<bool> {
        let Some(value) = self.store.load_state(SESSION_STATE_KEY)? else {
            return Ok(false);
        };
        let snapshot: SessionSnapshot = match serde_json::from_value(value) {
            Ok(s) => s,
            Err(e) => {
                warn!("discarding unreadable parade snapshot: {e}");
                self.store.clear_state(SESSION_STATE_KEY)?;
                return Ok(false);
            }
        };

        self.wave = snapshot.wave;
        self.selector
            .restore_draw(snapshot.options, snapshot.selection);
        info!(
            options = self.selector.current_sub_draw().len(),
            picked = self.selector.selection().is_some(),
            "restored in-progress parade"
        );
        Ok(true)
    }

    /// Mark the parade complete and drop the recovery snapshot.
    pub fn finish(&self) -> Result<()> {
        self.store.clear_state(SESSION_STATE_KEY)
    }

    /// The currently shown options with labels and colors resolved.
    pub fn options(&self) -> Vec<ParadeOption> {
        self.selector
            .current_sub_draw()
            .iter()
            .map(|&clan| ParadeOption {
                clan,
                name: self.pool.name_for(clan).to_string(),
                color: self.pool.color_for(clan),
            })
            .collect()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selector.selection()
    }

    pub fn wave(&self) -> &[Clan] {
        &self.wave
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    fn persist_snapshot(&self) -> Result<()> {
        let snapshot = SessionSnapshot {
            wave: self.wave.clone(),
            options: self.selector.current_sub_draw().to_vec(),
            selection: self.selector.selection(),
        };
        let value =
            serde_json::to_value(&snapshot).context("failed to serialize parade snapshot")?;
        self.store.save_state(SESSION_STATE_KEY, &value)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clan::ClanEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ten_entry_pool() -> ClanPool {
        let clans = [
            Clan::Ocean,
            Clan::Radioactive,
            Clan::Toxic,
            Clan::Mutaplant,
            Clan::Voltage,
            Clan::Frost,
            Clan::Impact,
            Clan::Ash,
            Clan::Aerial,
            Clan::Inferno,
        ];
        ClanPool::new(
            clans
                .iter()
                .map(|&clan| ClanEntry {
                    clan,
                    name: format!("clan {clan}"),
                    color: Rgb::WHITE,
                })
                .collect(),
        )
    }

    fn test_config(pool: ClanPool, allow_reselect: bool) -> Config {
        Config {
            profile_name: "starter".to_string(),
            wave_size: 6,
            show_count: 3,
            allow_reselect,
            db_path: ":memory:".to_string(),
            pool,
        }
    }

    fn memory_session(allow_reselect: bool) -> ParadeSession {
        let config = test_config(ten_entry_pool(), allow_reselect);
        let store = ProfileStore::open(":memory:").unwrap();
        ParadeSession::new(&config, store)
    }

    #[test]
    fn start_shows_three_options_from_the_wave() {
        let mut session = memory_session(true);
        let mut rng = StdRng::seed_from_u64(4);

        let options = session.start(&mut rng).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(session.wave().len(), 6);
        for option in &options {
            assert!(session.wave().contains(&option.clan));
        }
    }

    #[test]
    fn start_with_empty_pool_degrades_to_no_options() {
        let config = test_config(ClanPool::new(vec![]), true);
        let store = ProfileStore::open(":memory:").unwrap();
        let mut session = ParadeSession::new(&config, store);
        let mut rng = StdRng::seed_from_u64(4);

        let options = session.start(&mut rng).unwrap();
        assert!(options.is_empty());
        assert!(session.wave().is_empty());
    }

    #[test]
    fn pick_writes_clan_into_profile() {
        let mut session = memory_session(true);
        let mut rng = StdRng::seed_from_u64(9);
        let options = session.start(&mut rng).unwrap();

        let picked = session.pick(1).unwrap().unwrap();
        assert_eq!(picked, options[1].clan);

        let record = session.store().load_profile("starter").unwrap().unwrap();
        assert_eq!(record.clan, Some(picked));
    }

    #[test]
    fn out_of_range_pick_is_a_warning_not_an_error() {
        let mut session = memory_session(true);
        let mut rng = StdRng::seed_from_u64(9);
        session.start(&mut rng).unwrap();

        assert_eq!(session.pick(7).unwrap(), None);
        assert!(session.store().load_profile("starter").unwrap().is_none());
    }

    #[test]
    fn pick_before_start_is_a_warning_not_an_error() {
        let mut session = memory_session(true);
        assert_eq!(session.pick(0).unwrap(), None);
    }

    #[test]
    fn reselect_overwrites_when_allowed() {
        let mut session = memory_session(true);
        let mut rng = StdRng::seed_from_u64(2);
        let options = session.start(&mut rng).unwrap();

        session.pick(0).unwrap().unwrap();
        let second = session.pick(2).unwrap().unwrap();
        assert_eq!(second, options[2].clan);

        let record = session.store().load_profile("starter").unwrap().unwrap();
        assert_eq!(record.clan, Some(second));
    }

    #[test]
    fn reselect_is_rejected_when_locked() {
        let mut session = memory_session(false);
        let mut rng = StdRng::seed_from_u64(2);
        session.start(&mut rng).unwrap();

        let first = session.pick(0).unwrap().unwrap();
        assert_eq!(session.pick(2).unwrap(), None);

        let record = session.store().load_profile("starter").unwrap().unwrap();
        assert_eq!(record.clan, Some(first));
    }

    #[test]
    fn snapshot_restores_options_and_selection() {
        let store = ProfileStore::open(":memory:").unwrap();
        let config = test_config(ten_entry_pool(), true);
        let mut session = ParadeSession::new(&config, store);
        let mut rng = StdRng::seed_from_u64(31);

        let options = session.start(&mut rng).unwrap();
        session.pick(1).unwrap().unwrap();
        let wave = session.wave().to_vec();

        // Simulate a restart sharing the same database. An in-memory store
        // cannot be reopened, so hand the connection to a fresh session.
        let mut resumed = ParadeSession::new(&config, session.store);
        assert!(resumed.restore().unwrap());
        assert_eq!(resumed.wave(), wave.as_slice());
        assert_eq!(resumed.options(), options);
        assert_eq!(resumed.selection().map(|s| s.index), Some(1));
    }

    #[test]
    fn restore_without_snapshot_returns_false() {
        let mut session = memory_session(true);
        assert!(!session.restore().unwrap());
    }

    #[test]
    fn finish_clears_the_snapshot() {
        let store = ProfileStore::open(":memory:").unwrap();
        let config = test_config(ten_entry_pool(), true);
        let mut session = ParadeSession::new(&config, store);
        let mut rng = StdRng::seed_from_u64(31);

        session.start(&mut rng).unwrap();
        session.finish().unwrap();

        let mut resumed = ParadeSession::new(&config, session.store);
        assert!(!resumed.restore().unwrap());
    }

    #[test]
    fn options_carry_configured_labels() {
        let mut session = memory_session(true);
        let mut rng = StdRng::seed_from_u64(18);
        let options = session.start(&mut rng).unwrap();
        for option in options {
            assert_eq!(option.name, format!("clan {}", option.clan));
            assert_eq!(option.color, Rgb::WHITE);
        }
    }
}
