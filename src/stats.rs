// Base stat generation: one D6 per stat with a re-roll budget, plus the
// hidden life-bonus event.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five stats rolled during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatKind {
    MaxLife,
    Defense,
    MaxStamina,
    Reach,
    AttackSpeed,
}

pub const ALL_STATS: &[StatKind] = &[
    StatKind::MaxLife,
    StatKind::Defense,
    StatKind::MaxStamina,
    StatKind::Reach,
    StatKind::AttackSpeed,
];

impl StatKind {
    fn index(self) -> usize {
        match self {
            StatKind::MaxLife => 0,
            StatKind::Defense => 1,
            StatKind::MaxStamina => 2,
            StatKind::Reach => 3,
            StatKind::AttackSpeed => 4,
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatKind::MaxLife => "max_life",
            StatKind::Defense => "defense",
            StatKind::MaxStamina => "max_stamina",
            StatKind::Reach => "reach",
            StatKind::AttackSpeed => "attack_speed",
        };
        write!(f, "{s}")
    }
}

/// Rolled base stats. Life, defense, stamina, and reach carry the raw die
/// value (1-6); attack speed is in seconds, derived from its die tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub max_life: f64,
    pub defense: f64,
    pub max_stamina: f64,
    pub reach: f64,
    pub attack_speed: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StatRollError {
    #[error("no stats rolled yet; roll all stats first")]
    NotRolled,

    #[error("no re-roll attempts left for {0}")]
    NoAttemptsLeft(StatKind),
}

const DIE_FACES: u32 = 6;
/// 1 initial roll + 2 re-rolls per stat.
const TOTAL_ATTEMPTS_PER_STAT: u8 = 3;

/// Rolls base stats with a D6 per stat and tracks the per-stat re-roll
/// budget. Does not touch the clan assignment; that stays `Unknown` until
/// the parade pick.
#[derive(Debug)]
pub struct StatRoller {
    block: Option<StatBlock>,
    attempts_left: [u8; 5],
}

impl Default for StatRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl StatRoller {
    pub fn new() -> Self {
        StatRoller {
            block: None,
            attempts_left: [0; 5],
        }
    }

    /// Roll a D6 for each of the five stats and reset every re-roll budget
    /// to 2 remaining attempts.
    pub fn roll_all(&mut self, rng: &mut impl Rng) -> &StatBlock {
        let mut block = StatBlock {
            max_life: 0.0,
            defense: 0.0,
            max_stamina: 0.0,
            reach: 0.0,
            attack_speed: 0.0,
        };
        for &stat in ALL_STATS {
            apply_roll(&mut block, stat, rng);
        }
        self.block = Some(block);
        self.attempts_left = [TOTAL_ATTEMPTS_PER_STAT - 1; 5];
        self.block.as_ref().expect("just set")
    }

    /// Re-roll a single stat if it has attempts remaining. On success,
    /// returns the new value and decrements that stat's budget.
    pub fn reroll(&mut self, stat: StatKind, rng: &mut impl Rng) -> Result<f64, StatRollError> {
        let block = self.block.as_mut().ok_or(StatRollError::NotRolled)?;
        let idx = stat.index();
        if self.attempts_left[idx] == 0 {
            return Err(StatRollError::NoAttemptsLeft(stat));
        }
        let value = apply_roll(block, stat, rng);
        self.attempts_left[idx] -= 1;
        Ok(value)
    }

    /// Remaining re-rolls for a stat (0 before the first `roll_all`).
    pub fn attempts_left(&self, stat: StatKind) -> u8 {
        self.attempts_left[stat.index()]
    }

    pub fn block(&self) -> Option<&StatBlock> {
        self.block.as_ref()
    }

    /// Story event: a hidden D6 multiplies max life, then +10.
    pub fn apply_life_bonus(&mut self, rng: &mut impl Rng) -> Result<f64, StatRollError> {
        let block = self.block.as_mut().ok_or(StatRollError::NotRolled)?;
        let hidden = rng.gen_range(1..=DIE_FACES) as f64;
        block.max_life = block.max_life * hidden + 10.0;
        Ok(block.max_life)
    }
}

fn apply_roll(block: &mut StatBlock, stat: StatKind, rng: &mut impl Rng) -> f64 {
    let d6 = rng.gen_range(1..=DIE_FACES);
    let value = match stat {
        StatKind::AttackSpeed => attack_speed_seconds(d6, rng),
        _ => d6 as f64,
    };
    match stat {
        StatKind::MaxLife => block.max_life = value,
        StatKind::Defense => block.defense = value,
        StatKind::MaxStamina => block.max_stamina = value,
        StatKind::Reach => block.reach = value,
        StatKind::AttackSpeed => block.attack_speed = value,
    }
    value
}

/// Attack speed is the only stat translated into a seconds range:
/// 1 -> 5.01-6, 2 -> 4.01-5, 3 -> 3.01-4, 4 -> 2.01-3, 5 -> 1.01-2,
/// 6 -> 0.1-6 (the wildcard tier). Uniform within the tier.
fn attack_speed_seconds(d6: u32, rng: &mut impl Rng) -> f64 {
    let (min_s, max_s) = match d6 {
        1 => (5.01, 6.0),
        2 => (4.01, 5.0),
        3 => (3.01, 4.0),
        4 => (2.01, 3.0),
        5 => (1.01, 2.0),
        _ => (0.1, 6.0),
    };
    rng.gen_range(min_s..=max_s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn roll_all_produces_values_in_die_range() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let block = *roller.roll_all(&mut rng);
            for value in [block.max_life, block.defense, block.max_stamina, block.reach] {
                assert!((1.0..=6.0).contains(&value), "die stat {value} out of range");
                assert_eq!(value.fract(), 0.0, "die stat should be whole");
            }
            assert!(
                (0.1..=6.0).contains(&block.attack_speed),
                "attack speed {} out of range",
                block.attack_speed
            );
        }
    }

    #[test]
    fn roll_all_grants_two_rerolls_per_stat() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        roller.roll_all(&mut rng);
        for &stat in ALL_STATS {
            assert_eq!(roller.attempts_left(stat), 2);
        }
    }

    #[test]
    fn reroll_consumes_budget_per_stat() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        roller.roll_all(&mut rng);

        roller.reroll(StatKind::Defense, &mut rng).unwrap();
        assert_eq!(roller.attempts_left(StatKind::Defense), 1);
        roller.reroll(StatKind::Defense, &mut rng).unwrap();
        assert_eq!(roller.attempts_left(StatKind::Defense), 0);
        // Other stats keep their own budgets.
        assert_eq!(roller.attempts_left(StatKind::Reach), 2);
    }

    #[test]
    fn reroll_exhausted_budget_is_a_noop_error() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        roller.roll_all(&mut rng);
        roller.reroll(StatKind::MaxLife, &mut rng).unwrap();
        roller.reroll(StatKind::MaxLife, &mut rng).unwrap();

        let before = *roller.block().unwrap();
        assert_eq!(
            roller.reroll(StatKind::MaxLife, &mut rng),
            Err(StatRollError::NoAttemptsLeft(StatKind::MaxLife))
        );
        assert_eq!(*roller.block().unwrap(), before);
    }

    #[test]
    fn reroll_before_roll_all_is_rejected() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(
            roller.reroll(StatKind::Reach, &mut rng),
            Err(StatRollError::NotRolled)
        );
    }

    #[test]
    fn reroll_updates_only_the_target_stat() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        let before = *roller.roll_all(&mut rng);
        roller.reroll(StatKind::AttackSpeed, &mut rng).unwrap();
        let after = *roller.block().unwrap();
        assert_eq!(after.max_life, before.max_life);
        assert_eq!(after.defense, before.defense);
        assert_eq!(after.max_stamina, before.max_stamina);
        assert_eq!(after.reach, before.reach);
    }

    #[test]
    fn life_bonus_multiplies_and_adds_ten() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        let life = roller.roll_all(&mut rng).max_life;

        let boosted = roller.apply_life_bonus(&mut rng).unwrap();
        // Hidden die is 1-6, so life*1+10 <= boosted <= life*6+10.
        assert!(boosted >= life + 10.0);
        assert!(boosted <= life * 6.0 + 10.0);
        assert_eq!(roller.block().unwrap().max_life, boosted);
    }

    #[test]
    fn life_bonus_requires_rolled_stats() {
        let mut roller = StatRoller::new();
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(roller.apply_life_bonus(&mut rng), Err(StatRollError::NotRolled));
    }

    #[test]
    fn attack_speed_tiers_map_die_to_seconds() {
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..100 {
            assert!((5.01..=6.0).contains(&attack_speed_seconds(1, &mut rng)));
            assert!((4.01..=5.0).contains(&attack_speed_seconds(2, &mut rng)));
            assert!((3.01..=4.0).contains(&attack_speed_seconds(3, &mut rng)));
            assert!((2.01..=3.0).contains(&attack_speed_seconds(4, &mut rng)));
            assert!((1.01..=2.0).contains(&attack_speed_seconds(5, &mut rng)));
            assert!((0.1..=6.0).contains(&attack_speed_seconds(6, &mut rng)));
        }
    }
}
