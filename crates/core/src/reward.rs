use crate::{
    CardDef, Content, EnemyTier, GameConfig, ItemDef, Rarity, RarityWeight, RngState, ValueRange,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardError {
    #[error("reward weights are empty or sum to zero")]
    InvalidWeights,
    #[error("no {0:?} cards in content")]
    EmptyCardPool(Rarity),
    #[error("no {0:?} items in content")]
    EmptyItemPool(Rarity),
    #[error("upgrade {kind:?} is capped at {cap} purchases")]
    LimitReached { kind: UpgradeKind, cap: u32 },
    #[error("no price configured for upgrade {0:?}")]
    MissingUpgrade(UpgradeKind),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Health,
    MaxEnergy,
    HandSize,
    StartingGold,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Health,
        UpgradeKind::MaxEnergy,
        UpgradeKind::HandSize,
        UpgradeKind::StartingGold,
    ];
}

/// Cumulative-weight selection over buckets in declaration order.
pub fn roll_weighted<T: Clone>(
    items: impl IntoIterator<Item = (T, u32)>,
    rng: &mut RngState,
) -> Result<T, RewardError> {
    let items: Vec<(T, u32)> = items.into_iter().filter(|(_, w)| *w > 0).collect();
    let total: u64 = items.iter().map(|(_, w)| u64::from(*w)).sum();
    if total == 0 {
        return Err(RewardError::InvalidWeights);
    }
    let mut roll = rng.below(total);
    for (item, weight) in items {
        let weight = u64::from(weight);
        if roll < weight {
            return Ok(item);
        }
        roll -= weight;
    }
    Err(RewardError::InvalidWeights)
}

pub fn roll_rarity(weights: &[RarityWeight], rng: &mut RngState) -> Result<Rarity, RewardError> {
    roll_weighted(weights.iter().map(|w| (w.rarity, w.weight)), rng)
}

pub fn roll_range(range: ValueRange, rng: &mut RngState) -> u32 {
    rng.range_inclusive(range.min, range.max)
}

/// Rolls drops, prices and upgrade costs from the configured tables.
pub struct RewardResolver<'a> {
    config: &'a GameConfig,
    content: &'a Content,
}

impl<'a> RewardResolver<'a> {
    pub fn new(config: &'a GameConfig, content: &'a Content) -> Self {
        Self { config, content }
    }

    pub fn roll_card(&self, rarity: Rarity, rng: &mut RngState) -> Result<&'a CardDef, RewardError> {
        self.content
            .pick_card(rarity, rng)
            .ok_or(RewardError::EmptyCardPool(rarity))
    }

    pub fn roll_reward_card(&self, rng: &mut RngState) -> Result<&'a CardDef, RewardError> {
        let rarity = roll_rarity(&self.config.rewards.card_rarity_weights, rng)?;
        self.roll_card(rarity, rng)
    }

    pub fn roll_item(&self, rng: &mut RngState) -> Result<&'a ItemDef, RewardError> {
        let rarity = roll_rarity(&self.config.rewards.item_rarity_weights, rng)?;
        self.content
            .pick_item(rarity, rng)
            .ok_or(RewardError::EmptyItemPool(rarity))
    }

    /// Independent rolls for a choose-one screen; duplicates may appear.
    pub fn card_options(&self, count: u32, rng: &mut RngState) -> Result<Vec<String>, RewardError> {
        let mut options = Vec::with_capacity(count as usize);
        for _ in 0..count {
            options.push(self.roll_reward_card(rng)?.id.clone());
        }
        Ok(options)
    }

    pub fn roll_gold(&self, tier: EnemyTier, bonus_percent: u32, rng: &mut RngState) -> u32 {
        let base = self
            .config
            .rewards
            .tier(tier)
            .map(|entry| roll_range(entry.gold, rng))
            .unwrap_or(0);
        with_bonus(base, bonus_percent)
    }

    pub fn roll_treasure_gold(&self, bonus_percent: u32, rng: &mut RngState) -> u32 {
        with_bonus(roll_range(self.config.rewards.treasure_gold, rng), bonus_percent)
    }

    pub fn experience_for(&self, tier: EnemyTier) -> u32 {
        self.config
            .rewards
            .tier(tier)
            .map(|entry| entry.experience)
            .unwrap_or(0)
    }

    pub fn drops_item(&self, tier: EnemyTier) -> bool {
        self.config
            .rewards
            .tier(tier)
            .map(|entry| entry.item_drop)
            .unwrap_or(false)
    }

    /// Price of the next purchase of `kind` after `purchased` earlier ones.
    pub fn price_for(&self, kind: UpgradeKind, purchased: u32) -> Result<u32, RewardError> {
        let rule = &self.config.upgrades;
        if purchased >= rule.max_purchases {
            return Err(RewardError::LimitReached {
                kind,
                cap: rule.max_purchases,
            });
        }
        let entry = rule.entry(kind).ok_or(RewardError::MissingUpgrade(kind))?;
        Ok(entry
            .base_price
            .saturating_add(entry.price_step.saturating_mul(purchased)))
    }

    pub fn card_price(&self, rarity: Rarity, rng: &mut RngState) -> u32 {
        self.config
            .shop
            .card_price(rarity)
            .map(|range| roll_range(range, rng))
            .unwrap_or(0)
    }

    pub fn item_price(&self, rarity: Rarity, rng: &mut RngState) -> u32 {
        self.config
            .shop
            .item_price(rarity)
            .map(|range| roll_range(range, rng))
            .unwrap_or(0)
    }
}

fn with_bonus(base: u32, bonus_percent: u32) -> u32 {
    let bonus = u64::from(base) * u64::from(bonus_percent) / 100;
    base.saturating_add(bonus as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;

    #[test]
    fn single_bucket_always_wins() {
        let mut rng = RngState::from_seed(1);
        let weights = vec![RarityWeight {
            rarity: Rarity::Common,
            weight: 100,
        }];
        for _ in 0..50 {
            assert_eq!(roll_rarity(&weights, &mut rng), Ok(Rarity::Common));
        }
    }

    #[test]
    fn empty_or_zero_weights_fail() {
        let mut rng = RngState::from_seed(1);
        assert_eq!(roll_rarity(&[], &mut rng), Err(RewardError::InvalidWeights));
        let zero = vec![RarityWeight {
            rarity: Rarity::Rare,
            weight: 0,
        }];
        assert_eq!(roll_rarity(&zero, &mut rng), Err(RewardError::InvalidWeights));
    }

    #[test]
    fn zero_weight_bucket_is_never_returned() {
        let mut rng = RngState::from_seed(3);
        let weights = vec![
            RarityWeight {
                rarity: Rarity::Legendary,
                weight: 0,
            },
            RarityWeight {
                rarity: Rarity::Uncommon,
                weight: 5,
            },
        ];
        for _ in 0..100 {
            assert_eq!(roll_rarity(&weights, &mut rng), Ok(Rarity::Uncommon));
        }
    }

    #[test]
    fn upgrade_price_grows_then_caps() {
        let config = GameConfig::default();
        let content = sample_content();
        let resolver = RewardResolver::new(&config, &content);
        assert_eq!(resolver.price_for(UpgradeKind::Health, 0), Ok(50));
        assert_eq!(resolver.price_for(UpgradeKind::Health, 4), Ok(150));
        assert_eq!(
            resolver.price_for(UpgradeKind::Health, 5),
            Err(RewardError::LimitReached {
                kind: UpgradeKind::Health,
                cap: 5
            })
        );
    }

    #[test]
    fn card_options_match_requested_count() {
        let config = GameConfig::default();
        let content = sample_content();
        let resolver = RewardResolver::new(&config, &content);
        let mut rng = RngState::from_seed(11);
        let options = resolver.card_options(3, &mut rng).expect("options");
        assert_eq!(options.len(), 3);
        assert!(options.iter().all(|id| content.card(id).is_some()));
    }

    #[test]
    fn gold_bonus_is_applied() {
        assert_eq!(with_bonus(20, 50), 30);
        assert_eq!(with_bonus(20, 0), 20);
    }
}
