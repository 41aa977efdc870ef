use crate::{Content, EnemyTier, GameConfig, MysteryOutcome, RarityWeight, UpgradeKind};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{table} weights are empty or sum to zero")]
    InvalidWeights { table: &'static str },
    #[error("{table} weights give {rarity:?} a chance but content has none")]
    MissingRarity {
        table: &'static str,
        rarity: crate::Rarity,
    },
    #[error("no node weights for act {0}")]
    MissingActWeights(u32),
    #[error("map rule is invalid: {0}")]
    InvalidMapRule(String),
    #[error("no {0:?} enemy defined")]
    MissingEnemyTier(EnemyTier),
    #[error("starter deck references unknown card {0}")]
    UnknownStarterCard(String),
    #[error("starter deck has {len} cards but max deck size is {max}")]
    StarterDeckTooLarge { len: usize, max: usize },
    #[error("no upgrade entry for {0:?}")]
    MissingUpgrade(UpgradeKind),
    #[error("talent {talent} requires unknown talent {prerequisite}")]
    UnknownPrerequisite { talent: String, prerequisite: String },
    #[error("event {0} has no options")]
    EmptyEvent(String),
    #[error("event nodes can be rolled but no events are defined")]
    NoEvents,
}

/// Validated configuration and content shared by every state of a run.
#[derive(Debug)]
pub struct Catalog {
    pub config: GameConfig,
    pub content: Content,
}

impl Catalog {
    pub fn new(config: GameConfig, content: Content) -> Result<Arc<Self>, CatalogError> {
        validate(&config, &content)?;
        Ok(Arc::new(Self { config, content }))
    }
}

fn validate(config: &GameConfig, content: &Content) -> Result<(), CatalogError> {
    check_rarity_table("card rarity", &config.rewards.card_rarity_weights, |rarity| {
        content.has_rarity_cards(rarity)
    })?;
    check_rarity_table("item rarity", &config.rewards.item_rarity_weights, |rarity| {
        content.has_rarity_items(rarity)
    })?;

    let map = &config.map;
    if map.total_floors == 0 {
        return Err(CatalogError::InvalidMapRule("total_floors is zero".into()));
    }
    if map.floors_per_act == 0 {
        return Err(CatalogError::InvalidMapRule("floors_per_act is zero".into()));
    }
    if map.biomes_per_act == 0 {
        return Err(CatalogError::InvalidMapRule("biomes_per_act is zero".into()));
    }
    if map.min_fan_out == 0 || map.min_fan_out > map.max_fan_out {
        return Err(CatalogError::InvalidMapRule(format!(
            "fan-out {}..={}",
            map.min_fan_out, map.max_fan_out
        )));
    }
    for act in 1..=map.act_count() {
        let weights = map.weights_for_act(act);
        if weights.is_empty() {
            return Err(CatalogError::MissingActWeights(act));
        }
        if weights.iter().all(|w| w.weight == 0) {
            return Err(CatalogError::InvalidWeights { table: "node" });
        }
        // Elite rolls need the elite pool.
        if weights
            .iter()
            .any(|w| w.kind == crate::NodeKind::Elite && w.weight > 0)
            && content.enemy_count(EnemyTier::Elite) == 0
        {
            return Err(CatalogError::MissingEnemyTier(EnemyTier::Elite));
        }
        if weights
            .iter()
            .any(|w| w.kind == crate::NodeKind::Event && w.weight > 0)
            && content.events.is_empty()
        {
            return Err(CatalogError::NoEvents);
        }
    }
    if map.mystery_weights.iter().all(|w| w.weight == 0) {
        return Err(CatalogError::InvalidWeights { table: "mystery" });
    }
    let mystery_event = map
        .mystery_weights
        .iter()
        .any(|w| w.outcome == MysteryOutcome::Event && w.weight > 0);
    if mystery_event && content.events.is_empty() {
        return Err(CatalogError::InvalidWeights { table: "mystery" });
    }

    for tier in [EnemyTier::Basic, EnemyTier::Boss, EnemyTier::FinalBoss] {
        if content.enemy_count(tier) == 0 {
            return Err(CatalogError::MissingEnemyTier(tier));
        }
    }

    for id in &config.run.starter_deck {
        if content.card(id).is_none() {
            return Err(CatalogError::UnknownStarterCard(id.clone()));
        }
    }
    if config.run.starter_deck.len() > config.run.max_deck_size {
        return Err(CatalogError::StarterDeckTooLarge {
            len: config.run.starter_deck.len(),
            max: config.run.max_deck_size,
        });
    }

    for kind in UpgradeKind::ALL {
        if config.upgrades.entry(kind).is_none() {
            return Err(CatalogError::MissingUpgrade(kind));
        }
    }

    for talent in &content.talents {
        for prerequisite in &talent.prerequisites {
            if content.talent(prerequisite).is_none() {
                return Err(CatalogError::UnknownPrerequisite {
                    talent: talent.id.clone(),
                    prerequisite: prerequisite.clone(),
                });
            }
        }
    }
    if let Some(event) = content.events.iter().find(|event| event.options.is_empty()) {
        return Err(CatalogError::EmptyEvent(event.id.clone()));
    }
    Ok(())
}

fn check_rarity_table(
    table: &'static str,
    weights: &[RarityWeight],
    has_rarity: impl Fn(crate::Rarity) -> bool,
) -> Result<(), CatalogError> {
    if weights.iter().all(|w| w.weight == 0) {
        return Err(CatalogError::InvalidWeights { table });
    }
    for entry in weights.iter().filter(|w| w.weight > 0) {
        if !has_rarity(entry.rarity) {
            return Err(CatalogError::MissingRarity {
                table,
                rarity: entry.rarity,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_config, sample_content};

    #[test]
    fn sample_catalog_validates() {
        assert!(Catalog::new(sample_config(), sample_content()).is_ok());
    }

    #[test]
    fn zero_card_weights_fail_fast() {
        let mut config = sample_config();
        for weight in &mut config.rewards.card_rarity_weights {
            weight.weight = 0;
        }
        assert_eq!(
            Catalog::new(config, sample_content()).err(),
            Some(CatalogError::InvalidWeights {
                table: "card rarity"
            })
        );
    }

    #[test]
    fn missing_final_boss_fails_fast() {
        let mut content = sample_content();
        content
            .enemies
            .retain(|enemy| enemy.tier != EnemyTier::FinalBoss);
        assert_eq!(
            Catalog::new(sample_config(), content).err(),
            Some(CatalogError::MissingEnemyTier(EnemyTier::FinalBoss))
        );
    }

    #[test]
    fn zero_floor_map_fails_fast() {
        let mut config = sample_config();
        config.map.total_floors = 0;
        assert!(matches!(
            Catalog::new(config, sample_content()),
            Err(CatalogError::InvalidMapRule(_))
        ));
    }

    #[test]
    fn unknown_starter_card_fails() {
        let mut config = sample_config();
        config.run.starter_deck.push("nonexistent".to_string());
        assert_eq!(
            Catalog::new(config, sample_content()).err(),
            Some(CatalogError::UnknownStarterCard("nonexistent".to_string()))
        );
    }

    #[test]
    fn event_nodes_need_events() {
        let mut content = sample_content();
        content.events.clear();
        assert_eq!(
            Catalog::new(sample_config(), content).err(),
            Some(CatalogError::NoEvents)
        );
    }
}
