use serde::{Deserialize, Serialize};

pub use deckclimb_core::{
    BlessingDef, CardDef, Content, EnemyDef, EnemyTier, EventDef, GameConfig, ItemDef, MapRule,
    ProgressionRule, Rarity, RewardRule, RunRule, ShopRule, StatusRule, TalentDef, UpgradeRule,
};

/// Per-table counts, printed by front ends after loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentSummary {
    pub cards: usize,
    pub enemies: usize,
    pub bosses: usize,
    pub items: usize,
    pub talents: usize,
    pub events: usize,
    pub blessings: usize,
    pub biomes: usize,
}

impl ContentSummary {
    pub fn from_content(content: &Content) -> Self {
        Self {
            cards: content.cards.len(),
            enemies: content.enemies.len(),
            bosses: content
                .enemies
                .iter()
                .filter(|enemy| enemy.tier.is_boss())
                .count(),
            items: content.items.len(),
            talents: content.talents.len(),
            events: content.events.len(),
            blessings: content.blessings.len(),
            biomes: content.biomes.len(),
        }
    }
}
