use crate::{EnemyTier, NodeKind, Rarity, StatusKind, UpgradeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRule {
    pub starting_health: u32,
    pub starting_energy: u32,
    pub starting_hand_size: u32,
    pub max_hand_size: u32,
    pub max_deck_size: usize,
    pub starting_gold: u32,
    pub bag_slots: usize,
    pub consumable_slots: usize,
    pub rest_heal_percent: u32,
    pub starter_deck: Vec<String>,
}

impl Default for RunRule {
    fn default() -> Self {
        Self {
            starting_health: 100,
            starting_energy: 3,
            starting_hand_size: 5,
            max_hand_size: 10,
            max_deck_size: 30,
            starting_gold: 100,
            bag_slots: 12,
            consumable_slots: 3,
            rest_heal_percent: 30,
            starter_deck: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MapLayout {
    /// Every node of floor f links to every node of floor f + 1.
    FullyConnected,
    /// Each node links to one or two nodes of the next floor.
    #[default]
    Branching,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeWeight {
    pub kind: NodeKind,
    pub weight: u32,
}

/// Node weights used from `from_act` onward until a later entry takes over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActNodeWeights {
    pub from_act: u32,
    pub weights: Vec<NodeWeight>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MysteryOutcome {
    Battle,
    Event,
    Shop,
    Treasure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysteryWeight {
    pub outcome: MysteryOutcome,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRule {
    pub total_floors: u32,
    pub floors_per_act: u32,
    pub biomes_per_act: u32,
    pub min_fan_out: u32,
    pub max_fan_out: u32,
    pub layout: MapLayout,
    pub node_weights: Vec<ActNodeWeights>,
    pub mystery_weights: Vec<MysteryWeight>,
    pub enemy_health_scaling_percent: u32,
}

impl MapRule {
    pub fn weights_for_act(&self, act: u32) -> &[NodeWeight] {
        self.node_weights
            .iter()
            .filter(|entry| entry.from_act <= act)
            .max_by_key(|entry| entry.from_act)
            .map(|entry| entry.weights.as_slice())
            .unwrap_or(&[])
    }

    pub fn act_count(&self) -> u32 {
        if self.floors_per_act == 0 {
            return 0;
        }
        self.total_floors.div_ceil(self.floors_per_act)
    }
}

fn weights(entries: &[(NodeKind, u32)]) -> Vec<NodeWeight> {
    entries
        .iter()
        .map(|&(kind, weight)| NodeWeight { kind, weight })
        .collect()
}

impl Default for MapRule {
    fn default() -> Self {
        Self {
            total_floors: 25,
            floors_per_act: 5,
            biomes_per_act: 1,
            min_fan_out: 2,
            max_fan_out: 5,
            layout: MapLayout::Branching,
            node_weights: vec![
                ActNodeWeights {
                    from_act: 1,
                    weights: weights(&[
                        (NodeKind::Enemy, 60),
                        (NodeKind::Shop, 20),
                        (NodeKind::Event, 10),
                        (NodeKind::Mystery, 10),
                    ]),
                },
                ActNodeWeights {
                    from_act: 2,
                    weights: weights(&[
                        (NodeKind::Enemy, 50),
                        (NodeKind::Elite, 15),
                        (NodeKind::Shop, 15),
                        (NodeKind::Event, 7),
                        (NodeKind::Mystery, 5),
                        (NodeKind::Rest, 5),
                        (NodeKind::God, 3),
                    ]),
                },
            ],
            mystery_weights: vec![
                MysteryWeight {
                    outcome: MysteryOutcome::Battle,
                    weight: 40,
                },
                MysteryWeight {
                    outcome: MysteryOutcome::Event,
                    weight: 30,
                },
                MysteryWeight {
                    outcome: MysteryOutcome::Shop,
                    weight: 15,
                },
                MysteryWeight {
                    outcome: MysteryOutcome::Treasure,
                    weight: 15,
                },
            ],
            enemy_health_scaling_percent: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityWeight {
    pub rarity: Rarity,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierReward {
    pub tier: EnemyTier,
    pub gold: ValueRange,
    pub experience: u32,
    pub item_drop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRule {
    pub card_rarity_weights: Vec<RarityWeight>,
    pub item_rarity_weights: Vec<RarityWeight>,
    pub card_choices: u32,
    pub blessing_choices: u32,
    pub tiers: Vec<TierReward>,
    pub treasure_gold: ValueRange,
}

impl RewardRule {
    pub fn tier(&self, tier: EnemyTier) -> Option<&TierReward> {
        self.tiers.iter().find(|entry| entry.tier == tier)
    }
}

impl Default for RewardRule {
    fn default() -> Self {
        Self {
            card_rarity_weights: vec![
                RarityWeight {
                    rarity: Rarity::Common,
                    weight: 60,
                },
                RarityWeight {
                    rarity: Rarity::Uncommon,
                    weight: 30,
                },
                RarityWeight {
                    rarity: Rarity::Rare,
                    weight: 10,
                },
            ],
            item_rarity_weights: vec![
                RarityWeight {
                    rarity: Rarity::Common,
                    weight: 70,
                },
                RarityWeight {
                    rarity: Rarity::Uncommon,
                    weight: 25,
                },
                RarityWeight {
                    rarity: Rarity::Rare,
                    weight: 5,
                },
            ],
            card_choices: 3,
            blessing_choices: 3,
            tiers: vec![
                TierReward {
                    tier: EnemyTier::Basic,
                    gold: ValueRange { min: 10, max: 20 },
                    experience: 10,
                    item_drop: false,
                },
                TierReward {
                    tier: EnemyTier::Elite,
                    gold: ValueRange { min: 25, max: 40 },
                    experience: 25,
                    item_drop: true,
                },
                TierReward {
                    tier: EnemyTier::Boss,
                    gold: ValueRange { min: 50, max: 80 },
                    experience: 50,
                    item_drop: true,
                },
                TierReward {
                    tier: EnemyTier::FinalBoss,
                    gold: ValueRange { min: 100, max: 150 },
                    experience: 100,
                    item_drop: true,
                },
            ],
            treasure_gold: ValueRange { min: 20, max: 40 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityPrice {
    pub rarity: Rarity,
    pub price: ValueRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRule {
    pub card_slots: u32,
    pub item_slots: u32,
    pub card_prices: Vec<RarityPrice>,
    pub item_prices: Vec<RarityPrice>,
    pub reroll_base: u32,
    pub reroll_step: u32,
    pub removal_price: u32,
}

impl ShopRule {
    pub fn card_price(&self, rarity: Rarity) -> Option<ValueRange> {
        lookup_price(&self.card_prices, rarity)
    }

    pub fn item_price(&self, rarity: Rarity) -> Option<ValueRange> {
        lookup_price(&self.item_prices, rarity)
    }
}

fn lookup_price(prices: &[RarityPrice], rarity: Rarity) -> Option<ValueRange> {
    prices
        .iter()
        .find(|entry| entry.rarity == rarity)
        .map(|entry| entry.price)
}

impl Default for ShopRule {
    fn default() -> Self {
        let range = |min, max| ValueRange { min, max };
        Self {
            card_slots: 5,
            item_slots: 3,
            card_prices: vec![
                RarityPrice {
                    rarity: Rarity::Common,
                    price: range(45, 55),
                },
                RarityPrice {
                    rarity: Rarity::Uncommon,
                    price: range(68, 82),
                },
                RarityPrice {
                    rarity: Rarity::Rare,
                    price: range(135, 165),
                },
                RarityPrice {
                    rarity: Rarity::Legendary,
                    price: range(250, 300),
                },
            ],
            item_prices: vec![
                RarityPrice {
                    rarity: Rarity::Common,
                    price: range(40, 60),
                },
                RarityPrice {
                    rarity: Rarity::Uncommon,
                    price: range(80, 100),
                },
                RarityPrice {
                    rarity: Rarity::Rare,
                    price: range(150, 180),
                },
                RarityPrice {
                    rarity: Rarity::Legendary,
                    price: range(280, 320),
                },
            ],
            reroll_base: 25,
            reroll_step: 10,
            removal_price: 75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradePrice {
    pub kind: UpgradeKind,
    pub base_price: u32,
    pub price_step: u32,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRule {
    pub max_purchases: u32,
    pub upgrades: Vec<UpgradePrice>,
}

impl UpgradeRule {
    pub fn entry(&self, kind: UpgradeKind) -> Option<&UpgradePrice> {
        self.upgrades.iter().find(|entry| entry.kind == kind)
    }

    pub fn amount(&self, kind: UpgradeKind) -> u32 {
        self.entry(kind).map(|entry| entry.amount).unwrap_or(0)
    }
}

impl Default for UpgradeRule {
    fn default() -> Self {
        let upgrade = |kind, base_price, price_step, amount| UpgradePrice {
            kind,
            base_price,
            price_step,
            amount,
        };
        Self {
            max_purchases: 5,
            upgrades: vec![
                upgrade(UpgradeKind::Health, 50, 25, 10),
                upgrade(UpgradeKind::MaxEnergy, 150, 75, 1),
                upgrade(UpgradeKind::HandSize, 120, 60, 1),
                upgrade(UpgradeKind::StartingGold, 40, 20, 25),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRule {
    pub poison_damage: u32,
    pub burn_damage: u32,
    pub bleed_damage: u32,
    pub regeneration_heal: u32,
    pub shield_absorb: u32,
    pub weak_percent: u32,
}

impl StatusRule {
    pub fn per_stack_damage(&self, kind: StatusKind) -> u32 {
        match kind {
            StatusKind::Poison => self.poison_damage,
            StatusKind::Burn => self.burn_damage,
            StatusKind::Bleed => self.bleed_damage,
            _ => 0,
        }
    }

    pub fn per_stack_heal(&self, kind: StatusKind) -> u32 {
        match kind {
            StatusKind::Regeneration => self.regeneration_heal,
            _ => 0,
        }
    }
}

impl Default for StatusRule {
    fn default() -> Self {
        Self {
            poison_damage: 1,
            burn_damage: 2,
            bleed_damage: 1,
            regeneration_heal: 1,
            shield_absorb: 5,
            weak_percent: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionRule {
    pub experience_per_level: u32,
    pub talent_points_per_level: u32,
    pub max_level: u32,
    pub victory_experience: u32,
}

impl Default for ProgressionRule {
    fn default() -> Self {
        Self {
            experience_per_level: 100,
            talent_points_per_level: 1,
            max_level: 50,
            victory_experience: 150,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub run: RunRule,
    #[serde(default)]
    pub map: MapRule,
    #[serde(default)]
    pub rewards: RewardRule,
    #[serde(default)]
    pub shop: ShopRule,
    #[serde(default)]
    pub upgrades: UpgradeRule,
    #[serde(default)]
    pub statuses: StatusRule,
    #[serde(default)]
    pub progression: ProgressionRule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn act_weights_switch_at_configured_act() {
        let rule = MapRule::default();
        let act1 = rule.weights_for_act(1);
        assert!(act1.iter().all(|w| w.kind != NodeKind::Elite));
        let act3 = rule.weights_for_act(3);
        assert!(act3
            .iter()
            .any(|w| w.kind == NodeKind::Elite && w.weight == 15));
    }

    #[test]
    fn act_count_rounds_up_partial_act() {
        let mut rule = MapRule::default();
        assert_eq!(rule.act_count(), 5);
        rule.total_floors = 23;
        assert_eq!(rule.act_count(), 5);
        rule.floors_per_act = 0;
        assert_eq!(rule.act_count(), 0);
    }
}
