use crate::{RngState, StatusInstance};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Attack,
    Skill,
    Power,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardEffect {
    Damage { amount: u32 },
    Block { amount: u32 },
    Heal { amount: u32 },
    Energy { amount: u32 },
    Draw { count: u32 },
    ApplyEnemy { status: StatusInstance },
    ApplySelf { status: StatusInstance },
    Cleanse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDef {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub kind: CardKind,
    pub cost: u32,
    pub effects: Vec<CardEffect>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTier {
    #[default]
    Basic,
    Elite,
    Boss,
    FinalBoss,
}

impl EnemyTier {
    pub fn is_boss(self) -> bool {
        matches!(self, EnemyTier::Boss | EnemyTier::FinalBoss)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: String,
    pub name: String,
    pub tier: EnemyTier,
    pub health: u32,
    pub damage: u32,
    /// Act a boss template is bound to; ignored for other tiers.
    #[serde(default)]
    pub act: Option<u32>,
    #[serde(default)]
    pub on_hit: Option<StatusInstance>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Consumable,
    Passive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    Heal { amount: u32 },
    Energy { amount: u32 },
    DamageEnemy { amount: u32 },
    ApplyEnemy { status: StatusInstance },
    ApplySelf { status: StatusInstance },
    Cleanse,
    BonusBlock { amount: u32 },
    BonusStrength { amount: u32 },
    BonusThorns { amount: u32 },
}

impl ItemEffect {
    pub fn needs_battle(&self) -> bool {
        matches!(
            self,
            ItemEffect::DamageEnemy { .. } | ItemEffect::ApplyEnemy { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
    pub effects: Vec<ItemEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TalentEffect {
    MaxHealth { amount: u32 },
    MaxEnergy { amount: u32 },
    HandSize { amount: u32 },
    StartingGold { amount: u32 },
    CardChoices { amount: u32 },
    GoldGainPercent { percent: u32 },
    Revive { percent: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentDef {
    pub id: String,
    pub name: String,
    pub cost: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub effects: Vec<TalentEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    GainGold { amount: u32 },
    LoseGold { amount: u32 },
    Heal { amount: u32 },
    Damage { amount: u32 },
    MaxHealth { amount: u32 },
    GainCard { rarity: Rarity },
    GainItem,
    Strength { amount: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOption {
    pub label: String,
    #[serde(default)]
    pub gold_cost: u32,
    pub outcomes: Vec<EventOutcome>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDef {
    pub id: String,
    pub title: String,
    pub options: Vec<EventOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlessingEffect {
    MaxHealth { amount: u32 },
    MaxEnergy { amount: u32 },
    Strength { amount: u32 },
    Gold { amount: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlessingDef {
    pub id: String,
    pub name: String,
    pub effects: Vec<BlessingEffect>,
}

/// Static lookup tables; read-only for the whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    pub cards: Vec<CardDef>,
    pub enemies: Vec<EnemyDef>,
    pub items: Vec<ItemDef>,
    pub talents: Vec<TalentDef>,
    pub events: Vec<EventDef>,
    pub blessings: Vec<BlessingDef>,
    pub biomes: Vec<String>,
}

impl Content {
    pub fn card(&self, id: &str) -> Option<&CardDef> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&ItemDef> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn talent(&self, id: &str) -> Option<&TalentDef> {
        self.talents.iter().find(|talent| talent.id == id)
    }

    pub fn event(&self, id: &str) -> Option<&EventDef> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn blessing(&self, id: &str) -> Option<&BlessingDef> {
        self.blessings.iter().find(|blessing| blessing.id == id)
    }

    pub fn pick_card<'a>(&'a self, rarity: Rarity, rng: &mut RngState) -> Option<&'a CardDef> {
        let indices: Vec<usize> = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, card)| card.rarity == rarity)
            .map(|(idx, _)| idx)
            .collect();
        pick_index(&indices, rng).map(|idx| &self.cards[idx])
    }

    pub fn pick_item<'a>(&'a self, rarity: Rarity, rng: &mut RngState) -> Option<&'a ItemDef> {
        let indices: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.rarity == rarity)
            .map(|(idx, _)| idx)
            .collect();
        pick_index(&indices, rng).map(|idx| &self.items[idx])
    }

    pub fn pick_enemy<'a>(&'a self, tier: EnemyTier, rng: &mut RngState) -> Option<&'a EnemyDef> {
        let indices: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.tier == tier)
            .map(|(idx, _)| idx)
            .collect();
        pick_index(&indices, rng).map(|idx| &self.enemies[idx])
    }

    /// Boss bound to `act`, falling back to cycling through the boss pool.
    pub fn boss_for_act(&self, act: u32) -> Option<&EnemyDef> {
        let bosses: Vec<&EnemyDef> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.tier == EnemyTier::Boss)
            .collect();
        if let Some(boss) = bosses.iter().find(|boss| boss.act == Some(act)) {
            return Some(boss);
        }
        if bosses.is_empty() {
            return None;
        }
        let idx = (act.saturating_sub(1) as usize) % bosses.len();
        bosses.get(idx).copied()
    }

    pub fn final_boss(&self) -> Option<&EnemyDef> {
        self.enemies
            .iter()
            .find(|enemy| enemy.tier == EnemyTier::FinalBoss)
    }

    pub fn pick_event<'a>(&'a self, rng: &mut RngState) -> Option<&'a EventDef> {
        let idx = rng.pick_index(self.events.len())?;
        self.events.get(idx)
    }

    /// Up to `count` distinct blessings in random order.
    pub fn pick_blessings(&self, count: usize, rng: &mut RngState) -> Vec<String> {
        let mut ids: Vec<String> = self
            .blessings
            .iter()
            .map(|blessing| blessing.id.clone())
            .collect();
        rng.shuffle(&mut ids);
        ids.truncate(count);
        ids
    }

    pub fn enemy_count(&self, tier: EnemyTier) -> usize {
        self.enemies.iter().filter(|enemy| enemy.tier == tier).count()
    }

    pub fn has_rarity_cards(&self, rarity: Rarity) -> bool {
        self.cards.iter().any(|card| card.rarity == rarity)
    }

    pub fn has_rarity_items(&self, rarity: Rarity) -> bool {
        self.items.iter().any(|item| item.rarity == rarity)
    }
}

fn pick_index(items: &[usize], rng: &mut RngState) -> Option<usize> {
    let idx = rng.pick_index(items.len())?;
    items.get(idx).copied()
}
