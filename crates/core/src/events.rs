use crate::{InventoryError, NodeId, NodeKind, RunOutcome, StatusKind, UpgradeKind};
use serde::{Deserialize, Serialize};

/// Why the reducer refused an action; the state is left unchanged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    CapacityExceeded,
    LimitReached,
    PrerequisiteNotMet,
    InsufficientFunds,
    InsufficientEnergy,
    InvalidPhase,
    InvalidTarget,
    AlreadyUnlocked,
    MapAlreadyGenerated,
    MalformedContent,
}

impl From<InventoryError> for Denial {
    fn from(value: InventoryError) -> Self {
        match value {
            InventoryError::NoFreeSlot => Denial::CapacityExceeded,
            _ => Denial::InvalidTarget,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Holder {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum Event {
    RunStarted {
        seed: u64,
        max_health: u32,
    },
    MapGenerated {
        acts: u32,
        nodes: usize,
    },
    PathChosen {
        act: u32,
        theme: String,
    },
    NodeEntered {
        node: NodeId,
        kind: NodeKind,
    },
    NodeCompleted {
        node: NodeId,
        opened: Vec<NodeId>,
    },
    ActCleared {
        act: u32,
    },
    BattleStarted {
        enemy: String,
        health: u32,
        is_boss: bool,
    },
    EnemyDamaged {
        amount: u32,
        health: u32,
    },
    PlayerDamaged {
        amount: u32,
        health: u32,
    },
    AttackDodged {
        holder: Holder,
    },
    StatusApplied {
        holder: Holder,
        kind: StatusKind,
        stacks: u32,
    },
    StatusTicked {
        holder: Holder,
        damage: u32,
        healing: u32,
    },
    CardPlayed {
        card: String,
        energy_left: u32,
    },
    EnemyDefeated {
        enemy: String,
    },
    Revived {
        health: u32,
    },
    RewardsReady {
        gold: u32,
        cards: usize,
        item: bool,
    },
    CardUnlocked {
        card: String,
    },
    ItemGained {
        item: String,
        slot: usize,
    },
    GoldChanged {
        delta: i64,
        gold: u32,
    },
    ShopEntered {
        cards: usize,
        items: usize,
        reroll_cost: u32,
    },
    ShopBought {
        id: String,
        cost: u32,
        gold: u32,
    },
    UpgradePurchased {
        kind: UpgradeKind,
        purchased: u32,
        cost: u32,
    },
    TalentUnlocked {
        talent: String,
    },
    LevelUp {
        level: u32,
    },
    RunEnded {
        outcome: RunOutcome,
    },
    ProfileSaved,
    ProfileLoaded {
        resumed: bool,
    },
    Clamped {
        field: &'static str,
        requested: u64,
        applied: u64,
    },
    Denied {
        action: &'static str,
        reason: Denial,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn append(&mut self, other: &mut EventBus) {
        self.queue.append(&mut other.queue);
    }

    pub fn events(&self) -> &[Event] {
        &self.queue
    }

    pub fn last_denial(&self) -> Option<Denial> {
        self.queue.iter().rev().find_map(|event| match event {
            Event::Denied { reason, .. } => Some(*reason),
            _ => None,
        })
    }
}
