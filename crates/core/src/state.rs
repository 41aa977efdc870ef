use crate::{
    Biome, EnemyData, Inventory, NodeId, Piles, ShopState, StatusInstance,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Defeat,
}

/// What the active node is waiting on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Battle,
    Shop,
    Event,
    Blessing,
    Rest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    MapNavigation,
    NodeResolution(Resolution),
    RewardResolution,
    RunEnded(RunOutcome),
}

impl RunPhase {
    pub fn in_run(self) -> bool {
        !matches!(self, RunPhase::Idle | RunPhase::RunEnded(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BattleState {
    pub enemy: EnemyData,
    pub enemy_health: u32,
    pub enemy_max_health: u32,
    pub enemy_block: u32,
    pub is_boss: bool,
    /// Zero until the first hand is dealt.
    pub turn: u32,
    pub piles: Piles,
}

impl BattleState {
    pub fn new(enemy: EnemyData, is_boss: bool) -> Self {
        Self {
            enemy_health: enemy.health,
            enemy_max_health: enemy.health,
            enemy_block: 0,
            is_boss,
            turn: 0,
            piles: Piles::default(),
            enemy,
        }
    }

    pub fn started(&self) -> bool {
        self.turn > 0
    }

    pub fn enemy_defeated(&self) -> bool {
        self.enemy_health == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingRewards {
    pub gold: u32,
    pub card_options: Vec<String>,
    pub item: Option<String>,
}

impl PendingRewards {
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.card_options.is_empty() && self.item.is_none()
    }
}

/// Bonuses picked up during the run from blessings and events.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RunBonuses {
    pub strength: u32,
    pub block: u32,
    pub thorns: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct RunStats {
    pub enemies_defeated: u32,
    pub cards_played: u32,
    pub turns: u32,
    pub gold_earned: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
}

/// Everything needed to resume a run, stored in `Profile::current_run`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub seed: u64,
    pub phase: RunPhase,
    pub health: u32,
    pub max_health: u32,
    pub energy: u32,
    pub max_energy: u32,
    pub hand_size: u32,
    pub max_hand_size: u32,
    pub max_deck_size: usize,
    pub gold: u32,
    pub current_act: u32,
    pub current_floor: u32,
    pub map: Vec<Biome>,
    pub completed_node_ids: Vec<NodeId>,
    pub available_node_ids: BTreeSet<NodeId>,
    #[serde(default)]
    pub selected_node: Option<NodeId>,
    #[serde(default)]
    pub active_node: Option<NodeId>,
    #[serde(default)]
    pub selected_path: Option<String>,
    pub unlocked_cards: BTreeSet<String>,
    pub selected_deck: Vec<String>,
    pub inventory: Inventory,
    #[serde(default)]
    pub player_statuses: Vec<StatusInstance>,
    #[serde(default)]
    pub enemy_statuses: Vec<StatusInstance>,
    #[serde(default)]
    pub player_block: u32,
    #[serde(default)]
    pub battle: Option<BattleState>,
    #[serde(default)]
    pub shop: Option<ShopState>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub offered_blessings: Vec<String>,
    #[serde(default)]
    pub pending_rewards: Option<PendingRewards>,
    #[serde(default)]
    pub run_bonuses: RunBonuses,
    #[serde(default)]
    pub has_used_revive: bool,
    #[serde(default)]
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_with_payload() {
        let phase = RunPhase::NodeResolution(Resolution::Shop);
        let json = serde_json::to_string(&phase).expect("serialize");
        assert_eq!(json, r#"{"node_resolution":"shop"}"#);
        let back: RunPhase = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, phase);
        assert!(back.in_run());
        assert!(!RunPhase::RunEnded(RunOutcome::Defeat).in_run());
    }

    #[test]
    fn battle_starts_at_full_enemy_health() {
        let enemy = EnemyData {
            health: 70,
            ..EnemyData::default()
        };
        let battle = BattleState::new(enemy, false);
        assert_eq!(battle.enemy_health, 70);
        assert_eq!(battle.enemy_max_health, 70);
        assert!(!battle.started());
        assert!(!battle.enemy_defeated());
    }
}
