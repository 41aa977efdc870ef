use crate::{EnemyData, NodeId, Profile, Settings, StatusInstance, StatusKind, UpgradeKind};
use serde::{Deserialize, Serialize};

/// Every mutation of a run goes through one of these.
///
/// On the wire an action is `{ "type": "DAMAGE_ENEMY", "amount": 80 }`;
/// unrecognised `type` strings decode to [`Action::Unknown`], which the
/// reducer treats as an identity transform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // lifecycle
    StartNewRun {
        #[serde(default)]
        seed: Option<u64>,
    },
    EndRun {
        victory: bool,
    },
    ResetForNewGame,
    SaveProfile,
    LoadProfile {
        profile: Box<Profile>,
    },
    UpdateSettings {
        settings: Settings,
    },

    // map
    GenerateMap,
    SelectPath {
        path_theme: String,
    },
    SelectNode {
        node_id: NodeId,
    },
    ConfirmNode,
    CompleteNodeInTree {
        node_id: NodeId,
    },

    // resources
    DamagePlayer {
        amount: u32,
    },
    HealPlayer {
        amount: u32,
    },
    SetMaxHealth {
        amount: u32,
    },
    IncreaseMaxHealth {
        amount: u32,
    },
    AddGold {
        amount: u32,
    },
    SpendGold {
        amount: u32,
    },
    SpendEnergy {
        amount: u32,
    },
    GainEnergy {
        amount: u32,
    },
    ResetEnergy,
    SetHandSize {
        size: u32,
    },
    GainBlock {
        amount: u32,
    },

    // battle
    SetEnemyForBattle {
        enemy_data: EnemyData,
        #[serde(default)]
        is_boss: bool,
    },
    StartBattle,
    DamageEnemy {
        amount: u32,
    },
    HealEnemy {
        amount: u32,
    },
    PlayCard {
        hand_index: usize,
    },
    DrawCards {
        count: u32,
    },
    EndTurn,

    // statuses
    ApplyStatusToPlayer {
        status: StatusInstance,
    },
    ApplyStatusToEnemy {
        status: StatusInstance,
    },
    ClearPlayerStatus {
        status_type: StatusKind,
    },
    ClearEnemyStatus {
        status_type: StatusKind,
    },
    ClearAllPlayerStatuses,
    ClearAllEnemyStatuses,
    TickPlayerStatuses,
    TickEnemyStatuses,

    // rewards
    ClaimGoldReward,
    ChooseCardReward {
        card_id: String,
    },
    SkipCardReward,
    ClaimItemReward,
    FinishRewards,

    // shop
    BuyShopCard {
        index: usize,
    },
    BuyShopItem {
        index: usize,
    },
    RerollShop,
    RemoveCardAtShop {
        deck_index: usize,
    },
    LeaveShop,

    // events, blessings, rest
    ResolveEvent {
        option_index: usize,
    },
    ChooseBlessing {
        index: usize,
    },
    Rest,

    // inventory
    AddItemToBag {
        item_id: String,
    },
    DiscardBagItem {
        slot: usize,
    },
    EquipConsumable {
        bag_slot: usize,
    },
    UnequipConsumable {
        belt_slot: usize,
    },
    EquipPassive {
        bag_slot: usize,
    },
    UnequipPassive,
    UseConsumable {
        belt_slot: usize,
    },

    // cards and deck
    UnlockCard {
        card_id: String,
    },
    AddCardToDeck {
        card_id: String,
    },
    RemoveCardFromDeck {
        index: usize,
    },
    SetDeck {
        cards: Vec<String>,
    },

    // permanent progression
    UpgradeHealth,
    UpgradeMaxEnergy,
    UpgradeHandSize,
    UpgradeStartingGold,
    GainExperience {
        amount: u32,
    },
    UnlockTalent {
        talent_id: String,
    },
    ResetTalents,

    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn upgrade_kind(&self) -> Option<UpgradeKind> {
        match self {
            Action::UpgradeHealth => Some(UpgradeKind::Health),
            Action::UpgradeMaxEnergy => Some(UpgradeKind::MaxEnergy),
            Action::UpgradeHandSize => Some(UpgradeKind::HandSize),
            Action::UpgradeStartingGold => Some(UpgradeKind::StartingGold),
            _ => None,
        }
    }

    /// Wire tag of the action, used in logs and denial events.
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartNewRun { .. } => "START_NEW_RUN",
            Action::EndRun { .. } => "END_RUN",
            Action::ResetForNewGame => "RESET_FOR_NEW_GAME",
            Action::SaveProfile => "SAVE_PROFILE",
            Action::LoadProfile { .. } => "LOAD_PROFILE",
            Action::UpdateSettings { .. } => "UPDATE_SETTINGS",
            Action::GenerateMap => "GENERATE_MAP",
            Action::SelectPath { .. } => "SELECT_PATH",
            Action::SelectNode { .. } => "SELECT_NODE",
            Action::ConfirmNode => "CONFIRM_NODE",
            Action::CompleteNodeInTree { .. } => "COMPLETE_NODE_IN_TREE",
            Action::DamagePlayer { .. } => "DAMAGE_PLAYER",
            Action::HealPlayer { .. } => "HEAL_PLAYER",
            Action::SetMaxHealth { .. } => "SET_MAX_HEALTH",
            Action::IncreaseMaxHealth { .. } => "INCREASE_MAX_HEALTH",
            Action::AddGold { .. } => "ADD_GOLD",
            Action::SpendGold { .. } => "SPEND_GOLD",
            Action::SpendEnergy { .. } => "SPEND_ENERGY",
            Action::GainEnergy { .. } => "GAIN_ENERGY",
            Action::ResetEnergy => "RESET_ENERGY",
            Action::SetHandSize { .. } => "SET_HAND_SIZE",
            Action::GainBlock { .. } => "GAIN_BLOCK",
            Action::SetEnemyForBattle { .. } => "SET_ENEMY_FOR_BATTLE",
            Action::StartBattle => "START_BATTLE",
            Action::DamageEnemy { .. } => "DAMAGE_ENEMY",
            Action::HealEnemy { .. } => "HEAL_ENEMY",
            Action::PlayCard { .. } => "PLAY_CARD",
            Action::DrawCards { .. } => "DRAW_CARDS",
            Action::EndTurn => "END_TURN",
            Action::ApplyStatusToPlayer { .. } => "APPLY_STATUS_TO_PLAYER",
            Action::ApplyStatusToEnemy { .. } => "APPLY_STATUS_TO_ENEMY",
            Action::ClearPlayerStatus { .. } => "CLEAR_PLAYER_STATUS",
            Action::ClearEnemyStatus { .. } => "CLEAR_ENEMY_STATUS",
            Action::ClearAllPlayerStatuses => "CLEAR_ALL_PLAYER_STATUSES",
            Action::ClearAllEnemyStatuses => "CLEAR_ALL_ENEMY_STATUSES",
            Action::TickPlayerStatuses => "TICK_PLAYER_STATUSES",
            Action::TickEnemyStatuses => "TICK_ENEMY_STATUSES",
            Action::ClaimGoldReward => "CLAIM_GOLD_REWARD",
            Action::ChooseCardReward { .. } => "CHOOSE_CARD_REWARD",
            Action::SkipCardReward => "SKIP_CARD_REWARD",
            Action::ClaimItemReward => "CLAIM_ITEM_REWARD",
            Action::FinishRewards => "FINISH_REWARDS",
            Action::BuyShopCard { .. } => "BUY_SHOP_CARD",
            Action::BuyShopItem { .. } => "BUY_SHOP_ITEM",
            Action::RerollShop => "REROLL_SHOP",
            Action::RemoveCardAtShop { .. } => "REMOVE_CARD_AT_SHOP",
            Action::LeaveShop => "LEAVE_SHOP",
            Action::ResolveEvent { .. } => "RESOLVE_EVENT",
            Action::ChooseBlessing { .. } => "CHOOSE_BLESSING",
            Action::Rest => "REST",
            Action::AddItemToBag { .. } => "ADD_ITEM_TO_BAG",
            Action::DiscardBagItem { .. } => "DISCARD_BAG_ITEM",
            Action::EquipConsumable { .. } => "EQUIP_CONSUMABLE",
            Action::UnequipConsumable { .. } => "UNEQUIP_CONSUMABLE",
            Action::EquipPassive { .. } => "EQUIP_PASSIVE",
            Action::UnequipPassive => "UNEQUIP_PASSIVE",
            Action::UseConsumable { .. } => "USE_CONSUMABLE",
            Action::UnlockCard { .. } => "UNLOCK_CARD",
            Action::AddCardToDeck { .. } => "ADD_CARD_TO_DECK",
            Action::RemoveCardFromDeck { .. } => "REMOVE_CARD_FROM_DECK",
            Action::SetDeck { .. } => "SET_DECK",
            Action::UpgradeHealth => "UPGRADE_HEALTH",
            Action::UpgradeMaxEnergy => "UPGRADE_MAX_ENERGY",
            Action::UpgradeHandSize => "UPGRADE_HAND_SIZE",
            Action::UpgradeStartingGold => "UPGRADE_STARTING_GOLD",
            Action::GainExperience { .. } => "GAIN_EXPERIENCE",
            Action::UnlockTalent { .. } => "UNLOCK_TALENT",
            Action::ResetTalents => "RESET_TALENTS",
            Action::Unknown => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_json_with_camel_case_payload() {
        let action: Action =
            serde_json::from_str(r#"{"type":"COMPLETE_NODE_IN_TREE","nodeId":4}"#).expect("parse");
        assert_eq!(action, Action::CompleteNodeInTree { node_id: NodeId(4) });

        let action: Action = serde_json::from_str(
            r#"{"type":"SET_ENEMY_FOR_BATTLE","enemyData":{"health":70},"isBoss":false}"#,
        )
        .expect("parse");
        match action {
            Action::SetEnemyForBattle { enemy_data, is_boss } => {
                assert_eq!(enemy_data.health, 70);
                assert!(!is_boss);
            }
            other => panic!("unexpected {other:?}"),
        }

        let action: Action = serde_json::from_str(
            r#"{"type":"APPLY_STATUS_TO_PLAYER","status":{"type":"bleed","stacks":2,"duration":3}}"#,
        )
        .expect("parse");
        assert_eq!(
            action,
            Action::ApplyStatusToPlayer {
                status: StatusInstance::new(StatusKind::Bleed, 2, 3)
            }
        );
    }

    #[test]
    fn unknown_type_decodes_to_unknown() {
        let action: Action =
            serde_json::from_str(r#"{"type":"PLAY_MINIGAME"}"#).expect("parse");
        assert_eq!(action, Action::Unknown);
    }

    #[test]
    fn name_matches_wire_tag() {
        let action = Action::StartNewRun { seed: Some(3) };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["type"], action.name());
        let json = serde_json::to_value(Action::UpgradeMaxEnergy).expect("serialize");
        assert_eq!(json["type"], Action::UpgradeMaxEnergy.name());
    }
}
