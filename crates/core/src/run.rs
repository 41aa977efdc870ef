//! The run reducer.
//!
//! [`reduce`] is the only way a run changes: it clones the state, applies one
//! [`Action`] and returns the new value. Player mistakes never fail; they come
//! back as [`Event::Denied`] with the state untouched. Resource overflow is
//! clamped and reported as [`Event::Clamped`].

use crate::{
    Action, BattleState, Biome, Catalog, Denial, Event, EventBus, Inventory, NodeId, PendingRewards,
    Profile, RngState, RunBonuses, RunPhase, RunStats, ShopState, StatusInstance,
};
use std::collections::BTreeSet;
use std::sync::Arc;

mod battle;
mod encounters;
mod helpers;
mod inventory;
mod lifecycle;
mod navigation;
mod progression;
mod resources;
mod rewards;
mod shop;


#[derive(Debug, Clone)]
pub struct RunState {
    pub catalog: Arc<Catalog>,
    pub rng: RngState,
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
    /// Floor whose nodes can be selected next.
    pub current_floor: u32,
    pub map: Vec<Biome>,
    pub completed_node_ids: Vec<NodeId>,
    pub available_node_ids: BTreeSet<NodeId>,
    pub selected_node: Option<NodeId>,
    pub active_node: Option<NodeId>,
    pub selected_path: Option<String>,
    pub unlocked_cards: BTreeSet<String>,
    pub selected_deck: Vec<String>,
    pub inventory: Inventory,
    pub player_statuses: Vec<StatusInstance>,
    pub enemy_statuses: Vec<StatusInstance>,
    pub player_block: u32,
    pub battle: Option<BattleState>,
    pub shop: Option<ShopState>,
    pub event: Option<String>,
    pub offered_blessings: Vec<String>,
    pub pending_rewards: Option<PendingRewards>,
    pub run_bonuses: RunBonuses,
    pub has_used_revive: bool,
    pub stats: RunStats,
    pub profile: Profile,
}

/// Applies `action` to a copy of `state`.
///
/// Events raised by a successful action are appended to `events`; a denied
/// action leaves only the `Denied` event behind.
pub fn reduce(state: &RunState, action: &Action, events: &mut EventBus) -> RunState {
    let mut next = state.clone();
    let mut local = EventBus::default();
    match next.apply(action, &mut local) {
        Ok(()) => {
            events.append(&mut local);
            next
        }
        Err(reason) => {
            tracing::debug!(action = action.name(), ?reason, "action denied");
            events.push(Event::Denied {
                action: action.name(),
                reason,
            });
            state.clone()
        }
    }
}

impl RunState {
    /// Fresh idle state; `START_NEW_RUN` derives the run's numbers.
    pub fn new(catalog: Arc<Catalog>, profile: Profile, seed: u64) -> Self {
        let run = &catalog.config.run;
        Self {
            rng: RngState::from_seed(seed),
            seed,
            phase: RunPhase::Idle,
            health: run.starting_health,
            max_health: run.starting_health,
            energy: run.starting_energy,
            max_energy: run.starting_energy,
            hand_size: run.starting_hand_size,
            max_hand_size: run.max_hand_size,
            max_deck_size: run.max_deck_size,
            gold: 0,
            current_act: 1,
            current_floor: 1,
            map: Vec::new(),
            completed_node_ids: Vec::new(),
            available_node_ids: BTreeSet::new(),
            selected_node: None,
            active_node: None,
            selected_path: None,
            unlocked_cards: BTreeSet::new(),
            selected_deck: Vec::new(),
            inventory: Inventory::new(run.bag_slots, run.consumable_slots),
            player_statuses: Vec::new(),
            enemy_statuses: Vec::new(),
            player_block: 0,
            battle: None,
            shop: None,
            event: None,
            offered_blessings: Vec::new(),
            pending_rewards: None,
            run_bonuses: RunBonuses::default(),
            has_used_revive: false,
            stats: RunStats::default(),
            profile,
            catalog,
        }
    }

    /// In-place convenience over [`reduce`] for drivers that own the state.
    pub fn dispatch(&mut self, action: &Action, events: &mut EventBus) {
        *self = reduce(self, action, events);
    }

    pub fn enemy_health(&self) -> u32 {
        self.battle
            .as_ref()
            .map(|battle| battle.enemy_health)
            .unwrap_or(0)
    }

    fn apply(&mut self, action: &Action, events: &mut EventBus) -> Result<(), Denial> {
        match action {
            Action::StartNewRun { seed } => self.start_new_run(*seed, events),
            Action::EndRun { victory } => self.end_run_action(*victory, events),
            Action::ResetForNewGame => self.reset_for_new_game(events),
            Action::SaveProfile => self.save_profile(events),
            Action::LoadProfile { profile } => self.load_profile(profile, events),
            Action::UpdateSettings { settings } => {
                self.profile.settings = settings.clone();
                Ok(())
            }

            Action::GenerateMap => self.generate_map(events),
            Action::SelectPath { path_theme } => self.select_path(path_theme, events),
            Action::SelectNode { node_id } => self.select_node(*node_id),
            Action::ConfirmNode => self.confirm_node(events),
            Action::CompleteNodeInTree { node_id } => self.complete_node_in_tree(*node_id, events),

            Action::DamagePlayer { amount } => self.damage_player_action(*amount, events),
            Action::HealPlayer { amount } => self.heal_player_action(*amount, events),
            Action::SetMaxHealth { amount } => self.set_max_health(*amount, events),
            Action::IncreaseMaxHealth { amount } => self.increase_max_health(*amount),
            Action::AddGold { amount } => self.add_gold_action(*amount, events),
            Action::SpendGold { amount } => self.spend_gold_action(*amount, events),
            Action::SpendEnergy { amount } => self.spend_energy_action(*amount, events),
            Action::GainEnergy { amount } => self.gain_energy_action(*amount, events),
            Action::ResetEnergy => {
                self.energy = self.max_energy;
                Ok(())
            }
            Action::SetHandSize { size } => self.set_hand_size(*size, events),
            Action::GainBlock { amount } => {
                self.player_block = self.player_block.saturating_add(*amount);
                Ok(())
            }

            Action::SetEnemyForBattle {
                enemy_data,
                is_boss,
            } => self.set_enemy_for_battle(enemy_data, *is_boss, events),
            Action::StartBattle => self.start_battle(events),
            Action::DamageEnemy { amount } => self.damage_enemy_action(*amount, events),
            Action::HealEnemy { amount } => self.heal_enemy(*amount, events),
            Action::PlayCard { hand_index } => self.play_card(*hand_index, events),
            Action::DrawCards { count } => self.draw_cards_action(*count),
            Action::EndTurn => self.end_turn(events),

            Action::ApplyStatusToPlayer { status } => self.apply_player_status(*status, events),
            Action::ApplyStatusToEnemy { status } => self.apply_enemy_status(*status, events),
            Action::ClearPlayerStatus { status_type } => {
                self.player_statuses = crate::clear_status(&self.player_statuses, *status_type);
                Ok(())
            }
            Action::ClearEnemyStatus { status_type } => {
                self.enemy_statuses = crate::clear_status(&self.enemy_statuses, *status_type);
                Ok(())
            }
            Action::ClearAllPlayerStatuses => {
                self.player_statuses.clear();
                Ok(())
            }
            Action::ClearAllEnemyStatuses => {
                self.enemy_statuses.clear();
                Ok(())
            }
            Action::TickPlayerStatuses => self.tick_player_statuses(events),
            Action::TickEnemyStatuses => self.tick_enemy_statuses(events),

            Action::ClaimGoldReward => self.claim_gold_reward(events),
            Action::ChooseCardReward { card_id } => self.choose_card_reward(card_id, events),
            Action::SkipCardReward => self.skip_card_reward(),
            Action::ClaimItemReward => self.claim_item_reward(events),
            Action::FinishRewards => self.finish_rewards(events),

            Action::BuyShopCard { index } => self.buy_shop_card(*index, events),
            Action::BuyShopItem { index } => self.buy_shop_item(*index, events),
            Action::RerollShop => self.reroll_shop(events),
            Action::RemoveCardAtShop { deck_index } => self.remove_card_at_shop(*deck_index, events),
            Action::LeaveShop => self.leave_shop(events),

            Action::ResolveEvent { option_index } => self.resolve_event(*option_index, events),
            Action::ChooseBlessing { index } => self.choose_blessing(*index, events),
            Action::Rest => self.rest(events),

            Action::AddItemToBag { item_id } => self.add_item_to_bag(item_id, events),
            Action::DiscardBagItem { slot } => {
                self.inventory.discard(*slot)?;
                Ok(())
            }
            Action::EquipConsumable { bag_slot } => {
                self.inventory.equip_consumable(*bag_slot)?;
                Ok(())
            }
            Action::UnequipConsumable { belt_slot } => {
                self.inventory.unequip_consumable(*belt_slot)?;
                Ok(())
            }
            Action::EquipPassive { bag_slot } => {
                self.inventory.equip_passive(*bag_slot)?;
                Ok(())
            }
            Action::UnequipPassive => {
                self.inventory.unequip_passive()?;
                Ok(())
            }
            Action::UseConsumable { belt_slot } => self.use_consumable(*belt_slot, events),

            Action::UnlockCard { card_id } => self.unlock_card_action(card_id, events),
            Action::AddCardToDeck { card_id } => self.add_card_to_deck(card_id),
            Action::RemoveCardFromDeck { index } => self.remove_card_from_deck(*index),
            Action::SetDeck { cards } => self.set_deck(cards),

            Action::UpgradeHealth
            | Action::UpgradeMaxEnergy
            | Action::UpgradeHandSize
            | Action::UpgradeStartingGold => match action.upgrade_kind() {
                Some(kind) => self.purchase_upgrade(kind, events),
                None => Ok(()),
            },
            Action::GainExperience { amount } => self.gain_experience(*amount, events),
            Action::UnlockTalent { talent_id } => self.unlock_talent(talent_id, events),
            Action::ResetTalents => self.reset_talents(),

            Action::Unknown => Ok(()),
        }
    }
}
