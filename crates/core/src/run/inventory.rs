use super::*;
use crate::{apply_status, clear_debuffs, Holder, ItemEffect, StatusKind};

/// Turns a bonus granted by a consumable lasts.
const ITEM_BONUS_DURATION: u32 = 3;

impl RunState {
    pub(super) fn add_item_to_bag(&mut self, item_id: &str, events: &mut EventBus) -> Result<(), Denial> {
        self.gain_item(item_id, events)
    }

    /// Consumes the belt item; battle-only effects need a standing enemy.
    pub(super) fn use_consumable(&mut self, belt_slot: usize, events: &mut EventBus) -> Result<(), Denial> {
        let item_id = self
            .inventory
            .consumable(belt_slot)
            .map(|item| item.id.clone())
            .ok_or(Denial::InvalidTarget)?;
        let catalog = Arc::clone(&self.catalog);
        let def = catalog.content.item(&item_id).ok_or(Denial::MalformedContent)?;
        let needs_battle = def.effects.iter().any(ItemEffect::needs_battle);
        let battle_live = self
            .battle
            .as_ref()
            .is_some_and(|battle| !battle.enemy_defeated())
            && self.phase == RunPhase::NodeResolution(crate::Resolution::Battle);
        if needs_battle && !battle_live {
            return Err(Denial::InvalidPhase);
        }
        self.inventory.take_consumable(belt_slot)?;
        tracing::debug!(item = %item_id, "consumable used");

        for effect in &def.effects {
            match effect {
                ItemEffect::Heal { amount } => self.restore_health(*amount, events),
                ItemEffect::Energy { amount } => self.refill_energy(*amount, events),
                ItemEffect::DamageEnemy { amount } => self.strike_enemy(*amount, false, events),
                ItemEffect::ApplyEnemy { status } => {
                    self.enemy_statuses = apply_status(&self.enemy_statuses, *status);
                    events.push(Event::StatusApplied {
                        holder: Holder::Enemy,
                        kind: status.kind,
                        stacks: status.stacks,
                    });
                }
                ItemEffect::ApplySelf { status } => self.apply_player_status(*status, events)?,
                ItemEffect::Cleanse => self.player_statuses = clear_debuffs(&self.player_statuses),
                ItemEffect::BonusBlock { amount } => {
                    self.player_block = self.player_block.saturating_add(*amount);
                }
                ItemEffect::BonusStrength { amount } => self.apply_player_status(
                    StatusInstance::new(StatusKind::Strength, *amount, ITEM_BONUS_DURATION),
                    events,
                )?,
                ItemEffect::BonusThorns { amount } => self.apply_player_status(
                    StatusInstance::new(StatusKind::Thorns, *amount, ITEM_BONUS_DURATION),
                    events,
                )?,
            }
            if self.battle.as_ref().is_some_and(|battle| battle.enemy_defeated()) || !self.phase.in_run() {
                break;
            }
        }
        Ok(())
    }
}
