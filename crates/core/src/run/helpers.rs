use super::*;
use crate::{ItemEffect, ItemKind, RewardResolver, RunOutcome};

pub(super) fn percent_of(value: u32, percent: u32) -> u32 {
    (u64::from(value) * u64::from(percent) / 100) as u32
}

impl RunState {
    pub(super) fn resolver(catalog: &Catalog) -> RewardResolver<'_> {
        RewardResolver::new(&catalog.config, &catalog.content)
    }

    pub(super) fn require_in_run(&self) -> Result<(), Denial> {
        if self.phase.in_run() {
            Ok(())
        } else {
            Err(Denial::InvalidPhase)
        }
    }

    pub(super) fn require_phase(&self, phase: RunPhase) -> Result<(), Denial> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(Denial::InvalidPhase)
        }
    }

    pub(super) fn clamped(
        field: &'static str,
        requested: u64,
        applied: u64,
        events: &mut EventBus,
    ) {
        if requested == applied {
            return;
        }
        tracing::debug!(field, requested, applied, "value clamped");
        events.push(Event::Clamped {
            field,
            requested,
            applied,
        });
    }

    /// Direct health loss; block and charges are handled by the caller.
    pub(super) fn lose_health(&mut self, amount: u32, events: &mut EventBus) {
        if amount == 0 {
            return;
        }
        let applied = amount.min(self.health);
        Self::clamped("health", u64::from(amount), u64::from(applied), events);
        self.health -= applied;
        self.stats.damage_taken += u64::from(applied);
        self.profile.lifetime_stats.damage_taken += u64::from(applied);
        events.push(Event::PlayerDamaged {
            amount: applied,
            health: self.health,
        });
        self.check_defeat(events);
    }

    pub(super) fn restore_health(&mut self, amount: u32, events: &mut EventBus) {
        let room = self.max_health - self.health.min(self.max_health);
        let applied = amount.min(room);
        Self::clamped("health", u64::from(amount), u64::from(applied), events);
        self.health += applied;
    }

    pub(super) fn earn_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
        self.stats.gold_earned += u64::from(amount);
        self.profile.lifetime_stats.gold_earned += u64::from(amount);
    }

    pub(super) fn pay(&mut self, price: u32, events: &mut EventBus) -> Result<(), Denial> {
        if self.gold < price {
            return Err(Denial::InsufficientFunds);
        }
        self.gold -= price;
        events.push(Event::GoldChanged {
            delta: -i64::from(price),
            gold: self.gold,
        });
        Ok(())
    }

    pub(super) fn gain_max_health(&mut self, amount: u32) {
        self.max_health = self.max_health.saturating_add(amount);
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    pub(super) fn gain_max_energy(&mut self, amount: u32) {
        self.max_energy = self.max_energy.saturating_add(amount);
        self.energy = self.energy.saturating_add(amount).min(self.max_energy);
    }

    /// Health hit zero: spend the revive talent once, otherwise the run is lost.
    pub(super) fn check_defeat(&mut self, events: &mut EventBus) {
        if self.health > 0 || !self.phase.in_run() {
            return;
        }
        let bonuses = self.profile.talent_bonuses(&self.catalog.content);
        match bonuses.revive_percent {
            Some(percent) if !self.has_used_revive => {
                self.has_used_revive = true;
                self.health = percent_of(self.max_health, percent).max(1);
                tracing::info!(health = self.health, "revived");
                events.push(Event::Revived {
                    health: self.health,
                });
            }
            _ => self.end_run(RunOutcome::Defeat, events),
        }
    }

    pub(super) fn unlock_card(&mut self, card_id: &str, events: &mut EventBus) -> bool {
        if !self.unlocked_cards.insert(card_id.to_string()) {
            return false;
        }
        self.profile.lifetime_stats.cards_unlocked += 1;
        events.push(Event::CardUnlocked {
            card: card_id.to_string(),
        });
        true
    }

    /// Unlocks the card and adds it to the deck when there is room.
    pub(super) fn gain_card(&mut self, card_id: &str, events: &mut EventBus) {
        self.unlock_card(card_id, events);
        if self.selected_deck.len() < self.max_deck_size {
            self.selected_deck.push(card_id.to_string());
        } else {
            tracing::debug!(card = card_id, "deck full; card unlocked only");
        }
    }

    pub(super) fn gain_item(&mut self, item_id: &str, events: &mut EventBus) -> Result<(), Denial> {
        let kind = self
            .catalog
            .content
            .item(item_id)
            .map(|def| def.kind)
            .ok_or(Denial::InvalidTarget)?;
        let slot = self
            .inventory
            .add_to_bag(crate::Item::new(item_id, kind))?;
        events.push(Event::ItemGained {
            item: item_id.to_string(),
            slot,
        });
        Ok(())
    }

    /// Bonuses from blessings plus the equipped passive item.
    pub(super) fn battle_bonuses(&self) -> RunBonuses {
        let mut bonuses = self.run_bonuses;
        let passive = self
            .inventory
            .passive()
            .filter(|item| item.kind == ItemKind::Passive)
            .and_then(|item| self.catalog.content.item(&item.id));
        if let Some(def) = passive {
            for effect in &def.effects {
                match effect {
                    ItemEffect::BonusBlock { amount } => bonuses.block += amount,
                    ItemEffect::BonusStrength { amount } => bonuses.strength += amount,
                    ItemEffect::BonusThorns { amount } => bonuses.thorns += amount,
                    _ => {}
                }
            }
        }
        bonuses
    }
}
