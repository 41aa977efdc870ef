use super::*;
use crate::{RewardError, UpgradeKind};

impl RunState {
    pub(super) fn unlock_card_action(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), Denial> {
        if self.catalog.content.card(card_id).is_none() {
            return Err(Denial::InvalidTarget);
        }
        if !self.unlock_card(card_id, events) {
            return Err(Denial::AlreadyUnlocked);
        }
        Ok(())
    }

    pub(super) fn add_card_to_deck(&mut self, card_id: &str) -> Result<(), Denial> {
        if !self.unlocked_cards.contains(card_id) {
            return Err(Denial::PrerequisiteNotMet);
        }
        if self.selected_deck.len() >= self.max_deck_size {
            return Err(Denial::CapacityExceeded);
        }
        self.selected_deck.push(card_id.to_string());
        Ok(())
    }

    pub(super) fn remove_card_from_deck(&mut self, index: usize) -> Result<(), Denial> {
        if index >= self.selected_deck.len() {
            return Err(Denial::InvalidTarget);
        }
        self.selected_deck.remove(index);
        Ok(())
    }

    /// Replaces the deck wholesale; every card must already be unlocked.
    pub(super) fn set_deck(&mut self, cards: &[String]) -> Result<(), Denial> {
        if cards.len() > self.max_deck_size {
            return Err(Denial::CapacityExceeded);
        }
        if cards.iter().any(|card| !self.unlocked_cards.contains(card)) {
            return Err(Denial::PrerequisiteNotMet);
        }
        self.selected_deck = cards.to_vec();
        Ok(())
    }

    /// Permanent upgrade bought with run gold. Stat upgrades also lift the
    /// current run; starting gold only pays out next time.
    pub(super) fn purchase_upgrade(&mut self, kind: UpgradeKind, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let resolver = Self::resolver(&catalog);
        let purchased = self.profile.upgrades.get(kind);
        let price = resolver.price_for(kind, purchased).map_err(|err| match err {
            RewardError::LimitReached { .. } => Denial::LimitReached,
            other => {
                tracing::error!(error = %other, "upgrade price lookup failed");
                Denial::MalformedContent
            }
        })?;
        self.pay(price, events)?;
        let purchased = self.profile.upgrades.increment(kind);
        let amount = catalog.config.upgrades.amount(kind);
        if self.phase.in_run() {
            match kind {
                UpgradeKind::Health => self.gain_max_health(amount),
                UpgradeKind::MaxEnergy => self.gain_max_energy(amount),
                UpgradeKind::HandSize => {
                    self.hand_size = self.hand_size.saturating_add(amount).min(self.max_hand_size);
                }
                UpgradeKind::StartingGold => {}
            }
        }
        tracing::info!(?kind, purchased, price, "upgrade purchased");
        events.push(Event::UpgradePurchased {
            kind,
            purchased,
            cost: price,
        });
        Ok(())
    }

    pub(super) fn gain_experience(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.grant_experience(amount, events);
        Ok(())
    }

    pub(super) fn grant_experience(&mut self, amount: u32, events: &mut EventBus) {
        if amount == 0 {
            return;
        }
        let gained = self
            .profile
            .gain_experience(amount, &self.catalog.config.progression);
        if gained == 0 {
            return;
        }
        let level = self.profile.level;
        tracing::info!(level, points = self.profile.talent_points, "level up");
        events.push(Event::LevelUp { level });
    }

    pub(super) fn unlock_talent(&mut self, talent_id: &str, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let talent = catalog.content.talent(talent_id).ok_or(Denial::InvalidTarget)?;
        if self.profile.has_talent(talent_id) {
            return Err(Denial::AlreadyUnlocked);
        }
        if !self.profile.missing_prerequisites(talent).is_empty() {
            return Err(Denial::PrerequisiteNotMet);
        }
        if self.profile.talent_points < talent.cost {
            return Err(Denial::PrerequisiteNotMet);
        }
        self.profile.talent_points -= talent.cost;
        self.profile.unlocked_talents.push(talent_id.to_string());
        tracing::info!(talent = talent_id, "talent unlocked");
        events.push(Event::TalentUnlocked {
            talent: talent_id.to_string(),
        });
        Ok(())
    }

    pub(super) fn reset_talents(&mut self) -> Result<(), Denial> {
        if self.profile.unlocked_talents.is_empty() {
            return Err(Denial::InvalidTarget);
        }
        let refund = self.profile.reset_talents(&self.catalog.content);
        tracing::debug!(refund, "talents reset");
        Ok(())
    }
}
