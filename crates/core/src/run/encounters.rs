use super::helpers::percent_of;
use super::*;
use crate::{BlessingEffect, EventOutcome, Resolution};

impl RunState {
    pub(super) fn open_event(&mut self, _events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let event = catalog
            .content
            .pick_event(&mut self.rng)
            .ok_or(Denial::MalformedContent)?;
        tracing::debug!(event = %event.id, "event opened");
        self.event = Some(event.id.clone());
        self.phase = RunPhase::NodeResolution(Resolution::Event);
        Ok(())
    }

    pub(super) fn resolve_event(&mut self, option_index: usize, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::NodeResolution(Resolution::Event))?;
        let catalog = Arc::clone(&self.catalog);
        let event_id = self.event.clone().ok_or(Denial::InvalidPhase)?;
        let event = catalog.content.event(&event_id).ok_or(Denial::MalformedContent)?;
        let option = event.options.get(option_index).ok_or(Denial::InvalidTarget)?;
        if option.gold_cost > 0 {
            self.pay(option.gold_cost, events)?;
        }
        let resolver = Self::resolver(&catalog);
        for outcome in &option.outcomes {
            match outcome {
                EventOutcome::GainGold { amount } => {
                    self.earn_gold(*amount);
                    events.push(Event::GoldChanged {
                        delta: i64::from(*amount),
                        gold: self.gold,
                    });
                }
                EventOutcome::LoseGold { amount } => {
                    let applied = (*amount).min(self.gold);
                    Self::clamped("gold", u64::from(*amount), u64::from(applied), events);
                    self.gold -= applied;
                }
                EventOutcome::Heal { amount } => self.restore_health(*amount, events),
                EventOutcome::Damage { amount } => self.lose_health(*amount, events),
                EventOutcome::MaxHealth { amount } => self.gain_max_health(*amount),
                EventOutcome::GainCard { rarity } => match resolver.roll_card(*rarity, &mut self.rng) {
                    Ok(card) => self.gain_card(&card.id, events),
                    Err(err) => tracing::error!(error = %err, "event card roll failed"),
                },
                EventOutcome::GainItem => match resolver.roll_item(&mut self.rng) {
                    Ok(item) => {
                        if self.gain_item(&item.id, events).is_err() {
                            tracing::debug!(item = %item.id, "bag full; event item lost");
                        }
                    }
                    Err(err) => tracing::error!(error = %err, "event item roll failed"),
                },
                EventOutcome::Strength { amount } => {
                    self.run_bonuses.strength = self.run_bonuses.strength.saturating_add(*amount);
                }
            }
            if !self.phase.in_run() {
                return Ok(());
            }
        }
        self.complete_active_node(events)
    }

    pub(super) fn open_blessings(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let count = catalog.config.rewards.blessing_choices as usize;
        let offered = catalog.content.pick_blessings(count, &mut self.rng);
        if offered.is_empty() {
            tracing::debug!("no blessings to offer");
            return self.complete_active_node(events);
        }
        self.offered_blessings = offered;
        self.phase = RunPhase::NodeResolution(Resolution::Blessing);
        Ok(())
    }

    pub(super) fn choose_blessing(&mut self, index: usize, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::NodeResolution(Resolution::Blessing))?;
        let id = self
            .offered_blessings
            .get(index)
            .cloned()
            .ok_or(Denial::InvalidTarget)?;
        let catalog = Arc::clone(&self.catalog);
        let blessing = catalog.content.blessing(&id).ok_or(Denial::MalformedContent)?;
        for effect in &blessing.effects {
            match effect {
                BlessingEffect::MaxHealth { amount } => self.gain_max_health(*amount),
                BlessingEffect::MaxEnergy { amount } => self.gain_max_energy(*amount),
                BlessingEffect::Strength { amount } => {
                    self.run_bonuses.strength = self.run_bonuses.strength.saturating_add(*amount);
                }
                BlessingEffect::Gold { amount } => {
                    self.earn_gold(*amount);
                    events.push(Event::GoldChanged {
                        delta: i64::from(*amount),
                        gold: self.gold,
                    });
                }
            }
        }
        tracing::debug!(blessing = %id, "blessing chosen");
        self.complete_active_node(events)
    }

    pub(super) fn rest(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::NodeResolution(Resolution::Rest))?;
        let heal = percent_of(self.max_health, self.catalog.config.run.rest_heal_percent);
        self.restore_health(heal, events);
        self.complete_active_node(events)
    }
}
