use super::*;

impl RunState {
    /// Raw health loss; block and statuses do not apply.
    pub(super) fn damage_player_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.require_in_run()?;
        self.lose_health(amount, events);
        Ok(())
    }

    pub(super) fn heal_player_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.require_in_run()?;
        self.restore_health(amount, events);
        Ok(())
    }

    /// Max health never drops below one; current health follows it down.
    pub(super) fn set_max_health(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        let applied = amount.max(1);
        Self::clamped("max_health", u64::from(amount), u64::from(applied), events);
        self.max_health = applied;
        self.health = self.health.min(applied);
        Ok(())
    }

    pub(super) fn increase_max_health(&mut self, amount: u32) -> Result<(), Denial> {
        self.gain_max_health(amount);
        Ok(())
    }

    pub(super) fn add_gold_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        if amount == 0 {
            return Ok(());
        }
        self.earn_gold(amount);
        events.push(Event::GoldChanged {
            delta: i64::from(amount),
            gold: self.gold,
        });
        Ok(())
    }

    /// Spends what is there; overspending clamps at zero.
    pub(super) fn spend_gold_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        let applied = amount.min(self.gold);
        Self::clamped("gold", u64::from(amount), u64::from(applied), events);
        if applied == 0 {
            return Ok(());
        }
        self.gold -= applied;
        events.push(Event::GoldChanged {
            delta: -i64::from(applied),
            gold: self.gold,
        });
        Ok(())
    }

    pub(super) fn spend_energy_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        let applied = amount.min(self.energy);
        Self::clamped("energy", u64::from(amount), u64::from(applied), events);
        self.energy -= applied;
        Ok(())
    }

    pub(super) fn gain_energy_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.refill_energy(amount, events);
        Ok(())
    }

    pub(super) fn set_hand_size(&mut self, size: u32, events: &mut EventBus) -> Result<(), Denial> {
        let applied = size.clamp(1, self.max_hand_size.max(1));
        Self::clamped("hand_size", u64::from(size), u64::from(applied), events);
        self.hand_size = applied;
        Ok(())
    }
}
