use super::*;
use crate::{
    apply_status, clear_debuffs, has_status, outgoing_damage, resolve_hit, stacks_of, tick_statuses,
    CardEffect, EnemyData, EnemyTier, Holder, Piles, Resolution, StatusKind,
};

/// Turns a run-long bonus status lasts once granted at battle start.
const BONUS_DURATION: u32 = 99;

impl RunState {
    fn in_battle(&self) -> bool {
        self.phase == RunPhase::NodeResolution(Resolution::Battle)
    }

    /// Battle bound and the enemy still standing.
    fn live_battle(&self) -> Result<&BattleState, Denial> {
        match self.battle.as_ref() {
            Some(battle) if self.in_battle() && !battle.enemy_defeated() => Ok(battle),
            _ => Err(Denial::InvalidPhase),
        }
    }

    fn dealt_battle(&self) -> Result<&BattleState, Denial> {
        let battle = self.live_battle()?;
        if battle.started() {
            Ok(battle)
        } else {
            Err(Denial::InvalidPhase)
        }
    }

    pub(super) fn set_enemy_for_battle(
        &mut self,
        enemy: &EnemyData,
        is_boss: bool,
        events: &mut EventBus,
    ) -> Result<(), Denial> {
        self.require_in_run()?;
        // Rebinding is only allowed from the map or over the current fight.
        if !matches!(
            self.phase,
            RunPhase::MapNavigation | RunPhase::NodeResolution(Resolution::Battle)
        ) {
            return Err(Denial::InvalidPhase);
        }
        self.bind_enemy(enemy.clone(), is_boss, events);
        Ok(())
    }

    fn bind_enemy(&mut self, enemy: EnemyData, is_boss: bool, events: &mut EventBus) {
        let is_boss = is_boss || enemy.tier.is_boss();
        events.push(Event::BattleStarted {
            enemy: enemy.name.clone(),
            health: enemy.health,
            is_boss,
        });
        tracing::debug!(enemy = %enemy.name, health = enemy.health, is_boss, "enemy bound");
        self.battle = Some(BattleState::new(enemy, is_boss));
        self.enemy_statuses.clear();
        self.player_block = 0;
        self.phase = RunPhase::NodeResolution(Resolution::Battle);
    }

    /// Binds the enemy of a map node and deals the opening hand.
    pub(super) fn begin_battle(
        &mut self,
        enemy: EnemyData,
        is_boss: bool,
        events: &mut EventBus,
    ) -> Result<(), Denial> {
        self.bind_enemy(enemy, is_boss, events);
        self.start_battle(events)
    }

    pub(super) fn start_battle(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        if self.live_battle()?.started() {
            return Err(Denial::InvalidPhase);
        }
        let bonuses = self.battle_bonuses();
        if bonuses.strength > 0 {
            self.apply_player_status(
                crate::StatusInstance::new(StatusKind::Strength, bonuses.strength, BONUS_DURATION),
                events,
            )?;
        }
        if bonuses.thorns > 0 {
            self.apply_player_status(
                crate::StatusInstance::new(StatusKind::Thorns, bonuses.thorns, BONUS_DURATION),
                events,
            )?;
        }
        self.player_block = bonuses.block;
        self.energy = self.max_energy;
        if let Some(battle) = self.battle.as_mut() {
            battle.piles = Piles::from_deck(&self.selected_deck, &mut self.rng);
            battle.turn = 1;
        }
        self.stats.turns += 1;
        self.deal_turn_hand();
        Ok(())
    }

    /// Draws the turn's hand; each dazed stack costs one card, never below one.
    fn deal_turn_hand(&mut self) {
        let dazed = stacks_of(&self.player_statuses, StatusKind::Dazed);
        let count = self.hand_size.saturating_sub(dazed).max(1);
        self.draw(count);
    }

    fn draw(&mut self, count: u32) -> usize {
        let limit = self.max_hand_size as usize;
        match self.battle.as_mut() {
            Some(battle) => battle.piles.draw_cards(count as usize, limit, &mut self.rng),
            None => 0,
        }
    }

    pub(super) fn draw_cards_action(&mut self, count: u32) -> Result<(), Denial> {
        self.dealt_battle()?;
        self.draw(count);
        Ok(())
    }

    pub(super) fn damage_enemy_action(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.live_battle()?;
        self.strike_enemy(amount, false, events);
        Ok(())
    }

    /// Routes damage through the enemy's dodge, shield and block.
    ///
    /// Only card attacks trigger the enemy's thorns.
    pub(super) fn strike_enemy(&mut self, amount: u32, attack: bool, events: &mut EventBus) {
        let catalog = Arc::clone(&self.catalog);
        let hit = resolve_hit(amount, &mut self.enemy_statuses, &catalog.config.statuses);
        if hit.dodged {
            events.push(Event::AttackDodged {
                holder: Holder::Enemy,
            });
            return;
        }
        let remaining = match self.battle.as_mut() {
            Some(battle) => {
                let blocked = hit.damage.min(battle.enemy_block);
                battle.enemy_block -= blocked;
                hit.damage - blocked
            }
            None => return,
        };
        if self.enemy_lose_health(remaining, events) {
            return;
        }
        if attack && hit.thorns > 0 {
            self.lose_health(hit.thorns, events);
        }
    }

    /// Applies raw damage to the enemy; returns true when it dies.
    fn enemy_lose_health(&mut self, amount: u32, events: &mut EventBus) -> bool {
        let Some(battle) = self.battle.as_mut() else {
            return false;
        };
        let applied = amount.min(battle.enemy_health);
        Self::clamped("enemy_health", u64::from(amount), u64::from(applied), events);
        battle.enemy_health -= applied;
        let health = battle.enemy_health;
        self.stats.damage_dealt += u64::from(applied);
        self.profile.lifetime_stats.damage_dealt += u64::from(applied);
        events.push(Event::EnemyDamaged {
            amount: applied,
            health,
        });
        if health == 0 {
            self.win_battle(events);
            return true;
        }
        false
    }

    pub(super) fn heal_enemy(&mut self, amount: u32, events: &mut EventBus) -> Result<(), Denial> {
        self.live_battle()?;
        if let Some(battle) = self.battle.as_mut() {
            let room = battle.enemy_max_health - battle.enemy_health;
            let applied = amount.min(room);
            Self::clamped("enemy_health", u64::from(amount), u64::from(applied), events);
            battle.enemy_health += applied;
        }
        Ok(())
    }

    pub(super) fn play_card(&mut self, hand_index: usize, events: &mut EventBus) -> Result<(), Denial> {
        let battle = self.dealt_battle()?;
        let card_id = battle
            .piles
            .hand
            .get(hand_index)
            .cloned()
            .ok_or(Denial::InvalidTarget)?;
        let catalog = Arc::clone(&self.catalog);
        let card = catalog.content.card(&card_id).ok_or(Denial::MalformedContent)?;
        if card.cost > self.energy {
            return Err(Denial::InsufficientEnergy);
        }
        self.energy -= card.cost;
        if let Some(battle) = self.battle.as_mut() {
            if let Some(played) = battle.piles.play(hand_index) {
                battle.piles.discard_card(played);
            }
        }
        self.stats.cards_played += 1;
        events.push(Event::CardPlayed {
            card: card_id.clone(),
            energy_left: self.energy,
        });

        let rule = &catalog.config.statuses;
        for effect in &card.effects {
            match effect {
                CardEffect::Damage { amount } => {
                    let damage = outgoing_damage(*amount, &self.player_statuses, rule);
                    self.strike_enemy(damage, true, events);
                }
                CardEffect::Block { amount } => {
                    self.player_block = self.player_block.saturating_add(*amount);
                }
                CardEffect::Heal { amount } => self.restore_health(*amount, events),
                CardEffect::Energy { amount } => self.refill_energy(*amount, events),
                CardEffect::Draw { count } => {
                    self.draw(*count);
                }
                CardEffect::ApplyEnemy { status } => {
                    self.enemy_statuses = apply_status(&self.enemy_statuses, *status);
                    events.push(Event::StatusApplied {
                        holder: Holder::Enemy,
                        kind: status.kind,
                        stacks: status.stacks,
                    });
                }
                CardEffect::ApplySelf { status } => self.apply_player_status(*status, events)?,
                CardEffect::Cleanse => self.player_statuses = clear_debuffs(&self.player_statuses),
            }
            if !self.in_battle() || self.battle.as_ref().is_some_and(|b| b.enemy_defeated()) {
                break;
            }
        }
        Ok(())
    }

    pub(super) fn refill_energy(&mut self, amount: u32, events: &mut EventBus) {
        let room = self.max_energy - self.energy.min(self.max_energy);
        let applied = amount.min(room);
        Self::clamped("energy", u64::from(amount), u64::from(applied), events);
        self.energy += applied;
    }

    /// Enemy acts, then the player's next turn begins.
    pub(super) fn end_turn(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.dealt_battle()?;
        if let Some(battle) = self.battle.as_mut() {
            battle.piles.discard_hand();
        }

        let dazed = has_status(&self.enemy_statuses, StatusKind::Dazed);
        if self.tick_enemy(events) {
            return Ok(());
        }
        if dazed {
            tracing::debug!("enemy is dazed and skips its turn");
        } else {
            self.enemy_attack(events);
        }
        if !self.in_battle() || self.battle.as_ref().is_some_and(|b| b.enemy_defeated()) {
            return Ok(());
        }

        if let Some(battle) = self.battle.as_mut() {
            battle.turn += 1;
        }
        self.stats.turns += 1;
        self.player_block = self.battle_bonuses().block;
        self.tick_player(events);
        if !self.phase.in_run() {
            return Ok(());
        }
        self.energy = self.max_energy;
        self.deal_turn_hand();
        Ok(())
    }

    fn enemy_attack(&mut self, events: &mut EventBus) {
        let Some(enemy) = self.battle.as_ref().map(|battle| battle.enemy.clone()) else {
            return;
        };
        let catalog = Arc::clone(&self.catalog);
        let rule = &catalog.config.statuses;
        let damage = outgoing_damage(enemy.damage, &self.enemy_statuses, rule);
        let hit = resolve_hit(damage, &mut self.player_statuses, rule);
        if hit.dodged {
            events.push(Event::AttackDodged {
                holder: Holder::Player,
            });
            return;
        }
        let blocked = hit.damage.min(self.player_block);
        self.player_block -= blocked;
        self.lose_health(hit.damage - blocked, events);
        if !self.phase.in_run() {
            return;
        }
        if let Some(status) = enemy.on_hit {
            // Block does not stop the on-hit rider.
            let _ = self.apply_player_status(status, events);
        }
        if hit.thorns > 0 {
            self.strike_enemy(hit.thorns, false, events);
        }
    }

    /// Returns true when the tick killed the enemy.
    fn tick_enemy(&mut self, events: &mut EventBus) -> bool {
        let catalog = Arc::clone(&self.catalog);
        let tick = tick_statuses(&self.enemy_statuses, &catalog.config.statuses);
        self.enemy_statuses = tick.statuses;
        events.push(Event::StatusTicked {
            holder: Holder::Enemy,
            damage: tick.total_damage,
            healing: tick.total_healing,
        });
        if tick.total_healing > 0 {
            if let Some(battle) = self.battle.as_mut() {
                battle.enemy_health = battle
                    .enemy_health
                    .saturating_add(tick.total_healing)
                    .min(battle.enemy_max_health);
            }
        }
        tick.total_damage > 0 && self.enemy_lose_health(tick.total_damage, events)
    }

    fn tick_player(&mut self, events: &mut EventBus) {
        let catalog = Arc::clone(&self.catalog);
        let tick = tick_statuses(&self.player_statuses, &catalog.config.statuses);
        self.player_statuses = tick.statuses;
        events.push(Event::StatusTicked {
            holder: Holder::Player,
            damage: tick.total_damage,
            healing: tick.total_healing,
        });
        self.lose_health(tick.total_damage, events);
        if self.phase.in_run() {
            self.restore_health(tick.total_healing, events);
        }
    }

    pub(super) fn tick_player_statuses(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.require_in_run()?;
        self.tick_player(events);
        Ok(())
    }

    pub(super) fn tick_enemy_statuses(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.live_battle()?;
        self.tick_enemy(events);
        Ok(())
    }

    pub(super) fn apply_player_status(
        &mut self,
        status: crate::StatusInstance,
        events: &mut EventBus,
    ) -> Result<(), Denial> {
        self.require_in_run()?;
        if !status.is_live() {
            return Ok(());
        }
        self.player_statuses = apply_status(&self.player_statuses, status);
        events.push(Event::StatusApplied {
            holder: Holder::Player,
            kind: status.kind,
            stacks: status.stacks,
        });
        Ok(())
    }

    pub(super) fn apply_enemy_status(
        &mut self,
        status: crate::StatusInstance,
        events: &mut EventBus,
    ) -> Result<(), Denial> {
        self.live_battle()?;
        if !status.is_live() {
            return Ok(());
        }
        self.enemy_statuses = apply_status(&self.enemy_statuses, status);
        events.push(Event::StatusApplied {
            holder: Holder::Enemy,
            kind: status.kind,
            stacks: status.stacks,
        });
        Ok(())
    }

    /// Records the kill and rolls the rewards screen.
    fn win_battle(&mut self, events: &mut EventBus) {
        let Some(battle) = self.battle.as_ref() else {
            return;
        };
        let tier = match battle.enemy.tier {
            EnemyTier::Basic if battle.is_boss => EnemyTier::Boss,
            tier => tier,
        };
        let name = battle.enemy.name.clone();
        self.stats.enemies_defeated += 1;
        let lifetime = &mut self.profile.lifetime_stats;
        match tier {
            EnemyTier::Basic => lifetime.enemies_defeated += 1,
            EnemyTier::Elite => lifetime.elites_defeated += 1,
            EnemyTier::Boss | EnemyTier::FinalBoss => lifetime.bosses_defeated += 1,
        }
        tracing::info!(enemy = %name, ?tier, "enemy defeated");
        events.push(Event::EnemyDefeated { enemy: name });

        let catalog = Arc::clone(&self.catalog);
        let resolver = Self::resolver(&catalog);
        let bonuses = self.profile.talent_bonuses(&catalog.content);
        self.grant_experience(resolver.experience_for(tier), events);

        let gold = resolver.roll_gold(tier, bonuses.gold_gain_percent, &mut self.rng);
        let choices = catalog.config.rewards.card_choices + bonuses.card_choices;
        let card_options = resolver
            .card_options(choices, &mut self.rng)
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, "card reward roll failed");
                Vec::new()
            });
        let item = if resolver.drops_item(tier) {
            match resolver.roll_item(&mut self.rng) {
                Ok(def) => Some(def.id.clone()),
                Err(err) => {
                    tracing::error!(error = %err, "item drop roll failed");
                    None
                }
            }
        } else {
            None
        };

        self.player_statuses.clear();
        self.enemy_statuses.clear();
        self.player_block = 0;
        self.offer_rewards(
            PendingRewards {
                gold,
                card_options,
                item,
            },
            events,
        );
    }
}
