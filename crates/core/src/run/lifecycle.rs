use super::*;
use crate::{map, MapGenerator, MapRequest, RunOutcome, RunSnapshot, UpgradeKind};

impl RunState {
    pub(super) fn start_new_run(&mut self, seed: Option<u64>, events: &mut EventBus) -> Result<(), Denial> {
        let seed = seed.unwrap_or_else(|| self.rng.next_u64());
        let catalog = Arc::clone(&self.catalog);
        let mut profile = std::mem::take(&mut self.profile);
        profile.current_run = None;
        let mut next = RunState::new(Arc::clone(&catalog), profile, seed);

        let config = &catalog.config;
        let upgrades = next.profile.upgrades.clone();
        let bought = |kind: UpgradeKind| {
            upgrades
                .get(kind)
                .saturating_mul(config.upgrades.amount(kind))
        };
        let talents = next.profile.talent_bonuses(&catalog.content);
        next.max_health = config
            .run
            .starting_health
            .saturating_add(bought(UpgradeKind::Health))
            .saturating_add(talents.max_health);
        next.health = next.max_health;
        next.max_energy = config
            .run
            .starting_energy
            .saturating_add(bought(UpgradeKind::MaxEnergy))
            .saturating_add(talents.max_energy);
        next.energy = next.max_energy;
        next.hand_size = config
            .run
            .starting_hand_size
            .saturating_add(bought(UpgradeKind::HandSize))
            .saturating_add(talents.hand_size)
            .min(next.max_hand_size);
        next.gold = config
            .run
            .starting_gold
            .saturating_add(bought(UpgradeKind::StartingGold))
            .saturating_add(talents.starting_gold);
        next.selected_deck = config.run.starter_deck.clone();
        next.unlocked_cards = next.selected_deck.iter().cloned().collect();

        next.install_map(events)?;
        next.phase = RunPhase::MapNavigation;
        next.profile.lifetime_stats.runs_started += 1;
        next.profile.current_run = Some(next.snapshot());
        tracing::info!(seed, max_health = next.max_health, gold = next.gold, "run started");
        events.push(Event::RunStarted {
            seed,
            max_health: next.max_health,
        });
        *self = next;
        Ok(())
    }

    /// Generates the map into an empty state and opens floor 1.
    pub(super) fn install_map(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        if !self.map.is_empty() {
            return Err(Denial::MapAlreadyGenerated);
        }
        let catalog = Arc::clone(&self.catalog);
        let rule = &catalog.config.map;
        let generated = MapGenerator::new(rule, &catalog.content)
            .generate(MapRequest::from_rule(rule), &mut self.rng);
        let biomes = match generated {
            Ok(biomes) => biomes,
            Err(err) => {
                tracing::error!(error = %err, "map generation failed");
                return Err(Denial::MalformedContent);
            }
        };
        self.available_node_ids = map::nodes(&biomes)
            .filter(|node| node.available)
            .map(|node| node.id)
            .collect();
        self.completed_node_ids.clear();
        self.current_act = 1;
        self.current_floor = 1;
        events.push(Event::MapGenerated {
            acts: map::act_count(&biomes),
            nodes: map::node_count(&biomes),
        });
        self.map = biomes;
        Ok(())
    }

    pub(super) fn end_run_action(&mut self, victory: bool, events: &mut EventBus) -> Result<(), Denial> {
        self.require_in_run()?;
        let outcome = if victory {
            RunOutcome::Victory
        } else {
            RunOutcome::Defeat
        };
        self.end_run(outcome, events);
        Ok(())
    }

    pub(super) fn end_run(&mut self, outcome: RunOutcome, events: &mut EventBus) {
        let floor = self.reached_floor();
        let stats = &mut self.profile.lifetime_stats;
        match outcome {
            RunOutcome::Victory => stats.runs_won += 1,
            RunOutcome::Defeat => stats.runs_lost += 1,
        }
        stats.highest_floor = stats.highest_floor.max(floor);
        if outcome == RunOutcome::Victory {
            let experience = self.catalog.config.progression.victory_experience;
            self.grant_experience(experience, events);
        }
        self.phase = RunPhase::RunEnded(outcome);
        self.selected_node = None;
        self.player_statuses.clear();
        self.enemy_statuses.clear();
        self.profile.current_run = None;
        tracing::info!(?outcome, floor, "run ended");
        events.push(Event::RunEnded { outcome });
    }

    pub(super) fn reached_floor(&self) -> u32 {
        self.completed_node_ids
            .iter()
            .filter_map(|id| map::find_node(&self.map, *id))
            .map(|node| node.floor)
            .max()
            .unwrap_or(0)
    }

    pub(super) fn reset_for_new_game(&mut self, _events: &mut EventBus) -> Result<(), Denial> {
        let seed = self.rng.next_u64();
        let mut profile = std::mem::take(&mut self.profile);
        profile.current_run = None;
        *self = RunState::new(Arc::clone(&self.catalog), profile, seed);
        Ok(())
    }

    pub(super) fn save_profile(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.profile.current_run = if self.phase.in_run() {
            Some(self.snapshot())
        } else {
            None
        };
        events.push(Event::ProfileSaved);
        Ok(())
    }

    pub(super) fn load_profile(&mut self, profile: &Profile, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let seed = self.rng.next_u64();
        let next = match profile.current_run.clone() {
            Some(snapshot) => RunState::resume(catalog, profile.clone(), snapshot),
            None => RunState::new(catalog, profile.clone(), seed),
        };
        let resumed = next.phase.in_run();
        tracing::info!(resumed, level = next.profile.level, "profile loaded");
        events.push(Event::ProfileLoaded { resumed });
        *self = next;
        Ok(())
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            seed: self.seed,
            phase: self.phase,
            health: self.health,
            max_health: self.max_health,
            energy: self.energy,
            max_energy: self.max_energy,
            hand_size: self.hand_size,
            max_hand_size: self.max_hand_size,
            max_deck_size: self.max_deck_size,
            gold: self.gold,
            current_act: self.current_act,
            current_floor: self.current_floor,
            map: self.map.clone(),
            completed_node_ids: self.completed_node_ids.clone(),
            available_node_ids: self.available_node_ids.clone(),
            selected_node: self.selected_node,
            active_node: self.active_node,
            selected_path: self.selected_path.clone(),
            unlocked_cards: self.unlocked_cards.clone(),
            selected_deck: self.selected_deck.clone(),
            inventory: self.inventory.clone(),
            player_statuses: self.player_statuses.clone(),
            enemy_statuses: self.enemy_statuses.clone(),
            player_block: self.player_block,
            battle: self.battle.clone(),
            shop: self.shop.clone(),
            event: self.event.clone(),
            offered_blessings: self.offered_blessings.clone(),
            pending_rewards: self.pending_rewards.clone(),
            run_bonuses: self.run_bonuses,
            has_used_revive: self.has_used_revive,
            stats: self.stats,
        }
    }

    /// Rebuilds a run from a saved snapshot.
    ///
    /// The random stream is reseeded from the run seed and progress, so a
    /// resumed run stays deterministic without persisting generator state.
    pub fn resume(catalog: Arc<Catalog>, profile: Profile, snapshot: RunSnapshot) -> Self {
        let progress = snapshot.completed_node_ids.len() as u64 + 1;
        let mut state = RunState::new(catalog, profile, snapshot.seed);
        state.rng = RngState::from_seed(snapshot.seed.wrapping_add(progress));
        state.phase = snapshot.phase;
        state.health = snapshot.health;
        state.max_health = snapshot.max_health;
        state.energy = snapshot.energy;
        state.max_energy = snapshot.max_energy;
        state.hand_size = snapshot.hand_size;
        state.max_hand_size = snapshot.max_hand_size;
        state.max_deck_size = snapshot.max_deck_size;
        state.gold = snapshot.gold;
        state.current_act = snapshot.current_act;
        state.current_floor = snapshot.current_floor;
        state.map = snapshot.map;
        state.completed_node_ids = snapshot.completed_node_ids;
        state.available_node_ids = snapshot.available_node_ids;
        state.selected_node = snapshot.selected_node;
        state.active_node = snapshot.active_node;
        state.selected_path = snapshot.selected_path;
        state.unlocked_cards = snapshot.unlocked_cards;
        state.selected_deck = snapshot.selected_deck;
        state.inventory = snapshot.inventory;
        state.player_statuses = snapshot.player_statuses;
        state.enemy_statuses = snapshot.enemy_statuses;
        state.player_block = snapshot.player_block;
        state.battle = snapshot.battle;
        state.shop = snapshot.shop;
        state.event = snapshot.event;
        state.offered_blessings = snapshot.offered_blessings;
        state.pending_rewards = snapshot.pending_rewards;
        state.run_bonuses = snapshot.run_bonuses;
        state.has_used_revive = snapshot.has_used_revive;
        state.stats = snapshot.stats;
        state
    }
}
