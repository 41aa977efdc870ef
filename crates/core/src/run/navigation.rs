use super::*;
use crate::{
    map, roll_weighted, EnemyData, EnemyTier, MysteryOutcome, NodeKind, Resolution, RunOutcome,
};

impl RunState {
    pub(super) fn generate_map(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        if matches!(self.phase, RunPhase::RunEnded(_)) {
            return Err(Denial::InvalidPhase);
        }
        self.install_map(events)?;
        if self.phase == RunPhase::Idle {
            self.phase = RunPhase::MapNavigation;
        }
        Ok(())
    }

    /// Commits the current act to one biome; the others close.
    pub(super) fn select_path(&mut self, theme: &str, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::MapNavigation)?;
        let act = self.current_act;
        let act_started = self
            .completed_node_ids
            .iter()
            .filter_map(|id| map::find_node(&self.map, *id))
            .any(|node| node.act == act);
        if act_started {
            return Err(Denial::InvalidPhase);
        }
        let closed = map::choose_biome(&mut self.map, act, theme).map_err(|_| Denial::InvalidTarget)?;
        for id in &closed {
            self.available_node_ids.remove(id);
        }
        if let Some(selected) = self.selected_node {
            if closed.contains(&selected) {
                self.selected_node = None;
            }
        }
        self.selected_path = Some(theme.to_string());
        events.push(Event::PathChosen {
            act,
            theme: theme.to_string(),
        });
        Ok(())
    }

    fn selectable(&self, id: NodeId) -> Result<&crate::Node, Denial> {
        let node = map::find_node(&self.map, id).ok_or(Denial::InvalidTarget)?;
        if node.completed
            || !node.available
            || !self.available_node_ids.contains(&id)
            || node.floor != self.current_floor
        {
            return Err(Denial::InvalidTarget);
        }
        Ok(node)
    }

    pub(super) fn select_node(&mut self, id: NodeId) -> Result<(), Denial> {
        self.require_phase(RunPhase::MapNavigation)?;
        self.selectable(id)?;
        self.selected_node = Some(id);
        Ok(())
    }

    /// Enters the selected node; its kind decides what the run waits on next.
    pub(super) fn confirm_node(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::MapNavigation)?;
        let id = self.selected_node.ok_or(Denial::InvalidTarget)?;
        let node = self.selectable(id)?.clone();
        self.selected_node = None;
        self.active_node = Some(id);
        events.push(Event::NodeEntered {
            node: id,
            kind: node.kind,
        });
        tracing::debug!(node = %id, kind = ?node.kind, floor = node.floor, "node entered");
        match node.kind {
            NodeKind::Enemy | NodeKind::Elite | NodeKind::Boss => {
                let enemy = node.enemy_data.ok_or(Denial::MalformedContent)?;
                self.begin_battle(enemy, node.kind == NodeKind::Boss, events)
            }
            NodeKind::Shop => self.open_shop(events),
            NodeKind::Event => self.open_event(events),
            NodeKind::God => self.open_blessings(events),
            NodeKind::Rest => {
                self.phase = RunPhase::NodeResolution(Resolution::Rest);
                Ok(())
            }
            NodeKind::Mystery => self.resolve_mystery(node.act, events),
        }
    }

    fn resolve_mystery(&mut self, act: u32, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let rule = &catalog.config.map;
        let outcome = roll_weighted(
            rule.mystery_weights.iter().map(|w| (w.outcome, w.weight)),
            &mut self.rng,
        )
        .map_err(|err| {
            tracing::error!(error = %err, "mystery roll failed");
            Denial::MalformedContent
        })?;
        tracing::debug!(?outcome, "mystery resolved");
        match outcome {
            MysteryOutcome::Battle => {
                let def = catalog
                    .content
                    .pick_enemy(EnemyTier::Basic, &mut self.rng)
                    .ok_or(Denial::MalformedContent)?;
                let enemy = EnemyData::from_template(def, act, rule.enemy_health_scaling_percent);
                self.begin_battle(enemy, false, events)
            }
            MysteryOutcome::Event => self.open_event(events),
            MysteryOutcome::Shop => self.open_shop(events),
            MysteryOutcome::Treasure => {
                let resolver = Self::resolver(&catalog);
                let bonus = self.profile.talent_bonuses(&catalog.content).gold_gain_percent;
                let gold = resolver.roll_treasure_gold(bonus, &mut self.rng);
                let item = match resolver.roll_item(&mut self.rng) {
                    Ok(def) => Some(def.id.clone()),
                    Err(err) => {
                        tracing::error!(error = %err, "treasure item roll failed");
                        None
                    }
                };
                self.offer_rewards(
                    PendingRewards {
                        gold,
                        card_options: Vec::new(),
                        item,
                    },
                    events,
                );
                Ok(())
            }
        }
    }

    pub(super) fn complete_node_in_tree(&mut self, id: NodeId, events: &mut EventBus) -> Result<(), Denial> {
        self.require_phase(RunPhase::MapNavigation)?;
        self.selectable(id)?;
        self.complete_node(id, events)
    }

    /// Finishes the active node, if any, and returns to the map.
    pub(super) fn complete_active_node(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        match self.active_node {
            Some(id) => self.complete_node(id, events),
            None => {
                self.clear_resolution();
                self.phase = RunPhase::MapNavigation;
                Ok(())
            }
        }
    }

    fn clear_resolution(&mut self) {
        self.battle = None;
        self.shop = None;
        self.event = None;
        self.offered_blessings.clear();
        self.pending_rewards = None;
        self.player_block = 0;
    }

    fn complete_node(&mut self, id: NodeId, events: &mut EventBus) -> Result<(), Denial> {
        let opened = map::complete_node(&mut self.map, id).map_err(|_| Denial::InvalidTarget)?;
        let node = map::find_node(&self.map, id)
            .cloned()
            .ok_or(Denial::InvalidTarget)?;
        self.completed_node_ids.push(id);
        self.available_node_ids.remove(&id);
        self.available_node_ids.extend(opened.iter().copied());
        self.current_floor = node.floor + 1;
        self.selected_node = None;
        self.active_node = None;
        self.clear_resolution();
        self.phase = RunPhase::MapNavigation;
        let stats = &mut self.profile.lifetime_stats;
        stats.highest_floor = stats.highest_floor.max(node.floor);
        events.push(Event::NodeCompleted { node: id, opened });

        if node.kind != NodeKind::Boss {
            return Ok(());
        }
        events.push(Event::ActCleared { act: node.act });
        if node.act >= map::act_count(&self.map) {
            self.end_run(RunOutcome::Victory, events);
            return Ok(());
        }
        self.current_act = node.act + 1;
        self.selected_path = None;
        let opened = map::open_act(&mut self.map, self.current_act);
        self.available_node_ids.extend(opened);
        tracing::info!(act = self.current_act, "act started");
        Ok(())
    }
}
