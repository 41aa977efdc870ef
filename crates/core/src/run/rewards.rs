use super::*;

impl RunState {
    pub(super) fn offer_rewards(&mut self, rewards: PendingRewards, events: &mut EventBus) {
        events.push(Event::RewardsReady {
            gold: rewards.gold,
            cards: rewards.card_options.len(),
            item: rewards.item.is_some(),
        });
        self.pending_rewards = Some(rewards);
        self.phase = RunPhase::RewardResolution;
    }

    fn pending(&mut self) -> Result<&mut PendingRewards, Denial> {
        if self.phase != RunPhase::RewardResolution {
            return Err(Denial::InvalidPhase);
        }
        self.pending_rewards.as_mut().ok_or(Denial::InvalidPhase)
    }

    pub(super) fn claim_gold_reward(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        let pending = self.pending()?;
        let gold = std::mem::take(&mut pending.gold);
        if gold == 0 {
            return Err(Denial::InvalidTarget);
        }
        self.earn_gold(gold);
        events.push(Event::GoldChanged {
            delta: i64::from(gold),
            gold: self.gold,
        });
        Ok(())
    }

    pub(super) fn choose_card_reward(&mut self, card_id: &str, events: &mut EventBus) -> Result<(), Denial> {
        let pending = self.pending()?;
        if !pending.card_options.iter().any(|option| option == card_id) {
            return Err(Denial::InvalidTarget);
        }
        pending.card_options.clear();
        self.gain_card(card_id, events);
        Ok(())
    }

    pub(super) fn skip_card_reward(&mut self) -> Result<(), Denial> {
        let pending = self.pending()?;
        if pending.card_options.is_empty() {
            return Err(Denial::InvalidTarget);
        }
        pending.card_options.clear();
        Ok(())
    }

    /// A full bag denies the claim and leaves the item waiting.
    pub(super) fn claim_item_reward(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        let item = self.pending()?.item.clone().ok_or(Denial::InvalidTarget)?;
        self.gain_item(&item, events)?;
        if let Some(pending) = self.pending_rewards.as_mut() {
            pending.item = None;
        }
        Ok(())
    }

    /// Forfeits whatever is left unclaimed and completes the node.
    pub(super) fn finish_rewards(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.pending()?;
        self.complete_active_node(events)
    }
}
