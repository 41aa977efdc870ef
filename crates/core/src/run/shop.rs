use super::*;
use crate::Resolution;

impl RunState {
    pub(super) fn open_shop(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        let catalog = Arc::clone(&self.catalog);
        let resolver = Self::resolver(&catalog);
        let shop = ShopState::generate(&resolver, &catalog.config.shop, &mut self.rng).map_err(|err| {
            tracing::error!(error = %err, "shop generation failed");
            Denial::MalformedContent
        })?;
        events.push(Event::ShopEntered {
            cards: shop.cards.len(),
            items: shop.items.len(),
            reroll_cost: shop.reroll_cost,
        });
        self.shop = Some(shop);
        self.phase = RunPhase::NodeResolution(Resolution::Shop);
        Ok(())
    }

    fn shop_ref(&self) -> Result<&ShopState, Denial> {
        if self.phase != RunPhase::NodeResolution(Resolution::Shop) {
            return Err(Denial::InvalidPhase);
        }
        self.shop.as_ref().ok_or(Denial::InvalidPhase)
    }

    pub(super) fn buy_shop_card(&mut self, index: usize, events: &mut EventBus) -> Result<(), Denial> {
        let price = self.shop_ref()?.card_price(index).ok_or(Denial::InvalidTarget)?;
        if self.selected_deck.len() >= self.max_deck_size {
            return Err(Denial::CapacityExceeded);
        }
        self.pay(price, events)?;
        let offer = self
            .shop
            .as_mut()
            .and_then(|shop| shop.take_card(index))
            .ok_or(Denial::InvalidTarget)?;
        self.gain_card(&offer.card_id, events);
        events.push(Event::ShopBought {
            id: offer.card_id,
            cost: price,
            gold: self.gold,
        });
        Ok(())
    }

    pub(super) fn buy_shop_item(&mut self, index: usize, events: &mut EventBus) -> Result<(), Denial> {
        let price = self.shop_ref()?.item_price(index).ok_or(Denial::InvalidTarget)?;
        if self.inventory.bag.is_full() {
            return Err(Denial::CapacityExceeded);
        }
        self.pay(price, events)?;
        let offer = self
            .shop
            .as_mut()
            .and_then(|shop| shop.take_item(index))
            .ok_or(Denial::InvalidTarget)?;
        self.gain_item(&offer.item_id, events)?;
        events.push(Event::ShopBought {
            id: offer.item_id,
            cost: price,
            gold: self.gold,
        });
        Ok(())
    }

    pub(super) fn reroll_shop(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        let cost = self.shop_ref()?.reroll_cost;
        self.pay(cost, events)?;
        let catalog = Arc::clone(&self.catalog);
        let resolver = Self::resolver(&catalog);
        if let Some(shop) = self.shop.as_mut() {
            shop.reroll(&resolver, &catalog.config.shop, &mut self.rng)
                .map_err(|err| {
                    tracing::error!(error = %err, "shop reroll failed");
                    Denial::MalformedContent
                })?;
            events.push(Event::ShopEntered {
                cards: shop.cards.len(),
                items: shop.items.len(),
                reroll_cost: shop.reroll_cost,
            });
        }
        Ok(())
    }

    /// One removal per shop visit.
    pub(super) fn remove_card_at_shop(&mut self, deck_index: usize, events: &mut EventBus) -> Result<(), Denial> {
        let shop = self.shop_ref()?;
        if shop.removal_used {
            return Err(Denial::LimitReached);
        }
        let price = shop.removal_price;
        if deck_index >= self.selected_deck.len() {
            return Err(Denial::InvalidTarget);
        }
        self.pay(price, events)?;
        let removed = self.selected_deck.remove(deck_index);
        if let Some(shop) = self.shop.as_mut() {
            shop.removal_used = true;
        }
        tracing::debug!(card = %removed, price, "card removed at shop");
        Ok(())
    }

    pub(super) fn leave_shop(&mut self, events: &mut EventBus) -> Result<(), Denial> {
        self.shop_ref()?;
        self.complete_active_node(events)
    }
}
