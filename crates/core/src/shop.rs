use crate::{Rarity, RewardError, RewardResolver, RngState, ShopRule};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardOffer {
    pub card_id: String,
    pub rarity: Rarity,
    pub price: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemOffer {
    pub item_id: String,
    pub rarity: Rarity,
    pub price: u32,
}

/// Offers of the shop node currently being visited.
///
/// Bought offers are removed, so indices shift after every purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShopState {
    pub cards: Vec<CardOffer>,
    pub items: Vec<ItemOffer>,
    pub reroll_cost: u32,
    pub removal_price: u32,
    pub removal_used: bool,
}

impl ShopState {
    pub fn generate(
        resolver: &RewardResolver<'_>,
        rule: &ShopRule,
        rng: &mut RngState,
    ) -> Result<Self, RewardError> {
        Ok(Self {
            cards: generate_cards(resolver, rule, rng)?,
            items: generate_items(resolver, rule, rng)?,
            reroll_cost: rule.reroll_base,
            removal_price: rule.removal_price,
            removal_used: false,
        })
    }

    /// Replaces every offer and raises the next reroll price.
    pub fn reroll(
        &mut self,
        resolver: &RewardResolver<'_>,
        rule: &ShopRule,
        rng: &mut RngState,
    ) -> Result<(), RewardError> {
        self.cards = generate_cards(resolver, rule, rng)?;
        self.items = generate_items(resolver, rule, rng)?;
        self.reroll_cost = self.reroll_cost.saturating_add(rule.reroll_step);
        Ok(())
    }

    pub fn card_price(&self, index: usize) -> Option<u32> {
        self.cards.get(index).map(|offer| offer.price)
    }

    pub fn item_price(&self, index: usize) -> Option<u32> {
        self.items.get(index).map(|offer| offer.price)
    }

    pub fn take_card(&mut self, index: usize) -> Option<CardOffer> {
        if index >= self.cards.len() {
            return None;
        }
        Some(self.cards.remove(index))
    }

    pub fn take_item(&mut self, index: usize) -> Option<ItemOffer> {
        if index >= self.items.len() {
            return None;
        }
        Some(self.items.remove(index))
    }
}

fn generate_cards(
    resolver: &RewardResolver<'_>,
    rule: &ShopRule,
    rng: &mut RngState,
) -> Result<Vec<CardOffer>, RewardError> {
    let mut offers = Vec::with_capacity(rule.card_slots as usize);
    for _ in 0..rule.card_slots {
        let card = resolver.roll_reward_card(rng)?;
        let price = resolver.card_price(card.rarity, rng);
        offers.push(CardOffer {
            card_id: card.id.clone(),
            rarity: card.rarity,
            price,
        });
    }
    Ok(offers)
}

fn generate_items(
    resolver: &RewardResolver<'_>,
    rule: &ShopRule,
    rng: &mut RngState,
) -> Result<Vec<ItemOffer>, RewardError> {
    let mut offers = Vec::with_capacity(rule.item_slots as usize);
    for _ in 0..rule.item_slots {
        let item = resolver.roll_item(rng)?;
        let price = resolver.item_price(item.rarity, rng);
        offers.push(ItemOffer {
            item_id: item.id.clone(),
            rarity: item.rarity,
            price,
        });
    }
    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;
    use crate::GameConfig;

    #[test]
    fn generate_fills_configured_slots_with_ranged_prices() {
        let config = GameConfig::default();
        let content = sample_content();
        let resolver = RewardResolver::new(&config, &content);
        let mut rng = RngState::from_seed(17);
        let shop = ShopState::generate(&resolver, &config.shop, &mut rng).expect("shop");
        assert_eq!(shop.cards.len(), config.shop.card_slots as usize);
        assert_eq!(shop.items.len(), config.shop.item_slots as usize);
        for offer in &shop.cards {
            let range = config.shop.card_price(offer.rarity).expect("range");
            assert!((range.min..=range.max).contains(&offer.price));
        }
        assert_eq!(shop.reroll_cost, config.shop.reroll_base);
    }

    #[test]
    fn reroll_raises_cost_by_step() {
        let config = GameConfig::default();
        let content = sample_content();
        let resolver = RewardResolver::new(&config, &content);
        let mut rng = RngState::from_seed(3);
        let mut shop = ShopState::generate(&resolver, &config.shop, &mut rng).expect("shop");
        shop.reroll(&resolver, &config.shop, &mut rng).expect("reroll");
        shop.reroll(&resolver, &config.shop, &mut rng).expect("reroll");
        assert_eq!(
            shop.reroll_cost,
            config.shop.reroll_base + 2 * config.shop.reroll_step
        );
    }

    #[test]
    fn take_removes_offer() {
        let config = GameConfig::default();
        let content = sample_content();
        let resolver = RewardResolver::new(&config, &content);
        let mut rng = RngState::from_seed(5);
        let mut shop = ShopState::generate(&resolver, &config.shop, &mut rng).expect("shop");
        let before = shop.items.len();
        assert!(shop.take_item(0).is_some());
        assert_eq!(shop.items.len(), before - 1);
        assert!(shop.take_card(99).is_none());
    }
}
