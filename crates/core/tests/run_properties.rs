//! Properties that hold for every seed and every action sequence.

use deckclimb_core::{
    check_invariants, nodes, reduce, Action, Catalog, Content, EventBus, GameConfig, MapGenerator,
    MapRequest, NodeKind, Profile, RngState, RunPhase, RunState,
};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn content() -> Content {
    let value = json!({
        "cards": [
            { "id": "strike", "name": "Strike", "rarity": "common", "kind": "attack", "cost": 1,
              "effects": [{ "kind": "damage", "amount": 6 }] },
            { "id": "defend", "name": "Defend", "rarity": "common", "kind": "skill", "cost": 1,
              "effects": [{ "kind": "block", "amount": 5 }] },
            { "id": "focus", "name": "Focus", "rarity": "uncommon", "kind": "skill", "cost": 0,
              "effects": [{ "kind": "draw", "count": 2 }] },
            { "id": "meteor", "name": "Meteor", "rarity": "rare", "kind": "attack", "cost": 3,
              "effects": [{ "kind": "damage", "amount": 24 }] }
        ],
        "enemies": [
            { "id": "slime", "name": "Slime", "tier": "basic", "health": 30, "damage": 5 },
            { "id": "brute", "name": "Brute", "tier": "elite", "health": 70, "damage": 10 },
            { "id": "golem", "name": "Golem", "tier": "boss", "health": 120, "damage": 12 },
            { "id": "lich", "name": "Lich", "tier": "final_boss", "health": 250, "damage": 18 }
        ],
        "items": [
            { "id": "potion", "name": "Potion", "rarity": "common", "kind": "consumable",
              "effects": [{ "kind": "heal", "amount": 20 }] },
            { "id": "ring", "name": "Ring", "rarity": "uncommon", "kind": "passive",
              "effects": [{ "kind": "bonus_strength", "amount": 1 }] },
            { "id": "mail", "name": "Mail", "rarity": "rare", "kind": "passive",
              "effects": [{ "kind": "bonus_thorns", "amount": 2 }] }
        ],
        "talents": [],
        "events": [
            { "id": "well", "title": "Well", "options": [
                { "label": "Drink", "outcomes": [{ "kind": "heal", "amount": 10 }] }
            ] }
        ],
        "blessings": [
            { "id": "oak", "name": "Oak", "effects": [{ "kind": "max_health", "amount": 10 }] }
        ],
        "biomes": ["forest", "caverns"]
    });
    serde_json::from_value(value).expect("fixture content")
}

fn catalog() -> Arc<Catalog> {
    let mut config = GameConfig::default();
    config.run.starter_deck = vec!["strike".into(), "strike".into(), "defend".into()];
    Catalog::new(config, content()).expect("fixture catalog")
}

fn resource_action() -> impl Strategy<Value = Action> {
    let amount = 0u32..400;
    prop_oneof![
        amount.clone().prop_map(|amount| Action::DamagePlayer { amount }),
        amount.clone().prop_map(|amount| Action::HealPlayer { amount }),
        amount.clone().prop_map(|amount| Action::AddGold { amount }),
        amount.clone().prop_map(|amount| Action::SpendGold { amount }),
        amount.clone().prop_map(|amount| Action::SpendEnergy { amount }),
        amount.clone().prop_map(|amount| Action::GainEnergy { amount }),
        amount.clone().prop_map(|amount| Action::SetMaxHealth { amount }),
        amount.prop_map(|size| Action::SetHandSize { size }),
        Just(Action::ResetEnergy),
        Just(Action::Unknown),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_seed_builds_a_valid_map(seed in any::<u64>()) {
        let catalog = catalog();
        let mut rng = RngState::from_seed(seed);
        let map = MapGenerator::new(&catalog.config.map, &catalog.content)
            .generate(MapRequest::from_rule(&catalog.config.map), &mut rng)
            .expect("generate");
        prop_assert!(check_invariants(&map).is_ok());
        prop_assert_eq!(map.len(), 5);
        for node in nodes(&map) {
            prop_assert_eq!(node.available, node.floor == 1);
            prop_assert_eq!(node.kind.is_battle(), node.enemy_data.is_some());
            if node.kind == NodeKind::Boss {
                prop_assert!(node.children_ids.is_empty());
            }
        }
    }

    #[test]
    fn generation_is_deterministic(seed in any::<u64>()) {
        let catalog = catalog();
        let generator = MapGenerator::new(&catalog.config.map, &catalog.content);
        let request = MapRequest::from_rule(&catalog.config.map);
        let first = generator.generate(request, &mut RngState::from_seed(seed)).expect("first");
        let second = generator.generate(request, &mut RngState::from_seed(seed)).expect("second");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn resources_stay_in_bounds(
        seed in any::<u64>(),
        actions in proptest::collection::vec(resource_action(), 1..40),
    ) {
        let state = RunState::new(catalog(), Profile::new(), seed);
        let mut events = EventBus::default();
        let mut state = reduce(&state, &Action::StartNewRun { seed: Some(seed) }, &mut events);
        for action in &actions {
            state = reduce(&state, action, &mut events);
            prop_assert!(state.health <= state.max_health);
            prop_assert!(state.max_health >= 1);
            prop_assert!(state.energy <= state.max_energy);
            prop_assert!(state.hand_size >= 1 && state.hand_size <= state.max_hand_size);
            if state.health == 0 {
                prop_assert_eq!(state.phase, RunPhase::RunEnded(deckclimb_core::RunOutcome::Defeat));
            }
        }
    }

    #[test]
    fn unknown_actions_never_change_state(seed in any::<u64>()) {
        let state = RunState::new(catalog(), Profile::new(), seed);
        let mut events = EventBus::default();
        let state = reduce(&state, &Action::StartNewRun { seed: Some(seed) }, &mut events);
        let next = reduce(&state, &Action::Unknown, &mut events);
        prop_assert_eq!(next.snapshot(), state.snapshot());
        prop_assert_eq!(next.profile, state.profile);
    }
}
