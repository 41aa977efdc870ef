use crate::*;
use std::sync::Arc;

fn card(id: &str, rarity: Rarity, kind: CardKind, cost: u32, effects: Vec<CardEffect>) -> CardDef {
    CardDef {
        id: id.to_string(),
        name: id.replace('_', " "),
        rarity,
        kind,
        cost,
        effects,
    }
}

fn enemy(id: &str, tier: EnemyTier, health: u32, damage: u32, act: Option<u32>) -> EnemyDef {
    EnemyDef {
        id: id.to_string(),
        name: id.replace('_', " "),
        tier,
        health,
        damage,
        act,
        on_hit: None,
    }
}

fn item(id: &str, rarity: Rarity, kind: ItemKind, effects: Vec<ItemEffect>) -> ItemDef {
    ItemDef {
        id: id.to_string(),
        name: id.replace('_', " "),
        rarity,
        kind,
        effects,
    }
}

pub(crate) fn sample_content() -> Content {
    Content {
        cards: vec![
            card(
                "strike",
                Rarity::Common,
                CardKind::Attack,
                1,
                vec![CardEffect::Damage { amount: 6 }],
            ),
            card(
                "defend",
                Rarity::Common,
                CardKind::Skill,
                1,
                vec![CardEffect::Block { amount: 5 }],
            ),
            card(
                "venom_dart",
                Rarity::Uncommon,
                CardKind::Attack,
                1,
                vec![
                    CardEffect::Damage { amount: 3 },
                    CardEffect::ApplyEnemy {
                        status: StatusInstance::new(StatusKind::Poison, 3, 3),
                    },
                ],
            ),
            card(
                "second_breath",
                Rarity::Uncommon,
                CardKind::Skill,
                0,
                vec![CardEffect::Energy { amount: 1 }, CardEffect::Draw { count: 1 }],
            ),
            card(
                "meteor",
                Rarity::Rare,
                CardKind::Attack,
                3,
                vec![CardEffect::Damage { amount: 24 }],
            ),
            card(
                "purify",
                Rarity::Rare,
                CardKind::Skill,
                1,
                vec![CardEffect::Cleanse, CardEffect::Heal { amount: 5 }],
            ),
        ],
        enemies: vec![
            enemy("slime", EnemyTier::Basic, 30, 5, None),
            enemy("cultist", EnemyTier::Basic, 40, 6, None),
            EnemyDef {
                on_hit: Some(StatusInstance::new(StatusKind::Bleed, 2, 2)),
                ..enemy("brute", EnemyTier::Elite, 70, 10, None)
            },
            enemy("stone_golem", EnemyTier::Boss, 120, 12, Some(1)),
            enemy("ash_drake", EnemyTier::Boss, 150, 14, Some(2)),
            enemy("lich_king", EnemyTier::FinalBoss, 250, 18, None),
        ],
        items: vec![
            item(
                "healing_potion",
                Rarity::Common,
                ItemKind::Consumable,
                vec![ItemEffect::Heal { amount: 20 }],
            ),
            item(
                "fire_bomb",
                Rarity::Common,
                ItemKind::Consumable,
                vec![ItemEffect::DamageEnemy { amount: 15 }],
            ),
            item(
                "iron_ring",
                Rarity::Uncommon,
                ItemKind::Passive,
                vec![ItemEffect::BonusStrength { amount: 1 }],
            ),
            item(
                "thorn_mail",
                Rarity::Rare,
                ItemKind::Passive,
                vec![ItemEffect::BonusThorns { amount: 2 }],
            ),
        ],
        talents: vec![
            TalentDef {
                id: "vitality".to_string(),
                name: "Vitality".to_string(),
                cost: 1,
                prerequisites: Vec::new(),
                effects: vec![TalentEffect::MaxHealth { amount: 10 }],
            },
            TalentDef {
                id: "second_wind".to_string(),
                name: "Second Wind".to_string(),
                cost: 2,
                prerequisites: vec!["vitality".to_string()],
                effects: vec![TalentEffect::Revive { percent: 50 }],
            },
        ],
        events: vec![EventDef {
            id: "shrine".to_string(),
            title: "Forgotten Shrine".to_string(),
            options: vec![
                EventOption {
                    label: "Pray".to_string(),
                    gold_cost: 0,
                    outcomes: vec![EventOutcome::Heal { amount: 15 }],
                },
                EventOption {
                    label: "Donate".to_string(),
                    gold_cost: 50,
                    outcomes: vec![EventOutcome::MaxHealth { amount: 5 }],
                },
                EventOption {
                    label: "Desecrate".to_string(),
                    gold_cost: 0,
                    outcomes: vec![
                        EventOutcome::GainGold { amount: 60 },
                        EventOutcome::Damage { amount: 10 },
                    ],
                },
            ],
        }],
        blessings: vec![
            BlessingDef {
                id: "oak".to_string(),
                name: "Blessing of the Oak".to_string(),
                effects: vec![BlessingEffect::MaxHealth { amount: 15 }],
            },
            BlessingDef {
                id: "flame".to_string(),
                name: "Blessing of Flame".to_string(),
                effects: vec![BlessingEffect::Strength { amount: 1 }],
            },
            BlessingDef {
                id: "coin".to_string(),
                name: "Blessing of Coin".to_string(),
                effects: vec![BlessingEffect::Gold { amount: 75 }],
            },
        ],
        biomes: vec![
            "forest".to_string(),
            "caverns".to_string(),
            "ruins".to_string(),
        ],
    }
}

pub(crate) fn sample_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.run.starter_deck = ["strike"; 5]
        .into_iter()
        .chain(["defend"; 4])
        .map(str::to_string)
        .collect();
    config
}

pub(crate) fn sample_catalog() -> Arc<Catalog> {
    match Catalog::new(sample_config(), sample_content()) {
        Ok(catalog) => catalog,
        Err(err) => panic!("sample catalog is invalid: {err}"),
    }
}
