use deckclimb_core::{Event, RunPhase, RunState, StatusInstance};

pub fn print_state(run: &RunState) {
    println!("== State ==");
    println!(
        "Phase {} | Act {} Floor {} | Seed {}",
        phase_label(run.phase),
        run.current_act,
        run.current_floor,
        run.seed
    );
    println!(
        "Health {}/{} | Block {} | Energy {}/{} | Hand Size {} | Gold {}",
        run.health,
        run.max_health,
        run.player_block,
        run.energy,
        run.max_energy,
        run.hand_size,
        run.gold
    );
    if !run.player_statuses.is_empty() {
        println!("Statuses {}", statuses_label(&run.player_statuses));
    }
    if let Some(battle) = &run.battle {
        println!(
            "Enemy {} {}/{} | Block {} | Hits {}{}",
            battle.enemy.name,
            battle.enemy_health,
            battle.enemy_max_health,
            battle.enemy_block,
            battle.enemy.damage,
            if battle.is_boss { " | BOSS" } else { "" }
        );
        if !run.enemy_statuses.is_empty() {
            println!("Enemy Statuses {}", statuses_label(&run.enemy_statuses));
        }
    }
    if let Some(rewards) = &run.pending_rewards {
        println!(
            "Rewards: gold {} | cards [{}] | item {}",
            rewards.gold,
            rewards.card_options.join(", "),
            rewards.item.as_deref().unwrap_or("-")
        );
    }
    if let Some(event_id) = &run.event {
        if let Some(event) = run.catalog.content.event(event_id) {
            println!("Event: {}", event.title);
            for (idx, option) in event.options.iter().enumerate() {
                let cost = if option.gold_cost > 0 {
                    format!(" ({} gold)", option.gold_cost)
                } else {
                    String::new()
                };
                println!("  {idx}: {}{cost}", option.label);
            }
        }
    }
    for (idx, id) in run.offered_blessings.iter().enumerate() {
        let name = run
            .catalog
            .content
            .blessing(id)
            .map(|blessing| blessing.name.as_str())
            .unwrap_or(id.as_str());
        println!("  blessing {idx}: {name}");
    }
}

pub fn print_map(run: &RunState) {
    println!("== Map ==");
    if run.map.is_empty() {
        println!("(no map; use 'gen')");
        return;
    }
    for biome in &run.map {
        let marker = if biome.act == run.current_act { ">" } else { " " };
        println!("{marker} Act {} [{}]", biome.act, biome.theme);
        if biome.act != run.current_act {
            continue;
        }
        for floor in &biome.floors {
            let nodes: Vec<String> = floor
                .nodes
                .iter()
                .map(|node| {
                    let flag = if node.completed {
                        "x"
                    } else if node.available && node.floor == run.current_floor {
                        "*"
                    } else {
                        " "
                    };
                    format!("{flag}{}:{:?}", node.id, node.kind)
                })
                .collect();
            println!("    floor {:>2}  {}", floor.number, nodes.join("  "));
        }
    }
    println!("(* selectable, x completed)");
}

pub fn print_hand(run: &RunState) {
    println!("== Hand ==");
    let Some(battle) = &run.battle else {
        println!("(not in battle)");
        return;
    };
    for (idx, card_id) in battle.piles.hand.iter().enumerate() {
        match run.catalog.content.card(card_id) {
            Some(card) => println!("{idx}: {} [{}] cost {}", card.name, card.id, card.cost),
            None => println!("{idx}: {card_id}"),
        }
    }
    println!(
        "Draw {} | Discard {}",
        battle.piles.draw.len(),
        battle.piles.discard.len()
    );
}

pub fn print_deck(run: &RunState) {
    println!("== Deck ({}/{}) ==", run.selected_deck.len(), run.max_deck_size);
    for (idx, card_id) in run.selected_deck.iter().enumerate() {
        println!("{idx}: {card_id}");
    }
    let unlocked: Vec<&str> = run.unlocked_cards.iter().map(String::as_str).collect();
    println!("Unlocked: {}", unlocked.join(", "));
}

pub fn print_inventory(run: &RunState) {
    println!("== Inventory ==");
    let bag = &run.inventory.bag;
    println!("Bag {}/{}", bag.occupied(), bag.capacity());
    for (idx, item) in bag.iter() {
        println!("  {idx}: {} ({:?})", item.id, item.kind);
    }
    let belt = &run.inventory.tool_belt.consumables;
    println!("Belt {}/{}", belt.occupied(), belt.capacity());
    for (idx, item) in belt.iter() {
        println!("  {idx}: {}", item.id);
    }
    println!(
        "Passive: {}",
        run.inventory
            .passive()
            .map(|item| item.id.as_str())
            .unwrap_or("-")
    );
}

pub fn print_shop(run: &RunState) {
    println!("== Shop ==");
    let Some(shop) = &run.shop else {
        println!("(no shop open)");
        return;
    };
    for (idx, offer) in shop.cards.iter().enumerate() {
        println!("card {idx}: {} ({:?}) ${}", offer.card_id, offer.rarity, offer.price);
    }
    for (idx, offer) in shop.items.iter().enumerate() {
        println!("item {idx}: {} ({:?}) ${}", offer.item_id, offer.rarity, offer.price);
    }
    let removal = if shop.removal_used {
        "used".to_string()
    } else {
        format!("${}", shop.removal_price)
    };
    println!("Reroll ${} | Removal {removal}", shop.reroll_cost);
}

pub fn print_profile(run: &RunState) {
    let profile = &run.profile;
    println!("== Profile ==");
    println!(
        "Level {} | XP {}/{} | Talent Points {}",
        profile.level,
        profile.experience,
        profile.experience_to_next(&run.catalog.config.progression),
        profile.talent_points
    );
    let upgrades = &profile.upgrades;
    println!(
        "Upgrades: health {} | energy {} | hand {} | gold {}",
        upgrades.health_upgrades_purchased,
        upgrades.max_energy_upgrades_purchased,
        upgrades.hand_size_upgrades_purchased,
        upgrades.starting_gold_upgrades_purchased
    );
    let stats = &profile.lifetime_stats;
    println!(
        "Runs {} (won {}, lost {}) | Enemies {} | Bosses {} | Best Floor {}",
        stats.runs_started,
        stats.runs_won,
        stats.runs_lost,
        stats.enemies_defeated,
        stats.bosses_defeated,
        stats.highest_floor
    );
    println!(
        "Autosave {} every {}s",
        if profile.settings.autosave_enabled { "on" } else { "off" },
        profile.settings.autosave_interval_secs
    );
}

pub fn print_talents(run: &RunState) {
    println!("== Talents ==");
    for talent in &run.catalog.content.talents {
        let state = if run.profile.has_talent(&talent.id) {
            "owned"
        } else if run.profile.missing_prerequisites(talent).is_empty() {
            "open"
        } else {
            "locked"
        };
        let requires = if talent.prerequisites.is_empty() {
            String::new()
        } else {
            format!(" needs {}", talent.prerequisites.join(", "))
        };
        println!(
            "{} [{}] cost {} {state}{requires}",
            talent.name, talent.id, talent.cost
        );
    }
}

pub fn print_event(event: &Event) {
    match event {
        Event::Denied { action, reason } => println!("! {action} denied: {reason:?}"),
        Event::Clamped {
            field,
            requested,
            applied,
        } => println!("~ {field} clamped: {requested} -> {applied}"),
        Event::PlayerDamaged { amount, health } => println!("- you take {amount} ({health} left)"),
        Event::EnemyDamaged { amount, health } => println!("- enemy takes {amount} ({health} left)"),
        Event::RunEnded { outcome } => println!("== run over: {outcome:?} =="),
        other => println!("- {other:?}"),
    }
}

fn phase_label(phase: RunPhase) -> String {
    match phase {
        RunPhase::Idle => "idle".to_string(),
        RunPhase::MapNavigation => "map".to_string(),
        RunPhase::NodeResolution(resolution) => format!("{resolution:?}").to_lowercase(),
        RunPhase::RewardResolution => "rewards".to_string(),
        RunPhase::RunEnded(outcome) => format!("ended ({outcome:?})").to_lowercase(),
    }
}

fn statuses_label(statuses: &[StatusInstance]) -> String {
    statuses
        .iter()
        .map(|status| format!("{:?} x{} ({}t)", status.kind, status.stacks, status.duration))
        .collect::<Vec<_>>()
        .join(", ")
}
