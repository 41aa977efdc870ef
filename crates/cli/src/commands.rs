use deckclimb_core::{Action, NodeId, StatusInstance, StatusKind};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    State,
    Map,
    Hand,
    Deck,
    Inventory,
    Shop,
    Profile,
    Talents,
    Save,
    Load,
    /// Select and confirm in one step.
    Enter(NodeId),
    Dispatch(Action),
}

const UPGRADES: &[&str] = &["health", "energy", "hand", "gold"];

pub const HELP: &str = "\
views:     state | map | hand | deck | inv | shop | profile | talents
run:       new [seed] | gen | path <theme> | go <node> | select <node> | confirm | end-run <win|lose> | reset
battle:    fight | play <hand#> | end | draw <n> | status <player|enemy> <kind> <stacks> <turns>
rewards:   gold | card <id> | skip | item | done
shop:      buy <card|item> <#> | reroll | remove <deck#> | leave
nodes:     option <#> | bless <#> | rest
items:     equip <bag#> | unequip <belt#> | passive <bag#> | unpassive | discard <bag#> | use <belt#>
deck:      unlock <card> | add <card> | drop <deck#>
profile:   upgrade <health|energy|hand|gold> | talent <id> | reset-talents | xp <n>
files:     save | load | quit
Any line starting with '{' is decoded as a raw action, e.g. {\"type\":\"ADD_GOLD\",\"amount\":50}";

pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if input.starts_with('{') {
        return serde_json::from_str::<Action>(input)
            .map(Command::Dispatch)
            .map_err(|err| format!("bad action json: {err}"));
    }
    let mut parts = input.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    let action = match cmd {
        "help" | "h" | "?" => return Ok(Command::Help),
        "quit" | "exit" | "q" => return Ok(Command::Quit),
        "state" | "s" => return Ok(Command::State),
        "map" | "m" => return Ok(Command::Map),
        "hand" => return Ok(Command::Hand),
        "deck" => return Ok(Command::Deck),
        "inv" | "inventory" => return Ok(Command::Inventory),
        "shop" => return Ok(Command::Shop),
        "profile" => return Ok(Command::Profile),
        "talents" => return Ok(Command::Talents),
        "save" => return Ok(Command::Save),
        "load" => return Ok(Command::Load),
        "go" => return Ok(Command::Enter(NodeId(number(&args, 0, "node")?))),

        "new" => Action::StartNewRun {
            seed: args.first().map(|raw| parse(raw, "seed")).transpose()?,
        },
        "end-run" => Action::EndRun {
            victory: match args.first().copied() {
                Some("win") => true,
                Some("lose") => false,
                _ => return Err("usage: end-run <win|lose>".to_string()),
            },
        },
        "reset" => Action::ResetForNewGame,
        "gen" => Action::GenerateMap,
        "path" => Action::SelectPath {
            path_theme: word(&args, 0, "theme")?,
        },
        "select" => Action::SelectNode {
            node_id: NodeId(number(&args, 0, "node")?),
        },
        "confirm" => Action::ConfirmNode,

        "fight" => Action::StartBattle,
        "play" => Action::PlayCard {
            hand_index: number(&args, 0, "hand index")?,
        },
        "end" => Action::EndTurn,
        "draw" => Action::DrawCards {
            count: number(&args, 0, "count")?,
        },
        "status" => status_action(&args)?,

        "gold" => Action::ClaimGoldReward,
        "card" => Action::ChooseCardReward {
            card_id: word(&args, 0, "card")?,
        },
        "skip" => Action::SkipCardReward,
        "item" => Action::ClaimItemReward,
        "done" => Action::FinishRewards,

        "buy" => match args.first().copied() {
            Some("card") => Action::BuyShopCard {
                index: number(&args, 1, "offer")?,
            },
            Some("item") => Action::BuyShopItem {
                index: number(&args, 1, "offer")?,
            },
            _ => return Err("usage: buy <card|item> <#>".to_string()),
        },
        "reroll" => Action::RerollShop,
        "remove" => Action::RemoveCardAtShop {
            deck_index: number(&args, 0, "deck index")?,
        },
        "leave" => Action::LeaveShop,

        "option" => Action::ResolveEvent {
            option_index: number(&args, 0, "option")?,
        },
        "bless" => Action::ChooseBlessing {
            index: number(&args, 0, "blessing")?,
        },
        "rest" => Action::Rest,

        "equip" => Action::EquipConsumable {
            bag_slot: number(&args, 0, "bag slot")?,
        },
        "unequip" => Action::UnequipConsumable {
            belt_slot: number(&args, 0, "belt slot")?,
        },
        "passive" => Action::EquipPassive {
            bag_slot: number(&args, 0, "bag slot")?,
        },
        "unpassive" => Action::UnequipPassive,
        "discard" => Action::DiscardBagItem {
            slot: number(&args, 0, "bag slot")?,
        },
        "use" => Action::UseConsumable {
            belt_slot: number(&args, 0, "belt slot")?,
        },

        "unlock" => Action::UnlockCard {
            card_id: word(&args, 0, "card")?,
        },
        "add" => Action::AddCardToDeck {
            card_id: word(&args, 0, "card")?,
        },
        "drop" => Action::RemoveCardFromDeck {
            index: number(&args, 0, "deck index")?,
        },

        "upgrade" => match args.first().copied() {
            Some("health") => Action::UpgradeHealth,
            Some("energy") => Action::UpgradeMaxEnergy,
            Some("hand") => Action::UpgradeHandSize,
            Some("gold") => Action::UpgradeStartingGold,
            _ => return Err(format!("usage: upgrade <{}>", UPGRADES.join("|"))),
        },
        "talent" => Action::UnlockTalent {
            talent_id: word(&args, 0, "talent")?,
        },
        "reset-talents" => Action::ResetTalents,
        "xp" => Action::GainExperience {
            amount: number(&args, 0, "amount")?,
        },
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };
    Ok(Command::Dispatch(action))
}

fn status_action(args: &[&str]) -> Result<Action, String> {
    let kind: StatusKind = serde_json::from_value(serde_json::Value::String(word(args, 1, "status")?))
        .map_err(|_| format!("unknown status: {}", args[1]))?;
    let status = StatusInstance::new(kind, number(args, 2, "stacks")?, number(args, 3, "turns")?);
    match args.first().copied() {
        Some("player") => Ok(Action::ApplyStatusToPlayer { status }),
        Some("enemy") => Ok(Action::ApplyStatusToEnemy { status }),
        _ => Err("usage: status <player|enemy> <kind> <stacks> <turns>".to_string()),
    }
}

fn word(args: &[&str], index: usize, what: &str) -> Result<String, String> {
    args.get(index)
        .map(|value| value.to_string())
        .ok_or_else(|| format!("missing {what}"))
}

fn number<T: std::str::FromStr>(args: &[&str], index: usize, what: &str) -> Result<T, String> {
    let raw = args.get(index).ok_or_else(|| format!("missing {what}"))?;
    parse(raw, what)
}

fn parse<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("invalid {what}: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_map_to_actions() {
        assert_eq!(
            parse_command("play 2"),
            Ok(Command::Dispatch(Action::PlayCard { hand_index: 2 }))
        );
        assert_eq!(
            parse_command("buy item 0"),
            Ok(Command::Dispatch(Action::BuyShopItem { index: 0 }))
        );
        assert_eq!(
            parse_command("new 7"),
            Ok(Command::Dispatch(Action::StartNewRun { seed: Some(7) }))
        );
        assert_eq!(parse_command("go 12"), Ok(Command::Enter(NodeId(12))));
        assert_eq!(parse_command("  s "), Ok(Command::State));
    }

    #[test]
    fn raw_json_is_decoded_as_an_action() {
        assert_eq!(
            parse_command(r#"{"type":"ADD_GOLD","amount":50}"#),
            Ok(Command::Dispatch(Action::AddGold { amount: 50 }))
        );
        assert_eq!(
            parse_command(r#"{"type":"NOT_A_THING"}"#),
            Ok(Command::Dispatch(Action::Unknown))
        );
    }

    #[test]
    fn status_command_builds_an_instance() {
        let parsed = parse_command("status enemy poison 3 2").expect("parse");
        assert_eq!(
            parsed,
            Command::Dispatch(Action::ApplyStatusToEnemy {
                status: StatusInstance::new(StatusKind::Poison, 3, 2),
            })
        );
        assert!(parse_command("status enemy frostbite 1 1").is_err());
    }

    #[test]
    fn bad_input_explains_itself() {
        assert_eq!(parse_command("play"), Err("missing hand index".to_string()));
        assert_eq!(parse_command("play x"), Err("invalid hand index: x".to_string()));
        assert!(parse_command("upgrade luck").is_err());
        assert!(parse_command("dance").is_err());
    }
}
