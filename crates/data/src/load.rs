use crate::schema::{
    BlessingDef, CardDef, Content, EnemyDef, EventDef, GameConfig, ItemDef, MapRule,
    ProgressionRule, RewardRule, RunRule, ShopRule, StatusRule, TalentDef, UpgradeRule,
};
use anyhow::{bail, Context};
use deckclimb_core::Catalog;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const CONFIG_DIR: &str = "config";
const CONTENT_DIR: &str = "content";

/// Reads the rule tables under `<dir>/config`.
///
/// `statuses.json` and `progression.json` fall back to defaults when absent.
pub fn load_game_config(dir: &Path) -> anyhow::Result<GameConfig> {
    let dir = dir.join(CONFIG_DIR);
    let run: RunRule = load_json(dir.join("run.json"))?;
    let map: MapRule = load_json(dir.join("map.json"))?;
    let rewards: RewardRule = load_json(dir.join("rewards.json"))?;
    let shop: ShopRule = load_json(dir.join("shop.json"))?;
    let upgrades: UpgradeRule = load_json(dir.join("upgrades.json"))?;
    let statuses: StatusRule = load_json_or_default(dir.join("statuses.json"))?;
    let progression: ProgressionRule = load_json_or_default(dir.join("progression.json"))?;

    Ok(GameConfig {
        run,
        map,
        rewards,
        shop,
        upgrades,
        statuses,
        progression,
    })
}

/// Reads every content table under `<dir>/content`.
pub fn load_content(dir: &Path) -> anyhow::Result<Content> {
    let base = dir.join(CONTENT_DIR);
    let cards: Vec<CardDef> = load_json(base.join("cards.json"))?;
    let enemies: Vec<EnemyDef> = load_json(base.join("enemies.json"))?;
    let items: Vec<ItemDef> = load_json(base.join("items.json"))?;
    let talents: Vec<TalentDef> = load_json_or_default(base.join("talents.json"))?;
    let events: Vec<EventDef> = load_json_or_default(base.join("events.json"))?;
    let blessings: Vec<BlessingDef> = load_json_or_default(base.join("blessings.json"))?;
    let biomes: Vec<String> = load_json_or_default(base.join("biomes.json"))?;

    check_unique("card", cards.iter().map(|card| card.id.as_str()))?;
    check_unique("enemy", enemies.iter().map(|enemy| enemy.id.as_str()))?;
    check_unique("item", items.iter().map(|item| item.id.as_str()))?;
    check_unique("talent", talents.iter().map(|talent| talent.id.as_str()))?;
    check_unique("event", events.iter().map(|event| event.id.as_str()))?;
    check_unique("blessing", blessings.iter().map(|blessing| blessing.id.as_str()))?;
    check_unique("biome", biomes.iter().map(String::as_str))?;

    let requires: HashMap<&str, &[String]> = talents
        .iter()
        .map(|talent| (talent.id.as_str(), talent.prerequisites.as_slice()))
        .collect();
    if let Some(cycle) = detect_cycle_ids(talents.iter().map(|talent| talent.id.as_str()), |id| {
        requires.get(id).map(|deps| deps.to_vec()).unwrap_or_default()
    }) {
        bail!("talent prerequisites form a cycle: {}", cycle.join(" -> "));
    }

    let content = Content {
        cards,
        enemies,
        items,
        talents,
        events,
        blessings,
        biomes,
    };
    tracing::debug!(
        cards = content.cards.len(),
        enemies = content.enemies.len(),
        items = content.items.len(),
        "content loaded"
    );
    Ok(content)
}

/// Loads config and content from `dir` and cross-validates them.
pub fn load_catalog(dir: &Path) -> anyhow::Result<Arc<Catalog>> {
    let config = load_game_config(dir)?;
    let content = load_content(dir)?;
    Catalog::new(config, content).with_context(|| format!("validate assets in {}", dir.display()))
}

fn check_unique<'a>(table: &str, ids: impl Iterator<Item = &'a str>) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            bail!("{table} id cannot be empty");
        }
        if !seen.insert(id) {
            bail!("duplicate {table} {id}");
        }
    }
    Ok(())
}

fn detect_cycle_ids<'a, F>(
    ids: impl Iterator<Item = &'a str>,
    mut deps_for: F,
) -> Option<Vec<String>>
where
    F: FnMut(&str) -> Vec<String>,
{
    fn visit<F>(
        id: &str,
        deps_for: &mut F,
        visiting: &mut Vec<String>,
        visited: &mut HashSet<String>,
    ) -> Option<Vec<String>>
    where
        F: FnMut(&str) -> Vec<String>,
    {
        if visited.contains(id) {
            return None;
        }
        if let Some(index) = visiting.iter().position(|value| value == id) {
            let mut cycle = visiting[index..].to_vec();
            cycle.push(id.to_string());
            return Some(cycle);
        }
        visiting.push(id.to_string());
        for dep in deps_for(id) {
            if let Some(cycle) = visit(&dep, deps_for, visiting, visited) {
                return Some(cycle);
            }
        }
        let _ = visiting.pop();
        visited.insert(id.to_string());
        None
    }

    let mut visiting = Vec::new();
    let mut visited = HashSet::new();
    for id in ids {
        if let Some(cycle) = visit(id, &mut deps_for, &mut visiting, &mut visited) {
            return Some(cycle);
        }
    }
    None
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    if path.exists() {
        load_json(path)
    } else {
        Ok(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_detection_reports_the_loop() {
        let deps: HashMap<&str, Vec<String>> = HashMap::from([
            ("a", vec!["b".to_string()]),
            ("b", vec!["c".to_string()]),
            ("c", vec!["a".to_string()]),
        ]);
        let cycle = detect_cycle_ids(["a", "b", "c"].into_iter(), |id| {
            deps.get(id).cloned().unwrap_or_default()
        })
        .expect("cycle");
        assert_eq!(cycle, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn chains_without_loops_pass() {
        let cycle = detect_cycle_ids(["a", "b"].into_iter(), |id| match id {
            "b" => vec!["a".to_string()],
            _ => Vec::new(),
        });
        assert!(cycle.is_none());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = check_unique("card", ["strike", "defend", "strike"].into_iter())
            .expect_err("duplicate");
        assert!(err.to_string().contains("duplicate card strike"));
    }
}
