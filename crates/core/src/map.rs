//! Branching map of acts, biomes and floors.
//!
//! Edges are explicit child-id lists that only point from floor `f` to floor
//! `f + 1`, so every generated map is a DAG. The last floor of every biome is
//! a single boss node without children.

use crate::{
    roll_weighted, Content, EnemyDef, EnemyTier, MapLayout, MapRule, RewardError, RngState,
    StatusInstance,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Enemy,
    Elite,
    Boss,
    Shop,
    Event,
    Mystery,
    God,
    Rest,
}

impl NodeKind {
    pub fn is_battle(self) -> bool {
        matches!(self, NodeKind::Enemy | NodeKind::Elite | NodeKind::Boss)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EnemyData {
    pub template_id: String,
    pub name: String,
    pub tier: EnemyTier,
    pub health: u32,
    pub damage: u32,
    pub on_hit: Option<StatusInstance>,
}

impl EnemyData {
    /// Binds a template, scaling health by `scaling_percent` per act after the first.
    pub fn from_template(def: &EnemyDef, act: u32, scaling_percent: u32) -> Self {
        let steps = u64::from(act.saturating_sub(1)) * u64::from(scaling_percent);
        let health = u64::from(def.health) + u64::from(def.health) * steps / 100;
        Self {
            template_id: def.id.clone(),
            name: def.name.clone(),
            tier: def.tier,
            health: health.min(u64::from(u32::MAX)) as u32,
            damage: def.damage,
            on_hit: def.on_hit,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub act: u32,
    pub floor: u32,
    #[serde(default)]
    pub enemy_data: Option<EnemyData>,
    pub children_ids: Vec<NodeId>,
    pub completed: bool,
    pub available: bool,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Floor {
    pub number: u32,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Biome {
    pub index: u32,
    pub act: u32,
    pub theme: String,
    pub floors: Vec<Floor>,
}

impl Biome {
    /// The act boss, when this biome is the one storing it (the first biome
    /// of each act holds the shared boss floor).
    pub fn boss(&self) -> Option<&Node> {
        self.floors
            .last()
            .and_then(|floor| floor.nodes.first())
            .filter(|node| node.kind == NodeKind::Boss)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map request has zero floors")]
    Empty,
    #[error("floors per act must be positive")]
    InvalidFloorsPerAct,
    #[error("biomes per act must be positive")]
    InvalidBiomeCount,
    #[error("fan-out range {min}..={max} is invalid")]
    InvalidFanOut { min: u32, max: u32 },
    #[error("no {0:?} enemies in content")]
    EmptyPool(EnemyTier),
    #[error("node weights for act {0} are empty or zero")]
    InvalidWeights(u32),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("malformed map: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapRequest {
    pub total_floors: u32,
    pub floors_per_act: u32,
    pub biomes_per_act: u32,
}

impl MapRequest {
    pub fn from_rule(rule: &MapRule) -> Self {
        Self {
            total_floors: rule.total_floors,
            floors_per_act: rule.floors_per_act,
            biomes_per_act: rule.biomes_per_act,
        }
    }
}

pub struct MapGenerator<'a> {
    rule: &'a MapRule,
    content: &'a Content,
}

impl<'a> MapGenerator<'a> {
    pub fn new(rule: &'a MapRule, content: &'a Content) -> Self {
        Self { rule, content }
    }

    pub fn generate(&self, request: MapRequest, rng: &mut RngState) -> Result<Vec<Biome>, MapError> {
        if request.total_floors == 0 {
            return Err(MapError::Empty);
        }
        if request.floors_per_act == 0 {
            return Err(MapError::InvalidFloorsPerAct);
        }
        if request.biomes_per_act == 0 {
            return Err(MapError::InvalidBiomeCount);
        }
        if self.rule.min_fan_out == 0 || self.rule.min_fan_out > self.rule.max_fan_out {
            return Err(MapError::InvalidFanOut {
                min: self.rule.min_fan_out,
                max: self.rule.max_fan_out,
            });
        }

        let acts = request.total_floors.div_ceil(request.floors_per_act);
        let mut next_id = 1u32;
        let mut biomes = Vec::new();
        for act in 1..=acts {
            let first_floor = (act - 1) * request.floors_per_act + 1;
            let floors_in_act = request
                .floors_per_act
                .min(request.total_floors - (first_floor - 1));
            let themes = self.pick_themes(request.biomes_per_act as usize, rng);
            let first_biome = biomes.len();
            for theme in themes {
                let index = biomes.len() as u32;
                let mut floors = Vec::with_capacity(floors_in_act as usize);
                for offset in 0..floors_in_act.saturating_sub(1) {
                    floors.push(self.build_floor(act, first_floor + offset, &mut next_id, rng)?);
                }
                self.link_floors(&mut floors, rng);
                biomes.push(Biome {
                    index,
                    act,
                    theme,
                    floors,
                });
            }

            // Every path of the act ends at the same boss.
            let boss_floor = self.build_boss_floor(
                act,
                first_floor + floors_in_act - 1,
                act == acts,
                &mut next_id,
            )?;
            let boss_ids: Vec<NodeId> = boss_floor.nodes.iter().map(|node| node.id).collect();
            for biome in &mut biomes[first_biome..] {
                if let Some(last) = biome.floors.last_mut() {
                    for node in &mut last.nodes {
                        node.children_ids = boss_ids.clone();
                    }
                }
            }
            biomes[first_biome].floors.push(boss_floor);
            if act == 1 {
                for biome in &mut biomes[first_biome..] {
                    if let Some(first) = biome.floors.first_mut() {
                        for node in &mut first.nodes {
                            node.available = true;
                        }
                    }
                }
            }
        }
        tracing::debug!(acts, nodes = node_count(&biomes), "map generated");
        Ok(biomes)
    }

    fn pick_themes(&self, count: usize, rng: &mut RngState) -> Vec<String> {
        let mut pool = self.content.biomes.clone();
        if pool.is_empty() {
            pool.push("wilds".to_string());
        }
        rng.shuffle(&mut pool);
        (0..count).map(|idx| pool[idx % pool.len()].clone()).collect()
    }

    fn build_floor(
        &self,
        act: u32,
        number: u32,
        next_id: &mut u32,
        rng: &mut RngState,
    ) -> Result<Floor, MapError> {
        let count = rng.range_inclusive(self.rule.min_fan_out, self.rule.max_fan_out);
        let weights = self.rule.weights_for_act(act);
        let mut nodes = Vec::with_capacity(count as usize);
        for slot in 0..count {
            let kind = roll_weighted(weights.iter().map(|w| (w.kind, w.weight)), rng).map_err(
                |err| match err {
                    RewardError::InvalidWeights => MapError::InvalidWeights(act),
                    other => MapError::Malformed(other.to_string()),
                },
            )?;
            let kind = if kind == NodeKind::Boss {
                NodeKind::Enemy
            } else {
                kind
            };
            let enemy_data = match kind {
                NodeKind::Enemy => Some(self.bind_enemy(EnemyTier::Basic, act, rng)?),
                NodeKind::Elite => Some(self.bind_enemy(EnemyTier::Elite, act, rng)?),
                _ => None,
            };
            nodes.push(Node {
                id: alloc_id(next_id),
                kind,
                act,
                floor: number,
                enemy_data,
                children_ids: Vec::new(),
                completed: false,
                available: false,
                position: Position {
                    x: (slot + 1) as f32 / (count + 1) as f32,
                    y: number as f32,
                },
            });
        }
        Ok(Floor { number, nodes })
    }

    fn build_boss_floor(
        &self,
        act: u32,
        number: u32,
        final_act: bool,
        next_id: &mut u32,
    ) -> Result<Floor, MapError> {
        let template = if final_act {
            self.content
                .final_boss()
                .ok_or(MapError::EmptyPool(EnemyTier::FinalBoss))?
        } else {
            self.content
                .boss_for_act(act)
                .ok_or(MapError::EmptyPool(EnemyTier::Boss))?
        };
        let boss = Node {
            id: alloc_id(next_id),
            kind: NodeKind::Boss,
            act,
            floor: number,
            enemy_data: Some(EnemyData::from_template(
                template,
                act,
                self.rule.enemy_health_scaling_percent,
            )),
            children_ids: Vec::new(),
            completed: false,
            available: false,
            position: Position {
                x: 0.5,
                y: number as f32,
            },
        };
        Ok(Floor {
            number,
            nodes: vec![boss],
        })
    }

    fn bind_enemy(&self, tier: EnemyTier, act: u32, rng: &mut RngState) -> Result<EnemyData, MapError> {
        let def = self
            .content
            .pick_enemy(tier, rng)
            .ok_or(MapError::EmptyPool(tier))?;
        Ok(EnemyData::from_template(
            def,
            act,
            self.rule.enemy_health_scaling_percent,
        ))
    }

    fn link_floors(&self, floors: &mut [Floor], rng: &mut RngState) {
        for idx in 1..floors.len() {
            let (upper, lower) = floors.split_at_mut(idx);
            let parents = &mut upper[idx - 1].nodes;
            let children: Vec<NodeId> = lower[0].nodes.iter().map(|node| node.id).collect();
            match self.rule.layout {
                MapLayout::FullyConnected => {
                    for parent in parents.iter_mut() {
                        parent.children_ids = children.clone();
                    }
                }
                MapLayout::Branching => link_branching(parents, &children, rng),
            }
        }
    }
}

fn alloc_id(next_id: &mut u32) -> NodeId {
    let id = NodeId(*next_id);
    *next_id = next_id.saturating_add(1);
    id
}

fn link_branching(parents: &mut [Node], children: &[NodeId], rng: &mut RngState) {
    let m = parents.len();
    let n = children.len();
    if m == 0 || n == 0 {
        return;
    }
    for (i, parent) in parents.iter_mut().enumerate() {
        let primary = i * n / m;
        let mut picks = vec![primary];
        if n > 1 && rng.chance_percent(50) {
            let neighbor = if primary + 1 < n { primary + 1 } else { primary - 1 };
            picks.push(neighbor);
        }
        parent.children_ids = picks.into_iter().map(|idx| children[idx]).collect();
    }
    for (j, child) in children.iter().enumerate() {
        let has_parent = parents
            .iter()
            .any(|parent| parent.children_ids.contains(child));
        if !has_parent {
            parents[j * m / n].children_ids.push(*child);
        }
    }
    for parent in parents.iter_mut() {
        parent.children_ids.sort();
        parent.children_ids.dedup();
    }
}

pub fn nodes(map: &[Biome]) -> impl Iterator<Item = &Node> {
    map.iter()
        .flat_map(|biome| biome.floors.iter())
        .flat_map(|floor| floor.nodes.iter())
}

pub fn node_count(map: &[Biome]) -> usize {
    nodes(map).count()
}

pub fn find_node(map: &[Biome], id: NodeId) -> Option<&Node> {
    nodes(map).find(|node| node.id == id)
}

pub fn find_node_mut(map: &mut [Biome], id: NodeId) -> Option<&mut Node> {
    map.iter_mut()
        .flat_map(|biome| biome.floors.iter_mut())
        .flat_map(|floor| floor.nodes.iter_mut())
        .find(|node| node.id == id)
}

pub fn biome_of(map: &[Biome], id: NodeId) -> Option<&Biome> {
    map.iter().find(|biome| {
        biome
            .floors
            .iter()
            .any(|floor| floor.nodes.iter().any(|node| node.id == id))
    })
}

/// The single boss every biome of `act` leads to.
pub fn act_boss(map: &[Biome], act: u32) -> Option<&Node> {
    nodes(map).find(|node| node.act == act && node.kind == NodeKind::Boss)
}

pub fn act_count(map: &[Biome]) -> u32 {
    map.iter().map(|biome| biome.act).max().unwrap_or(0)
}

pub fn last_floor(map: &[Biome]) -> u32 {
    nodes(map).map(|node| node.floor).max().unwrap_or(0)
}

/// Marks `id` completed and its children available; returns the children.
pub fn complete_node(map: &mut [Biome], id: NodeId) -> Result<Vec<NodeId>, MapError> {
    let node = find_node_mut(map, id).ok_or(MapError::UnknownNode(id))?;
    node.completed = true;
    let children = node.children_ids.clone();
    for child in &children {
        if let Some(child_node) = find_node_mut(map, *child) {
            child_node.available = true;
        }
    }
    Ok(children)
}

/// Makes the first floor of every biome in `act` available.
pub fn open_act(map: &mut [Biome], act: u32) -> Vec<NodeId> {
    let mut opened = Vec::new();
    for biome in map.iter_mut().filter(|biome| biome.act == act) {
        if let Some(first) = biome.floors.first_mut() {
            for node in &mut first.nodes {
                node.available = true;
                opened.push(node.id);
            }
        }
    }
    opened
}

/// Restricts `act` to the biome themed `theme`; returns the nodes closed off.
pub fn choose_biome(map: &mut [Biome], act: u32, theme: &str) -> Result<Vec<NodeId>, MapError> {
    if !map
        .iter()
        .any(|biome| biome.act == act && biome.theme == theme)
    {
        return Err(MapError::Malformed(format!(
            "act {act} has no biome themed {theme}"
        )));
    }
    let mut closed = Vec::new();
    for biome in map
        .iter_mut()
        .filter(|biome| biome.act == act && biome.theme != theme)
    {
        if let Some(first) = biome.floors.first_mut() {
            for node in &mut first.nodes {
                if node.available {
                    node.available = false;
                    closed.push(node.id);
                }
            }
        }
    }
    Ok(closed)
}

/// Checks acyclicity, reachability and the one-boss-per-act rule.
pub fn check_invariants(map: &[Biome]) -> Result<(), MapError> {
    let mut seen = BTreeSet::new();
    let floors: HashMap<NodeId, u32> = nodes(map).map(|node| (node.id, node.floor)).collect();
    for node in nodes(map) {
        if !seen.insert(node.id) {
            return Err(MapError::Malformed(format!("duplicate node {}", node.id)));
        }
        for child in &node.children_ids {
            match floors.get(child) {
                Some(&floor) if floor == node.floor + 1 => {}
                _ => {
                    return Err(MapError::Malformed(format!(
                        "edge {} -> {} does not descend one floor",
                        node.id, child
                    )))
                }
            }
        }
        if node.kind != NodeKind::Boss && node.children_ids.is_empty() {
            return Err(MapError::Malformed(format!("node {} has no children", node.id)));
        }
    }
    for act in 1..=act_count(map) {
        let bosses: Vec<&Node> = nodes(map)
            .filter(|node| node.act == act && node.kind == NodeKind::Boss)
            .collect();
        let last = nodes(map)
            .filter(|node| node.act == act)
            .map(|node| node.floor)
            .max();
        match bosses.as_slice() {
            [boss] if boss.children_ids.is_empty() && Some(boss.floor) == last => {}
            _ => {
                return Err(MapError::Malformed(format!(
                    "act {act} must end in exactly one childless boss, found {}",
                    bosses.len()
                )))
            }
        }
    }
    for biome in map {
        let mut reached: BTreeSet<NodeId> = BTreeSet::new();
        let mut queue: VecDeque<NodeId> = biome
            .floors
            .first()
            .map(|floor| floor.nodes.iter().map(|node| node.id).collect())
            .unwrap_or_default();
        while let Some(id) = queue.pop_front() {
            if !reached.insert(id) {
                continue;
            }
            if let Some(node) = find_node(map, id) {
                queue.extend(node.children_ids.iter().copied());
            }
        }
        for node in biome.floors.iter().flat_map(|floor| floor.nodes.iter()) {
            if !reached.contains(&node.id) {
                return Err(MapError::Malformed(format!("node {} is unreachable", node.id)));
            }
        }
        if !biome.floors.is_empty() {
            let boss = act_boss(map, biome.act);
            if !boss.is_some_and(|boss| reached.contains(&boss.id)) {
                return Err(MapError::Malformed(format!(
                    "biome {} does not lead to its act boss",
                    biome.index
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_content;

    fn generate(rule: &MapRule, seed: u64) -> Vec<Biome> {
        let content = sample_content();
        let mut rng = RngState::from_seed(seed);
        MapGenerator::new(rule, &content)
            .generate(MapRequest::from_rule(rule), &mut rng)
            .expect("generate")
    }

    #[test]
    fn twenty_five_floors_make_five_acts_with_one_boss_each() {
        let rule = MapRule::default();
        let map = generate(&rule, 7);
        assert_eq!(act_count(&map), 5);
        assert_eq!(map.len(), 5);
        for biome in &map {
            let bosses: Vec<&Node> = biome
                .floors
                .iter()
                .flat_map(|floor| floor.nodes.iter())
                .filter(|node| node.kind == NodeKind::Boss)
                .collect();
            assert_eq!(bosses.len(), 1);
            assert!(bosses[0].children_ids.is_empty());
            assert_eq!(biome.floors.len(), 5);
        }
        assert_eq!(last_floor(&map), 25);
        check_invariants(&map).expect("invariants");
    }

    #[test]
    fn only_first_floor_starts_available() {
        let map = generate(&MapRule::default(), 21);
        for node in nodes(&map) {
            assert_eq!(node.available, node.floor == 1, "node {}", node.id);
        }
    }

    #[test]
    fn completing_a_node_opens_children_only() {
        let mut map = generate(&MapRule::default(), 5);
        let first_floor: Vec<NodeId> = map[0].floors[0].nodes.iter().map(|n| n.id).collect();
        let target = first_floor[0];
        let children = complete_node(&mut map, target).expect("complete");
        assert!(!children.is_empty());
        for child in &children {
            assert!(find_node(&map, *child).expect("child").available);
        }
        for sibling in &first_floor[1..] {
            let node = find_node(&map, *sibling).expect("sibling");
            assert!(node.available);
            assert!(!node.completed);
        }
    }

    #[test]
    fn act_one_never_rolls_elites_and_final_act_binds_final_boss() {
        let map = generate(&MapRule::default(), 99);
        for node in nodes(&map).filter(|node| node.act == 1) {
            assert_ne!(node.kind, NodeKind::Elite);
        }
        let final_boss = act_boss(&map, act_count(&map)).expect("boss");
        assert_eq!(
            final_boss.enemy_data.as_ref().map(|enemy| enemy.tier),
            Some(EnemyTier::FinalBoss)
        );
    }

    #[test]
    fn fully_connected_layout_links_every_pair() {
        let rule = MapRule {
            layout: MapLayout::FullyConnected,
            ..MapRule::default()
        };
        let map = generate(&rule, 3);
        let biome = &map[0];
        for pair in biome.floors.windows(2) {
            let lower: Vec<NodeId> = pair[1].nodes.iter().map(|node| node.id).collect();
            for node in &pair[0].nodes {
                assert_eq!(node.children_ids, lower);
            }
        }
    }

    #[test]
    fn zero_floors_fail_fast() {
        let rule = MapRule {
            total_floors: 0,
            ..MapRule::default()
        };
        let content = sample_content();
        let mut rng = RngState::from_seed(1);
        let result = MapGenerator::new(&rule, &content).generate(MapRequest::from_rule(&rule), &mut rng);
        assert_eq!(result, Err(MapError::Empty));
    }

    #[test]
    fn partial_last_act_still_ends_in_final_boss() {
        let rule = MapRule {
            total_floors: 7,
            ..MapRule::default()
        };
        let map = generate(&rule, 4);
        assert_eq!(map.len(), 2);
        assert_eq!(map[1].floors.len(), 2);
        assert_eq!(last_floor(&map), 7);
        check_invariants(&map).expect("invariants");
    }

    #[test]
    fn biomes_of_an_act_share_one_boss() {
        let rule = MapRule {
            biomes_per_act: 2,
            ..MapRule::default()
        };
        let map = generate(&rule, 1);
        assert_eq!(map.len(), 10);
        check_invariants(&map).expect("invariants");
        for act in 1..=act_count(&map) {
            let bosses: Vec<&Node> = nodes(&map)
                .filter(|node| node.act == act && node.kind == NodeKind::Boss)
                .collect();
            assert_eq!(bosses.len(), 1, "act {act}");
            let boss = bosses[0].id;
            for biome in map.iter().filter(|biome| biome.act == act) {
                let tail = biome
                    .floors
                    .iter()
                    .rev()
                    .find(|floor| floor.nodes.iter().all(|node| node.kind != NodeKind::Boss))
                    .expect("path floors");
                for node in &tail.nodes {
                    assert_eq!(node.children_ids, vec![boss]);
                }
            }
        }
        let finals = nodes(&map)
            .filter(|node| {
                node.enemy_data.as_ref().map(|enemy| enemy.tier) == Some(EnemyTier::FinalBoss)
            })
            .count();
        assert_eq!(finals, 1);
    }

    #[test]
    fn split_boss_floors_fail_the_invariants() {
        let rule = MapRule {
            biomes_per_act: 2,
            ..MapRule::default()
        };
        let mut map = generate(&rule, 2);
        let mut twin = map[0].floors.last().cloned().expect("boss floor");
        for node in &mut twin.nodes {
            node.id = NodeId(10_000);
        }
        if let Some(tail) = map[1].floors.last_mut() {
            for node in &mut tail.nodes {
                node.children_ids = vec![NodeId(10_000)];
            }
        }
        map[1].floors.push(twin);
        assert!(check_invariants(&map).is_err());
    }

    #[test]
    fn later_acts_scale_enemy_health() {
        let content = sample_content();
        let def = &content.enemies[0];
        let scaled = EnemyData::from_template(def, 3, 20);
        assert_eq!(scaled.health, def.health + def.health * 40 / 100);
    }
}
