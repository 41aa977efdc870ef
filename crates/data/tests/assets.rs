use deckclimb_core::{
    act_count, check_invariants, nodes, reduce, Action, EventBus, MapGenerator, MapRequest, NodeKind, Profile,
    RngState, RunPhase, RunState,
};
use deckclimb_data::{load_catalog, load_content, load_game_config, ContentSummary};
use std::fs;
use std::path::{Path, PathBuf};

fn assets_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("assets")
}

fn copy_assets(to: &Path) {
    for sub in ["config", "content"] {
        fs::create_dir_all(to.join(sub)).expect("mkdir");
        for entry in fs::read_dir(assets_root().join(sub)).expect("read assets") {
            let entry = entry.expect("entry");
            fs::copy(entry.path(), to.join(sub).join(entry.file_name())).expect("copy");
        }
    }
}

#[test]
fn shipped_assets_load_and_validate() {
    let catalog = load_catalog(&assets_root()).expect("load catalog");
    let summary = ContentSummary::from_content(&catalog.content);
    assert!(summary.cards >= 10);
    assert_eq!(summary.bosses, 5);
    assert!(summary.events > 0);
    for card in &catalog.config.run.starter_deck {
        assert!(catalog.content.card(card).is_some(), "starter card {card}");
    }
}

#[test]
fn shipped_map_rule_builds_five_acts() {
    let config = load_game_config(&assets_root()).expect("config");
    let content = load_content(&assets_root()).expect("content");
    let generator = MapGenerator::new(&config.map, &content);
    for seed in 0..20 {
        let mut rng = RngState::from_seed(seed);
        let map = generator
            .generate(MapRequest::from_rule(&config.map), &mut rng)
            .expect("generate");
        check_invariants(&map).expect("invariants");
        let bosses = nodes(&map).filter(|node| node.kind == NodeKind::Boss).count();
        assert_eq!(bosses, act_count(&map) as usize);
        assert_eq!(act_count(&map), 5);
        assert_eq!(map.len(), 10);
        assert!(nodes(&map)
            .filter(|node| node.available)
            .all(|node| node.floor == 1));
    }
}

#[test]
fn a_run_starts_on_shipped_assets() {
    let catalog = load_catalog(&assets_root()).expect("catalog");
    let state = RunState::new(catalog, Profile::new(), 99);
    let mut events = EventBus::default();
    let state = reduce(&state, &Action::StartNewRun { seed: Some(99) }, &mut events);
    assert_eq!(events.last_denial(), None);
    assert_eq!(state.phase, RunPhase::MapNavigation);
    assert_eq!(state.selected_deck.len(), 10);
    assert!(state.selected_path.is_none());
}

#[test]
fn missing_table_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_assets(dir.path());
    fs::remove_file(dir.path().join("content").join("items.json")).expect("remove");
    let err = load_content(dir.path()).expect_err("items are required");
    assert!(format!("{err:#}").contains("items.json"));
}

#[test]
fn optional_tables_default_to_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_assets(dir.path());
    fs::remove_file(dir.path().join("content").join("talents.json")).expect("remove");
    fs::remove_file(dir.path().join("config").join("statuses.json")).expect("remove");
    let content = load_content(dir.path()).expect("content");
    assert!(content.talents.is_empty());
    load_game_config(dir.path()).expect("config");
}

#[test]
fn unknown_starter_card_fails_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_assets(dir.path());
    let path = dir.path().join("config").join("run.json");
    let raw = fs::read_to_string(&path).expect("read");
    fs::write(&path, raw.replace("quick_jab", "missing_card")).expect("write");
    let err = load_catalog(dir.path()).expect_err("unknown card");
    assert!(format!("{err:#}").contains("missing_card"));
}

#[test]
fn talent_cycles_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    copy_assets(dir.path());
    let talents = r#"[
        { "id": "a", "name": "A", "cost": 1, "prerequisites": ["b"], "effects": [] },
        { "id": "b", "name": "B", "cost": 1, "prerequisites": ["a"], "effects": [] }
    ]"#;
    fs::write(dir.path().join("content").join("talents.json"), talents).expect("write");
    let err = load_content(dir.path()).expect_err("cycle");
    assert!(err.to_string().contains("cycle"));
}
