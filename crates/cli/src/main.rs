mod commands;
mod view;

use anyhow::Context;
use commands::{parse_command, Command, HELP};
use deckclimb_core::{Action, EventBus, Profile, RunState};
use deckclimb_data::{load_catalog, ContentSummary};
use deckclimb_save::{Autosaver, SaveManager, SaveSlot};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_RUN_SEED: u64 = 0xC0FFEE;

#[derive(Debug, Clone)]
struct CliOptions {
    seed: u64,
    slot: u8,
    assets: PathBuf,
    saves: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        seed: std::env::var("DECKCLIMB_SEED")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_RUN_SEED),
        slot: 1,
        assets: PathBuf::from("assets"),
        saves: None,
        script: None,
    };
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        match (args[idx].as_str(), value) {
            ("--seed", Some(value)) => {
                if let Ok(seed) = value.parse() {
                    options.seed = seed;
                }
                idx += 1;
            }
            ("--slot", Some(value)) => {
                if let Ok(slot) = value.parse() {
                    options.slot = slot;
                }
                idx += 1;
            }
            ("--assets", Some(value)) => {
                options.assets = PathBuf::from(value);
                idx += 1;
            }
            ("--saves", Some(value)) => {
                options.saves = Some(PathBuf::from(value));
                idx += 1;
            }
            ("--script", Some(value)) => {
                options.script = Some(PathBuf::from(value));
                idx += 1;
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if let Err(err) = run(options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let catalog = load_catalog(&options.assets)?;
    let summary = ContentSummary::from_content(&catalog.content);
    println!(
        "loaded {} cards, {} enemies ({} bosses), {} items, {} talents, {} events",
        summary.cards, summary.enemies, summary.bosses, summary.items, summary.talents, summary.events
    );

    let slot = SaveSlot::new(options.slot)?;
    let saves = options
        .saves
        .or_else(SaveManager::default_dir)
        .context("no save directory; pass --saves or set HOME")?;
    let mut session = Session {
        run: RunState::new(catalog, Profile::new(), options.seed),
        manager: SaveManager::new(saves),
        slot,
        autosaver: None,
    };
    session.load()?;
    session.sync_autosave();

    match &options.script {
        Some(path) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("read script {}", path.display()))?;
            for line in body.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                println!("> {line}");
                if !session.handle(line)? {
                    break;
                }
            }
        }
        None => {
            println!("{HELP}");
            let stdin = io::stdin();
            let mut lines = stdin.lock().lines();
            loop {
                print!("{}> ", session.prompt());
                io::stdout().flush()?;
                let Some(line) = lines.next() else {
                    break;
                };
                if !session.handle(&line?)? {
                    break;
                }
            }
        }
    }
    session.shutdown()
}

struct Session {
    run: RunState,
    manager: SaveManager,
    slot: SaveSlot,
    autosaver: Option<(Autosaver, u64)>,
}

impl Session {
    fn prompt(&self) -> String {
        format!(
            "[act {} floor {} | hp {}/{} | gold {}]",
            self.run.current_act,
            self.run.current_floor,
            self.run.health,
            self.run.max_health,
            self.run.gold
        )
    }

    /// Returns `false` once the player asks to quit.
    fn handle(&mut self, line: &str) -> anyhow::Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                return Ok(true);
            }
        };
        match command {
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
            Command::State => view::print_state(&self.run),
            Command::Map => view::print_map(&self.run),
            Command::Hand => view::print_hand(&self.run),
            Command::Deck => view::print_deck(&self.run),
            Command::Inventory => view::print_inventory(&self.run),
            Command::Shop => view::print_shop(&self.run),
            Command::Profile => view::print_profile(&self.run),
            Command::Talents => view::print_talents(&self.run),
            Command::Save => {
                if let Err(err) = self.save() {
                    tracing::warn!(slot = %self.slot, error = %format!("{err:#}"), "manual save failed");
                    println!("save failed: {err:#}");
                }
            }
            Command::Load => {
                if let Err(err) = self.load() {
                    tracing::warn!(slot = %self.slot, error = %format!("{err:#}"), "manual load failed");
                    println!("load failed: {err:#}");
                }
            }
            Command::Enter(node_id) => {
                if self.dispatch(&Action::SelectNode { node_id }) {
                    self.dispatch(&Action::ConfirmNode);
                }
            }
            Command::Dispatch(action) => {
                self.dispatch(&action);
            }
        }
        Ok(true)
    }

    /// Applies one action, prints its events and reports whether it went through.
    fn dispatch(&mut self, action: &Action) -> bool {
        let mut events = EventBus::default();
        self.run.dispatch(action, &mut events);
        let accepted = events.last_denial().is_none();
        for event in events.drain() {
            view::print_event(&event);
        }
        self.sync_autosave();
        accepted
    }

    /// Profile with the live run folded in, as it would be written to disk.
    fn persistable_profile(&self) -> Profile {
        let mut profile = self.run.profile.clone();
        profile.current_run = self.run.phase.in_run().then(|| self.run.snapshot());
        profile
    }

    fn sync_autosave(&mut self) {
        let settings = &self.run.profile.settings;
        let wanted = settings
            .autosave_enabled
            .then_some(settings.autosave_interval_secs.max(1));
        let current = self.autosaver.as_ref().map(|(_, interval)| *interval);
        if wanted != current {
            if let Some((mut saver, _)) = self.autosaver.take() {
                saver.stop();
            }
            if let Some(interval) = wanted {
                let saver = Autosaver::spawn(
                    self.manager.clone(),
                    self.slot,
                    Duration::from_secs(interval),
                );
                self.autosaver = Some((saver, interval));
            }
        }
        if let Some((saver, _)) = &self.autosaver {
            saver.submit(&self.persistable_profile());
        }
    }

    fn save(&mut self) -> anyhow::Result<()> {
        self.dispatch(&Action::SaveProfile);
        self.manager
            .save(self.slot, &self.run.profile)
            .with_context(|| format!("save slot {}", self.slot))?;
        let path = self.manager.path(self.slot);
        tracing::info!(slot = %self.slot, path = %path.display(), "profile saved");
        println!("saved to {}", path.display());
        Ok(())
    }

    fn load(&mut self) -> anyhow::Result<()> {
        let loaded = self
            .manager
            .load(self.slot)
            .with_context(|| format!("load slot {}", self.slot))?;
        match loaded {
            Some(profile) => {
                let resumed = profile.current_run.is_some();
                self.dispatch(&Action::LoadProfile {
                    profile: Box::new(profile),
                });
                tracing::info!(slot = %self.slot, resumed, "profile loaded");
            }
            None => {
                tracing::info!(slot = %self.slot, "save slot empty");
                println!("slot {} is empty; starting a fresh profile", self.slot);
            }
        }
        Ok(())
    }

    fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some((mut saver, _)) = self.autosaver.take() {
            saver.stop();
        }
        let profile = self.persistable_profile();
        if let Err(err) = self.manager.save(self.slot, &profile) {
            tracing::warn!(slot = %self.slot, error = %err, "final save failed");
            return Err(err).with_context(|| format!("save slot {}", self.slot));
        }
        let path = self.manager.path(self.slot);
        tracing::info!(slot = %self.slot, in_run = profile.current_run.is_some(), "profile saved on exit");
        println!("saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn flags_override_defaults() {
        let options = parse_cli_options(&args(&[
            "--seed", "9", "--slot", "2", "--assets", "data", "--saves", "/tmp/s",
        ]));
        assert_eq!(options.seed, 9);
        assert_eq!(options.slot, 2);
        assert_eq!(options.assets, PathBuf::from("data"));
        assert_eq!(options.saves, Some(PathBuf::from("/tmp/s")));
        assert!(options.script.is_none());
    }

    #[test]
    fn bad_values_keep_defaults() {
        let options = parse_cli_options(&args(&["--slot", "two", "--verbose"]));
        assert_eq!(options.slot, 1);
        assert_eq!(options.assets, PathBuf::from("assets"));
    }
}
