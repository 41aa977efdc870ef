//! Core run logic. Keep this crate free of IO and platform concerns.

pub mod action;
pub mod catalog;
pub mod config;
pub mod content;
pub mod deck;
pub mod events;
pub mod inventory;
pub mod map;
pub mod profile;
pub mod reward;
pub mod rng;
pub mod run;
pub mod shop;
pub mod state;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::*;
pub use catalog::*;
pub use config::*;
pub use content::*;
pub use deck::*;
pub use events::*;
pub use inventory::*;
pub use map::*;
pub use profile::*;
pub use reward::*;
pub use rng::*;
pub use run::*;
pub use shop::*;
pub use state::*;
pub use status::*;
