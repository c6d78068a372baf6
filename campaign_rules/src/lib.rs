//! # Campaign Rules
//!
//! The player-state crate: offices, named resources, alignment, and the
//! read/write traits the news pipeline uses to consult and change the player.
//! This crate is the single source of truth for player state and does not
//! contain any news-processing logic.

pub mod alignment;
pub mod mechanics;
pub mod player_state;

pub use alignment::*;
pub use mechanics::*;
pub use player_state::*;
