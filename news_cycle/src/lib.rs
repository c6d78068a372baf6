//! # News Cycle
//!
//! Turns unstructured news items into scored, time-decaying decision events
//! with quantified consequences. Player state lives in `campaign_rules`; this
//! crate only reads it through `PlayerContext` and writes it through
//! `ResourceSink`.
//!
//! ## Core Components
//!
//! - **classifier**: Keyword and entity heuristics that score raw items
//! - **templates**: Template catalog, matcher and variable injector
//! - **events**: Game events, response menus and the event factory
//! - **temporal**: Per-event news-cycle stages, attention decay and story fatigue
//! - **fallback**: Source health, the item cache and the procedural generator
//! - **consequences**: Response resolution, deferred effects and stance history
//! - **orchestrator**: The composition root driven by the host game loop
//!
//! ## Design Philosophy
//!
//! - **Host-Driven**: The host calls `update` and `on_turn_advance`; nothing runs on its own
//! - **Degrade, Don't Fail**: A dead feed means cached or generated stories, never an empty turn
//! - **Deterministic**: A seeded RNG drives rolls and generation, so runs replay exactly

pub mod classifier;
pub mod config;
pub mod consequences;
pub mod content;
pub mod error;
pub mod events;
pub mod fallback;
pub mod logging;
pub mod notifications;
pub mod orchestrator;
pub mod templates;
pub mod temporal;

pub use classifier::*;
pub use config::*;
pub use consequences::*;
pub use content::*;
pub use error::*;
pub use events::*;
pub use fallback::*;
pub use notifications::*;
pub use orchestrator::*;
pub use templates::*;
pub use temporal::*;
