//! The spaced-repetition core: a pure SM-2 interval engine, a card
//! scheduler that applies it through an injected `CardStore`, the
//! due-set selector, and derived review statistics.

pub mod card;
pub mod engine;
pub mod memory;
pub mod quality;
pub mod scheduler;
pub mod stats;
pub mod store;

pub use card::{CardContent, CardDraft, CardSource, CardType, ReviewRecord, SrsCard};
pub use quality::{InvalidQuality, ReviewQuality};
pub use scheduler::{SrsError, SrsScheduler};
pub use stats::ReviewStats;
pub use store::{CardStore, StoreError};
