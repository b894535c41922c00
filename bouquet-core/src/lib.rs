//! # Digibouquet Core
//!
//! Composition and session engine for virtual flower bouquets.
//! Compiles to WASM so the browser front end drives the same model the
//! server renders.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              bouquet-core.wasm              │
//! ├─────────────────────────────────────────────┤
//! │  Creation Flow   │  Session Store           │
//! │  - 4 stages      │  - Composition owner     │
//! │  - Pick gating   │  - Language, 6..=10 rule │
//! ├─────────────────────────────────────────────┤
//! │  Composition     │  Arrangement Engine      │
//! │  - Flowers       │  - Expansion             │
//! │  - Greenery      │  - Fisher-Yates shuffle  │
//! │  - Letter        │  - Rotation jitter       │
//! ├─────────────────────────────────────────────┤
//! │  Layout          │  Sizing                  │
//! │  - Asset paths   │  - Card text fitting     │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arrangement;
pub mod catalog;
pub mod composition;
pub mod error;
pub mod flow;
pub mod layout;
pub mod session;
pub mod share;
pub mod sizing;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use arrangement::FlowerInstance;
pub use catalog::{FlowerCatalog, FlowerCatalogEntry, FlowerId, SizeClass};
pub use composition::{Composition, FlowerSelection, Greenery, Letter, LetterField};
pub use error::{BouquetError, BouquetResult};
pub use flow::{CreationFlow, Stage};
pub use layout::{BouquetLayout, CardText, PlacedFlower};
pub use session::{EntryParams, Language, SessionHost, SessionId, SessionStore};
pub use share::{ModeTag, ShareId, SharePayload, SharedBouquet};
pub use sizing::{font_size, TextFit};

/// Bouquet core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
