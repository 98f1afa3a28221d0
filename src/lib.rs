//! Brasa Voice - voice ordering assistant and order backend for Brasa Roja
//!
//! This library provides:
//! - Menu catalog loading (embedded, TOML, scraped markup, database)
//! - Utterance matching against the catalog
//! - The ordering dialogue and its effect runner
//! - Voice adapters (terminal, microphone with STT/TTS)
//! - The order backend (HTTP API, SQLite store, kitchen WebSocket feed)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Voice I/O                           │
//! │   Console  │  Microphone + STT  │  TTS + Speaker     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Dialogue                               │
//! │   Controller  │  Matcher  │  Cart  │  Menu           │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /api/pedidos
//! ┌────────────────────▼────────────────────────────────┐
//! │             Order backend                            │
//! │   API  │  SQLite  │  Kitchen feed (/ws/cocina)       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cart;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod error;
pub mod events;
pub mod matcher;
pub mod menu;
pub mod order;
pub mod voice;

pub use cart::{Cart, CartLine, RemoveOutcome};
pub use config::Config;
pub use db::{DbConn, DbPool};
pub use dialogue::{Assistant, Controller, DialogueConfig, DialogueState, Effect, Input, Session};
pub use error::{Error, Result};
pub use events::{KitchenEvent, KitchenFeed};
pub use menu::{Catalog, Category, MenuItem, MenuSource, Price};
pub use order::{HttpOrderClient, Order, OrderPayload, OrderStatus, OrderSubmitter, SubmitOutcome};
pub use voice::{ListenError, VoiceIo};
