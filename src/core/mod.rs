//! # Core Application Logic
//!
//! This module contains peerdeck's business logic.
//! It knows nothing about any specific UI technology and performs no I/O.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Effect (work orders) │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │      TUI Adapter        │
//!                    │  spawns tokio tasks     │──── HTTP ───► node
//!                    │  feeds back Actions     │
//!                    └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: `Action`, `Effect` and the `update` reducer
//! - [`sync`]: tick generations, timer ids and connection health
//! - [`tabs`]: per-peer conversation tabs keyed by peer name
//! - [`search`]: the incremental search session
//! - [`render`]: record → row mappings shared by every view
//! - [`command`]: the input line grammar
//! - [`config`]: layered configuration

pub mod action;
pub mod command;
pub mod config;
pub mod render;
pub mod search;
pub mod state;
pub mod sync;
pub mod tabs;
