//! # Shelf Architecture
//!
//! Shelf is a **personal library manager**: it keeps PDFs, EPUBs and text files
//! in per-item directories next to their extracted plain text and a JSON
//! metadata file. The core is a library; the `shelf` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One store call per command                               │
//! │  - Builds CmdResult (items, text, paths, messages)          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/) + Extractors (extract/)             │
//! │  - ShelfStore owns the on-disk layout under the shelf root  │
//! │  - Extractors turn pdf/epub/text bytes into plain text      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes regular Rust arguments and returns
//! `Result<CmdResult>`. It never prints and never calls `std::process::exit`.
//! Diagnostics go through `tracing`; installing a subscriber is the client's job.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`commands`]: One module per user-facing command
//! - [`store`]: The shelf store and its on-disk layout
//! - [`extract`]: Format extractors (pdf, epub, text)
//! - [`model`]: Core data types (`Item`, `Format`, `ItemUpdate`)
//! - [`validation`]: Item id rules
//! - [`config`]: Shelf root resolution and the config file
//! - [`error`]: Error types and their exit codes
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod store;
pub mod validation;
