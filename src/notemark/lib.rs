//! # Notemark Architecture
//!
//! Notemark keeps a structured note store and a directory of Markdown
//! mirror files mutually consistent. It is a library with a CLI client,
//! not a CLI with incidental library code, and the layering reflects that:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs + args.rs)                              │
//! │  - Parses arguments, renders output, owns exit codes        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade; normalizes indexes → note ids               │
//! │  - Returns structured Result types                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands + Sync Engine (commands/, sync/)                  │
//! │  - Business logic over the core types                       │
//! │  - No I/O assumptions beyond the store trait and sync root  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (mergeable/, structure.rs, store/)                    │
//! │  - Unit-sequence text, placeholder codec, token diff,       │
//! │    three-way merge, structure parsing                       │
//! │  - NoteStore trait: FileStore (prod), InMemoryStore (tests) │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key ideas
//!
//! - A note body is a sequence of opaque units (character runs and embedded
//!   objects). Editable text is a projection: objects become placeholder
//!   tokens that round-trip back to the same unit identity.
//! - Every mutation goes through a diff: user edits apply against the
//!   snapshot their session started from, and concurrent changes three-way
//!   merge instead of clobbering. Overlapping regions resolve to the
//!   committed side and are reported, never silently dropped.
//! - The sync engine classifies each note by comparing content fingerprints
//!   against the manifest from the last pass, then propagates, merges, or
//!   (only when the other side is untouched) deletes.
//! - No code from `api.rs` inward writes to stdout/stderr or exits the
//!   process; everything returns `Result<CmdResult>` or a pass summary.
//!
//! ## Module Overview
//!
//! - [`api`]: the API facade, entry point for all operations
//! - [`commands`]: business logic for each note command
//! - [`mergeable`]: unit sequences, placeholder codec, diff, merge
//! - [`structure`]: checklists, tables, tags, links
//! - [`sync`]: change detection, manifest, mirror files, engine, watch loop
//! - [`store`]: storage trait and implementations
//! - [`model`]: core data types (`Note`, `Folder`, `AttachmentRef`)
//! - [`index`]: display indexing (`1`, `p1` notation)
//! - [`config`]: configuration management
//! - [`editor`]: external editor integration
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod index;
pub mod mergeable;
pub mod model;
pub mod store;
pub mod structure;
pub mod sync;
