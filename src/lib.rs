//! Personal information diet tracker.
//!
//! Keeps a catalog of consumption items (books, articles, podcasts, videos,
//! courses, papers) with a lifecycle status, ratings, tags, and a dated
//! progress log, and derives statistics and an activity timeline from them.
//! The same operations are exposed to AI assistants over
//! [MCP](https://modelcontextprotocol.io/) and to the terminal by the
//! `infodiet` binary.
//!
//! | Status | Reached by | Sets |
//! |--------|------------|------|
//! | `backlog` | creation | |
//! | `in_progress` | `start_item` | `started_at` = today |
//! | `finished` | `finish_item` | `finished_at` = today, optional rating |
//! | `abandoned` | `abandon_item` | |
//!
//! # Architecture
//!
//! - **Storage**: bundled SQLite via rusqlite in WAL mode, forward-only migrations
//! - **Validation**: raw inputs are parsed into typed requests before the store is touched
//! - **Derived views**: statistics and the timeline are recomputed from stored rows on each call
//! - **Transport**: MCP over stdio (primary) or Streamable HTTP behind a bearer token
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite connection setup, schema, migrations, and health checks
//! - [`diet`]: Validation, item and progress repositories, statistics, and timeline
//! - [`error`]: The validation / not-found / storage error taxonomy

pub mod config;
pub mod db;
pub mod diet;
pub mod error;
