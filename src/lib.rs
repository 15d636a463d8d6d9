//! wcscan - static extraction of web component metadata
//!
//! wcscan reads a TypeScript/JavaScript project without executing it, finds
//! every custom element registration, and describes each registered
//! component's properties and events as JSON-Schema-like models, together
//! with the bundler and module federation settings of the build.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Core analysis engine (collection, resolution, extraction, assembly)
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod utils;
