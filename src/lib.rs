//! # gbtbl - GenBank to NCBI Feature Table Converter
//!
//! Converts GenBank flat files (.gb) to NCBI five-column feature tables
//! (.tbl), with post-processing corrections for deprecated qualifiers
//! and header formatting.
//!
//! ## Architecture
//!
//! A single-pass pipeline with clear separation between stages:
//! - `model`: Data structures for records, features, and locations
//! - `formats`: GenBank flat-file reading and parsing
//! - `location`: Recursive-descent parser for the location grammar
//! - `table`: Five-column row rendering and serialization
//! - `rules`: Post-processing rewrites over the rendered rows
//! - `convert`: Per-file and per-directory orchestration for the CLI
//!
//! The parser produces structured `Feature` values; the renderer turns
//! them into a tagged row stream; the rules rewrite only that stream.
//! Nothing is shared between files, so batch mode is a plain loop.

pub mod convert;
pub mod formats;
pub mod location;
pub mod model;
pub mod rules;
pub mod table;
