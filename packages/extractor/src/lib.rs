//! Regclause Extractor - Structured clause extraction from regulatory PDFs.
//!
//! This crate turns FCA and EBA regulatory documents into typed clauses:
//! page text is cleaned, the configured sections are located, each section
//! is split into numbered clauses, and every clause is annotated with its
//! titles and source page.
//!
//! # Example
//!
//! ```
//! use regclause_extractor::segmentation::{ClauseGrammar, ClauseSegmenter, Numbering};
//! use regclause_extractor::types::ClauseType;
//!
//! let grammar = ClauseGrammar::new(Numbering::Typed, ClauseType::Unknown);
//! let clauses = ClauseSegmenter::new(&grammar)
//!     .segment("5.2A.1 R A firm must assess\n5.2A.2 G Guidance", "5.2A")
//!     .unwrap();
//! assert_eq!(clauses[0].clause_id, "5.2A.1 R");
//! assert_eq!(clauses[1].clause_type, ClauseType::Guidance);
//! ```
//!
//! # Architecture
//!
//! The extractor is organized into several modules:
//!
//! - [`config`]: Parser configuration and constants
//! - [`types`]: Core data types (Clause, ParsedDocument, etc.)
//! - [`error`]: Error types and Result alias
//! - [`pdf`]: Page text extraction from PDF files
//! - [`segmentation`]: Page cleaning, section location and clause splitting
//! - [`parsers`]: Jurisdiction profiles, the parser trait and the registry
//! - [`service`]: Parser selection, batch parsing and parse history
//! - [`output`]: JSON and YAML output files
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parsers;
pub mod pdf;
pub mod segmentation;
pub mod service;
pub mod types;

// Re-export commonly used items
pub use config::{OutputFormat, ParserConfig};
pub use error::{ExtractorError, Result};
pub use parsers::{ParserRegistry, RegulationParser};
pub use service::ParserService;
pub use types::{Clause, ClauseType, ParsedDocument, RegulationCountry};
