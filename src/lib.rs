// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert YAML domain models to Markdown with Mermaid diagrams.
//!
//! Four document kinds are understood: domain stories, strategic DDD system
//! maps, tactical DDD bounded contexts and data-engineering pipelines. Each
//! is detected from its keys, read into typed records, and rendered as one
//! Markdown document with cross-links and capped diagrams.
//!
//! # Overview
//!
//! 1. [`parser`] reads YAML text into a generic tree
//! 2. [`detector`] decides which kind of document it is
//! 3. [`convert`] reads the typed [`model`] and hands it to a [`renderer`]
//!
//! References between entities go through a [`resolver`], so an id that
//! points nowhere is shown as plain text instead of a broken link.
//!
//! # Example
//!
//! ```
//! use s2doc::{convert, parser, renderer::RenderOptions};
//!
//! let yaml = "
//! system:
//!   id: shop
//!   name: Shop
//!   domains:
//!     - id: dom_sales
//!       name: Sales
//!       type: core
//! ";
//! let doc = parser::parse_document(yaml).unwrap();
//! let conversion = convert::convert(&doc, &RenderOptions::default()).unwrap();
//!
//! assert!(conversion.markdown.contains("Sales"));
//! assert!(conversion.markdown.contains("```mermaid"));
//! ```
//!
//! # Modules
//!
//! - [`parser`]: YAML text to a document tree
//! - [`detector`]: schema detection
//! - [`model`]: typed records per document kind
//! - [`resolver`]: id indexes and reference resolution
//! - [`markdown`]: text primitives (humanize, escaping, anchors, tables)
//! - [`diagram`]: Mermaid diagram builders with size caps
//! - [`renderer`]: one Markdown renderer per document kind
//! - [`convert`]: the detect, read and render pipeline
//! - [`check`]: duplicate ids and dangling references

#![deny(missing_docs)]

pub mod check;
pub mod convert;
pub mod detector;
pub mod diagram;
pub mod markdown;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod resolver;

pub use convert::{Conversion, ConvertError, convert};
