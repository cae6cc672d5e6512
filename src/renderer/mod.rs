// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown rendering, one module per document kind.
//!
//! Every renderer builds its resolver once, then emits its sections in a
//! fixed order. A section whose collection is empty renders as "" and is
//! dropped by [`crate::markdown::sections`], so absent data never leaves a
//! stray heading behind.

pub mod data_eng;
pub mod stories;
pub mod strategic;
pub mod tactical;

use crate::diagram::DiagramCaps;

/// Configuration options for Markdown rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether to embed Mermaid diagram blocks.
    pub diagrams: bool,

    /// Size limits applied to every diagram.
    pub caps: DiagramCaps,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            diagrams: true,
            caps: DiagramCaps::default(),
        }
    }
}
