// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Reference-safe Markdown primitives shared by all renderers.
//!
//! Everything that ends up inside a table cell goes through [`escape_cell`],
//! either directly or via [`Table`]. Links only ever point at raw entity ids;
//! labels come from [`humanize`].

/// Turns an identifier-style name into a spaced, readable label.
///
/// Names that already contain a space are returned unchanged. Hyphenated
/// names are split and each part capitalized. Anything else is treated as
/// `PascalCase`/`camelCase`: a space goes before each upper-case letter that
/// follows a lower-case letter or precedes one, so acronyms stay together.
///
/// ```
/// use s2doc::markdown::humanize;
///
/// assert_eq!(humanize("UserEvents"), "User Events");
/// assert_eq!(humanize("user-events"), "User Events");
/// assert_eq!(humanize("MLFeatureStore"), "ML Feature Store");
/// assert_eq!(humanize("ID"), "ID");
/// ```
#[must_use]
pub fn humanize(name: &str) -> String {
    if name.contains(' ') {
        return name.to_owned();
    }
    if name.contains('-') {
        return name
            .split('-')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || next_lower {
                out.push(' ');
            }
        }
        out.push(c);
    }
    out
}

/// Upper-cases the first character and lower-cases the rest.
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Escapes a value for use inside a table cell: `|` becomes `\|` and line
/// breaks become spaces.
#[must_use]
pub fn escape_cell(value: &str) -> String {
    value
        .trim()
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace('\n', " ")
}

/// An HTML anchor whose target is the raw entity id.
#[must_use]
pub fn anchor(id: &str) -> String {
    format!("<a id=\"{id}\"></a>")
}

/// A link to an in-document anchor. Empty text falls back to the id.
#[must_use]
pub fn link(id: &str, text: &str) -> String {
    let text = if text.is_empty() { id } else { text };
    format!("[{text}](#{id})")
}

/// Inline code, with backticks inside replaced by quotes.
#[must_use]
pub fn code(text: &str) -> String {
    format!("`{}`", text.replace('`', "'"))
}

/// `✓` or `✗`.
#[must_use]
pub const fn check_mark(value: bool) -> &'static str {
    if value { "✓" } else { "✗" }
}

/// Joins non-empty items with `", "`, or returns `fallback` when there are none.
#[must_use]
pub fn join_or<S: AsRef<str>>(items: &[S], fallback: &str) -> String {
    let joined = items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        fallback.to_owned()
    } else {
        joined
    }
}

/// Joins rendered sections with a blank line, skipping empty ones so an
/// absent section leaves no trace.
#[must_use]
pub fn sections<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .filter_map(|s| {
            let s = s.as_ref().trim_end();
            (!s.is_empty()).then(|| s.to_owned())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// A pipe table. Cells are escaped on insertion; an empty table renders as "".
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// An empty table with the given column headers.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Adds a row of raw cell values.
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.rows
            .push(cells.into_iter().map(|c| escape_cell(c.as_ref())).collect());
        self
    }

    /// Whether no row was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The table as Markdown, or "" without rows.
    #[must_use]
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        lines.push(format!("| {} |", self.header.join(" | ")));
        lines.push(format!(
            "|{}|",
            self.header.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        ));
        for row in &self.rows {
            lines.push(format!("| {} |", row.join(" | ")));
        }
        lines.join("\n")
    }
}

/// Line-oriented text builder for one section.
#[derive(Debug, Clone, Default)]
pub struct Block {
    lines: Vec<String>,
}

impl Block {
    /// An empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line as is.
    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// A blank line, collapsed if the previous line is already blank.
    pub fn blank(&mut self) -> &mut Self {
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
        self
    }

    /// A paragraph followed by a blank line; nothing for empty text.
    pub fn para(&mut self, text: &str) -> &mut Self {
        let text = text.trim();
        if !text.is_empty() {
            self.line(text).blank();
        }
        self
    }

    /// `**label**: value` line, skipped when the value is empty.
    pub fn field(&mut self, label: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.line(format!("**{label}**: {value}  "));
        }
        self
    }

    /// A heading line followed by a bullet list; nothing for an empty list.
    pub fn list<S: AsRef<str>>(&mut self, heading: &str, items: &[S]) -> &mut Self {
        if items.is_empty() {
            return self;
        }
        self.blank().line(heading);
        for item in items {
            self.line(format!("- {}", item.as_ref()));
        }
        self.blank()
    }

    /// Like [`Block::list`] under a bold `**heading**:` label.
    pub fn bullets<S: AsRef<str>>(&mut self, heading: &str, items: &[S]) -> &mut Self {
        self.list(&format!("**{heading}**:"), items)
    }

    /// Appends a rendered block (table, diagram); nothing for "".
    pub fn push_block(&mut self, block: &str) -> &mut Self {
        if !block.is_empty() {
            self.blank().line(block).blank();
        }
        self
    }

    /// Whether only blank lines were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    /// The block's text, trimmed.
    #[must_use]
    pub fn finish(&self) -> String {
        self.lines.join("\n").trim().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_examples() {
        assert_eq!(humanize("UserEvents"), "User Events");
        assert_eq!(humanize("user-events"), "User Events");
        assert_eq!(humanize("User Events"), "User Events");
        assert_eq!(humanize(""), "");
        assert_eq!(humanize("MLFeatureStore"), "ML Feature Store");
        assert_eq!(humanize("XMLParser"), "XML Parser");
        assert_eq!(humanize("PaymentTemplateId"), "Payment Template Id");
        assert_eq!(humanize("camelCase"), "camel Case");
    }

    #[test]
    fn humanize_is_idempotent() {
        for name in ["UserEvents", "user-events", "MLFeatureStore", "ID", "a b", "x"] {
            let once = humanize(name);
            assert_eq!(humanize(&once), once, "{name}");
        }
    }

    #[test]
    fn capitalizes_words() {
        assert_eq!(capitalize("sMALL"), "Small");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn escapes_pipes_and_newlines() {
        assert_eq!(escape_cell("a | b\nc"), "a \\| b c");
        assert_eq!(escape_cell("  padded \n"), "padded");
    }

    #[test]
    fn link_falls_back_to_id() {
        assert_eq!(link("agg_1", "Order"), "[Order](#agg_1)");
        assert_eq!(link("agg_1", ""), "[agg_1](#agg_1)");
    }

    #[test]
    fn table_escapes_cells() {
        let mut table = Table::new(["Name", "Rule"]);
        table.row(["x", "a|b"]);
        assert_eq!(table.render(), "| Name | Rule |\n|---|---|\n| x | a\\|b |");
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert_eq!(Table::new(["A"]).render(), "");
    }

    #[test]
    fn sections_skip_empty_parts() {
        assert_eq!(sections(["# A", "", "  ", "B\n"]), "# A\n\nB");
    }

    #[test]
    fn block_builds_fields_and_bullets() {
        let mut block = Block::new();
        block
            .line("## Heading")
            .blank()
            .field("Type", "core")
            .field("Empty", "")
            .bullets("Rules", &["one", "two"])
            .bullets::<&str>("None", &[]);
        assert_eq!(
            block.finish(),
            "## Heading\n\n**Type**: core  \n\n**Rules**:\n- one\n- two"
        );
    }

    #[test]
    fn join_or_uses_fallback() {
        assert_eq!(join_or::<&str>(&[], "None"), "None");
        assert_eq!(join_or(&["a", "", "b"], "None"), "a, b");
    }
}
