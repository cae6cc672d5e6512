// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Mermaid diagram emission.
//!
//! Renderers decide *what* goes into a diagram (which nodes, which edges,
//! how many before collapsing); the types here only know how to write it
//! down. A [`Flowchart`] is an ordered list of nodes and subgraphs, then
//! edges, then style directives, and [`Flowchart::emit`] turns it into a
//! fenced block in that order. [`ClassDiagram`] and [`SequenceDiagram`] do
//! the same for the other two diagram kinds the renderers use.

use log::debug;

/// Display-size limits for diagrams. The data behind a diagram is never
/// truncated, only the picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramCaps {
    /// Nodes shown per collection before the rest collapse into "+K more".
    pub max_nodes: usize,
    /// Example edges shown per relationship category.
    pub max_edges: usize,
}

impl Default for DiagramCaps {
    fn default() -> Self {
        Self {
            max_nodes: 10,
            max_edges: 5,
        }
    }
}

/// Splits `items` into the shown prefix and the number hidden behind it.
#[must_use]
pub fn cap<'a, T>(items: &'a [T], max: usize, what: &str) -> (&'a [T], usize) {
    if items.len() <= max {
        return (items, 0);
    }
    let hidden = items.len() - max;
    debug!(collection = what, shown = max, hidden; "diagram cap applied");
    (&items[..max], hidden)
}

/// Makes an entity id usable as a Mermaid identifier.
///
/// ```
/// use s2doc::diagram::sanitize_id;
///
/// assert_eq!(sanitize_id("ds-raw-events"), "ds_raw_events");
/// assert_eq!(sanitize_id(""), "UNKNOWN");
/// ```
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    if id.is_empty() {
        return "UNKNOWN".to_owned();
    }
    id.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Quotes would end a Mermaid label early.
fn label_text(label: &str) -> String {
    label.replace('"', "#quot;").replace('\n', " ")
}

fn fence(body: &[String]) -> String {
    let mut out = String::from("```mermaid\n");
    for line in body {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("```");
    out
}

/// Flowchart layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `TB`
    TopBottom,
    /// `LR`
    LeftRight,
}

impl Direction {
    const fn keyword(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
        }
    }
}

/// Node outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `id["label"]`
    Box,
    /// `id{{"label"}}`, used for policies.
    Hexagon,
}

/// A flowchart node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Sanitized Mermaid id.
    pub id: String,
    /// Display label, escaped on output.
    pub label: String,
    /// Outline.
    pub shape: Shape,
}

impl Node {
    /// A box node; the id is sanitized.
    pub fn new(id: &str, label: impl Into<String>) -> Self {
        Self {
            id: sanitize_id(id),
            label: label.into(),
            shape: Shape::Box,
        }
    }

    /// Draws the node as a hexagon.
    #[must_use]
    pub fn hexagon(mut self) -> Self {
        self.shape = Shape::Hexagon;
        self
    }

    fn declaration(&self) -> String {
        let label = label_text(&self.label);
        match self.shape {
            Shape::Box => format!("{}[\"{label}\"]", self.id),
            Shape::Hexagon => format!("{}{{{{\"{label}\"}}}}", self.id),
        }
    }
}

/// Edge stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    /// `-->`
    Solid,
    /// `-.->`
    Dotted,
}

/// A directed flowchart edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Sanitized source id.
    pub from: String,
    /// Sanitized target id.
    pub to: String,
    /// Edge label, if any.
    pub label: Option<String>,
    /// Stroke.
    pub line: Line,
}

impl Edge {
    /// A solid, unlabelled edge; both ends are sanitized.
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: sanitize_id(from),
            to: sanitize_id(to),
            label: None,
            line: Line::Solid,
        }
    }

    /// Sets the label. An empty label leaves the edge unlabelled.
    #[must_use]
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }

    /// Draws the edge dotted.
    #[must_use]
    pub const fn dotted(mut self) -> Self {
        self.line = Line::Dotted;
        self
    }

    fn statement(&self) -> String {
        let arrow = match self.line {
            Line::Solid => "-->",
            Line::Dotted => "-.->",
        };
        match &self.label {
            Some(label) => format!(
                "{} {arrow}|\"{}\"| {}",
                self.from,
                label_text(label),
                self.to
            ),
            None => format!("{} {arrow} {}", self.from, self.to),
        }
    }
}

/// A titled group of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    /// Title shown on the group.
    pub title: String,
    /// Nodes in declared order.
    pub nodes: Vec<Node>,
}

/// A flowchart (`graph TB` / `graph LR`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flowchart {
    direction: Direction,
    nodes: Vec<Node>,
    subgraphs: Vec<Subgraph>,
    edges: Vec<Edge>,
    class_defs: Vec<(String, String)>,
    classes: Vec<(Vec<String>, String)>,
    styles: Vec<(String, String)>,
}

impl Flowchart {
    /// An empty flowchart.
    #[must_use]
    pub const fn new(direction: Direction) -> Self {
        Self {
            direction,
            nodes: Vec::new(),
            subgraphs: Vec::new(),
            edges: Vec::new(),
            class_defs: Vec::new(),
            classes: Vec::new(),
            styles: Vec::new(),
        }
    }

    /// Adds a top-level node.
    pub fn node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    /// Adds a titled subgraph; an empty one is dropped.
    pub fn subgraph(&mut self, title: &str, nodes: Vec<Node>) -> &mut Self {
        if !nodes.is_empty() {
            self.subgraphs.push(Subgraph {
                title: title.to_owned(),
                nodes,
            });
        }
        self
    }

    /// Adds an edge.
    pub fn edge(&mut self, edge: Edge) -> &mut Self {
        self.edges.push(edge);
        self
    }

    /// Declares a named style class.
    pub fn class_def(&mut self, name: &str, style: &str) -> &mut Self {
        self.class_defs.push((name.to_owned(), style.to_owned()));
        self
    }

    /// Assigns a style class to nodes; nothing for an empty list.
    pub fn class(&mut self, node_ids: Vec<String>, name: &str) -> &mut Self {
        if !node_ids.is_empty() {
            self.classes.push((node_ids, name.to_owned()));
        }
        self
    }

    /// Inline `style` directive for a single node.
    pub fn style(&mut self, node_id: &str, style: &str) -> &mut Self {
        self.styles.push((sanitize_id(node_id), style.to_owned()));
        self
    }

    /// Whether nothing would be drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.subgraphs.is_empty() && self.edges.is_empty()
    }

    /// Whether a node with the given (unsanitized) id is declared.
    #[must_use]
    pub fn declares(&self, id: &str) -> bool {
        let id = sanitize_id(id);
        self.nodes
            .iter()
            .chain(self.subgraphs.iter().flat_map(|s| &s.nodes))
            .any(|n| n.id == id)
    }

    /// The fenced `mermaid` block.
    #[must_use]
    pub fn emit(&self) -> String {
        let mut body = vec![format!("graph {}", self.direction.keyword())];
        for node in &self.nodes {
            body.push(format!("    {}", node.declaration()));
        }
        for subgraph in &self.subgraphs {
            body.push(format!("    subgraph {}", subgraph.title));
            for node in &subgraph.nodes {
                body.push(format!("        {}", node.declaration()));
            }
            body.push("    end".to_owned());
        }
        for edge in &self.edges {
            body.push(format!("    {}", edge.statement()));
        }
        for (name, style) in &self.class_defs {
            body.push(format!("    classDef {name} {style}"));
        }
        for (ids, name) in &self.classes {
            body.push(format!("    class {} {name}", ids.join(",")));
        }
        for (id, style) in &self.styles {
            body.push(format!("    style {id} {style}"));
        }
        fence(&body)
    }
}

/// One class in a class diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    /// Sanitized class name.
    pub name: String,
    /// Shown as `<<stereotype>>`.
    pub stereotype: String,
    /// Member lines, each prefixed `+`.
    pub members: Vec<String>,
}

/// A `classDiagram` with classes and directed associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDiagram {
    classes: Vec<Class>,
    relations: Vec<(String, String)>,
}

impl ClassDiagram {
    /// An empty class diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class; the name is sanitized.
    pub fn class(&mut self, name: &str, stereotype: &str, members: Vec<String>) -> &mut Self {
        self.classes.push(Class {
            name: sanitize_id(name),
            stereotype: stereotype.to_owned(),
            members,
        });
        self
    }

    /// Adds a `from --> to` association.
    pub fn relation(&mut self, from: &str, to: &str) -> &mut Self {
        self.relations.push((sanitize_id(from), sanitize_id(to)));
        self
    }

    /// Whether no class was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The fenced `mermaid` block.
    #[must_use]
    pub fn emit(&self) -> String {
        let mut body = vec!["classDiagram".to_owned()];
        for class in &self.classes {
            body.push(format!("    class {} {{", class.name));
            body.push(format!("        <<{}>>", class.stereotype));
            for member in &class.members {
                body.push(format!("        +{member}"));
            }
            body.push("    }".to_owned());
        }
        for (from, to) in &self.relations {
            body.push(format!("    {from} --> {to}"));
        }
        fence(&body)
    }
}

/// A `sequenceDiagram`: participants, then request/reply messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceDiagram {
    participants: Vec<(String, Option<String>)>,
    messages: Vec<String>,
}

impl SequenceDiagram {
    /// An empty sequence diagram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a participant, with an optional display label.
    pub fn participant(&mut self, id: &str, label: Option<&str>) -> &mut Self {
        self.participants
            .push((sanitize_id(id), label.map(label_text)));
        self
    }

    /// A call that activates the target.
    pub fn call(&mut self, from: &str, to: &str, text: &str) -> &mut Self {
        self.messages.push(format!(
            "{}->>+{}: {}",
            sanitize_id(from),
            sanitize_id(to),
            label_text(text)
        ));
        self
    }

    /// A reply that deactivates the sender.
    pub fn reply(&mut self, from: &str, to: &str, text: &str) -> &mut Self {
        self.messages.push(format!(
            "{}-->>-{}: {}",
            sanitize_id(from),
            sanitize_id(to),
            label_text(text)
        ));
        self
    }

    /// A reply that leaves activations as they are.
    pub fn message(&mut self, from: &str, to: &str, text: &str) -> &mut Self {
        self.messages.push(format!(
            "{}-->>{}: {}",
            sanitize_id(from),
            sanitize_id(to),
            label_text(text)
        ));
        self
    }

    /// The fenced `mermaid` block.
    #[must_use]
    pub fn emit(&self) -> String {
        let mut body = vec!["sequenceDiagram".to_owned()];
        for (id, label) in &self.participants {
            body.push(match label {
                Some(label) => format!("    participant {id} as {label}"),
                None => format!("    participant {id}"),
            });
        }
        for message in &self.messages {
            body.push(format!("    {message}"));
        }
        fence(&body)
    }
}
