//! Resume template parsing and substitution.
//!
//! Template syntax, on top of plain LaTeX:
//! - `<<KEY>>` inline placeholder, replaced by the rendered value for `KEY`.
//! - A line `% BEGIN:KEY` opens a region, `% END:KEY` closes it. The region's
//!   body is emitted only when the value for `KEY` is non-empty. Marker lines
//!   never appear in the output.
//!
//! Templates are parsed once into a node tree; filling is a pure walk.

use std::collections::HashMap;

use super::RenderError;

/// The standard resume template, compiled into the binary.
pub const STANDARD_TEMPLATE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/resume.tex"));

const OPEN: &str = "<<";
const CLOSE: &str = ">>";
const BEGIN_MARKER: &str = "% BEGIN:";
const END_MARKER: &str = "% END:";

/// Named locations a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Name,
    Contact,
    Summary,
    Skills,
    Experience,
    Education,
    Awards,
    Certifications,
    Publications,
}

impl Placeholder {
    pub const ALL: [Placeholder; 9] = [
        Placeholder::Name,
        Placeholder::Contact,
        Placeholder::Summary,
        Placeholder::Skills,
        Placeholder::Experience,
        Placeholder::Education,
        Placeholder::Awards,
        Placeholder::Certifications,
        Placeholder::Publications,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Placeholder::Name => "NAME",
            Placeholder::Contact => "CONTACT",
            Placeholder::Summary => "SUMMARY",
            Placeholder::Skills => "SKILLS",
            Placeholder::Experience => "EXPERIENCE",
            Placeholder::Education => "EDUCATION",
            Placeholder::Awards => "AWARDS",
            Placeholder::Certifications => "CERTIFICATIONS",
            Placeholder::Publications => "PUBLICATIONS",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Rendered (already escaped) text for each placeholder. Absent means empty.
pub type SectionValues = HashMap<Placeholder, String>;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Field(Placeholder),
    Region {
        section: Placeholder,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template text, rejecting unbalanced regions and bad placeholders.
    pub fn parse(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();

        // Each frame: (section, opening line, body collected so far).
        let mut stack: Vec<(Placeholder, usize, Vec<Node>)> = Vec::new();
        let mut root: Vec<Node> = Vec::new();

        for (idx, line) in source.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();

            if let Some(key) = trimmed.strip_prefix(BEGIN_MARKER) {
                let section = section_from_marker(key, line_no)?;
                stack.push((section, line_no, Vec::new()));
                continue;
            }

            if let Some(key) = trimmed.strip_prefix(END_MARKER) {
                let section = section_from_marker(key, line_no)?;
                let (open, open_line, body) = stack.pop().ok_or_else(|| {
                    RenderError::Template(format!(
                        "line {line_no}: END:{} has no matching BEGIN",
                        section.key()
                    ))
                })?;
                if open != section {
                    return Err(RenderError::Template(format!(
                        "line {line_no}: END:{} closes BEGIN:{} opened on line {open_line}",
                        section.key(),
                        open.key()
                    )));
                }
                let target = match stack.last_mut() {
                    Some((_, _, parent)) => parent,
                    None => &mut root,
                };
                target.push(Node::Region { section, body });
                continue;
            }

            let target = match stack.last_mut() {
                Some((_, _, body)) => body,
                None => &mut root,
            };
            parse_inline(line, line_no, target)?;
        }

        if let Some((section, line_no, _)) = stack.pop() {
            return Err(RenderError::Template(format!(
                "line {line_no}: BEGIN:{} is never closed",
                section.key()
            )));
        }

        if !contains_field(&root, Placeholder::Name) {
            return Err(RenderError::Template(format!(
                "template has no {OPEN}{}{CLOSE} placeholder",
                Placeholder::Name.key()
            )));
        }

        Ok(Self { source, nodes: root })
    }

    /// Parses the embedded standard template.
    pub fn standard() -> Result<Self, RenderError> {
        Self::parse(STANDARD_TEMPLATE)
    }

    /// Raw template text, as loaded.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitutes `values` into the template.
    pub fn fill(&self, values: &SectionValues) -> String {
        let mut out = String::with_capacity(self.source.len() * 2);
        fill_nodes(&self.nodes, values, &mut out);
        out
    }
}

fn section_from_marker(key: &str, line_no: usize) -> Result<Placeholder, RenderError> {
    let key = key.trim();
    Placeholder::from_key(key).ok_or_else(|| {
        RenderError::Template(format!("line {line_no}: unknown region '{key}'"))
    })
}

fn parse_inline(line: &str, line_no: usize, out: &mut Vec<Node>) -> Result<(), RenderError> {
    let mut rest = line;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open.find(CLOSE).ok_or_else(|| {
            RenderError::Template(format!("line {line_no}: unterminated placeholder"))
        })?;
        let key = &after_open[..end];
        let placeholder = Placeholder::from_key(key).ok_or_else(|| {
            RenderError::Template(format!("line {line_no}: unknown placeholder {OPEN}{key}{CLOSE}"))
        })?;
        if start > 0 {
            out.push(Node::Text(rest[..start].to_string()));
        }
        out.push(Node::Field(placeholder));
        rest = &after_open[end + CLOSE.len()..];
    }
    if !rest.is_empty() {
        out.push(Node::Text(rest.to_string()));
    }
    Ok(())
}

fn contains_field(nodes: &[Node], target: Placeholder) -> bool {
    nodes.iter().any(|node| match node {
        Node::Field(p) => *p == target,
        Node::Region { body, .. } => contains_field(body, target),
        Node::Text(_) => false,
    })
}

fn fill_nodes(nodes: &[Node], values: &SectionValues, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Field(p) => {
                if let Some(value) = values.get(p) {
                    out.push_str(value);
                }
            }
            Node::Region { section, body } => {
                let has_content = values.get(section).is_some_and(|v| !v.trim().is_empty());
                if has_content {
                    fill_nodes(body, values, out);
                }
            }
        }
    }
}
