//! Deterministic human-readable dumps of collection records.
//!
//! Records describe themselves as an ordered field list; one renderer turns
//! any record into indented text, writing `nil` for every absent optional.
//! The output is for logs and diagnostics only and is never parsed back.

use std::borrow::Cow;
use std::fmt::{self, Display, Write};

use crate::collection::{
    Author, Collection, License, Package, Platform, PlatformVersion, Product, Target, Version,
};
use crate::input::{InputDescriptor, InputPackage};
use crate::timestamp;

const INDENT: &str = "    ";
const NIL: &str = "nil";

/// A value in a rendered field list.
pub enum Node<'a> {
    /// A scalar, written as-is.
    Text(Cow<'a, str>),
    /// An absent optional.
    Nil,
    /// An ordered list of values.
    List(Vec<Node<'a>>),
    /// A nested record.
    Record(&'a dyn Describe),
}

impl<'a> Node<'a> {
    /// A borrowed scalar.
    pub fn text(s: &'a str) -> Self {
        Node::Text(Cow::Borrowed(s))
    }

    /// A scalar produced by `Display`.
    pub fn display(value: impl Display) -> Self {
        Node::Text(Cow::Owned(value.to_string()))
    }

    /// An optional scalar.
    pub fn opt_text(value: Option<&'a String>) -> Self {
        value.map_or(Node::Nil, |s| Node::text(s))
    }

    /// A list of strings.
    pub fn strings(items: &'a [String]) -> Self {
        Node::List(items.iter().map(|s| Node::text(s)).collect())
    }

    /// An optional list of strings.
    pub fn opt_strings(items: Option<&'a Vec<String>>) -> Self {
        items.map_or(Node::Nil, |v| Node::strings(v))
    }

    /// A list of records.
    pub fn records<T: Describe>(items: &'a [T]) -> Self {
        Node::List(items.iter().map(|r| Node::Record(r)).collect())
    }

    /// An optional list of records.
    pub fn opt_records<T: Describe>(items: Option<&'a Vec<T>>) -> Self {
        items.map_or(Node::Nil, |v| Node::records(v))
    }

    /// An optional record.
    pub fn opt_record<T: Describe>(record: Option<&'a T>) -> Self {
        record.map_or(Node::Nil, |r| Node::Record(r))
    }

    fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) | Node::Nil => true,
            Node::Record(r) => r.inline().is_some(),
            Node::List(items) => items.is_empty(),
        }
    }
}

/// A record that can be rendered by [`render`].
pub trait Describe {
    /// Heading written before the field block.
    fn type_name(&self) -> &'static str;

    /// Fields in the order they are written.
    fn fields(&self) -> Vec<(&'static str, Node<'_>)>;

    /// Single-line form for leaf records. Records that return `Some` are
    /// written with it instead of a field block.
    fn inline(&self) -> Option<String> {
        None
    }
}

/// Render a record as indented text.
pub fn render(record: &dyn Describe) -> String {
    let mut out = String::new();
    write_record(&mut out, record, 0);
    out
}

fn write_record(out: &mut String, record: &dyn Describe, depth: usize) {
    if let Some(line) = record.inline() {
        out.push_str(&line);
        return;
    }

    let fields = record.fields();
    let _ = writeln!(out, "{} {{", record.type_name());
    let last = fields.len().saturating_sub(1);
    for (i, (name, node)) in fields.iter().enumerate() {
        push_indent(out, depth + 1);
        let _ = write!(out, "{name}=");
        write_node(out, node, depth + 1);
        if i != last {
            out.push(',');
        }
        out.push('\n');
    }
    push_indent(out, depth);
    out.push('}');
}

fn write_node(out: &mut String, node: &Node<'_>, depth: usize) {
    match node {
        Node::Text(s) => out.push_str(s),
        Node::Nil => out.push_str(NIL),
        Node::Record(r) => write_record(out, *r, depth),
        Node::List(items) if items.iter().all(Node::is_inline) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_node(out, item, depth);
            }
            out.push(']');
        }
        Node::List(items) => {
            out.push_str("[\n");
            for item in items {
                push_indent(out, depth + 1);
                write_node(out, item, depth + 1);
                out.push_str(",\n");
            }
            push_indent(out, depth);
            out.push(']');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

impl Describe for Collection {
    fn type_name(&self) -> &'static str {
        "Collection"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("name", Node::text(&self.name)),
            ("overview", Node::opt_text(self.overview.as_ref())),
            ("keywords", Node::opt_strings(self.keywords.as_ref())),
            ("packages", Node::records(&self.packages)),
            ("formatVersion", Node::display(self.format_version)),
            ("revision", self.revision.map_or(Node::Nil, Node::display)),
            ("generatedAt", Node::display(timestamp::format(&self.generated_at))),
            ("generatedBy", Node::opt_record(self.generated_by.as_ref())),
        ]
    }
}

impl Describe for Author {
    fn type_name(&self) -> &'static str {
        "Author"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![("name", Node::text(&self.name))]
    }

    fn inline(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Describe for Package {
    fn type_name(&self) -> &'static str {
        "Package"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("url", Node::text(&self.url)),
            ("summary", Node::opt_text(self.summary.as_ref())),
            ("keywords", Node::opt_strings(self.keywords.as_ref())),
            ("versions", Node::records(&self.versions)),
            ("readmeURL", Node::opt_text(self.readme_url.as_ref())),
        ]
    }
}

impl Describe for Version {
    fn type_name(&self) -> &'static str {
        "Version"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("version", Node::text(&self.version)),
            ("packageName", Node::text(&self.package_name)),
            ("targets", Node::records(&self.targets)),
            ("products", Node::records(&self.products)),
            ("toolsVersion", Node::text(&self.tools_version)),
            (
                "minimumPlatformVersions",
                Node::opt_records(self.minimum_platform_versions.as_ref()),
            ),
            ("verifiedPlatforms", Node::opt_records(self.verified_platforms.as_ref())),
            (
                "verifiedSwiftVersions",
                Node::opt_strings(self.verified_swift_versions.as_ref()),
            ),
            ("license", Node::opt_record(self.license.as_ref())),
        ]
    }
}

impl Describe for Target {
    fn type_name(&self) -> &'static str {
        "Target"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("name", Node::text(&self.name)),
            ("moduleName", Node::opt_text(self.module_name.as_ref())),
        ]
    }
}

impl Describe for Product {
    fn type_name(&self) -> &'static str {
        "Product"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("name", Node::text(&self.name)),
            ("type", Node::display(self.kind)),
            ("targets", Node::strings(&self.targets)),
        ]
    }
}

impl Describe for Platform {
    fn type_name(&self) -> &'static str {
        "Platform"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![("name", Node::text(&self.name))]
    }

    fn inline(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl Describe for PlatformVersion {
    fn type_name(&self) -> &'static str {
        "PlatformVersion"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("name", Node::text(&self.name)),
            ("version", Node::text(&self.version)),
        ]
    }

    fn inline(&self) -> Option<String> {
        Some(format!("{}({})", self.name, self.version))
    }
}

impl Describe for License {
    fn type_name(&self) -> &'static str {
        "License"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("name", Node::text(&self.name)),
            ("url", Node::text(&self.url)),
        ]
    }

    fn inline(&self) -> Option<String> {
        Some(format!("License({}, {})", self.name, self.url))
    }
}

impl Describe for InputDescriptor {
    fn type_name(&self) -> &'static str {
        "InputDescriptor"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("title", Node::text(&self.title)),
            ("overview", Node::opt_text(self.overview.as_ref())),
            ("keywords", Node::opt_strings(self.keywords.as_ref())),
            ("packages", Node::records(&self.packages)),
            ("author", Node::opt_record(self.author.as_ref())),
        ]
    }
}

impl Describe for InputPackage {
    fn type_name(&self) -> &'static str {
        "Package"
    }

    fn fields(&self) -> Vec<(&'static str, Node<'_>)> {
        vec![
            ("url", Node::text(&self.url)),
            ("description", Node::opt_text(self.description.as_ref())),
            ("keywords", Node::opt_strings(self.keywords.as_ref())),
            ("versions", Node::opt_strings(self.versions.as_ref())),
            ("excludedProducts", Node::opt_strings(self.excluded_products.as_ref())),
            ("excludedTargets", Node::opt_strings(self.excluded_targets.as_ref())),
            ("readmeURL", Node::opt_text(self.readme_url.as_ref())),
        ]
    }
}

macro_rules! display_via_render {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&render(self))
                }
            }
        )*
    };
}

display_via_render!(
    Collection,
    Author,
    Package,
    Version,
    Target,
    Product,
    Platform,
    PlatformVersion,
    License,
    InputDescriptor,
    InputPackage,
);
