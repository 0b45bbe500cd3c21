//! The markdown dialect used by API and guide sources.
//!
//! Parsing happens in two passes: [`reflow`] turns raw text into logical
//! lines (hard-wrapped paragraphs joined, fenced blocks kept verbatim) and
//! [`build_tree`] nests those lines into [`MarkdownNode`]s by heading depth
//! and list indentation. [`render`] is the inverse of [`parse`].

use serde::Serialize;

use crate::DocError;
use crate::DocResult;
use crate::Lang;

/// The marker used by a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
	/// `- item`
	Default,
	/// `* item`
	Bullet,
	/// `1. item`
	Ordinal,
}

impl ListStyle {
	pub fn marker(self) -> &'static str {
		match self {
			Self::Default => "-",
			Self::Bullet => "*",
			Self::Ordinal => "1.",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MarkdownNode {
	Heading {
		level: usize,
		text: String,
		children: Vec<MarkdownNode>,
	},
	ListItem {
		style: ListStyle,
		text: String,
		children: Vec<MarkdownNode>,
	},
	Code {
		lang: String,
		lines: Vec<String>,
	},
	Note {
		kind: String,
		text: String,
	},
	Properties {
		lines: Vec<String>,
	},
	Text {
		text: String,
	},
}

impl MarkdownNode {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text { text: text.into() }
	}

	pub fn heading(level: usize, text: impl Into<String>, children: Vec<MarkdownNode>) -> Self {
		Self::Heading {
			level,
			text: text.into(),
			children,
		}
	}

	pub fn list_item(style: ListStyle, text: impl Into<String>, children: Vec<MarkdownNode>) -> Self {
		Self::ListItem {
			style,
			text: text.into(),
			children,
		}
	}

	/// The inline text carried by this node, if any.
	pub fn inline_text(&self) -> Option<&str> {
		match self {
			Self::Heading { text, .. }
			| Self::ListItem { text, .. }
			| Self::Note { text, .. }
			| Self::Text { text } => Some(text),
			Self::Code { .. } | Self::Properties { .. } => None,
		}
	}

	pub fn inline_text_mut(&mut self) -> Option<&mut String> {
		match self {
			Self::Heading { text, .. }
			| Self::ListItem { text, .. }
			| Self::Note { text, .. }
			| Self::Text { text } => Some(text),
			Self::Code { .. } | Self::Properties { .. } => None,
		}
	}

	pub fn children(&self) -> &[MarkdownNode] {
		match self {
			Self::Heading { children, .. } | Self::ListItem { children, .. } => children,
			_ => &[],
		}
	}

	pub fn children_mut(&mut self) -> Option<&mut Vec<MarkdownNode>> {
		match self {
			Self::Heading { children, .. } | Self::ListItem { children, .. } => Some(children),
			_ => None,
		}
	}

	pub fn is_bullet_starting_with(&self, prefix: &str) -> bool {
		matches!(self, Self::ListItem { style: ListStyle::Bullet, text, .. } if text.starts_with(prefix))
	}
}

/// Parse markdown text into a forest of nodes.
pub fn parse(content: impl AsRef<str>) -> DocResult<Vec<MarkdownNode>> {
	build_tree(&reflow(content.as_ref()))
}

/// Whether the line contains a `[label]:` link reference definition.
fn is_link_definition(line: &str) -> bool {
	line.match_indices('[').any(|(start, _)| {
		let rest = &line[start + 1..];
		rest.find(']')
			.is_some_and(|end| end > 0 && rest[end + 1..].starts_with(':'))
	})
}

fn is_block_boundary(trimmed: &str) -> bool {
	trimmed.starts_with("```") || trimmed.starts_with("---") || trimmed.starts_with(":::")
}

fn starts_with_flush_marker(trimmed: &str) -> bool {
	["1.", "<", ">", "|", "-", "*"]
		.iter()
		.any(|marker| trimmed.starts_with(marker))
}

/// Normalize raw markdown into logical lines.
///
/// Consecutive paragraph lines are joined with a single space. Lines inside
/// fenced code, note and front-matter blocks are passed through untouched.
/// Block markers toggle the "in block" state; they never nest.
pub fn reflow(content: &str) -> Vec<String> {
	let content = content.replace("\r\n", "\n");
	let mut in_block = false;
	let mut lines = Vec::new();
	let mut paragraph: Vec<String> = Vec::new();

	for line in content.split('\n') {
		let trimmed = line.trim();
		let heading = line.starts_with('#');
		let boundary = is_block_boundary(trimmed);
		let mut flush = trimmed.is_empty()
			|| starts_with_flush_marker(trimmed)
			|| is_link_definition(line)
			|| heading;

		if boundary {
			in_block = !in_block;
			flush = true;
		}

		if flush && !paragraph.is_empty() {
			lines.push(paragraph.join(" "));
			paragraph.clear();
		}

		if in_block || heading || boundary {
			lines.push(line.to_string());
		} else if !trimmed.is_empty() {
			if paragraph.is_empty() {
				paragraph.push(line.trim_end().to_string());
			} else {
				paragraph.push(trimmed.to_string());
			}
		}
	}

	if !paragraph.is_empty() {
		lines.push(paragraph.join(" "));
	}

	lines
}

struct Slot {
	node: Option<MarkdownNode>,
	level: usize,
	children: Vec<usize>,
}

/// Nests logical lines into a tree. Headings nest by `#` depth; everything
/// else nests under the innermost open list item with a smaller indent.
struct TreeBuilder {
	slots: Vec<Slot>,
	headings: Vec<usize>,
	sections: Vec<(usize, usize)>,
}

impl TreeBuilder {
	fn new() -> Self {
		Self {
			slots: vec![Slot {
				node: None,
				level: 0,
				children: Vec::new(),
			}],
			headings: vec![0],
			sections: Vec::new(),
		}
	}

	fn push_slot(&mut self, node: MarkdownNode, level: usize) -> usize {
		self.slots.push(Slot {
			node: Some(node),
			level,
			children: Vec::new(),
		});
		self.slots.len() - 1
	}

	fn push_heading(&mut self, level: usize, text: String) {
		while let Some(&top) = self.headings.last() {
			if self.slots[top].level >= level && top != 0 {
				self.headings.pop();
			} else {
				break;
			}
		}

		let parent = self.headings.last().copied().unwrap_or(0);
		let index = self.push_slot(MarkdownNode::heading(level, text, Vec::new()), level);
		self.slots[parent].children.push(index);
		self.headings.push(index);
		self.sections.clear();
	}

	fn append(&mut self, indent: usize, node: MarkdownNode) {
		while let Some(&(section_indent, _)) = self.sections.last() {
			if section_indent >= indent {
				self.sections.pop();
			} else {
				break;
			}
		}

		let parent = match self.sections.last() {
			Some(&(_, index)) => index,
			None => self.headings.last().copied().unwrap_or(0),
		};
		let is_list_item = matches!(node, MarkdownNode::ListItem { .. });
		let index = self.push_slot(node, 0);
		self.slots[parent].children.push(index);

		if is_list_item {
			self.sections.push((indent, index));
		}
	}

	fn assemble(&mut self, index: usize) -> Option<MarkdownNode> {
		let children: Vec<MarkdownNode> = std::mem::take(&mut self.slots[index].children)
			.into_iter()
			.filter_map(|child| self.assemble(child))
			.collect();
		let mut node = self.slots[index].node.take()?;

		if let Some(slot) = node.children_mut() {
			*slot = children;
		}

		Some(node)
	}

	fn finish(mut self) -> Vec<MarkdownNode> {
		std::mem::take(&mut self.slots[0].children)
			.into_iter()
			.filter_map(|child| self.assemble(child))
			.collect()
	}
}

fn bad_block(kind: &'static str, lines: &[String], at: usize) -> DocError {
	let from = at.saturating_sub(5);
	let to = (from + 10).min(lines.len());
	DocError::BadBlock {
		kind,
		snippet: lines[from..to].join("\n"),
	}
}

/// Collect the body of a fenced block starting at `lines[start]` (the opener).
/// Returns the captured lines and the index of the closing marker.
fn capture_block(
	lines: &[String],
	start: usize,
	indent: &str,
	marker: &str,
	kind: &'static str,
	allow_blank: bool,
) -> DocResult<(Vec<String>, usize)> {
	let mut body = Vec::new();
	let mut index = start + 1;

	loop {
		let Some(line) = lines.get(index) else {
			return Err(bad_block(kind, lines, start));
		};

		if line.trim().starts_with(marker) {
			return Ok((body, index));
		}

		if line.is_empty() && allow_blank {
			body.push(String::new());
		} else if !line.starts_with(indent) {
			return Err(bad_block(kind, lines, index));
		} else {
			body.push(line[indent.len()..].to_string());
		}

		index += 1;
	}
}

/// Build the node tree from logical lines produced by [`reflow`].
pub fn build_tree(lines: &[String]) -> DocResult<Vec<MarkdownNode>> {
	let mut builder = TreeBuilder::new();
	let mut index = 0;

	while index < lines.len() {
		let line = &lines[index];

		let hashes = line.chars().take_while(|c| *c == '#').count();
		if hashes > 0 {
			let text = line.get(hashes + 1..).unwrap_or_default().to_string();
			builder.push_heading(hashes, text);
			index += 1;
			continue;
		}

		let indent_len = line.len() - line.trim_start_matches(' ').len();
		let (indent, content) = line.split_at(indent_len);

		if let Some(lang) = content.strip_prefix("```") {
			let (body, end) = capture_block(lines, index, indent, "```", "code", true)?;
			builder.append(indent_len, MarkdownNode::Code {
				lang: lang.to_string(),
				lines: body,
			});
			index = end + 1;
			continue;
		}

		if let Some(kind) = content.strip_prefix(":::") {
			let (body, end) = capture_block(lines, index, indent, ":::", "comment", true)?;
			let text = body
				.iter()
				.map(String::as_str)
				.filter(|line| !line.is_empty())
				.collect::<Vec<_>>()
				.join(" ");
			builder.append(indent_len, MarkdownNode::Note {
				kind: kind.trim().to_string(),
				text,
			});
			index = end + 1;
			continue;
		}

		if content.starts_with("---") {
			let (body, end) = capture_block(lines, index, indent, "---", "header", false)?;
			builder.append(indent_len, MarkdownNode::Properties { lines: body });
			index = end + 1;
			continue;
		}

		let node = if let Some(text) = content.strip_prefix("- ") {
			MarkdownNode::list_item(ListStyle::Default, text, Vec::new())
		} else if let Some(text) = content.strip_prefix("* ") {
			MarkdownNode::list_item(ListStyle::Bullet, text, Vec::new())
		} else if let Some(text) = content.strip_prefix("1. ") {
			MarkdownNode::list_item(ListStyle::Ordinal, text, Vec::new())
		} else {
			MarkdownNode::text(content)
		};
		builder.append(indent_len, node);
		index += 1;
	}

	Ok(builder.finish())
}

/// Options for [`render`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
	/// Wrap paragraph text at this column. `0` disables wrapping.
	pub max_columns: usize,
}

/// Render nodes back to markdown. Re-parsing the output yields an equivalent
/// tree.
pub fn render(nodes: &[MarkdownNode], options: &RenderOptions) -> String {
	let mut out = Vec::new();
	let mut last: Option<&MarkdownNode> = None;

	for node in nodes {
		render_node("", node, last, &mut out, options);
		last = Some(node);
	}

	while out.last().is_some_and(String::is_empty) {
		out.pop();
	}

	let mut rendered = out.join("\n");
	rendered.push('\n');
	rendered
}

fn blank_line(out: &mut Vec<String>) {
	if out.last().is_some_and(|line| !line.is_empty()) {
		out.push(String::new());
	}
}

fn both_start_with(node: &str, last: Option<&MarkdownNode>, prefix: &str) -> bool {
	node.starts_with(prefix)
		&& matches!(last, Some(MarkdownNode::Text { text }) if text.starts_with(prefix))
}

fn render_node(
	indent: &str,
	node: &MarkdownNode,
	last: Option<&MarkdownNode>,
	out: &mut Vec<String>,
	options: &RenderOptions,
) {
	match node {
		MarkdownNode::Heading {
			level,
			text,
			children,
		} => {
			blank_line(out);
			out.push(format!("{} {text}", "#".repeat(*level)));
			let mut last = Some(node);
			for child in children {
				render_node("", child, last, out, options);
				last = Some(child);
			}
		}
		MarkdownNode::Text { text } => {
			let tight = both_start_with(text, last, "|")
				|| both_start_with(text, last, "<!--")
				|| both_start_with(text, last, ">")
				|| (is_link_definition(text)
					&& matches!(last, Some(MarkdownNode::Text { text }) if is_link_definition(text)));

			if !tight && last.and_then(MarkdownNode::inline_text).is_some() {
				blank_line(out);
			}
			out.push(wrap_text(text, options.max_columns, indent));
		}
		MarkdownNode::Code { lang, lines } => {
			blank_line(out);
			out.push(format!("{indent}```{lang}"));
			for line in lines {
				if line.is_empty() {
					out.push(String::new());
				} else {
					out.push(format!("{indent}{line}"));
				}
			}
			out.push(format!("{indent}```"));
			blank_line(out);
		}
		MarkdownNode::Note { kind, text } => {
			blank_line(out);
			out.push(format!("{indent}:::{kind}"));
			out.push(wrap_text(text, options.max_columns, indent));
			out.push(format!("{indent}:::"));
			blank_line(out);
		}
		MarkdownNode::Properties { lines } => {
			out.push(format!("{indent}---"));
			for line in lines {
				out.push(format!("{indent}{line}"));
			}
			out.push(format!("{indent}---"));
			blank_line(out);
		}
		MarkdownNode::ListItem {
			style,
			text,
			children,
		} => {
			let marker = style.marker();
			out.push(wrap_text(text, options.max_columns, &format!("{indent}{marker} ")));
			let child_indent = format!("{indent}{}", " ".repeat(marker.len() + 1));
			for child in children {
				render_node(&child_indent, child, Some(node), out, options);
			}
		}
	}
}

/// A token that would end a paragraph during [`reflow`] if it started a line.
fn is_unsafe_line_start(token: &str) -> bool {
	starts_with_flush_marker(token)
		|| token.starts_with('#')
		|| is_block_boundary(token)
		|| token.contains("]:")
}

/// Wrap `text` so the first line starts with `prefix` and continuation lines
/// are indented by the prefix width.
pub fn wrap_text(text: &str, max_columns: usize, prefix: &str) -> String {
	let indent = " ".repeat(prefix.len());
	text.split('\n')
		.enumerate()
		.map(|(index, line)| wrap_line(line, max_columns, if index == 0 { prefix } else { &indent }))
		.collect::<Vec<_>>()
		.join("\n")
}

fn wrap_line(text: &str, max_columns: usize, prefix: &str) -> String {
	if max_columns == 0 || text.trim_start().starts_with('|') {
		return format!("{prefix}{text}");
	}

	let indent = " ".repeat(prefix.len());
	let mut lines = Vec::new();
	let mut line = String::new();

	for token in text.split(' ') {
		if line.is_empty() {
			line = format!("{prefix}{token}");
			continue;
		}

		if line.len() + token.len() >= max_columns
			&& !token.is_empty()
			&& !is_unsafe_line_start(token)
		{
			lines.push(std::mem::take(&mut line));
			line = format!("{indent}{token}");
			continue;
		}

		line.push(' ');
		line.push_str(token);
	}

	lines.push(line);

	// A continuation line that reads as a `[x]:` definition would start a new
	// paragraph, so pull it back onto the line before.
	while let Some(index) = (1..lines.len()).find(|&index| is_link_definition(&lines[index])) {
		let continuation = lines.remove(index);
		let previous = &mut lines[index - 1];
		previous.push(' ');
		previous.push_str(continuation.trim_start());
	}

	lines.join("\n")
}

/// Visit every node, depth first.
pub fn visit_all(nodes: &[MarkdownNode], visitor: &mut impl FnMut(&MarkdownNode)) {
	for node in nodes {
		visitor(node);
		visit_all(node.children(), visitor);
	}
}

/// Visit every node mutably, depth first. The visitor returns an error to
/// abort the walk.
pub fn visit_all_mut(
	nodes: &mut [MarkdownNode],
	visitor: &mut impl FnMut(&mut MarkdownNode) -> DocResult<()>,
) -> DocResult<()> {
	for node in nodes {
		visitor(node)?;
		if let Some(children) = node.children_mut() {
			visit_all_mut(children, visitor)?;
		}
	}

	Ok(())
}

/// Drop every node whose `* langs: a, b` bullet child excludes `lang`.
/// The `langs:` bullets themselves are removed from the output.
pub fn filter_nodes_for_language(nodes: Vec<MarkdownNode>, lang: Lang) -> Vec<MarkdownNode> {
	nodes
		.into_iter()
		.filter_map(|mut node| {
			if let Some(children) = node.children_mut() {
				let position = children
					.iter()
					.position(|child| child.is_bullet_starting_with("langs:"));
				if let Some(position) = position {
					let langs = children.remove(position);
					let only = langs
						.inline_text()
						.and_then(|text| text.strip_prefix("langs:"))
						.unwrap_or_default();
					let included = only
						.split(',')
						.filter_map(|name| Lang::parse(name.trim()))
						.any(|candidate| candidate == lang);
					if !included {
						return None;
					}
				}

				let filtered = filter_nodes_for_language(std::mem::take(children), lang);
				*children = filtered;
			}

			Some(node)
		})
		.collect()
}

/// GitHub style heading slug: lowercase, keep alphanumerics, spaces, `-` and
/// `_`, then replace spaces with `-`.
pub fn github_slug(text: &str) -> String {
	text.to_lowercase()
		.chars()
		.filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
		.collect::<String>()
		.replace(' ', "-")
}

/// A list of links to every level 2 heading (and level 3 when `include_h3`).
pub fn generate_toc(nodes: &[MarkdownNode], include_h3: bool) -> Vec<MarkdownNode> {
	let toc_item = |text: &str, nested: Vec<MarkdownNode>| {
		MarkdownNode::list_item(
			ListStyle::Default,
			format!("[{text}](#{})", github_slug(text)),
			nested,
		)
	};
	let mut toc = Vec::new();

	for node in nodes {
		let MarkdownNode::Heading {
			level,
			text,
			children,
		} = node
		else {
			continue;
		};

		if *level < 2 {
			toc.extend(generate_toc(children, include_h3));
			continue;
		}

		if *level != 2 {
			continue;
		}

		let nested = if include_h3 {
			children
				.iter()
				.filter_map(|child| {
					match child {
						MarkdownNode::Heading { level: 3, text, .. } => Some(toc_item(text, Vec::new())),
						_ => None,
					}
				})
				.collect()
		} else {
			Vec::new()
		};
		toc.push(toc_item(text, nested));
	}

	toc
}
