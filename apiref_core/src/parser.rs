//! Builds the object model from API source markdown.
//!
//! ```md
//! # class: Page
//! * since: v1.8
//! * extends: [EventEmitter]
//!
//! ## async method: Page.goto
//! - returns: <[null]|[Response]>
//!
//! ### param: Page.goto.url
//! - `url` <[string]> URL to navigate to.
//!
//! ### option: Page.goto.timeout
//! - `timeout` ?<[float]> Maximum time.
//! ```

use std::path::Path;
use std::str::FromStr;

use tracing::debug;
use tracing::info;

use crate::DocError;
use crate::DocResult;
use crate::Lang;
use crate::documentation::Class;
use crate::documentation::Documentation;
use crate::documentation::Langs;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::Type;
use crate::markdown;
use crate::markdown::ListStyle;
use crate::markdown::MarkdownNode;
use crate::sources::collect_markdown_files;

/// A `name <type> comment` line split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable<'a> {
	pub name: &'a str,
	/// The type expression between the outer angle brackets.
	pub expression: &'a str,
	pub comment: &'a str,
	pub optional: bool,
}

/// Split a type line such as ``- `url` ?<[string]> URL to open`` (without
/// the list marker) or `returns: <[Response]>`.
pub fn parse_variable(line: &str) -> DocResult<Variable<'_>> {
	let invalid = || DocError::InvalidArgument(line.to_string());

	let (name, rest) = if let Some(quoted) = line.strip_prefix('`') {
		let end = quoted.find('`').ok_or_else(invalid)?;
		let rest = quoted[end + 1..].strip_prefix(' ').ok_or_else(invalid)?;
		(&quoted[..end], rest)
	} else {
		["returns", "type", "argument"]
			.into_iter()
			.find_map(|keyword| {
				line.strip_prefix(keyword)
					.and_then(|rest| rest.strip_prefix(": "))
					.map(|rest| (keyword, rest))
			})
			.ok_or_else(invalid)?
	};

	let optional = rest.starts_with('?');
	let rest = rest.trim_start_matches('?');
	if !rest.starts_with('<') {
		return Err(invalid());
	}

	let mut depth = 0_usize;
	for (index, byte) in rest.bytes().enumerate() {
		match byte {
			b'<' => depth += 1,
			b'>' => depth = depth.saturating_sub(1),
			_ => {}
		}
		if depth == 0 {
			let comment = &rest[index + 1..];
			return Ok(Variable {
				name,
				expression: &rest[1..index],
				comment: comment.strip_prefix(' ').unwrap_or(comment),
				optional,
			});
		}
	}

	Err(invalid())
}

/// Metadata bullets (`* since:`, `* langs:` ...) found under a heading or
/// type line.
#[derive(Debug, Default)]
struct Metadata {
	since: Option<String>,
	extends: Option<String>,
	langs: Langs,
	experimental: bool,
	deprecated: Option<String>,
}

impl Metadata {
	/// Pull the metadata bullets out of `nodes`, returning the rest.
	fn extract(nodes: Vec<MarkdownNode>) -> DocResult<(Self, Vec<MarkdownNode>)> {
		let mut metadata = Self::default();
		let mut rest = Vec::with_capacity(nodes.len());

		for node in nodes {
			let MarkdownNode::ListItem {
				style: ListStyle::Bullet,
				text,
				children,
			} = &node
			else {
				rest.push(node);
				continue;
			};

			if let Some(since) = text.strip_prefix("since:") {
				metadata.since = Some(since.trim().to_string());
			} else if let Some(extends) = text.strip_prefix("extends:") {
				let extends = extends.trim();
				let extends = extends.strip_prefix('[').unwrap_or(extends);
				let extends = extends.strip_suffix(']').unwrap_or(extends);
				metadata.extends = Some(extends.to_string());
			} else if let Some(langs) = text.strip_prefix("langs:") {
				metadata.langs = parse_langs(langs, children)?;
			} else if text.trim() == "experimental" {
				metadata.experimental = true;
			} else if let Some(deprecated) = text.strip_prefix("deprecated:") {
				metadata.deprecated = Some(deprecated.trim().to_string());
			} else {
				rest.push(node);
			}
		}

		Ok((metadata, rest))
	}

	fn apply(self, member: &mut Member) {
		member.since = self.since;
		member.langs = self.langs;
		member.experimental = self.experimental;
		if let Some(deprecated) = self.deprecated {
			member.deprecated = true;
			member.docs.insert(0, MarkdownNode::Note {
				kind: "caution".to_string(),
				text: format!("**DEPRECATED** {deprecated}"),
			});
		}
	}
}

fn parse_langs(only: &str, children: &[MarkdownNode]) -> DocResult<Langs> {
	let mut langs = Langs::default();

	let only = only
		.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(Lang::from_str)
		.collect::<DocResult<Vec<_>>>()?;
	if !only.is_empty() {
		langs.only = Some(only);
	}

	for child in children {
		let Some(text) = child.inline_text() else {
			continue;
		};

		if let Some(rest) = text.strip_prefix("alias-") {
			let (lang, alias) = rest
				.split_once(':')
				.ok_or_else(|| DocError::InvalidArgument(text.to_string()))?;
			langs.aliases.set(Lang::from_str(lang)?, alias.trim().to_string());
		} else if let Some(rest) = text.strip_prefix("type-") {
			let (lang, expression) = rest
				.split_once(':')
				.ok_or_else(|| DocError::InvalidArgument(text.to_string()))?;
			let line = format!("type: {}", expression.trim());
			let variable = parse_variable(&line)?;
			langs
				.types
				.set(Lang::from_str(lang)?, Type::parse(variable.expression, Vec::new())?);
		}
	}

	Ok(langs)
}

fn is_type_line(node: &MarkdownNode) -> bool {
	matches!(node, MarkdownNode::ListItem { style: ListStyle::Default, text, .. } if text.starts_with('`'))
}

/// Build a property from a type line list item. Nested type lines become the
/// properties of an `Object` type.
fn parse_property(text: &str, children: Vec<MarkdownNode>) -> DocResult<Member> {
	let variable = parse_variable(text)?;
	let (metadata, children) = Metadata::extract(children)?;

	let mut properties = Vec::new();
	let mut docs = Vec::new();
	if !variable.comment.is_empty() {
		docs.push(MarkdownNode::text(variable.comment));
	}
	for child in children {
		if is_type_line(&child) {
			properties.push(parse_type_line(child)?);
		} else {
			docs.push(child);
		}
	}

	let ty = Type::parse(variable.expression, properties)?;
	let mut member = Member::property(variable.name, ty, !variable.optional).with_docs(docs);
	metadata.apply(&mut member);
	Ok(member)
}

fn parse_type_line(node: MarkdownNode) -> DocResult<Member> {
	match node {
		MarkdownNode::ListItem { text, children, .. } => parse_property(&text, children),
		other => {
			Err(DocError::InvalidArgument(
				other.inline_text().unwrap_or_default().to_string(),
			))
		}
	}
}

fn member_kind(prefix: &str) -> Option<(MemberKind, bool, bool)> {
	// (kind, async, required)
	match prefix {
		"event" => Some((MemberKind::Event, false, true)),
		"property" => Some((MemberKind::Property, false, true)),
		"method" => Some((MemberKind::Method, false, true)),
		"async method" => Some((MemberKind::Method, true, true)),
		"optional method" => Some((MemberKind::Method, false, false)),
		"optional async method" => Some((MemberKind::Method, true, false)),
		_ => None,
	}
}

struct ClassDraft {
	class: Class,
	members: Vec<Member>,
}

/// Collects classes, members and arguments across the files of one API
/// source directory.
#[derive(Default)]
pub struct ApiParser {
	drafts: Vec<ClassDraft>,
}

impl ApiParser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add the headings of one parsed file.
	pub fn parse_nodes(&mut self, nodes: Vec<MarkdownNode>) -> DocResult<()> {
		for node in nodes {
			if let MarkdownNode::Heading {
				level,
				text,
				children,
			} = node
			{
				self.parse_heading(level, &text, children)?;
			}
		}

		Ok(())
	}

	fn parse_heading(&mut self, level: usize, text: &str, children: Vec<MarkdownNode>) -> DocResult<()> {
		let (headings, content): (Vec<_>, Vec<_>) = children
			.into_iter()
			.partition(|child| matches!(child, MarkdownNode::Heading { .. }));

		match level {
			1 => self.parse_class(text, content)?,
			2 => self.parse_member(text, content)?,
			3 => self.parse_argument(text, content)?,
			_ => {}
		}

		self.parse_nodes(headings)
	}

	fn draft_mut(&mut self, class_name: &str, heading: &str) -> DocResult<&mut ClassDraft> {
		self.drafts
			.iter_mut()
			.find(|draft| draft.class.name == class_name)
			.ok_or_else(|| DocError::InvalidApiHeading(heading.to_string()))
	}

	fn parse_class(&mut self, heading: &str, content: Vec<MarkdownNode>) -> DocResult<()> {
		let name = heading
			.strip_prefix("class: ")
			.or_else(|| heading.strip_prefix("interface: "))
			.map(str::trim)
			.ok_or_else(|| DocError::InvalidApiHeading(heading.to_string()))?;
		let (metadata, docs) = Metadata::extract(content)?;

		if let Some(draft) = self.drafts.iter_mut().find(|draft| draft.class.name == name) {
			draft.class.docs.extend(docs);
			return Ok(());
		}

		let mut class = Class::new(name, metadata.extends, Vec::new());
		class.since = metadata.since;
		class.langs = metadata.langs;
		class.experimental = metadata.experimental;
		class.docs = docs;

		debug!(class = %name, "parsed class");
		self.drafts.push(ClassDraft {
			class,
			members: Vec::new(),
		});
		Ok(())
	}

	fn parse_member(&mut self, heading: &str, content: Vec<MarkdownNode>) -> DocResult<()> {
		let invalid = || DocError::InvalidApiHeading(heading.to_string());
		let (prefix, qualified) = heading.split_once(": ").ok_or_else(invalid)?;
		let (kind, is_async, required) = member_kind(prefix).ok_or_else(invalid)?;
		let (class_name, name) = qualified.trim().split_once('.').ok_or_else(invalid)?;

		let (metadata, content) = Metadata::extract(content)?;
		let type_keyword = match kind {
			MemberKind::Method => "returns: ",
			MemberKind::Property => "type: ",
			MemberKind::Event => "argument: ",
		};

		let mut ty = None;
		let mut docs = Vec::new();
		for node in content {
			match node {
				MarkdownNode::ListItem {
					style: ListStyle::Default,
					text,
					children,
				} if ty.is_none() && text.starts_with(type_keyword) => {
					let property = parse_property(&text, children)?;
					ty = property.r#type;
				}
				other => docs.push(other),
			}
		}

		let ty = match (kind, ty) {
			(_, Some(ty)) => ty,
			(MemberKind::Property, None) => {
				return Err(DocError::InvalidArgument(format!("{qualified} has no `- type:` line")));
			}
			(_, None) => Type::named("void")?,
		};

		let mut member = Member::new(kind, name, Some(ty)).with_docs(docs);
		member.r#async = is_async;
		member.required = required;
		metadata.apply(&mut member);

		self.draft_mut(class_name, heading)?.members.push(member);
		Ok(())
	}

	fn parse_argument(&mut self, heading: &str, content: Vec<MarkdownNode>) -> DocResult<()> {
		let invalid = || DocError::InvalidApiHeading(heading.to_string());
		let (prefix, qualified) = heading.split_once(": ").ok_or_else(invalid)?;
		let is_option = match prefix {
			"param" => false,
			"option" => true,
			_ => return Err(invalid()),
		};
		let mut parts = qualified.trim().splitn(3, '.');
		let (Some(class_name), Some(method_name), Some(_)) = (parts.next(), parts.next(), parts.next())
		else {
			return Err(invalid());
		};

		let (metadata, content) = Metadata::extract(content)?;
		let mut type_line = None;
		let mut docs = Vec::new();
		for node in content {
			if type_line.is_none() && is_type_line(&node) {
				type_line = Some(node);
			} else {
				docs.push(node);
			}
		}

		let type_line = type_line.ok_or_else(|| DocError::InvalidArgument(heading.to_string()))?;
		let mut arg = parse_type_line(type_line)?;
		let mut arg_docs = std::mem::take(&mut arg.docs);
		arg_docs.extend(docs);
		let mut arg = arg.with_docs(arg_docs);
		metadata.apply(&mut arg);

		let draft = self.draft_mut(class_name, heading)?;
		let method = draft
			.members
			.iter_mut()
			.rev()
			.find(|member| member.name == method_name)
			.ok_or_else(|| DocError::UndefinedMember(format!("{class_name}.{method_name}")))?;

		if is_option {
			arg.required = false;
			add_option(method, arg);
		} else {
			add_param(method, arg, heading)?;
		}

		Ok(())
	}

	/// Assemble the collected drafts into a model.
	pub fn finish(self) -> Documentation {
		let classes = self
			.drafts
			.into_iter()
			.map(|draft| {
				let ClassDraft { mut class, mut members } = draft;
				for member in &mut members {
					// `options` always comes last.
					if let Some(position) = member.args.iter().position(|arg| arg.name == "options") {
						let options = member.args.remove(position);
						member.args.push(options);
					}
				}
				class.set_members(members);
				class
			})
			.collect();

		Documentation::new(classes)
	}
}

fn add_option(method: &mut Member, option: Member) {
	let options = match method.args.iter().position(|arg| arg.name == "options") {
		Some(position) => &mut method.args[position],
		None => {
			method
				.args
				.push(Member::property("options", Type::object(Vec::new()), false));
			let last = method.args.len() - 1;
			&mut method.args[last]
		}
	};

	if let Some(ty) = options.r#type.as_mut() {
		ty.properties.get_or_insert_with(Vec::new).push(option);
	}
}

/// Add a parameter. A parameter documented a second time with `* langs:`
/// overrides the first one for those languages.
fn add_param(method: &mut Member, param: Member, heading: &str) -> DocResult<()> {
	let Some(position) = method.args.iter().position(|arg| arg.name == param.name) else {
		method.args.push(param);
		return Ok(());
	};
	let existing = &mut method.args[position];

	let Some(only) = param.langs.only.clone() else {
		return Err(DocError::TypeOverrideWithoutLang(heading.to_string()));
	};
	for lang in only {
		existing.langs.overrides.set(lang, Box::new(param.clone()));
	}

	Ok(())
}

/// Parse one API source directory into a model. Files are read in sorted
/// path order.
pub fn parse_api_dir(dir: &Path) -> DocResult<Documentation> {
	let mut parser = ApiParser::new();
	let files = collect_markdown_files(dir, &[])?;

	for path in &files {
		let content = std::fs::read_to_string(path)?;
		let nodes = markdown::parse(&content).map_err(|error| error.in_file(path.display()))?;
		parser
			.parse_nodes(nodes)
			.map_err(|error| error.in_file(path.display()))?;
	}

	let documentation = parser.finish();
	info!(
		dir = %dir.display(),
		files = files.len(),
		classes = documentation.classes().len(),
		"parsed api sources"
	);
	Ok(documentation)
}

/// Parse API source markdown held in memory.
pub fn parse_api(content: &str) -> DocResult<Documentation> {
	let mut parser = ApiParser::new();
	parser.parse_nodes(markdown::parse(content)?)?;
	Ok(parser.finish())
}
