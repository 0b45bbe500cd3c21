use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Captures;
use regex::Regex;

use super::Class;
use super::Member;
use crate::DocError;
use crate::DocResult;
use crate::markdown::MarkdownNode;
use crate::markdown::visit_all_mut;

/// A reference target handed to the [`LinkRenderer`].
#[derive(Debug, Clone, Copy)]
pub enum Link<'a> {
	Class(&'a Class),
	Member(&'a Member),
	/// A parameter, by display alias.
	Param(&'a str),
	/// An option property, by display alias.
	Option(&'a str),
}

type RenderFn = dyn Fn(Link<'_>) -> Option<String> + Send + Sync;

/// Turns a reference into markdown link text. Returning `None` keeps the
/// original reference text.
#[derive(Clone)]
pub struct LinkRenderer(Arc<RenderFn>);

impl LinkRenderer {
	pub fn new(render: impl Fn(Link<'_>) -> Option<String> + Send + Sync + 'static) -> Self {
		Self(Arc::new(render))
	}

	pub fn render(&self, link: Link<'_>) -> Option<String> {
		(self.0)(link)
	}
}

impl fmt::Debug for LinkRenderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("LinkRenderer")
	}
}

static MEMBER_REFERENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[`(\w+): ([^\]`]+)`\](?:\(([^)]*)\))?").unwrap());

static CLASS_REFERENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[(\w+)\](\(|:|\[)?").unwrap());

/// Rendered link text for every class and member, computed before docs are
/// rewritten in place.
#[derive(Debug, Default)]
pub(crate) struct LinkTargets {
	classes: HashMap<String, String>,
	members: HashMap<String, String>,
	known_members: HashSet<String>,
}

impl LinkTargets {
	pub(crate) fn collect(classes: &[Class], renderer: &LinkRenderer) -> Self {
		let mut targets = Self::default();

		for class in classes {
			if let Some(rendered) = renderer.render(Link::Class(class)) {
				targets.classes.insert(class.name.clone(), rendered);
			}

			for member in class.members() {
				let key = format!("{}: {}", member.kind.as_str(), member.qualified_name());
				if let Some(rendered) = renderer.render(Link::Member(member)) {
					targets.members.insert(key.clone(), rendered);
				}
				targets.known_members.insert(key);
			}
		}

		targets
	}
}

/// Parameter and option aliases of the method whose docs are being
/// rewritten.
#[derive(Debug, Default)]
pub(crate) struct LinkContext {
	method: Option<String>,
	params: HashMap<String, String>,
	options: HashMap<String, String>,
}

impl LinkContext {
	pub(crate) fn for_method(method: &Member) -> Self {
		let mut options: HashMap<String, String> = method
			.option_properties()
			.iter()
			.map(|option| (option.name.clone(), option.alias.clone()))
			.collect();
		// Expanded overloads stay reachable under the option's documented name.
		for option in method.option_properties() {
			if let Some(original) = &option.overload_of {
				options
					.entry(original.clone())
					.or_insert_with(|| original.clone());
			}
		}

		Self {
			method: Some(method.qualified_name()),
			params: method
				.args
				.iter()
				.map(|arg| (arg.name.clone(), arg.alias.clone()))
				.collect(),
			options,
		}
	}
}

/// Rewrite the references in every inline text of `nodes`. Code blocks are
/// left untouched.
pub(crate) fn render_links_in_nodes(
	nodes: &mut [MarkdownNode],
	targets: &LinkTargets,
	context: &LinkContext,
	renderer: &LinkRenderer,
) -> DocResult<()> {
	visit_all_mut(nodes, &mut |node| {
		if let Some(text) = node.inline_text_mut() {
			*text = render_links_in_line(text, targets, context, renderer)?;
		}
		Ok(())
	})
}

fn render_links_in_line(
	text: &str,
	targets: &LinkTargets,
	context: &LinkContext,
	renderer: &LinkRenderer,
) -> DocResult<String> {
	let mut error = None;
	let text = MEMBER_REFERENCE.replace_all(text, |captures: &Captures<'_>| {
		match render_member_reference(captures, targets, context, renderer) {
			Ok(rendered) => rendered,
			Err(reference_error) => {
				error.get_or_insert(reference_error);
				captures[0].to_string()
			}
		}
	});
	if let Some(error) = error {
		return Err(error);
	}

	let text = CLASS_REFERENCE.replace_all(&text, |captures: &Captures<'_>| {
		if captures.get(2).is_some() {
			return captures[0].to_string();
		}
		targets
			.classes
			.get(&captures[1])
			.cloned()
			.unwrap_or_else(|| captures[0].to_string())
	});

	Ok(text.into_owned())
}

fn render_member_reference(
	captures: &Captures<'_>,
	targets: &LinkTargets,
	context: &LinkContext,
	renderer: &LinkRenderer,
) -> DocResult<String> {
	let reference = &captures[0];
	let kind = &captures[1];
	let name = &captures[2];

	let rendered = render_validated_reference(reference, kind, name, targets, context, renderer)?;

	// An explicit href wins once the reference itself is known to be valid.
	if captures.get(3).is_some_and(|href| !href.as_str().is_empty()) {
		return Ok(reference.to_string());
	}

	Ok(rendered)
}

fn render_validated_reference(
	reference: &str,
	kind: &str,
	name: &str,
	targets: &LinkTargets,
	context: &LinkContext,
	renderer: &LinkRenderer,
) -> DocResult<String> {
	match kind {
		"event" | "method" | "property" => {
			let key = format!("{kind}: {name}");
			if !targets.known_members.contains(&key) {
				return Err(DocError::UndefinedMember(reference.to_string()));
			}
			Ok(targets
				.members
				.get(&key)
				.cloned()
				.unwrap_or_else(|| reference.to_string()))
		}
		"param" | "option" => {
			let aliases = if kind == "param" {
				&context.params
			} else {
				&context.options
			};
			let alias = match &context.method {
				Some(method) => {
					aliases.get(name).map(String::as_str).ok_or_else(|| {
						DocError::UndefinedParam {
							param: reference.to_string(),
							method: method.clone(),
						}
					})?
				}
				None => name,
			};
			let link = if kind == "param" {
				Link::Param(alias)
			} else {
				Link::Option(alias)
			};
			Ok(renderer
				.render(link)
				.unwrap_or_else(|| reference.to_string()))
		}
		_ => Err(DocError::UnknownLinkKind(reference.to_string())),
	}
}
