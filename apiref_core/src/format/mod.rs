//! Per-language rendering of member signatures and types.
//!
//! Types render as bracketed link references (`[string]`) so the appended
//! link definitions turn them into hyperlinks. Unions are joined with `|`
//! and string literals are kept verbatim.

use std::collections::HashSet;

use crate::DocResult;
use crate::Lang;
use crate::documentation::Class;
use crate::documentation::Member;
use crate::documentation::Type;
use crate::markdown::MarkdownNode;

pub use self::csharp::CsharpFormatter;
pub use self::java::JavaFormatter;
pub use self::js::JsFormatter;
pub use self::python::PythonFormatter;

mod csharp;
mod java;
mod js;
mod python;

/// Whether a type is rendered for a value passed in or handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Input,
	Output,
}

/// One rendered signature. Languages that expand overloads return several.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMember {
	pub signature: String,
	/// The arguments to document for this signature, in display order.
	pub args: Vec<Member>,
}

pub trait Formatter: Send + Sync {
	fn lang(&self) -> Lang;

	fn format_member(&self, member: &Member) -> DocResult<Vec<FormattedMember>>;

	fn format_argument_name(&self, name: &str) -> String;

	/// The display name of an option property.
	fn format_option_name(&self, name: &str) -> String {
		self.format_argument_name(name)
	}

	/// Wrap rendered generic parameters, e.g. `<[string]>`.
	fn format_template(&self, inner: &str) -> String;

	fn format_function(&self, args: &str, ret: Option<&str>, ty: &Type) -> String;

	fn format_promise(&self, text: &str) -> String;

	fn render_type(&self, ty: &Type, direction: Direction, member: &Member) -> DocResult<String>;

	fn preprocess_comment(&self, docs: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
		docs
	}

	fn format_class_link(&self, class: &Class) -> String {
		format!("[{}]", class.alias)
	}

	fn format_member_link(&self, member: &Member, href: &str) -> DocResult<String> {
		let signature = self
			.format_member(member)?
			.into_iter()
			.next()
			.map(|formatted| formatted.signature)
			.unwrap_or_else(|| member.alias.clone());
		Ok(format!("[{signature}]({href})"))
	}

	fn format_param_link(&self, alias: &str) -> String {
		format!("`{}`", self.format_argument_name(alias))
	}

	fn format_option_link(&self, alias: &str) -> String {
		format!("`{}`", self.format_option_name(alias))
	}
}

/// The formatter for `lang`. `known_classes` are the class names types may
/// refer to; Java and C# reject any other name they have no mapping for.
pub fn formatter_for(lang: Lang, known_classes: HashSet<String>) -> Box<dyn Formatter> {
	match lang {
		Lang::Js => Box::new(JsFormatter::new()),
		Lang::Python => Box::new(PythonFormatter::new()),
		Lang::Java => Box::new(JavaFormatter::new(known_classes)),
		Lang::Csharp => Box::new(CsharpFormatter::new(known_classes)),
	}
}

/// `[name]`
pub(crate) fn link(name: &str) -> String {
	format!("[{name}]")
}

/// Upper-case the first character.
pub fn to_title_case(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Split an identifier into lowercase words at case changes and at `-`,
/// `_`, `.`, `#` and spaces. `APIRequest` yields `api`, `request`.
fn words(name: &str) -> Vec<String> {
	let chars: Vec<char> = name.chars().collect();
	let mut words = Vec::new();
	let mut current = String::new();

	for (index, &c) in chars.iter().enumerate() {
		if !c.is_alphanumeric() {
			if !current.is_empty() {
				words.push(std::mem::take(&mut current));
			}
			continue;
		}

		if c.is_uppercase() && !current.is_empty() {
			let previous = chars[index - 1];
			let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
			if previous.is_lowercase() || previous.is_ascii_digit() || (previous.is_uppercase() && next_is_lower) {
				words.push(std::mem::take(&mut current));
			}
		}

		current.extend(c.to_lowercase());
	}

	if !current.is_empty() {
		words.push(current);
	}

	words
}

/// `colorScheme` to `color_scheme`.
pub fn to_snake_case(name: &str) -> String {
	words(name).join("_")
}

/// `no-preference` or `colorScheme` to `NoPreference` / `ColorScheme`.
pub fn to_pascal_case(name: &str) -> String {
	words(name).iter().map(|word| to_title_case(word)).collect()
}

/// `BrowserContext` to `browser-context`.
pub fn to_kebab_case(name: &str) -> String {
	words(name).join("-")
}

/// The variable a class instance is conventionally held in: `page` for
/// `Page`, `apiRequest` for `APIRequest`.
pub fn var_name(class_name: &str) -> String {
	let mut words = words(class_name).into_iter();
	let Some(first) = words.next() else {
		return String::new();
	};
	std::iter::once(first)
		.chain(words.map(|word| to_title_case(&word)))
		.collect()
}

/// For `*Assertions` classes, the class of the value under test.
pub(crate) fn assertion_subject(class_name: &str) -> Option<&'static str> {
	let subject = class_name.strip_suffix("Assertions")?;
	Some(match subject {
		"Locator" => "locator",
		"Page" => "page",
		"APIResponse" => "response",
		_ => "value",
	})
}

/// Partition a union into its string literals and everything else.
pub(crate) fn split_literals(union: &[Type]) -> (Vec<&Type>, Vec<&Type>) {
	union.iter().partition(|ty| ty.is_string_literal())
}

/// The name of the enum generated for string literals: the union's own name
/// if it has one, else the member's alias.
pub(crate) fn enum_name(ty: &Type, member: &Member) -> String {
	if ty.name.is_empty() {
		to_pascal_case(&member.alias)
	} else {
		to_pascal_case(&ty.name)
	}
}

/// The literal values of `literals` without quotes.
pub(crate) fn literal_values(literals: &[&Type]) -> Vec<String> {
	literals.iter().filter_map(|ty| ty.literal_value()).collect()
}

/// Replace inline code spans in comment text, keeping code blocks as they
/// are.
pub(crate) fn replace_in_comment(
	mut docs: Vec<MarkdownNode>,
	replacements: &[(&str, &str)],
) -> Vec<MarkdownNode> {
	fn walk(nodes: &mut [MarkdownNode], replacements: &[(&str, &str)]) {
		for node in nodes {
			if let Some(text) = node.inline_text_mut() {
				for (from, to) in replacements {
					if text.contains(from) {
						*text = text.replace(from, to);
					}
				}
			}
			if let Some(children) = node.children_mut() {
				walk(children, replacements);
			}
		}
	}

	walk(&mut docs, replacements);
	docs
}

/// `name(a[, b, c])`: optional arguments after the first optional one are
/// wrapped in brackets.
pub(crate) fn bracketed_signature(args: &[&str], required: &[bool]) -> String {
	let mut signature = String::new();
	let mut has_optional = false;

	for (index, (name, required)) in args.iter().zip(required).enumerate() {
		let optional = !required;
		let separator = if index == 0 { "" } else { ", " };
		if optional && !has_optional {
			signature.push('[');
		}
		signature.push_str(separator);
		signature.push_str(name);
		has_optional = has_optional || optional;
	}

	if has_optional {
		signature.push(']');
	}

	signature
}
