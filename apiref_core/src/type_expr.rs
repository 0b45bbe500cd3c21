//! Parser for the compact type grammar used in API sources, e.g.
//! `Array<string>|Object<string, int>` or `function(Request):boolean`.
//!
//! This is a single forward scan with bracket counting, not a tokenizer:
//! angle brackets and parentheses inside string literals are counted like
//! any other character. Literal parentheses must be escaped as `\(` and `\)`
//! in source text and are unescaped by [`unescape_parens`] before parsing.

use serde::Serialize;

/// A node in the type expression AST.
///
/// Sibling alternatives are chained through `union`; sibling entries of a
/// template or argument list are chained through `next`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedType {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub args: Option<Box<ParsedType>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ret_type: Option<Box<ParsedType>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub template: Option<Box<ParsedType>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub union: Option<Box<ParsedType>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub next: Option<Box<ParsedType>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub union_name: Option<String>,
}

impl ParsedType {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn is_string_literal(&self) -> bool {
		self.name.len() >= 2 && self.name.starts_with('"') && self.name.ends_with('"')
	}

	/// Iterate this node and every alternative chained through `union`.
	pub fn union_chain(&self) -> impl Iterator<Item = &ParsedType> {
		std::iter::successors(Some(self), |ty| ty.union.as_deref())
	}

	/// Iterate this node and every sibling chained through `next`.
	pub fn next_chain(&self) -> impl Iterator<Item = &ParsedType> {
		std::iter::successors(Some(self), |ty| ty.next.as_deref())
	}
}

/// `true` when the type is a union made only of quoted string literals.
pub fn is_string_union(ty: &ParsedType) -> bool {
	ty.union.is_some() && ty.union_chain().all(ParsedType::is_string_literal)
}

/// Replace the `\(` and `\)` escapes used in source text.
pub fn unescape_parens(expression: &str) -> String {
	expression.replace("\\(", "(").replace("\\)", ")")
}

/// Returns the length of the bracketed prefix of `text`, which must start
/// with `open`. For unbalanced input this is the length of `text`.
fn matching_bracket(text: &str, open: u8, close: u8) -> usize {
	let bytes = text.as_bytes();
	let mut depth = 1;
	let mut index = 1;

	while index < bytes.len() && depth > 0 {
		if bytes[index] == open {
			depth += 1;
		} else if bytes[index] == close {
			depth -= 1;
		}
		index += 1;
	}

	index
}

fn bracket_contents(expression: &str, start: usize, length: usize) -> &str {
	let end = (start + length).saturating_sub(1).max(start + 1);
	expression.get(start + 1..end).unwrap_or_default()
}

/// Parse a type expression.
///
/// A generic whose parameters are all string literals is promoted to a named
/// enum: `Color<"red"|"blue">` yields the literal union with `union_name`
/// set to `Color`.
pub fn parse_type_expression(expression: &str) -> ParsedType {
	let expression = expression.trim();
	let bytes = expression.as_bytes();
	let mut name = expression.to_string();
	let mut next = None;
	let mut template = None;
	let mut args = None;
	let mut ret_type = None;
	let mut first_type_length = expression.len();
	let mut index = 0;

	while index < bytes.len() {
		match bytes[index] {
			b'<' => {
				name = expression[..index].to_string();
				let length = matching_bracket(&expression[index..], b'<', b'>');
				template = Some(Box::new(parse_type_expression(bracket_contents(
					expression, index, length,
				))));
				first_type_length = (index + length).min(expression.len());
				break;
			}
			b'(' => {
				name = expression[..index].to_string();
				let length = matching_bracket(&expression[index..], b'(', b')');
				args = Some(Box::new(parse_type_expression(bracket_contents(
					expression, index, length,
				))));
				index += length;

				match bytes.get(index) {
					Some(b':') => {
						let mut ret = parse_type_expression(&expression[index + 1..]);
						next = ret.next.take();
						ret_type = Some(Box::new(ret));
						break;
					}
					Some(b'|' | b',') => {
						first_type_length = index;
						break;
					}
					_ => continue,
				}
			}
			b'|' | b',' => {
				name = expression[..index].to_string();
				first_type_length = index;
				break;
			}
			_ => {}
		}
		index += 1;
	}

	let mut union = None;
	match bytes.get(first_type_length) {
		Some(b'|') => {
			union = Some(Box::new(parse_type_expression(
				&expression[first_type_length + 1..],
			)));
		}
		Some(b',') => {
			next = Some(Box::new(parse_type_expression(
				&expression[first_type_length + 1..],
			)));
		}
		_ => {}
	}

	if let Some(mut literals) = template.take() {
		if literals.union_name.is_none() && is_string_union(&literals) {
			// The enum node takes the generic's place in any enclosing list.
			// Alternatives after a promoted enum are not kept.
			literals.union_name = Some(name.trim().to_string());
			literals.next = next;
			return *literals;
		}
		template = Some(literals);
	}

	ParsedType {
		name: name.trim().to_string(),
		args,
		ret_type,
		template,
		union,
		next,
		union_name: None,
	}
}
