use serde::Serialize;

use super::FilterOptions;
use super::Member;
use crate::DocError;
use crate::DocResult;
use crate::Lang;
use crate::type_expr::ParsedType;
use crate::type_expr::is_string_union;
use crate::type_expr::parse_type_expression;
use crate::type_expr::unescape_parens;

/// A resolved type in the API model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
	pub name: String,
	/// Only present on `Object` types.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<Vec<Member>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub union: Option<Vec<Type>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub args: Option<Vec<Type>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub return_type: Option<Box<Type>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub templates: Option<Vec<Type>>,
	/// The source expression this type was parsed from.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expression: Option<String>,
}

fn strip_link_brackets(name: &str) -> &str {
	let name = name.trim();
	let name = name.strip_prefix('[').unwrap_or(name);
	name.strip_suffix(']').unwrap_or(name)
}

impl Type {
	/// Create a named type. `[Name]` link brackets are stripped. The bare
	/// name `number` is rejected: sources must say `int` or `float`.
	pub fn named(name: &str) -> DocResult<Self> {
		let name = strip_link_brackets(name);
		if name == "number" {
			return Err(DocError::NumberType(name.to_string()));
		}

		Ok(Self {
			name: name.to_string(),
			properties: (name == "Object").then(Vec::new),
			..Self::default()
		})
	}

	/// An `Object` type with the given properties.
	pub fn object(properties: Vec<Member>) -> Self {
		Self {
			name: "Object".to_string(),
			properties: Some(properties),
			..Self::default()
		}
	}

	/// Parse a source type expression, attaching `properties` to every
	/// `Object` inside it, so `[Array]<[Object]>` and `[null]|[Object]` keep
	/// their documented fields.
	pub fn parse(expression: &str, properties: Vec<Member>) -> DocResult<Self> {
		let unescaped = unescape_parens(expression);
		let parsed = parse_type_expression(&unescaped);
		let mut ty = Self::from_parsed(&parsed, false)
			.map_err(|error| attach_expression(error, expression))?;

		if !properties.is_empty() && !ty.attach_properties(&properties) {
			return Err(DocError::PropertiesOnNonObject(expression.to_string()));
		}
		ty.expression = Some(expression.to_string());

		Ok(ty)
	}

	/// Returns whether any `Object` took the properties.
	fn attach_properties(&mut self, properties: &[Member]) -> bool {
		let mut attached = false;
		if self.name == "Object" {
			self.properties = Some(properties.to_vec());
			attached = true;
		}
		for nested in [&mut self.union, &mut self.args, &mut self.templates]
			.into_iter()
			.flatten()
			.flatten()
		{
			attached |= nested.attach_properties(properties);
		}
		if let Some(ret) = &mut self.return_type {
			attached |= ret.attach_properties(properties);
		}
		attached
	}

	fn from_parsed(parsed: &ParsedType, in_union: bool) -> DocResult<Self> {
		if !in_union && parsed.union_name.is_none() && is_string_union(parsed) {
			return Err(DocError::AnonymousEnum(
				parsed
					.union_chain()
					.map(|ty| ty.name.as_str())
					.collect::<Vec<_>>()
					.join("|"),
			));
		}

		if !in_union && parsed.union.is_some() {
			let mut ty = Self {
				name: parsed
					.union_name
					.as_deref()
					.map(strip_link_brackets)
					.unwrap_or_default()
					.to_string(),
				..Self::default()
			};
			let mut union = Vec::new();

			for (index, alternative) in parsed.union_chain().enumerate() {
				let nested = alternative.union_name.is_some() && index > 0;
				union.push(Self::from_parsed(alternative, !nested)?);
				if nested {
					break;
				}
			}

			ty.union = Some(union);
			return Ok(ty);
		}

		if parsed.args.is_some() || parsed.ret_type.is_some() {
			let mut ty = Self::named("function")?;
			let mut args = Vec::new();

			if let Some(first) = parsed.args.as_deref() {
				for arg in first.next_chain().filter(|arg| !arg.name.is_empty()) {
					args.push(Self::from_parsed(arg, false)?);
				}
			}

			ty.args = Some(args);
			ty.return_type = match parsed.ret_type.as_deref() {
				Some(ret) => Some(Box::new(Self::from_parsed(ret, false)?)),
				None => None,
			};
			return Ok(ty);
		}

		if let Some(first) = parsed.template.as_deref() {
			let mut ty = Self::named(&parsed.name)?;
			let templates = first
				.next_chain()
				.map(|template| Self::from_parsed(template, false))
				.collect::<DocResult<Vec<_>>>()?;
			ty.templates = Some(templates);
			return Ok(ty);
		}

		Self::named(&parsed.name)
	}

	/// Whether this is a quoted string literal such as `"load"`.
	pub fn is_string_literal(&self) -> bool {
		self.name.len() >= 2 && self.name.starts_with('"') && self.name.ends_with('"')
	}

	/// The literal value without quotes, when this is a string literal.
	pub fn literal_value(&self) -> Option<String> {
		if !self.is_string_literal() {
			return None;
		}

		snailquote::unescape(&self.name)
			.ok()
			.or_else(|| Some(self.name[1..self.name.len() - 1].to_string()))
	}

	/// A union made only of string literals, i.e. a named enum.
	pub fn is_string_enum(&self) -> bool {
		self.union
			.as_ref()
			.is_some_and(|union| !union.is_empty() && union.iter().all(Type::is_string_literal))
	}

	/// A union of exactly one real type and `null`.
	pub fn is_nullable_wrapper(&self) -> bool {
		self.union.as_ref().is_some_and(|union| {
			union.len() == 2 && union.iter().filter(|ty| ty.name == "null").count() == 1
		})
	}

	pub fn is_function(&self) -> bool {
		self.name == "function"
	}

	/// Visit this type and every nested type, depth first.
	pub fn visit<'a>(&'a self, visitor: &mut impl FnMut(&'a Type)) {
		visitor(self);
		for nested in [&self.union, &self.args, &self.templates]
			.into_iter()
			.flatten()
			.flatten()
		{
			nested.visit(visitor);
		}
		if let Some(ret) = &self.return_type {
			ret.visit(visitor);
		}
		for property in self.properties.iter().flatten() {
			if let Some(ty) = &property.r#type {
				ty.visit(visitor);
			}
		}
	}

	/// The properties of the first nested `Object` type that has any.
	pub fn deep_properties(&self) -> Option<&[Member]> {
		let mut found = None;
		self.visit(&mut |ty| {
			if found.is_none() {
				if let Some(properties) = ty.properties.as_deref() {
					if !properties.is_empty() {
						found = Some(properties);
					}
				}
			}
		});
		found
	}

	/// Properties sorted by name.
	pub fn sorted_properties(&self) -> Vec<&Member> {
		let mut properties: Vec<&Member> = self.properties.iter().flatten().collect();
		properties.sort_by(|a, b| a.name.cmp(&b.name));
		properties
	}

	pub(crate) fn filter_for_language(&mut self, lang: Lang, options: &FilterOptions) -> DocResult<()> {
		if let Some(properties) = self.properties.take() {
			let mut filtered = Vec::with_capacity(properties.len());
			for mut property in properties {
				if !property.langs.includes(lang) {
					continue;
				}
				property.filter_for_language(lang, options)?;
				filtered.push(property);
			}
			self.properties = Some(filtered);
		}

		for nested in [&mut self.union, &mut self.args, &mut self.templates]
			.into_iter()
			.flatten()
			.flatten()
		{
			nested.filter_for_language(lang, options)?;
		}
		if let Some(ret) = &mut self.return_type {
			ret.filter_for_language(lang, options)?;
		}

		Ok(())
	}

	pub(crate) fn filter_out_experimental(&mut self) {
		if let Some(properties) = &mut self.properties {
			properties.retain(|property| !property.experimental);
			for property in properties {
				property.filter_out_experimental();
			}
		}

		for nested in [&mut self.union, &mut self.args, &mut self.templates]
			.into_iter()
			.flatten()
			.flatten()
		{
			nested.filter_out_experimental();
		}
	}
}

fn attach_expression(error: DocError, expression: &str) -> DocError {
	match error {
		DocError::AnonymousEnum(_) => DocError::AnonymousEnum(expression.to_string()),
		DocError::NumberType(_) => DocError::NumberType(expression.to_string()),
		other => other,
	}
}
