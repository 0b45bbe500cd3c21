use std::collections::HashSet;

use super::Direction;
use super::FormattedMember;
use super::Formatter;
use super::bracketed_signature;
use super::enum_name;
use super::link;
use super::literal_values;
use super::split_literals;
use super::to_pascal_case;
use super::to_title_case;
use super::var_name;
use crate::DocError;
use crate::DocResult;
use crate::Lang;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::Type;

/// Callback parameters that have a dedicated functional interface, keyed by
/// `Class.method.param`.
const FUNCTION_OVERRIDES: [(&str, &str); 4] = [
	("BrowserContext.exposeBinding.callback", "BindingCallback"),
	("BrowserContext.exposeFunction.callback", "FunctionCallback"),
	("Page.exposeBinding.callback", "BindingCallback"),
	("Page.exposeFunction.callback", "FunctionCallback"),
];

/// Names rendered as they are without being declared as classes.
const PASS_THROUGH: [&str; 6] = ["void", "null", "int", "boolean", "Error", "Date"];

/// Java.
#[derive(Debug, Clone, Default)]
pub struct JavaFormatter {
	known_classes: HashSet<String>,
}

impl JavaFormatter {
	pub fn new(known_classes: HashSet<String>) -> Self {
		Self { known_classes }
	}

	fn prefix(&self, member: &Member) -> String {
		match member.class_name.strip_suffix("Assertions") {
			Some(subject) => format!("assertThat({}).", var_name(subject)),
			None => format!("{}.", var_name(&member.class_name)),
		}
	}

	fn render_name(&self, ty: &Type, member: &Member) -> DocResult<String> {
		let name = ty.name.as_str();
		let rendered = match name {
			"any" | "Serializable" => link("Object"),
			"Array" => link("List"),
			"float" => link("double"),
			"path" => link("Path"),
			"RegExp" => link("Pattern"),
			"string" | "URL" => link("String"),
			"Buffer" => link("byte[]"),
			"Readable" => link("InputStream"),
			"Object" if ty.templates.is_some() => link("Map"),
			"Object" if ty.properties.as_ref().is_some_and(|properties| !properties.is_empty()) => {
				link(&to_pascal_case(&member.alias))
			}
			"Object" => link("Object"),
			_ if PASS_THROUGH.contains(&name) || self.known_classes.contains(name) => link(name),
			_ => {
				return Err(DocError::UnmappedType {
					name: name.to_string(),
					lang: Lang::Java.to_string(),
				});
			}
		};

		Ok(rendered)
	}

	fn render_function(&self, ty: &Type, direction: Direction, member: &Member) -> DocResult<String> {
		let key = format!(
			"{}.{}",
			member.enclosing_method.as_deref().unwrap_or(&member.class_name),
			member.name
		);
		if let Some((_, name)) = FUNCTION_OVERRIDES.iter().find(|(candidate, _)| *candidate == key) {
			return Ok(link(name));
		}

		let args = ty.args.as_deref().unwrap_or_default();
		let arg = match args {
			[] => String::new(),
			[arg] => self.render_type(arg, direction, member)?,
			_ => {
				return Err(DocError::UnsupportedArity {
					lang: Lang::Java.to_string(),
					arity: args.len(),
					context: key,
				});
			}
		};

		Ok(self.format_function(&arg, None, ty))
	}
}

impl Formatter for JavaFormatter {
	fn lang(&self) -> Lang {
		Lang::Java
	}

	fn format_member(&self, member: &Member) -> DocResult<Vec<FormattedMember>> {
		let prefix = self.prefix(member);
		let signature = match member.kind {
			MemberKind::Property => format!("{prefix}{}()", member.alias),
			MemberKind::Event => format!("{prefix}on{}(handler)", to_title_case(&member.alias)),
			MemberKind::Method => {
				let names: Vec<&str> = member.args.iter().map(|arg| arg.alias.as_str()).collect();
				let required: Vec<bool> = member.args.iter().map(|arg| arg.required).collect();
				format!("{prefix}{}({})", member.alias, bracketed_signature(&names, &required))
			}
		};

		Ok(vec![FormattedMember {
			signature,
			args: member.args.clone(),
		}])
	}

	fn format_argument_name(&self, name: &str) -> String {
		name.to_string()
	}

	fn format_option_name(&self, name: &str) -> String {
		format!("set{}", to_title_case(name))
	}

	fn format_template(&self, inner: &str) -> String {
		format!("<{inner}>")
	}

	fn format_function(&self, args: &str, _ret: Option<&str>, ty: &Type) -> String {
		if args.is_empty() {
			return link("Runnable");
		}

		let returns_boolean = ty.return_type.as_ref().is_some_and(|ret| ret.name == "boolean");
		let interface = if returns_boolean { "Predicate" } else { "Consumer" };
		format!("{}{}", link(interface), self.format_template(args))
	}

	fn format_promise(&self, text: &str) -> String {
		text.to_string()
	}

	fn render_type(&self, ty: &Type, direction: Direction, member: &Member) -> DocResult<String> {
		if let Some(union) = &ty.union {
			let (literals, others) = split_literals(union);
			let mut parts = Vec::new();

			if !literals.is_empty() {
				let values = literal_values(&literals)
					.iter()
					.map(|value| value.to_uppercase().replace('-', "_"))
					.collect::<Vec<_>>()
					.join(", ");
				parts.push(format!("[enum {} {{ {values} }}]", enum_name(ty, member)));
			}

			for other in others.into_iter().filter(|other| other.name != "null") {
				parts.push(self.render_type(other, direction, member)?);
			}

			return Ok(parts.join("|"));
		}

		if ty.is_string_literal() {
			return Ok(ty.name.clone());
		}

		if ty.is_function() {
			return self.render_function(ty, direction, member);
		}

		let mut rendered = self.render_name(ty, member)?;
		if let Some(templates) = &ty.templates {
			let inner = templates
				.iter()
				.map(|template| self.render_type(template, direction, member))
				.collect::<DocResult<Vec<_>>>()?
				.join(", ");
			rendered.push_str(&self.format_template(&inner));
		}

		Ok(rendered)
	}
}
