use super::Direction;
use super::FormattedMember;
use super::Formatter;
use super::assertion_subject;
use super::link;
use super::replace_in_comment;
use super::to_snake_case;
use crate::DocResult;
use crate::Lang;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::Type;
use crate::markdown::MarkdownNode;

/// Python, sync API.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl PythonFormatter {
	pub fn new() -> Self {
		Self
	}

	fn prefix(&self, member: &Member) -> String {
		match assertion_subject(&member.class_name) {
			Some(subject) => format!("expect({subject})."),
			None => format!("{}.", to_snake_case(&member.class_name)),
		}
	}

	fn render_name(&self, name: &str, direction: Direction) -> String {
		match name {
			"any" | "Serializable" => link("Any"),
			"boolean" => link("bool"),
			"string" | "URL" => link("str"),
			"Buffer" => link("bytes"),
			"RegExp" => link("Pattern"),
			"null" => link("NoneType"),
			"Object" => link("Dict"),
			"Array" => link("List"),
			"function" => link("Callable"),
			"Readable" => format!("{}{}", link("IO"), self.format_template(&link("bytes"))),
			"path" => {
				match direction {
					Direction::Input => {
						format!(
							"{}{}",
							link("Union"),
							self.format_template(&format!("{}, {}", link("str"), link("pathlib.Path")))
						)
					}
					Direction::Output => link("pathlib.Path"),
				}
			}
			_ => link(name),
		}
	}
}

/// Python spellings of member names that are not plain snake case.
fn python_name(name: &str) -> String {
	match name {
		"$" => "query_selector".to_string(),
		"$$" => "query_selector_all".to_string(),
		"$eval" => "eval_on_selector".to_string(),
		"$$eval" => "eval_on_selector_all".to_string(),
		_ => to_snake_case(name),
	}
}

impl Formatter for PythonFormatter {
	fn lang(&self) -> Lang {
		Lang::Python
	}

	fn format_member(&self, member: &Member) -> DocResult<Vec<FormattedMember>> {
		let prefix = self.prefix(member);
		let name = python_name(&member.alias);

		// Options are documented as keyword arguments next to the parameters.
		let mut args = Vec::with_capacity(member.args.len());
		for arg in &member.args {
			if arg.name == "options" {
				args.extend(arg.r#type.iter().flat_map(|ty| ty.sorted_properties()).cloned());
			} else {
				args.push(arg.clone());
			}
		}

		let signature = match member.kind {
			MemberKind::Property => format!("{prefix}{name}"),
			MemberKind::Event => format!("{prefix}on(\"{}\")", member.alias.to_lowercase()),
			MemberKind::Method if args.is_empty() && !member.r#async => format!("{prefix}{name}"),
			MemberKind::Method => {
				let mut parts: Vec<String> = args
					.iter()
					.filter(|arg| arg.required)
					.map(|arg| self.format_argument_name(&arg.alias))
					.collect();
				if args.iter().any(|arg| !arg.required) {
					parts.push("**kwargs".to_string());
				}
				format!("{prefix}{name}({})", parts.join(", "))
			}
		};

		Ok(vec![FormattedMember { signature, args }])
	}

	fn format_argument_name(&self, name: &str) -> String {
		to_snake_case(name)
	}

	fn format_template(&self, inner: &str) -> String {
		format!("\\[{inner}\\]")
	}

	fn format_function(&self, _args: &str, _ret: Option<&str>, _ty: &Type) -> String {
		link("Callable")
	}

	fn format_promise(&self, text: &str) -> String {
		text.to_string()
	}

	fn render_type(&self, ty: &Type, direction: Direction, member: &Member) -> DocResult<String> {
		if let Some(union) = &ty.union {
			return Ok(union
				.iter()
				.map(|alternative| self.render_type(alternative, direction, member))
				.collect::<DocResult<Vec<_>>>()?
				.join("|"));
		}

		if ty.is_string_literal() {
			return Ok(ty.name.clone());
		}

		if ty.is_function() {
			return Ok(self.format_function("", None, ty));
		}

		let mut rendered = self.render_name(&ty.name, direction);
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

	fn preprocess_comment(&self, docs: Vec<MarkdownNode>) -> Vec<MarkdownNode> {
		replace_in_comment(docs, &[
			("`null`", "`None`"),
			("`true`", "`True`"),
			("`false`", "`False`"),
		])
	}
}
