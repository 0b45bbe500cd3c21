use super::Direction;
use super::FormattedMember;
use super::Formatter;
use super::assertion_subject;
use super::bracketed_signature;
use super::link;
use super::var_name;
use crate::DocResult;
use crate::Lang;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::Type;

/// JavaScript and TypeScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsFormatter;

impl JsFormatter {
	pub fn new() -> Self {
		Self
	}

	fn prefix(&self, member: &Member) -> String {
		match assertion_subject(&member.class_name) {
			Some(subject) => format!("expect({subject})."),
			None => format!("{}.", var_name(&member.class_name)),
		}
	}

	fn render_name(&self, name: &str) -> String {
		match name {
			"int" | "float" => link("number"),
			"path" => link("string"),
			_ => link(name),
		}
	}
}

impl Formatter for JsFormatter {
	fn lang(&self) -> Lang {
		Lang::Js
	}

	fn format_member(&self, member: &Member) -> DocResult<Vec<FormattedMember>> {
		let prefix = self.prefix(member);
		let signature = match member.kind {
			MemberKind::Property => format!("{prefix}{}", member.alias),
			MemberKind::Event => format!("{prefix}on('{}')", member.alias),
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

	fn format_template(&self, inner: &str) -> String {
		format!("<{inner}>")
	}

	fn format_function(&self, args: &str, ret: Option<&str>, _ty: &Type) -> String {
		let mut rendered = link("function");
		if !args.is_empty() {
			rendered.push_str(&format!("({args})"));
		}
		if let Some(ret) = ret {
			rendered.push_str(&format!(":{ret}"));
		}
		rendered
	}

	fn format_promise(&self, text: &str) -> String {
		format!("{}<{text}>", link("Promise"))
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
			let args = ty
				.args
				.iter()
				.flatten()
				.map(|arg| self.render_type(arg, direction, member))
				.collect::<DocResult<Vec<_>>>()?
				.join(", ");
			let ret = match &ty.return_type {
				Some(ret) => Some(self.render_type(ret, direction, member)?),
				None => None,
			};
			return Ok(self.format_function(&args, ret.as_deref(), ty));
		}

		let mut rendered = self.render_name(&ty.name);
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
