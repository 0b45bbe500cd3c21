use std::collections::HashSet;

use super::Direction;
use super::FormattedMember;
use super::Formatter;
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

const PASS_THROUGH: [&str; 6] = ["void", "null", "int", "float", "Exception", "DateTime"];

/// Largest callback arity expressible as `Action<...>` / `Func<...>` here.
const MAX_CALLBACK_ARITY: usize = 3;

/// C#.
#[derive(Debug, Clone, Default)]
pub struct CsharpFormatter {
	known_classes: HashSet<String>,
}

impl CsharpFormatter {
	pub fn new(known_classes: HashSet<String>) -> Self {
		Self { known_classes }
	}

	fn prefix(&self, member: &Member) -> String {
		if let Some(subject) = member.class_name.strip_suffix("Assertions") {
			return format!("Expect({}).", to_pascal_case(subject));
		}
		match member.kind {
			MemberKind::Property => format!("{}.", member.class_name),
			MemberKind::Method | MemberKind::Event => format!("{}.", var_name(&member.class_name)),
		}
	}

	fn member_name(&self, member: &Member) -> String {
		let name = match member.alias.as_str() {
			"$" => "QuerySelector".to_string(),
			"$$" => "QuerySelectorAll".to_string(),
			"$eval" => "EvalOnSelector".to_string(),
			"$$eval" => "EvalOnSelectorAll".to_string(),
			alias => to_title_case(alias),
		};

		if member.is_method() && member.r#async {
			format!("{name}Async")
		} else {
			name
		}
	}

	fn render_name(&self, ty: &Type, member: &Member) -> DocResult<String> {
		let name = ty.name.as_str();
		let rendered = match name {
			"any" | "Serializable" => link("object"),
			"Array" => link("IEnumerable"),
			"boolean" => link("bool"),
			"path" | "string" | "URL" => link("string"),
			"RegExp" => link("Regex"),
			"Buffer" => link("byte[]"),
			"Readable" => link("Stream"),
			"Object" if ty.templates.is_some() => link("IDictionary"),
			"Object" if ty.properties.as_ref().is_some_and(|properties| !properties.is_empty()) => {
				link(&to_pascal_case(&member.alias))
			}
			"Object" => link("object"),
			_ if PASS_THROUGH.contains(&name) || self.known_classes.contains(name) => link(name),
			_ => {
				return Err(DocError::UnmappedType {
					name: name.to_string(),
					lang: Lang::Csharp.to_string(),
				});
			}
		};

		Ok(rendered)
	}

	fn render_union(&self, ty: &Type, union: &[Type], direction: Direction, member: &Member) -> DocResult<String> {
		let nullable = union.iter().any(|alternative| alternative.name == "null");
		let (literals, others) = split_literals(union);
		let mut parts = Vec::new();

		if !literals.is_empty() {
			let values = literal_values(&literals)
				.iter()
				.map(|value| to_pascal_case(value))
				.collect::<Vec<_>>()
				.join(", ");
			parts.push(format!("[enum {} {{ {values} }}]", enum_name(ty, member)));
		}

		for other in others.into_iter().filter(|other| other.name != "null") {
			parts.push(self.render_type(other, direction, member)?);
		}

		let rendered = parts.join("|");
		Ok(if nullable { format!("{rendered}?") } else { rendered })
	}

	/// A union of unrelated types, which becomes one overload per alternative.
	fn overload_alternatives(arg: &Member) -> Option<&[Type]> {
		let ty = arg.r#type.as_ref()?;
		let union = ty.union.as_deref()?;
		let plain = !ty.is_nullable_wrapper() && !union.iter().any(Type::is_string_literal);
		plain.then_some(union)
	}
}

impl Formatter for CsharpFormatter {
	fn lang(&self) -> Lang {
		Lang::Csharp
	}

	fn format_member(&self, member: &Member) -> DocResult<Vec<FormattedMember>> {
		let prefix = self.prefix(member);
		let name = self.member_name(member);

		let signature = match member.kind {
			MemberKind::Property => format!("{prefix}{name}"),
			MemberKind::Event => format!("{prefix}{name} += handler"),
			MemberKind::Method => {
				let args = member
					.args
					.iter()
					.map(|arg| self.format_argument_name(&arg.alias))
					.collect::<Vec<_>>()
					.join(", ");
				format!("{prefix}{name}({args})")
			}
		};

		let overloaded = member
			.args
			.iter()
			.position(|arg| arg.required && Self::overload_alternatives(arg).is_some());
		let Some(position) = overloaded else {
			return Ok(vec![FormattedMember {
				signature,
				args: member.args.clone(),
			}]);
		};

		let alternatives = Self::overload_alternatives(&member.args[position]).unwrap_or_default();
		Ok(alternatives
			.iter()
			.map(|alternative| {
				let mut args = member.args.clone();
				args[position].r#type = Some(alternative.clone());
				FormattedMember {
					signature: signature.clone(),
					args,
				}
			})
			.collect())
	}

	fn format_argument_name(&self, name: &str) -> String {
		name.to_string()
	}

	fn format_option_name(&self, name: &str) -> String {
		to_title_case(name)
	}

	fn format_template(&self, inner: &str) -> String {
		format!("<{inner}>")
	}

	fn format_function(&self, args: &str, ret: Option<&str>, _ty: &Type) -> String {
		match ret {
			Some(ret) if args.is_empty() => format!("{}{}", link("Func"), self.format_template(ret)),
			Some(ret) => format!("{}{}", link("Func"), self.format_template(&format!("{args}, {ret}"))),
			None if args.is_empty() => link("Action"),
			None => format!("{}{}", link("Action"), self.format_template(args)),
		}
	}

	fn format_promise(&self, text: &str) -> String {
		text.to_string()
	}

	fn render_type(&self, ty: &Type, direction: Direction, member: &Member) -> DocResult<String> {
		if let Some(union) = &ty.union {
			return self.render_union(ty, union, direction, member);
		}

		if ty.is_string_literal() {
			return Ok(ty.name.clone());
		}

		if ty.is_function() {
			let args = ty.args.as_deref().unwrap_or_default();
			if args.len() > MAX_CALLBACK_ARITY {
				return Err(DocError::UnsupportedArity {
					lang: Lang::Csharp.to_string(),
					arity: args.len(),
					context: member.qualified_name(),
				});
			}
			let rendered_args = args
				.iter()
				.map(|arg| self.render_type(arg, direction, member))
				.collect::<DocResult<Vec<_>>>()?
				.join(", ");
			let ret = match ty.return_type.as_deref().filter(|ret| ret.name != "void") {
				Some(ret) => Some(self.render_type(ret, direction, member)?),
				None => None,
			};
			return Ok(self.format_function(&rendered_args, ret.as_deref(), ty));
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
