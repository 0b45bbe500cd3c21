//! Option overload expansion for languages that cannot express a union of
//! unrelated types as a single parameter.
//!
//! For every option property typed `A|B`, the property is replaced by one
//! property per alternative, renamed with a type-derived suffix (`urlString`,
//! `urlRegex`). Nullable wrappers (`null|T`) and unions containing string
//! literals are rendered as enums instead and are left alone.

use tracing::debug;

use crate::DocError;
use crate::DocResult;
use crate::documentation::FilterOptions;
use crate::documentation::Member;
use crate::documentation::Type;

/// The alias suffix for one alternative of an option union.
pub fn overload_suffix(option: &str, ty: &Type) -> DocResult<&'static str> {
	match ty.name.as_str() {
		"string" => Ok("String"),
		"RegExp" => Ok("Regex"),
		"function" => Ok("Func"),
		"Buffer" => Ok("Byte"),
		"Object" | "Serializable" => Ok("Object"),
		other => {
			Err(DocError::UnsupportedOverload {
				option: option.to_string(),
				type_name: other.to_string(),
			})
		}
	}
}

fn needs_expansion(ty: &Type) -> bool {
	let Some(union) = &ty.union else {
		return false;
	};

	!ty.is_nullable_wrapper() && !union.iter().any(Type::is_string_literal)
}

/// Expand the union-typed option properties of `method` in place.
pub fn expand_option_overloads(method: &mut Member, options: &FilterOptions) -> DocResult<()> {
	let method_name = method.qualified_name();
	let Some(properties) = method
		.args
		.iter_mut()
		.find(|arg| arg.name == "options")
		.and_then(|arg| arg.r#type.as_mut())
		.and_then(|ty| ty.properties.as_mut())
	else {
		return Ok(());
	};

	let mut expanded = Vec::with_capacity(properties.len());

	for property in std::mem::take(properties) {
		let Some(ty) = property.r#type.as_ref().filter(|ty| needs_expansion(ty)) else {
			expanded.push(property);
			continue;
		};

		let alternatives: Vec<Type> = ty
			.union
			.iter()
			.flatten()
			.filter(|alternative| alternative.name != "null")
			.cloned()
			.collect();

		let mut suffixes = Vec::with_capacity(alternatives.len());
		for alternative in &alternatives {
			suffixes.push(overload_suffix(&property.name, alternative)?);
		}

		debug!(
			method = %method_name,
			option = %property.name,
			count = alternatives.len(),
			"expanding option overloads"
		);

		if options.csharp_short_notation {
			let mut collapsed = property;
			collapsed.alias = suffixes
				.iter()
				.map(|suffix| format!("{}{suffix}", collapsed.alias))
				.collect::<Vec<_>>()
				.join("|");
			expanded.push(collapsed);
			continue;
		}

		for (alternative, suffix) in alternatives.into_iter().zip(suffixes) {
			let mut overload = property.clone();
			overload.name = format!("{}{suffix}", property.name);
			overload.alias = format!("{}{suffix}", property.alias);
			overload.r#type = Some(alternative);
			overload.overload_of = Some(property.name.clone());
			expanded.push(overload);
		}
	}

	*properties = expanded;
	method.rebuild_index();
	Ok(())
}
