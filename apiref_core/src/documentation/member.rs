use std::collections::HashMap;

use serde::Serialize;

use super::FilterOptions;
use super::Type;
use crate::DocResult;
use crate::Lang;
use crate::LangMap;
use crate::markdown::MarkdownNode;
use crate::markdown::visit_all;
use crate::overloads::expand_option_overloads;

/// Per-language metadata attached to classes, members and properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Langs {
	/// When set, the item only exists for these languages.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub only: Option<Vec<Lang>>,
	/// Display name overrides.
	#[serde(skip_serializing_if = "LangMap::is_empty")]
	pub aliases: LangMap<String>,
	/// Type overrides.
	#[serde(skip_serializing_if = "LangMap::is_empty")]
	pub types: LangMap<Type>,
	/// Whole-argument overrides, used by parameters documented once per
	/// language.
	#[serde(skip_serializing_if = "LangMap::is_empty")]
	pub overrides: LangMap<Box<Member>>,
}

impl Langs {
	pub fn includes(&self, lang: Lang) -> bool {
		self.only.as_ref().is_none_or(|only| only.contains(&lang))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
	Property,
	Method,
	Event,
}

impl MemberKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Property => "property",
			Self::Method => "method",
			Self::Event => "event",
		}
	}
}

/// A property, method or event. Parameters and option properties are
/// members of kind `Property`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
	pub kind: MemberKind,
	pub name: String,
	/// Display name. Drops the `#N` overload suffix of `name` and can be
	/// replaced per language.
	pub alias: String,
	pub overload_index: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub r#type: Option<Type>,
	pub args: Vec<Member>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub docs: Vec<MarkdownNode>,
	pub required: bool,
	pub r#async: bool,
	pub deprecated: bool,
	pub experimental: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub since: Option<String>,
	#[serde(skip)]
	pub langs: Langs,
	/// Name of the owning class.
	pub class_name: String,
	/// `Class.method` of the method a parameter or option belongs to.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub enclosing_method: Option<String>,
	/// The class a copied member was originally documented on.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inherited_from: Option<String>,
	/// Name of the union-typed option an expanded overload was generated
	/// from.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub overload_of: Option<String>,
	#[serde(skip)]
	arg_index: HashMap<String, usize>,
}

impl Member {
	pub fn new(kind: MemberKind, name: impl Into<String>, r#type: Option<Type>) -> Self {
		let name = name.into();
		let (alias, overload_index) = match name.split_once('#') {
			Some((alias, index)) => {
				(
					alias.to_string(),
					index.parse::<usize>().unwrap_or(1).saturating_sub(1),
				)
			}
			None => (name.clone(), 0),
		};

		let mut member = Self {
			kind,
			name,
			alias,
			overload_index,
			r#type,
			args: Vec::new(),
			docs: Vec::new(),
			required: true,
			r#async: false,
			deprecated: false,
			experimental: false,
			since: None,
			langs: Langs::default(),
			class_name: String::new(),
			enclosing_method: None,
			inherited_from: None,
			overload_of: None,
			arg_index: HashMap::new(),
		};
		member.rebuild_index();
		member
	}

	/// A property (also used for parameters and options).
	pub fn property(name: impl Into<String>, r#type: Type, required: bool) -> Self {
		let mut member = Self::new(MemberKind::Property, name, Some(r#type));
		member.required = required;
		member
	}

	/// Attach the doc comment. Sets `deprecated` when it contains a
	/// `**DEPRECATED**` marker.
	pub fn with_docs(mut self, docs: Vec<MarkdownNode>) -> Self {
		visit_all(&docs, &mut |node| {
			if node
				.inline_text()
				.is_some_and(|text| text.contains("**DEPRECATED**"))
			{
				self.deprecated = true;
			}
		});
		self.docs = docs;
		self
	}

	pub fn is_method(&self) -> bool {
		self.kind == MemberKind::Method
	}

	pub fn is_constructor(&self) -> bool {
		self.kind == MemberKind::Method && self.name == "constructor"
	}

	/// `Class.name`, the handle used for back references.
	pub fn qualified_name(&self) -> String {
		format!("{}.{}", self.class_name, self.name)
	}

	pub fn arg(&self, name: &str) -> Option<&Member> {
		self.arg_index.get(name).map(|index| &self.args[*index])
	}

	/// The `options` parameter, if the member has one.
	pub fn options(&self) -> Option<&Member> {
		self.arg("options")
	}

	/// Option properties in alphabetical order.
	pub fn option_properties(&self) -> &[Member] {
		self.options()
			.and_then(|options| options.r#type.as_ref())
			.and_then(|ty| ty.properties.as_deref())
			.unwrap_or_default()
	}

	/// Rebuild the argument index and back references. Sorts option
	/// properties alphabetically.
	pub fn rebuild_index(&mut self) {
		self.arg_index.clear();
		let enclosing = (self.kind == MemberKind::Method).then(|| self.qualified_name());

		if self.kind == MemberKind::Method {
			self.enclosing_method.clone_from(&enclosing);
		}

		for (index, arg) in self.args.iter_mut().enumerate() {
			self.arg_index.insert(arg.name.clone(), index);
			arg.class_name.clone_from(&self.class_name);
			arg.enclosing_method.clone_from(&enclosing);

			if arg.name == "options" {
				if let Some(properties) = arg.r#type.as_mut().and_then(|ty| ty.properties.as_mut()) {
					properties.sort_by(|a, b| a.name.cmp(&b.name));
					for property in properties {
						property.class_name.clone_from(&self.class_name);
						property.enclosing_method.clone_from(&enclosing);
					}
				}
			}
		}
	}

	pub(crate) fn set_class_name(&mut self, class_name: &str) {
		class_name.clone_into(&mut self.class_name);
		self.rebuild_index();
	}

	/// Apply the language's alias and type overrides, drop arguments and
	/// properties not available in `lang`, and for C# expand union-typed
	/// options into overloads.
	pub(crate) fn filter_for_language(&mut self, lang: Lang, options: &FilterOptions) -> DocResult<()> {
		if let Some(alias) = self.langs.aliases.get(lang) {
			self.alias.clone_from(alias);
		}
		if let Some(ty) = self.langs.types.get(lang) {
			self.r#type = Some(ty.clone());
		}
		if let Some(ty) = &mut self.r#type {
			ty.filter_for_language(lang, options)?;
		}

		let mut args = Vec::with_capacity(self.args.len());
		for arg in std::mem::take(&mut self.args) {
			if !arg.langs.includes(lang) {
				continue;
			}

			let mut arg = match arg.langs.overrides.get(lang) {
				Some(overridden) => (**overridden).clone(),
				None => arg,
			};
			arg.filter_for_language(lang, options)?;

			let empty_options = arg.name == "options"
				&& arg
					.r#type
					.as_ref()
					.is_none_or(|ty| ty.properties.as_ref().is_none_or(Vec::is_empty));
			if empty_options {
				continue;
			}

			args.push(arg);
		}
		self.args = args;

		if lang == Lang::Csharp && self.kind == MemberKind::Method {
			expand_option_overloads(self, options)?;
		}

		self.rebuild_index();
		Ok(())
	}

	pub(crate) fn filter_out_experimental(&mut self) {
		self.args.retain(|arg| !arg.experimental);
		for arg in &mut self.args {
			arg.filter_out_experimental();
		}
		if let Some(ty) = &mut self.r#type {
			ty.filter_out_experimental();
		}
		self.rebuild_index();
	}
}
