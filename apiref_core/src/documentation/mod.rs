//! The API object model: classes, members and types built from API sources,
//! plus the passes that run over it before rendering.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

pub use self::class::*;
pub use self::links::Link;
pub use self::links::LinkRenderer;
pub use self::member::*;
pub use self::types::*;
use self::links::LinkContext;
use self::links::LinkTargets;
use self::links::render_links_in_nodes;
use crate::Diagnostic;
use crate::Diagnostics;
use crate::DocError;
use crate::DocResult;
use crate::Lang;
use crate::markdown::MarkdownNode;

mod class;
mod links;
mod member;
mod types;

/// Options for [`Documentation::filter_for_language`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterOptions {
	/// Collapse C# option overloads into one pipe-joined alias instead of
	/// emitting one property per alternative.
	pub csharp_short_notation: bool,
}

/// The root of the model.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Documentation {
	classes: Vec<Class>,
	#[serde(skip)]
	index: HashMap<String, usize>,
	#[serde(skip)]
	link_renderer: Option<LinkRenderer>,
}

impl Documentation {
	pub fn new(classes: Vec<Class>) -> Self {
		let mut documentation = Self {
			classes,
			index: HashMap::new(),
			link_renderer: None,
		};
		documentation.rebuild_index();
		documentation
	}

	pub fn classes(&self) -> &[Class] {
		&self.classes
	}

	pub fn class(&self, name: &str) -> Option<&Class> {
		self.index.get(name).map(|index| &self.classes[*index])
	}

	pub fn rebuild_index(&mut self) {
		self.index.clear();
		for (position, class) in self.classes.iter_mut().enumerate() {
			class.rebuild_index();
			self.index.insert(class.name.clone(), position);
		}
	}

	/// A new model holding copies of both class lists. Classes declared in
	/// both sources are combined into one class; the members of `other`
	/// follow the members of `self`.
	pub fn merge_with(&self, other: &Documentation) -> Documentation {
		let mut classes: Vec<Class> = Vec::with_capacity(self.classes.len() + other.classes.len());
		let mut positions: HashMap<String, usize> = HashMap::new();

		for class in self.classes.iter().chain(&other.classes) {
			match positions.get(&class.name) {
				Some(&position) => {
					let existing = &mut classes[position];
					debug!(class = %class.name, "merging class declared in two sources");
					existing.update_members(|members| members.extend(class.members().iter().cloned()));
					if existing.docs.is_empty() {
						existing.docs.clone_from(&class.docs);
					}
					if existing.extends.is_none() {
						existing.extends.clone_from(&class.extends);
					}
				}
				None => {
					positions.insert(class.name.clone(), classes.len());
					classes.push(class.clone());
				}
			}
		}

		Documentation::new(classes)
	}

	/// Append copies of each superclass's members to its subclasses.
	///
	/// Classes are processed base first so members inherited over several
	/// levels arrive in one pass. Member order is validated before anything is
	/// copied. A missing superclass and a member that shadows an inherited one
	/// are reported in `diagnostics`; the shadowed base member is not copied.
	pub fn copy_docs_from_superclasses(&mut self, diagnostics: &mut Diagnostics) {
		for class in &self.classes {
			class.validate_order(diagnostics);
		}

		let mut order: Vec<usize> = (0..self.classes.len()).collect();
		order.sort_by_key(|position| self.inheritance_depth(*position));

		for position in order {
			let class = &self.classes[position];
			let Some(base_name) = class.inheritable_base() else {
				continue;
			};
			let Some(base) = self.class(base_name) else {
				diagnostics.push(Diagnostic::error(
					class.name.clone(),
					format!("Undefined superclass: {base_name} in {}", class.name),
				));
				continue;
			};

			let mut inherited = Vec::new();
			for member in base.members() {
				if class.member(&member.name).is_some() {
					diagnostics.push(Diagnostic::error(
						format!("{}.{}", class.name, member.name),
						format!(
							"Member documentation overrides base: {}.{} over {}.{}",
							class.name, member.name, base.name, member.name
						),
					));
					continue;
				}

				let mut copy = member.clone();
				copy.inherited_from.get_or_insert_with(|| base.name.clone());
				inherited.push(copy);
			}

			debug!(class = %class.name, base = %base.name, count = inherited.len(), "copied inherited members");
			self.classes[position].update_members(|members| members.extend(inherited));
		}

		self.rebuild_index();
	}

	fn inheritance_depth(&self, position: usize) -> usize {
		let mut seen = HashSet::new();
		let mut depth = 0;
		let mut current = &self.classes[position];

		while let Some(base) = current.inheritable_base().and_then(|base| self.class(base)) {
			if !seen.insert(base.name.as_str()) {
				break;
			}
			depth += 1;
			current = base;
		}

		depth
	}

	/// Drop classes and members not available in `lang` and apply the
	/// language's aliases and type overrides. Runs once per language on a
	/// private copy of the model.
	pub fn filter_for_language(&mut self, lang: Lang, options: &FilterOptions) -> DocResult<()> {
		let mut classes = Vec::with_capacity(self.classes.len());
		for mut class in std::mem::take(&mut self.classes) {
			if !class.langs.includes(lang) {
				debug!(class = %class.name, %lang, "class not available in language");
				continue;
			}
			class.filter_for_language(lang, options)?;
			classes.push(class);
		}

		self.classes = classes;
		self.rebuild_index();
		Ok(())
	}

	/// Remove every experimental class, member and property.
	pub fn filter_out_experimental(&mut self) {
		self.classes.retain(|class| !class.experimental);
		for class in &mut self.classes {
			class.filter_out_experimental();
		}
		self.rebuild_index();
	}

	pub fn set_link_renderer(&mut self, renderer: LinkRenderer) {
		self.link_renderer = Some(renderer);
	}

	/// Resolve the references in every class, member, parameter and option
	/// comment. Does nothing until a link renderer is set.
	pub fn render_links(&mut self) -> DocResult<()> {
		let Some(renderer) = self.link_renderer.clone() else {
			warn!("render_links called without a link renderer");
			return Ok(());
		};
		let targets = LinkTargets::collect(&self.classes, &renderer);
		let no_context = LinkContext::default();

		for class in &mut self.classes {
			render_links_in_nodes(&mut class.docs, &targets, &no_context, &renderer)?;

			class.update_members(|members| {
				for member in members {
					let context = if member.is_method() {
						LinkContext::for_method(member)
					} else {
						LinkContext::default()
					};
					render_links_in_nodes(&mut member.docs, &targets, &context, &renderer)?;

					for arg in &mut member.args {
						render_links_in_nodes(&mut arg.docs, &targets, &context, &renderer)?;
						let properties = arg
							.r#type
							.as_mut()
							.and_then(|ty| ty.properties.as_mut())
							.into_iter()
							.flatten();
						for property in properties {
							render_links_in_nodes(&mut property.docs, &targets, &context, &renderer)?;
						}
					}
				}
				Ok::<(), DocError>(())
			})?;
		}

		Ok(())
	}

	/// Resolve references in free-standing text such as guides. Parameter and
	/// option references are not checked against any method.
	pub fn render_links_in_text(&self, nodes: &mut [MarkdownNode]) -> DocResult<()> {
		let Some(renderer) = &self.link_renderer else {
			return Ok(());
		};
		let targets = LinkTargets::collect(&self.classes, renderer);
		render_links_in_nodes(nodes, &targets, &LinkContext::default(), renderer)
	}

	/// The model as pretty printed JSON.
	pub fn to_json(&self) -> DocResult<String> {
		let json = serde_json::to_string_pretty(&self.classes).map_err(std::io::Error::from)?;
		Ok(json)
	}
}
