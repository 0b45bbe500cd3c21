use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::FilterOptions;
use super::Langs;
use super::Member;
use super::MemberKind;
use crate::Diagnostic;
use crate::Diagnostics;
use crate::DocResult;
use crate::Lang;
use crate::markdown::MarkdownNode;

/// Base names that are documented elsewhere and never copied from.
pub const NON_INHERITABLE_BASES: [&str; 4] = ["EventEmitter", "Error", "Exception", "RuntimeException"];

#[derive(Debug, Clone, Default, PartialEq)]
struct ClassIndex {
	members: HashMap<String, usize>,
	properties: Vec<usize>,
	methods: Vec<usize>,
	events: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
	/// Name as written in sources. Used for lookups and links.
	pub name: String,
	/// Display name for the current language.
	pub alias: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extends: Option<String>,
	#[serde(skip)]
	pub langs: Langs,
	pub experimental: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub since: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub docs: Vec<MarkdownNode>,
	members: Vec<Member>,
	#[serde(skip)]
	index: ClassIndex,
}

impl Class {
	pub fn new(name: impl Into<String>, extends: Option<String>, members: Vec<Member>) -> Self {
		let name = name.into();
		let mut class = Self {
			alias: name.clone(),
			name,
			extends,
			langs: Langs::default(),
			experimental: false,
			since: None,
			docs: Vec::new(),
			members,
			index: ClassIndex::default(),
		};
		class.rebuild_index();
		class
	}

	/// Members in documentation order.
	pub fn members(&self) -> &[Member] {
		&self.members
	}

	pub fn member(&self, name: &str) -> Option<&Member> {
		self.index.members.get(name).map(|index| &self.members[*index])
	}

	pub fn properties(&self) -> impl Iterator<Item = &Member> {
		self.index.properties.iter().map(|index| &self.members[*index])
	}

	pub fn methods(&self) -> impl Iterator<Item = &Member> {
		self.index.methods.iter().map(|index| &self.members[*index])
	}

	pub fn events(&self) -> impl Iterator<Item = &Member> {
		self.index.events.iter().map(|index| &self.members[*index])
	}

	/// Replace the member list and rebuild the index.
	pub fn set_members(&mut self, members: Vec<Member>) {
		self.members = members;
		self.rebuild_index();
	}

	pub fn push_member(&mut self, member: Member) {
		self.members.push(member);
		self.rebuild_index();
	}

	/// Mutate the member list in place. The index is rebuilt afterwards.
	pub fn update_members<T>(&mut self, update: impl FnOnce(&mut Vec<Member>) -> T) -> T {
		let result = update(&mut self.members);
		self.rebuild_index();
		result
	}

	/// The superclass members should be copied from, if any.
	pub fn inheritable_base(&self) -> Option<&str> {
		self.extends
			.as_deref()
			.filter(|base| !NON_INHERITABLE_BASES.contains(base))
	}

	/// Rebuild the per-kind indices and member back references.
	pub fn rebuild_index(&mut self) {
		let mut index = ClassIndex::default();

		for (position, member) in self.members.iter_mut().enumerate() {
			member.set_class_name(&self.name);
			index.members.insert(member.name.clone(), position);
			match member.kind {
				MemberKind::Property => index.properties.push(position),
				MemberKind::Method => index.methods.push(position),
				MemberKind::Event => index.events.push(position),
			}
		}

		self.index = index;
	}

	pub(crate) fn filter_for_language(&mut self, lang: Lang, options: &FilterOptions) -> DocResult<()> {
		let mut members = Vec::with_capacity(self.members.len());
		for mut member in std::mem::take(&mut self.members) {
			if !member.langs.includes(lang) {
				continue;
			}
			member.filter_for_language(lang, options)?;
			members.push(member);
		}

		if let Some(alias) = self.langs.aliases.get(lang) {
			self.alias.clone_from(alias);
		}

		self.set_members(members);
		Ok(())
	}

	pub(crate) fn filter_out_experimental(&mut self) {
		self.update_members(|members| {
			members.retain(|member| !member.experimental);
			for member in members {
				member.filter_out_experimental();
			}
		});
	}

	/// Check member ordering: events come first as one block, the
	/// constructor directly follows the events, and both the events and the
	/// remaining members are sorted alphabetically.
	pub fn validate_order(&self, diagnostics: &mut Diagnostics) {
		let members = &self.members;

		let first_non_event = members
			.iter()
			.position(|member| member.kind != MemberKind::Event)
			.unwrap_or(members.len());
		if let Some(stray) = members[first_non_event..]
			.iter()
			.find(|member| member.kind == MemberKind::Event)
		{
			diagnostics.push(Diagnostic::error(
				format!("{}.{}", self.name, stray.name),
				format!(
					"Events should go first. Event '{}' in class {} breaks order",
					stray.name, self.name
				),
			));
		}

		if let Some(position) = members.iter().position(Member::is_constructor) {
			if position > 0 && members[position - 1].kind != MemberKind::Event {
				diagnostics.push(Diagnostic::error(
					format!("{}.constructor", self.name),
					format!("Constructor of {} should go before other methods", self.name),
				));
			}
		}

		for pair in members.windows(2) {
			let (first, second) = (&pair[0], &pair[1]);
			if first.kind != MemberKind::Event || second.kind != MemberKind::Event {
				continue;
			}
			if compare_member_names(&first.name, &second.name) == Ordering::Greater {
				diagnostics.push(Diagnostic::error(
					format!("{}.{}", self.name, first.name),
					format!(
						"Event '{}' in class {} breaks alphabetic ordering of events",
						first.name, self.name
					),
				));
			}
		}

		for pair in members.windows(2) {
			let (first, second) = (&pair[0], &pair[1]);
			if first.kind == MemberKind::Event || second.kind == MemberKind::Event {
				continue;
			}
			if first.is_constructor() {
				continue;
			}
			if compare_member_names(&first.name, &second.name) == Ordering::Greater {
				diagnostics.push(Diagnostic::error(
					format!("{}.{}", self.name, first.name),
					format!(
						"Bad alphabetic ordering of {} members: {} should go after {}",
						self.name,
						self.display_member_name(first),
						self.display_member_name(second),
					),
				));
			}
		}
	}

	fn display_member_name(&self, member: &Member) -> String {
		if member.kind == MemberKind::Method {
			format!("{}.{}()", self.name, member.name)
		} else {
			format!("{}.{}", self.name, member.name)
		}
	}
}

/// Case and accent insensitive name ordering. A run of leading `$` counts as
/// one, so `$$eval` does not sort before `$eval`.
pub fn compare_member_names(first: &str, second: &str) -> Ordering {
	sort_key(first).cmp(&sort_key(second))
}

fn sort_key(name: &str) -> String {
	let trimmed = name.trim_start_matches('$');
	let prefix = if trimmed.len() == name.len() { "" } else { "$" };
	format!("{prefix}{trimmed}")
		.nfd()
		.filter(|c| !is_combining_mark(*c))
		.collect::<String>()
		.to_lowercase()
}
