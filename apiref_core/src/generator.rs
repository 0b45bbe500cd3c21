//! Drives a full generation run: load sources, build and merge the model,
//! then for each language filter it, resolve links and render one page per
//! class plus one per guide.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ApirefConfig;
use crate::Diagnostics;
use crate::DocResult;
use crate::Lang;
use crate::documentation::Class;
use crate::documentation::Documentation;
use crate::documentation::Link;
use crate::documentation::LinkRenderer;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::NON_INHERITABLE_BASES;
use crate::documentation::compare_member_names;
use crate::format::Direction;
use crate::format::FormattedMember;
use crate::format::Formatter;
use crate::format::formatter_for;
use crate::format::to_kebab_case;
use crate::markdown;
use crate::markdown::ListStyle;
use crate::markdown::MarkdownNode;
use crate::markdown::RenderOptions;
use crate::markdown::filter_nodes_for_language;
use crate::markdown::generate_toc;
use crate::parser::parse_api_dir;
use crate::sources::Guide;
use crate::sources::build_glob_set;
use crate::sources::load_guides;
use crate::sources::read_link_file;

/// Code fence info words that restrict a fence to one language.
const CODE_LANGS: [&str; 6] = ["js", "ts", "python", "py", "java", "csharp"];

/// Text nodes replaced by a generated table of contents in guides.
const TOC_MARKER: &str = "<!-- TOC -->";
const TOC3_MARKER: &str = "<!-- TOC3 -->";

/// A rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
	pub lang: Lang,
	pub path: PathBuf,
	pub content: String,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct Generation {
	pub files: Vec<GeneratedFile>,
	pub diagnostics: Diagnostics,
}

/// How a generated file compares with the file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
	UpToDate,
	Missing,
	Stale { current: String },
}

/// `class-<lowercase name>`
pub fn class_file_stem(class_alias: &str) -> String {
	format!("class-{}", class_alias.to_lowercase())
}

/// The heading anchor of a member: `kebab(class)-kebab(member)`, with
/// `-event-` between the two for events. An overload suffix `#2` becomes
/// `-2`.
pub fn member_anchor(class_name: &str, member: &Member) -> String {
	let class = to_kebab_case(class_name);
	let name = to_kebab_case(&member.name);
	match member.kind {
		MemberKind::Event => format!("{class}-event-{name}"),
		MemberKind::Method | MemberKind::Property => format!("{class}-{name}"),
	}
}

/// Keep only the code fences meant for `lang`. A fence whose first info word
/// is not a known language is kept everywhere.
pub fn gate_code_fences(nodes: Vec<MarkdownNode>, lang: Lang) -> Vec<MarkdownNode> {
	nodes
		.into_iter()
		.filter_map(|mut node| {
			if let MarkdownNode::Code { lang: info, .. } = &node {
				let word = info.split_whitespace().next().unwrap_or_default();
				if CODE_LANGS.contains(&word) && Lang::parse(word) != Some(lang) {
					return None;
				}
			}
			if let Some(children) = node.children_mut() {
				let gated = gate_code_fences(std::mem::take(children), lang);
				*children = gated;
			}
			Some(node)
		})
		.collect()
}

fn replace_toc_markers(nodes: &mut Vec<MarkdownNode>, toc: &[MarkdownNode], toc3: &[MarkdownNode]) {
	let mut index = 0;
	while index < nodes.len() {
		let replacement = match nodes[index].inline_text().map(str::trim) {
			Some(TOC_MARKER) if matches!(nodes[index], MarkdownNode::Text { .. }) => Some(toc),
			Some(TOC3_MARKER) if matches!(nodes[index], MarkdownNode::Text { .. }) => Some(toc3),
			_ => None,
		};

		if let Some(replacement) = replacement {
			nodes.splice(index..=index, replacement.iter().cloned());
			index += replacement.len();
			continue;
		}

		if let Some(children) = nodes[index].children_mut() {
			replace_toc_markers(children, toc, toc3);
		}
		index += 1;
	}
}

/// Compare generated files with what is on disk.
pub fn check_outputs(files: &[GeneratedFile]) -> DocResult<Vec<(GeneratedFile, FileStatus)>> {
	let mut statuses = Vec::with_capacity(files.len());
	for file in files {
		let status = if file.path.is_file() {
			let current = std::fs::read_to_string(&file.path)?;
			if current == file.content {
				FileStatus::UpToDate
			} else {
				FileStatus::Stale { current }
			}
		} else {
			FileStatus::Missing
		};
		statuses.push((file.clone(), status));
	}
	Ok(statuses)
}

/// Write generated files, creating directories as needed.
pub fn write_outputs(files: &[GeneratedFile]) -> DocResult<()> {
	for file in files {
		if let Some(parent) = file.path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&file.path, &file.content)?;
		debug!(path = %file.path.display(), "wrote file");
	}

	info!(count = files.len(), "wrote generated files");
	Ok(())
}

pub struct Generator {
	root: PathBuf,
	config: ApirefConfig,
}

impl Generator {
	pub fn new(root: impl Into<PathBuf>, config: ApirefConfig) -> Self {
		Self {
			root: root.into(),
			config,
		}
	}

	pub fn config(&self) -> &ApirefConfig {
		&self.config
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Parse every API directory and merge the results.
	pub fn load_documentation(&self) -> DocResult<Documentation> {
		let mut documentation = Documentation::default();
		for dir in self.config.api_roots(&self.root) {
			let parsed = parse_api_dir(&dir)?;
			documentation = documentation.merge_with(&parsed);
		}

		info!(classes = documentation.classes().len(), "loaded api model");
		Ok(documentation)
	}

	/// Load the model and copy inherited member docs, collecting ordering and
	/// inheritance issues.
	pub fn lint(&self) -> DocResult<(Documentation, Diagnostics)> {
		let mut documentation = self.load_documentation()?;
		let mut diagnostics = Diagnostics::new();
		documentation.copy_docs_from_superclasses(&mut diagnostics);

		if !diagnostics.is_empty() {
			warn!(count = diagnostics.len(), "documentation diagnostics found");
		}
		Ok((documentation, diagnostics))
	}

	/// The model for `lang`, filtered the same way pages are generated from.
	pub fn language_model(&self, base: &Documentation, lang: Lang) -> DocResult<Documentation> {
		let mut documentation = base.clone();
		documentation.filter_for_language(lang, &self.config.filter_options())?;
		if !self.config.include_experimental {
			documentation.filter_out_experimental();
		}
		Ok(documentation)
	}

	/// The filtered model for `lang` as JSON.
	pub fn json(&self, lang: Lang) -> DocResult<String> {
		let (base, _) = self.lint()?;
		self.language_model(&base, lang)?.to_json()
	}

	/// Run the whole pipeline for `langs` (every configured language when
	/// empty). Nothing is written.
	pub fn generate(&self, langs: &[Lang]) -> DocResult<Generation> {
		let (base, diagnostics) = self.lint()?;
		let langs = if langs.is_empty() {
			self.config.languages.as_slice()
		} else {
			langs
		};

		let source_root = self.config.source_root(&self.root);
		let api_roots = self.config.api_roots(&self.root);
		let mut link_files = vec![self.config.common_links_path(&self.root)];
		link_files.extend(
			Lang::ALL
				.iter()
				.map(|lang| self.config.language_links_path(&self.root, *lang)),
		);
		let exclude = build_glob_set(&self.config.guides.exclude)?;
		let guides = load_guides(&source_root, &api_roots, &link_files, &exclude)?;

		let mut files = Vec::new();
		for lang in langs {
			files.extend(self.generate_language(&base, *lang, &guides)?);
		}

		Ok(Generation { files, diagnostics })
	}

	fn generate_language(&self, base: &Documentation, lang: Lang, guides: &[Guide]) -> DocResult<Vec<GeneratedFile>> {
		info!(%lang, "generating language");
		let mut documentation = self.language_model(base, lang)?;

		let known_classes: HashSet<String> = documentation
			.classes()
			.iter()
			.map(|class| class.name.clone())
			.chain(NON_INHERITABLE_BASES.iter().map(ToString::to_string))
			.collect();
		let formatter = formatter_for(lang, known_classes.clone());
		let file_stems: HashMap<String, String> = documentation
			.classes()
			.iter()
			.map(|class| (class.name.clone(), class_file_stem(&class.alias)))
			.collect();

		documentation.set_link_renderer(self.link_renderer(lang, known_classes, file_stems.clone()));
		documentation.render_links()?;

		let page = PageRenderer {
			lang,
			formatter: formatter.as_ref(),
			documentation: &documentation,
			file_stems: &file_stems,
			extension: self.config.extension(),
		};
		let link_definitions = self.link_definitions(&documentation, lang)?;
		let output_root = self.config.output_root(&self.root, lang);
		let render_options = RenderOptions {
			max_columns: self.config.max_columns,
		};

		let mut classes: Vec<&Class> = documentation.classes().iter().collect();
		classes.sort_by(|a, b| a.alias.cmp(&b.alias));

		let mut files = Vec::new();
		for class in classes {
			let nodes = page.render_class(class)?;
			let path = output_root.join(format!("{}.{}", file_stems[&class.name], self.config.extension()));
			debug!(%lang, class = %class.alias, path = %path.display(), "rendered class");
			files.push(GeneratedFile {
				lang,
				content: finish_page(&nodes, &link_definitions, &render_options),
				path,
			});
		}

		for guide in guides {
			let nodes = page.render_guide(guide)?;
			let relative = guide
				.relative_path
				.with_file_name(format!("{}.{}", guide.output_stem(), self.config.extension()));
			files.push(GeneratedFile {
				lang,
				content: finish_page(&nodes, &link_definitions, &render_options),
				path: output_root.join(relative),
			});
		}

		info!(%lang, files = files.len(), "language pass finished");
		Ok(files)
	}

	fn link_renderer(&self, lang: Lang, known_classes: HashSet<String>, file_stems: HashMap<String, String>) -> LinkRenderer {
		let formatter = formatter_for(lang, known_classes);
		let extension = self.config.extension();

		LinkRenderer::new(move |link| {
			match link {
				Link::Class(class) => Some(formatter.format_class_link(class)),
				Link::Member(member) => {
					let class_name = member.inherited_from.as_deref().unwrap_or(&member.class_name);
					let stem = file_stems.get(class_name)?;
					let href = format!("./{stem}.{extension}#{}", member_anchor(class_name, member));
					match formatter.format_member_link(member, &href) {
						Ok(rendered) => Some(rendered),
						Err(error) => {
							warn!(member = %member.qualified_name(), %error, "could not render member link");
							None
						}
					}
				}
				Link::Param(alias) => Some(formatter.format_param_link(alias)),
				Link::Option(alias) => Some(formatter.format_option_link(alias)),
			}
		})
	}

	/// Class link definitions followed by the shared link files.
	fn link_definitions(&self, documentation: &Documentation, lang: Lang) -> DocResult<Vec<String>> {
		let extension = self.config.extension();
		let classes: BTreeMap<&str, String> = documentation
			.classes()
			.iter()
			.map(|class| {
				(
					class.alias.as_str(),
					format!(
						"[{alias}]: ./{}.{extension} \"{alias}\"",
						class_file_stem(&class.alias),
						alias = class.alias
					),
				)
			})
			.collect();

		let mut definitions: Vec<String> = classes.into_values().collect();
		definitions.extend(read_link_file(&self.config.common_links_path(&self.root))?);
		definitions.extend(read_link_file(&self.config.language_links_path(&self.root, lang))?);
		Ok(definitions)
	}
}

fn finish_page(nodes: &[MarkdownNode], link_definitions: &[String], options: &RenderOptions) -> String {
	let mut content = markdown::render(nodes, options);
	if !link_definitions.is_empty() {
		content.push('\n');
		content.push_str(&link_definitions.join("\n"));
		content.push('\n');
	}
	content
}

/// Builds the node tree of one page for one language.
struct PageRenderer<'a> {
	lang: Lang,
	formatter: &'a dyn Formatter,
	documentation: &'a Documentation,
	file_stems: &'a HashMap<String, String>,
	extension: &'static str,
}

impl PageRenderer<'_> {
	fn prepare_comment(&self, docs: &[MarkdownNode]) -> Vec<MarkdownNode> {
		let docs = filter_nodes_for_language(docs.to_vec(), self.lang);
		let docs = gate_code_fences(docs, self.lang);
		self.formatter.preprocess_comment(docs)
	}

	fn render_class(&self, class: &Class) -> DocResult<Vec<MarkdownNode>> {
		let mut nodes = vec![MarkdownNode::Properties {
			lines: vec![
				format!("id: {}", class_file_stem(&class.alias)),
				format!("title: \"{}\"", class.alias),
			],
		}];
		nodes.extend(self.prepare_comment(&class.docs));
		if let Some(base) = &class.extends {
			nodes.push(MarkdownNode::text(format!("Extends: [{base}]")));
		}

		let (own, inherited): (Vec<&Member>, Vec<&Member>) = class
			.members()
			.iter()
			.partition(|member| member.inherited_from.is_none());

		let mut formatted = Vec::with_capacity(own.len());
		for member in &own {
			formatted.push((*member, self.formatter.format_member(member)?));
		}

		nodes.extend(self.render_toc(&formatted, class, None));

		let mut bases: BTreeMap<&str, Vec<(&Member, Vec<FormattedMember>)>> = BTreeMap::new();
		for member in inherited {
			let base = member.inherited_from.as_deref().unwrap_or_default();
			bases
				.entry(base)
				.or_default()
				.push((member, self.formatter.format_member(member)?));
		}
		for (base, members) in &bases {
			let base_alias = self
				.documentation
				.class(base)
				.map_or(*base, |base_class| base_class.alias.as_str());
			nodes.push(MarkdownNode::heading(
				2,
				format!("Inherited from {base_alias}"),
				self.render_toc(members, class, Some(*base)),
			));
		}

		for (kind, title) in [
			(MemberKind::Event, "Events"),
			(MemberKind::Method, "Methods"),
			(MemberKind::Property, "Properties"),
		] {
			let mut sections = Vec::new();
			for (member, overloads) in formatted.iter().filter(|(member, _)| member.kind == kind) {
				sections.extend(self.render_member(class, member, overloads)?);
			}
			if !sections.is_empty() {
				nodes.push(MarkdownNode::heading(2, title, sections));
			}
		}

		Ok(nodes)
	}

	/// ToC entries sorted case-insensitively. Inherited entries link to the
	/// base class page.
	fn render_toc(&self, members: &[(&Member, Vec<FormattedMember>)], class: &Class, base: Option<&str>) -> Vec<MarkdownNode> {
		let mut entries: Vec<(&str, String)> = Vec::new();
		for (member, overloads) in members {
			let anchor_class = base.unwrap_or(&class.name);
			let page = match base {
				Some(base) => {
					let stem = self
						.file_stems
						.get(base)
						.cloned()
						.unwrap_or_else(|| class_file_stem(base));
					format!("./{stem}.{}", self.extension)
				}
				None => String::new(),
			};

			for (index, overload) in overloads.iter().enumerate() {
				let mut anchor = member_anchor(anchor_class, member);
				if index > 0 {
					anchor.push_str(&format!("-{index}"));
				}
				entries.push((&member.alias, format!("[{}]({page}#{anchor})", overload.signature)));
			}
		}

		entries.sort_by(|(a_alias, a_text), (b_alias, b_text)| {
			compare_member_names(a_alias, b_alias).then_with(|| a_text.cmp(b_text))
		});
		entries
			.into_iter()
			.map(|(_, text)| MarkdownNode::list_item(ListStyle::Default, text, Vec::new()))
			.collect()
	}

	fn render_member(&self, class: &Class, member: &Member, overloads: &[FormattedMember]) -> DocResult<Vec<MarkdownNode>> {
		let mut sections = Vec::with_capacity(overloads.len());

		for (index, overload) in overloads.iter().enumerate() {
			let mut anchor = member_anchor(&class.name, member);
			if index > 0 {
				anchor.push_str(&format!("-{index}"));
			}

			let mut children = Vec::new();
			if let Some(since) = &member.since {
				children.push(MarkdownNode::text(format!("Added in: {since}")));
			}
			children.extend(self.prepare_comment(&member.docs));

			match member.kind {
				MemberKind::Method => {
					if !overload.args.is_empty() {
						children.push(MarkdownNode::text("**Arguments**"));
						for arg in &overload.args {
							children.push(self.render_argument(arg, false)?);
						}
					}
					if let Some(returns) = self.render_returns(member)? {
						children.push(MarkdownNode::text("**Returns**"));
						children.push(returns);
					}
				}
				MemberKind::Property => {
					if let Some(ty) = self.render_value(member)? {
						children.push(MarkdownNode::text("**Type**"));
						children.push(ty);
					}
				}
				MemberKind::Event => {
					if let Some(data) = self.render_value(member)? {
						children.push(MarkdownNode::text("**Event data**"));
						children.push(data);
					}
				}
			}

			sections.push(MarkdownNode::heading(
				3,
				format!("{} {{#{anchor}}}", overload.signature),
				children,
			));
		}

		Ok(sections)
	}

	fn render_argument(&self, arg: &Member, is_option: bool) -> DocResult<MarkdownNode> {
		let name = if is_option {
			self.formatter.format_option_name(&arg.alias)
		} else {
			self.formatter.format_argument_name(&arg.alias)
		};

		let mut text = format!("`{name}`");
		if let Some(ty) = &arg.r#type {
			text.push(' ');
			text.push_str(&self.formatter.render_type(ty, Direction::Input, arg)?);
		}
		if !arg.required {
			text.push_str(" *(optional)*");
		}
		if is_option {
			if let Some(since) = &arg.since {
				text.push_str(&format!(" Added in: {since}"));
			}
		}

		let mut children = Vec::new();
		if let Some(ty) = &arg.r#type {
			for property in ty.sorted_properties() {
				children.push(self.render_argument(property, arg.name == "options")?);
			}
		}
		children.extend(self.prepare_comment(&arg.docs));

		Ok(MarkdownNode::list_item(ListStyle::Default, text, children))
	}

	fn render_returns(&self, member: &Member) -> DocResult<Option<MarkdownNode>> {
		let Some(ty) = &member.r#type else {
			return Ok(None);
		};
		if ty.name == "void" && !member.r#async {
			return Ok(None);
		}

		let mut rendered = self.formatter.render_type(ty, Direction::Output, member)?;
		if member.r#async {
			rendered = self.formatter.format_promise(&rendered);
		}

		Ok(Some(MarkdownNode::list_item(
			ListStyle::Default,
			rendered,
			self.render_properties(member)?,
		)))
	}

	fn render_value(&self, member: &Member) -> DocResult<Option<MarkdownNode>> {
		let Some(ty) = member.r#type.as_ref().filter(|ty| ty.name != "void") else {
			return Ok(None);
		};

		Ok(Some(MarkdownNode::list_item(
			ListStyle::Default,
			self.formatter.render_type(ty, Direction::Output, member)?,
			self.render_properties(member)?,
		)))
	}

	fn render_properties(&self, member: &Member) -> DocResult<Vec<MarkdownNode>> {
		let Some(properties) = member.r#type.as_ref().and_then(|ty| ty.deep_properties()) else {
			return Ok(Vec::new());
		};

		let mut sorted: Vec<&Member> = properties.iter().collect();
		sorted.sort_by(|a, b| a.name.cmp(&b.name));
		sorted
			.into_iter()
			.map(|property| self.render_argument(property, false))
			.collect()
	}

	fn render_guide(&self, guide: &Guide) -> DocResult<Vec<MarkdownNode>> {
		let mut nodes = self.prepare_comment(&guide.nodes);
		let toc = generate_toc(&nodes, false);
		let toc3 = generate_toc(&nodes, true);
		replace_toc_markers(&mut nodes, &toc, &toc3);
		self.documentation
			.render_links_in_text(&mut nodes)
			.map_err(|error| error.in_file(guide.relative_path.display()))?;
		Ok(nodes)
	}
}
