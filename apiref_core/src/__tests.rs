use std::collections::HashSet;
use std::path::Path;

use rstest::rstest;
use similar_asserts::assert_eq;
use tracing_test::traced_test;

use super::__fixtures::*;
use super::*;
use crate::documentation::Documentation;
use crate::documentation::FilterOptions;
use crate::documentation::Link;
use crate::documentation::LinkRenderer;
use crate::documentation::Member;
use crate::documentation::MemberKind;
use crate::documentation::Type;
use crate::documentation::compare_member_names;
use crate::format::Direction;
use crate::format::formatter_for;
use crate::format::to_kebab_case;
use crate::format::to_pascal_case;
use crate::format::to_snake_case;
use crate::format::var_name;
use crate::generator::FileStatus;
use crate::generator::Generator;
use crate::generator::check_outputs;
use crate::generator::gate_code_fences;
use crate::generator::member_anchor;
use crate::generator::write_outputs;
use crate::markdown::ListStyle;
use crate::markdown::MarkdownNode;
use crate::markdown::RenderOptions;
use crate::parser::parse_api;
use crate::parser::parse_variable;
use crate::sources::parse_front_matter;
use crate::type_expr::ParsedType;
use crate::type_expr::parse_type_expression;

fn known_classes(documentation: &Documentation) -> HashSet<String> {
	documentation
		.classes()
		.iter()
		.map(|class| class.name.clone())
		.collect()
}

fn member_names(members: &[Member]) -> Vec<&str> {
	members.iter().map(|member| member.name.as_str()).collect()
}

// --- Markdown ---

#[test]
fn reflow_joins_paragraphs_and_keeps_blocks() {
	let lines = markdown::reflow("hello\nworld\n\n- item\n  continued\n```js\n  a\n```");
	assert_eq!(lines, vec!["hello world", "- item continued", "```js", "  a", "```"]);
}

#[test]
fn build_tree_nests_by_heading_and_indent() -> DocResult<()> {
	let nodes = markdown::parse("# class: A\ntext\n- item\n  - nested\n")?;
	let expected = vec![MarkdownNode::heading(1, "class: A", vec![
		MarkdownNode::text("text"),
		MarkdownNode::list_item(ListStyle::Default, "item", vec![MarkdownNode::list_item(
			ListStyle::Default,
			"nested",
			Vec::new(),
		)]),
	])];
	assert_eq!(nodes, expected);

	Ok(())
}

#[rstest]
#[case::unterminated("```js\n  a\n")]
#[case::bad_indent("  ```js\n x\n  ```\n")]
#[case::unterminated_note(":::note\nA note.\n")]
fn build_tree_rejects_bad_blocks(#[case] input: &str) {
	let result = markdown::parse(input);
	assert!(matches!(result, Err(DocError::BadBlock { .. })), "{result:?}");
}

#[test]
fn render_round_trips() -> DocResult<()> {
	let input = "# Title\n\nSome text.\n\n- a\n  - b\n\n```js\ncode\n```\n\n:::note\nA note.\n:::\n";
	let nodes = markdown::parse(input)?;
	let rendered = markdown::render(&nodes, &RenderOptions::default());
	assert_eq!(markdown::parse(&rendered)?, nodes);

	Ok(())
}

#[rstest]
#[case::narrow(6)]
#[case::medium(12)]
#[case::wide(20)]
fn wrapped_render_keeps_link_like_text_in_one_paragraph(#[case] max_columns: usize) -> DocResult<()> {
	let nodes = markdown::parse("Some text with 1.5 seconds and [Foo]: bar and more words here.\n")?;
	assert_eq!(nodes.len(), 1);

	let rendered = markdown::render(&nodes, &RenderOptions { max_columns });
	assert_eq!(markdown::parse(&rendered)?, nodes, "{rendered}");

	Ok(())
}

#[rstest]
#[case::no_prefix("aaa bbb ccc", 8, "", "aaa bbb\nccc")]
#[case::list_prefix("aaa bbb ccc", 8, "- ", "- aaa\n  bbb\n  ccc")]
#[case::disabled("aaa bbb ccc", 0, "", "aaa bbb ccc")]
#[case::unsafe_token("aaa - bbb", 4, "", "aaa -\nbbb")]
fn wrap_text_at_columns(#[case] text: &str, #[case] columns: usize, #[case] prefix: &str, #[case] expected: &str) {
	assert_eq!(markdown::wrap_text(text, columns, prefix), expected);
}

#[test]
fn filter_nodes_drops_other_languages() -> DocResult<()> {
	let nodes = markdown::parse("## Python only\n\n* langs: python\n\ntext\n\n## All\n\ntext2\n")?;

	let js = markdown::filter_nodes_for_language(nodes.clone(), Lang::Js);
	assert_eq!(js, vec![MarkdownNode::heading(2, "All", vec![MarkdownNode::text("text2")])]);

	let python = markdown::filter_nodes_for_language(nodes, Lang::Python);
	assert_eq!(python[0], MarkdownNode::heading(2, "Python only", vec![MarkdownNode::text("text")]));

	Ok(())
}

#[test]
fn generate_toc_links_headings() -> DocResult<()> {
	let nodes = markdown::parse("# Guide\n\n## Getting Started!\n\n### Install it\n\n## Next\n")?;
	let toc = markdown::generate_toc(&nodes, true);
	let expected = vec![
		MarkdownNode::list_item(ListStyle::Default, "[Getting Started!](#getting-started)", vec![
			MarkdownNode::list_item(ListStyle::Default, "[Install it](#install-it)", Vec::new()),
		]),
		MarkdownNode::list_item(ListStyle::Default, "[Next](#next)", Vec::new()),
	];
	assert_eq!(toc, expected);

	Ok(())
}

// --- Type expressions ---

#[test]
fn parse_type_expression_with_template_and_union() {
	let parsed = parse_type_expression("Array<string>|null");
	let expected = ParsedType {
		name: "Array".to_string(),
		template: Some(Box::new(ParsedType::named("string"))),
		union: Some(Box::new(ParsedType::named("null"))),
		..ParsedType::default()
	};
	assert_eq!(parsed, expected);
}

#[test]
fn parse_type_expression_function() {
	let parsed = parse_type_expression("function(Request):boolean");
	let expected = ParsedType {
		name: "function".to_string(),
		args: Some(Box::new(ParsedType::named("Request"))),
		ret_type: Some(Box::new(ParsedType::named("boolean"))),
		..ParsedType::default()
	};
	assert_eq!(parsed, expected);
}

#[test]
fn named_string_union_becomes_enum() -> DocResult<()> {
	let ty = Type::parse(r#"Color<"red"|"blue">"#, Vec::new())?;
	assert_eq!(ty.name, "Color");
	assert!(ty.is_string_enum());
	let values: Vec<String> = ty.union.iter().flatten().filter_map(Type::literal_value).collect();
	assert_eq!(values, vec!["red", "blue"]);

	Ok(())
}

#[test]
fn object_templates_are_parsed() -> DocResult<()> {
	let ty = Type::parse("[Object]<[string], [int]>", Vec::new())?;
	assert_eq!(ty.name, "Object");
	let templates: Vec<&str> = ty.templates.iter().flatten().map(|ty| ty.name.as_str()).collect();
	assert_eq!(templates, vec!["string", "int"]);

	Ok(())
}

#[rstest]
#[case::anonymous_enum(r#""a"|"b""#)]
#[case::number("[number]")]
#[case::nested_number("[Array]<[number]>")]
fn type_parse_errors(#[case] expression: &str) {
	let result = Type::parse(expression, Vec::new());
	match result {
		Err(DocError::AnonymousEnum(found) | DocError::NumberType(found)) => assert_eq!(found, expression),
		other => panic!("expected a type error, got {other:?}"),
	}
}

const NESTED_OBJECTS: &str = "# class: Ctx\n\n## async method: Ctx.cookies\n- returns: <[Array]<[Object]>>\n  - \
                              `name` <[string]> Cookie name.\n  - `value` <[string]> Cookie value.\n\n## method: \
                              Ctx.viewport\n- returns: <[null]|[Object]>\n  - `width` <[int]> Width.\n";

#[rstest]
#[case::array_of_objects("cookies", vec!["name", "value"])]
#[case::nullable_object("viewport", vec!["width"])]
fn nested_properties_attach_to_inner_objects(#[case] method: &str, #[case] expected: Vec<&str>) -> DocResult<()> {
	let documentation = parse_api(NESTED_OBJECTS)?;
	let member = documentation
		.class("Ctx")
		.and_then(|class| class.member(method))
		.unwrap_or_else(|| panic!("Ctx.{method}"));
	let properties = member
		.r#type
		.as_ref()
		.and_then(Type::deep_properties)
		.unwrap_or_else(|| panic!("{method} has no nested properties"));
	assert_eq!(member_names(properties), expected);

	Ok(())
}

#[test]
fn nested_properties_need_an_object() {
	let source = "# class: Ctx\n\n## method: Ctx.title\n- returns: <[string]>\n  - `x` <[int]> X.\n";
	let result = parse_api(source);
	assert!(matches!(result, Err(DocError::PropertiesOnNonObject(_))), "{result:?}");
}

#[rstest]
#[case::named("`url` <[string]> URL to open.", "url", "[string]", "URL to open.", false)]
#[case::optional("`timeout` ?<[float]>", "timeout", "[float]", "", true)]
#[case::returns("returns: <[Array]<[string]>>", "returns", "[Array]<[string]>", "", false)]
fn parse_variable_lines(
	#[case] line: &str,
	#[case] name: &str,
	#[case] expression: &str,
	#[case] comment: &str,
	#[case] optional: bool,
) -> DocResult<()> {
	let variable = parse_variable(line)?;
	assert_eq!(variable.name, name);
	assert_eq!(variable.expression, expression);
	assert_eq!(variable.comment, comment);
	assert_eq!(variable.optional, optional);

	Ok(())
}

#[test]
fn parse_variable_rejects_missing_type() {
	let result = parse_variable("`url` URL to open.");
	assert!(matches!(result, Err(DocError::InvalidArgument(_))));
}

// --- API parsing ---

#[test]
fn parse_api_builds_classes_and_members() -> DocResult<()> {
	let documentation = parse_api(PAGE_API)?;
	let classes: Vec<&str> = documentation.classes().iter().map(|class| class.name.as_str()).collect();
	assert_eq!(classes, vec!["Page", "Frame", "Response"]);

	let page = documentation.class("Page").unwrap_or_else(|| panic!("Page"));
	assert_eq!(page.extends.as_deref(), Some("EventEmitter"));
	assert_eq!(page.since.as_deref(), Some("v1.8"));
	assert_eq!(member_names(page.members()), vec!["close", "goto", "url"]);
	assert_eq!(page.events().count(), 1);
	assert_eq!(page.methods().count(), 1);
	assert_eq!(page.properties().count(), 1);

	let goto = page.member("goto").unwrap_or_else(|| panic!("goto"));
	assert!(goto.r#async);
	assert_eq!(member_names(&goto.args), vec!["url", "options"]);
	assert_eq!(member_names(goto.option_properties()), vec!["timeout", "waitUntil"]);
	assert!(goto.option_properties().iter().all(|option| !option.required));
	assert_eq!(goto.option_properties()[0].enclosing_method.as_deref(), Some("Page.goto"));

	let returns: Vec<&str> = goto
		.r#type
		.iter()
		.flat_map(|ty| ty.union.iter().flatten())
		.map(|ty| ty.name.as_str())
		.collect();
	assert_eq!(returns, vec!["null", "Response"]);

	Ok(())
}

#[rstest]
#[case::property_without_type("# class: A\n\n## property: A.b\n\nNo type.\n")]
#[case::unknown_class_prefix("# widget: A\n")]
#[case::unknown_member_prefix("# class: A\n\n## field: A.b\n")]
#[case::member_of_unknown_class("# class: A\n\n## method: B.run\n")]
fn parse_api_errors(#[case] source: &str) {
	let result = parse_api(source);
	assert!(
		matches!(
			result,
			Err(DocError::InvalidArgument(_) | DocError::InvalidApiHeading(_))
		),
		"{result:?}"
	);
}

#[test]
fn deprecated_metadata_adds_caution_note() -> DocResult<()> {
	let documentation = parse_api("# class: A\n\n## method: A.old\n* deprecated: Use something else.\n")?;
	let old = documentation
		.class("A")
		.and_then(|class| class.member("old"))
		.unwrap_or_else(|| panic!("A.old"));

	assert!(old.deprecated);
	assert_eq!(old.docs[0], MarkdownNode::Note {
		kind: "caution".to_string(),
		text: "**DEPRECATED** Use something else.".to_string(),
	});

	Ok(())
}

#[test]
fn language_aliases_and_availability() -> DocResult<()> {
	let source = "# class: A\n\n## method: A.run\n* langs: js, python\n  - alias-python: execute\n";
	let documentation = parse_api(source)?;

	let mut python = documentation.clone();
	python.filter_for_language(Lang::Python, &FilterOptions::default())?;
	let run = python.class("A").and_then(|class| class.member("run"));
	assert_eq!(run.map(|member| member.alias.as_str()), Some("execute"));

	let mut java = documentation;
	java.filter_for_language(Lang::Java, &FilterOptions::default())?;
	assert!(java.class("A").is_some_and(|class| class.members().is_empty()));

	Ok(())
}

#[test]
fn parameter_override_per_language() -> DocResult<()> {
	let source = "# class: A\n\n## method: A.click\n### param: A.click.x\n- `x` <[int]> X.\n\n### param: \
	              A.click.x\n* langs: csharp\n- `x` <[float]> X as float.\n";
	let documentation = parse_api(source)?;

	for (lang, expected) in [(Lang::Js, "int"), (Lang::Csharp, "float")] {
		let mut filtered = documentation.clone();
		filtered.filter_for_language(lang, &FilterOptions::default())?;
		let x = filtered
			.class("A")
			.and_then(|class| class.member("click"))
			.and_then(|click| click.arg("x"))
			.and_then(|x| x.r#type.as_ref())
			.map(|ty| ty.name.clone());
		assert_eq!(x.as_deref(), Some(expected), "{lang}");
	}

	Ok(())
}

#[test]
fn parameter_documented_twice_without_langs_fails() {
	let source = "# class: A\n\n## method: A.click\n### param: A.click.x\n- `x` <[int]> X.\n\n### param: \
	              A.click.x\n- `x` <[float]> X.\n";
	let result = parse_api(source);
	assert!(matches!(result, Err(DocError::TypeOverrideWithoutLang(_))), "{result:?}");
}

#[test]
fn experimental_members_are_removed() -> DocResult<()> {
	let source = "# class: A\n\n## method: A.a\n\n## method: A.b\n* experimental\n";
	let mut documentation = parse_api(source)?;
	documentation.filter_out_experimental();
	let class = documentation.class("A").unwrap_or_else(|| panic!("A"));
	assert_eq!(member_names(class.members()), vec!["a"]);

	Ok(())
}

// --- Overloads ---

const WAIT_FOR_URL: &str = "# class: Page\n\n## async method: Page.waitForURL\n\n### option: \
                            Page.waitForURL.url\n- `url` <[string]|[RegExp]> The URL.\n";

#[test]
fn csharp_expands_union_options() -> DocResult<()> {
	let mut documentation = parse_api(WAIT_FOR_URL)?;
	documentation.filter_for_language(Lang::Csharp, &FilterOptions::default())?;
	let method = documentation
		.class("Page")
		.and_then(|class| class.member("waitForURL"))
		.unwrap_or_else(|| panic!("waitForURL"));

	assert_eq!(member_names(method.option_properties()), vec!["urlRegex", "urlString"]);
	let types: Vec<&str> = method
		.option_properties()
		.iter()
		.filter_map(|option| option.r#type.as_ref())
		.map(|ty| ty.name.as_str())
		.collect();
	assert_eq!(types, vec!["RegExp", "string"]);

	Ok(())
}

#[test]
fn csharp_short_notation_collapses_options() -> DocResult<()> {
	let mut documentation = parse_api(WAIT_FOR_URL)?;
	documentation.filter_for_language(Lang::Csharp, &FilterOptions {
		csharp_short_notation: true,
	})?;
	let method = documentation
		.class("Page")
		.and_then(|class| class.member("waitForURL"))
		.unwrap_or_else(|| panic!("waitForURL"));

	let aliases: Vec<&str> = method
		.option_properties()
		.iter()
		.map(|option| option.alias.as_str())
		.collect();
	assert_eq!(aliases, vec!["urlString|urlRegex"]);

	Ok(())
}

#[test]
fn other_languages_keep_union_options() -> DocResult<()> {
	let mut documentation = parse_api(WAIT_FOR_URL)?;
	documentation.filter_for_language(Lang::Js, &FilterOptions::default())?;
	let method = documentation
		.class("Page")
		.and_then(|class| class.member("waitForURL"))
		.unwrap_or_else(|| panic!("waitForURL"));
	assert_eq!(member_names(method.option_properties()), vec!["url"]);

	Ok(())
}

#[test]
fn csharp_rejects_unsupported_overload() -> DocResult<()> {
	let source = "# class: Page\n\n## method: Page.run\n\n### option: Page.run.value\n- `value` <[string]|[int]> \
	              The value.\n";
	let mut documentation = parse_api(source)?;
	let result = documentation.filter_for_language(Lang::Csharp, &FilterOptions::default());
	assert!(matches!(result, Err(DocError::UnsupportedOverload { .. })), "{result:?}");

	Ok(())
}

#[rstest]
#[case::csharp(Lang::Csharp)]
#[case::js(Lang::Js)]
fn option_links_resolve_after_overload_expansion(#[case] lang: Lang) -> DocResult<()> {
	let source = WAIT_FOR_URL.replace(
		"## async method: Page.waitForURL\n",
		"## async method: Page.waitForURL\n\nWaits. See [`option: url`].\n",
	);
	let mut documentation = parse_api(&source)?;
	documentation.filter_for_language(lang, &FilterOptions::default())?;
	documentation.set_link_renderer(LinkRenderer::new(|link| {
		match link {
			Link::Option(alias) => Some(format!("`{alias}`")),
			_ => None,
		}
	}));
	documentation.render_links()?;

	let method = documentation
		.class("Page")
		.and_then(|class| class.member("waitForURL"))
		.unwrap_or_else(|| panic!("waitForURL"));
	assert_eq!(method.docs, vec![MarkdownNode::text("Waits. See `url`.")]);

	Ok(())
}

// --- Model passes ---

#[test]
fn copy_docs_from_superclasses_reports_overrides() -> DocResult<()> {
	let source = "# class: Base\n\n## method: Base.a\n\n## method: Base.b\n\n# class: Child\n* extends: \
	              [Base]\n\n## method: Child.a\n";
	let mut documentation = parse_api(source)?;
	let mut diagnostics = Diagnostics::new();
	documentation.copy_docs_from_superclasses(&mut diagnostics);

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].message, "Member documentation overrides base: Child.a over Base.a");

	let child = documentation.class("Child").unwrap_or_else(|| panic!("Child"));
	assert_eq!(member_names(child.members()), vec!["a", "b"]);
	assert_eq!(child.members()[0].inherited_from, None);
	assert_eq!(child.members()[1].inherited_from.as_deref(), Some("Base"));
	assert_eq!(child.members()[1].class_name, "Child");

	Ok(())
}

#[test]
fn copy_docs_across_several_levels() -> DocResult<()> {
	let source = "# class: C\n* extends: [B]\n\n## method: C.c\n\n# class: B\n* extends: [A]\n\n## method: \
	              B.b\n\n# class: A\n\n## method: A.a\n";
	let mut documentation = parse_api(source)?;
	let mut diagnostics = Diagnostics::new();
	documentation.copy_docs_from_superclasses(&mut diagnostics);

	assert!(diagnostics.is_empty(), "{diagnostics:?}");
	let c = documentation.class("C").unwrap_or_else(|| panic!("C"));
	assert_eq!(member_names(c.members()), vec!["c", "b", "a"]);
	assert_eq!(c.members()[2].inherited_from.as_deref(), Some("A"));

	Ok(())
}

#[test]
fn copy_docs_reports_missing_superclass() -> DocResult<()> {
	let mut documentation = parse_api("# class: Child\n* extends: [Missing]\n")?;
	let mut diagnostics = Diagnostics::new();
	documentation.copy_docs_from_superclasses(&mut diagnostics);

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].message, "Undefined superclass: Missing in Child");
	assert!(diagnostics.has_errors());

	Ok(())
}

#[test]
fn validate_order_reports_problems() -> DocResult<()> {
	let source = "# class: Foo\n\n## method: Foo.b\n\n## method: Foo.a\n\n## event: Foo.e\n";
	let documentation = parse_api(source)?;
	let mut diagnostics = Diagnostics::new();
	documentation
		.class("Foo")
		.unwrap_or_else(|| panic!("Foo"))
		.validate_order(&mut diagnostics);

	let messages: Vec<&str> = diagnostics.iter().map(|diagnostic| diagnostic.message.as_str()).collect();
	assert_eq!(messages, vec![
		"Events should go first. Event 'e' in class Foo breaks order",
		"Bad alphabetic ordering of Foo members: Foo.b() should go after Foo.a()",
	]);

	Ok(())
}

#[test]
fn validate_order_accepts_constructor_after_events() -> DocResult<()> {
	let source = "# class: Foo\n\n## event: Foo.a\n\n## event: Foo.b\n\n## method: Foo.constructor\n\n## \
	              method: Foo.$eval\n\n## method: Foo.$$eval\n\n## method: Foo.click\n";
	let documentation = parse_api(source)?;
	let mut diagnostics = Diagnostics::new();
	documentation
		.class("Foo")
		.unwrap_or_else(|| panic!("Foo"))
		.validate_order(&mut diagnostics);
	assert!(diagnostics.is_empty(), "{diagnostics:?}");

	Ok(())
}

#[test]
fn merge_keeps_every_member() -> DocResult<()> {
	let first = parse_api("# class: Test\n\n## method: Test.a\n\n## method: Test.b\n")?;
	let second = parse_api("# class: Test\n\n## method: Test.c\n")?;
	let merged = first.merge_with(&second);

	assert_eq!(merged.classes().len(), 1);
	let test = merged.class("Test").unwrap_or_else(|| panic!("Test"));
	assert_eq!(
		test.members().len(),
		first.classes()[0].members().len() + second.classes()[0].members().len()
	);

	Ok(())
}

#[rstest]
#[case::case_insensitive("Alpha", "beta", std::cmp::Ordering::Less)]
#[case::accent_insensitive("\u{e9}tat", "ever", std::cmp::Ordering::Less)]
#[case::accent_equal("r\u{e9}sum\u{e9}", "resume", std::cmp::Ordering::Equal)]
#[case::dollar_run("$$eval", "$eval", std::cmp::Ordering::Equal)]
fn member_names_compare_loosely(#[case] first: &str, #[case] second: &str, #[case] expected: std::cmp::Ordering) {
	assert_eq!(compare_member_names(first, second), expected);
}

// --- Links ---

fn render_links_in(sentence: &str) -> DocResult<Documentation> {
	let source = format!("# class: A\n\n## method: A.run\n\n{sentence}\n\n### param: A.run.x\n- `x` <[int]> X.\n");
	let mut documentation = parse_api(&source)?;
	documentation.set_link_renderer(LinkRenderer::new(|link| {
		match link {
			Link::Class(class) => Some(format!("[{}](./{}.md)", class.name, class.name.to_lowercase())),
			Link::Member(member) => Some(format!("`{}`", member.qualified_name())),
			Link::Param(alias) | Link::Option(alias) => Some(format!("`{alias}`")),
		}
	}));
	documentation.render_links()?;
	Ok(documentation)
}

#[test]
fn render_links_rewrites_references() -> DocResult<()> {
	let documentation = render_links_in("Calls [`method: A.run`] with [`param: x`] on [A].")?;
	let run = documentation
		.class("A")
		.and_then(|class| class.member("run"))
		.unwrap_or_else(|| panic!("A.run"));
	assert_eq!(run.docs, vec![MarkdownNode::text("Calls `A.run` with `x` on [A](./a.md).")]);

	Ok(())
}

#[test]
fn render_links_keeps_explicit_hrefs() -> DocResult<()> {
	let documentation = render_links_in("See [`method: A.run`](https://example.com).")?;
	let run = documentation
		.class("A")
		.and_then(|class| class.member("run"))
		.unwrap_or_else(|| panic!("A.run"));
	assert_eq!(run.docs, vec![MarkdownNode::text("See [`method: A.run`](https://example.com).")]);

	Ok(())
}

#[rstest]
#[case::undefined_member("See [`method: A.missing`].")]
#[case::undefined_param("See [`param: y`].")]
#[case::unknown_kind("See [`widget: A.run`].")]
#[case::undefined_member_with_href("See [`method: A.gone`](#a).")]
#[case::unknown_kind_with_href("See [`widget: A.nothing`](./x.md).")]
fn render_links_errors(#[case] sentence: &str) {
	let result = render_links_in(sentence);
	assert!(
		matches!(
			result,
			Err(DocError::UndefinedMember(_) | DocError::UndefinedParam { .. } | DocError::UnknownLinkKind(_))
		),
		"{result:?}"
	);
}

// --- Formatters ---

#[rstest]
#[case::js(Lang::Js, ["page.on('close')", "page.goto(url[, options])", "page.url"])]
#[case::python(Lang::Python, ["page.on(\"close\")", "page.goto(url, **kwargs)", "page.url"])]
#[case::java(Lang::Java, ["page.onClose(handler)", "page.goto(url[, options])", "page.url()"])]
#[case::csharp(Lang::Csharp, ["page.Close += handler", "page.GotoAsync(url, options)", "Page.Url"])]
fn format_member_signatures(#[case] lang: Lang, #[case] expected: [&str; 3]) -> DocResult<()> {
	let documentation = parse_api(PAGE_API)?;
	let formatter = formatter_for(lang, known_classes(&documentation));
	let page = documentation.class("Page").unwrap_or_else(|| panic!("Page"));

	let mut signatures = Vec::new();
	for member in page.members() {
		signatures.push(formatter.format_member(member)?.remove(0).signature);
	}
	assert_eq!(signatures, expected);

	Ok(())
}

#[test]
fn python_flattens_options_into_keyword_arguments() -> DocResult<()> {
	let documentation = parse_api(PAGE_API)?;
	let formatter = formatter_for(Lang::Python, HashSet::new());
	let goto = documentation
		.class("Page")
		.and_then(|class| class.member("goto"))
		.unwrap_or_else(|| panic!("goto"));

	let formatted = formatter.format_member(goto)?;
	assert_eq!(member_names(&formatted[0].args), vec!["url", "timeout", "waitUntil"]);

	Ok(())
}

#[rstest]
#[case::js_template(Lang::Js, "[Array]<[string]>", "[Array]<[string]>")]
#[case::js_function(Lang::Js, "function([Request]):[boolean]", "[function]([Request]):[boolean]")]
#[case::js_numbers(Lang::Js, "[int]|[float]", "[number]|[number]")]
#[case::js_mixed_union(Lang::Js, r#""a"|"b"|[int]"#, r#""a"|"b"|[number]"#)]
#[case::python_dict(Lang::Python, "[Object]<[string], [string]>", r"[Dict]\[[str], [str]\]")]
#[case::python_path(Lang::Python, "[path]", r"[Union]\[[str], [pathlib.Path]\]")]
#[case::python_null(Lang::Python, "[null]|[string]", "[NoneType]|[str]")]
#[case::java_list(Lang::Java, "[Array]<[string]>", "[List]<[String]>")]
#[case::java_map(Lang::Java, "[Object]<[string], [string]>", "[Map]<[String], [String]>")]
#[case::java_nullable(Lang::Java, "[null]|[float]", "[double]")]
#[case::java_consumer(Lang::Java, "function([string])", "[Consumer]<[String]>")]
#[case::java_predicate(Lang::Java, "function([string]):[boolean]", "[Predicate]<[String]>")]
#[case::java_enum(Lang::Java, r#""a"|"b"|[int]"#, "[enum Mode { A, B }]|[int]")]
#[case::java_named_enum(Lang::Java, r#"[Media]<"print"|"no-preference">"#, "[enum Media { PRINT, NO_PREFERENCE }]")]
#[case::csharp_nullable(Lang::Csharp, "[string]|[null]", "[string]?")]
#[case::csharp_func(Lang::Csharp, "function([string]):[boolean]", "[Func]<[string], [bool]>")]
#[case::csharp_action(Lang::Csharp, "function()", "[Action]")]
#[case::csharp_enum(Lang::Csharp, r#""a"|"b"|[int]"#, "[enum Mode { A, B }]|[int]")]
#[case::csharp_named_enum(Lang::Csharp, r#"[Media]<"print"|"no-preference">"#, "[enum Media { Print, NoPreference }]")]
fn render_types(#[case] lang: Lang, #[case] expression: &str, #[case] expected: &str) -> DocResult<()> {
	let member = property("mode", expression);
	let formatter = formatter_for(lang, HashSet::new());
	let ty = member.r#type.as_ref().unwrap_or_else(|| panic!("type"));
	assert_eq!(formatter.render_type(ty, Direction::Input, &member)?, expected);

	Ok(())
}

#[test]
fn java_function_override_table() -> DocResult<()> {
	let mut member = property("callback", "function([Page]):[Object]");
	member.enclosing_method = Some("Page.exposeBinding".to_string());
	let formatter = formatter_for(Lang::Java, HashSet::new());
	let ty = member.r#type.as_ref().unwrap_or_else(|| panic!("type"));
	assert_eq!(formatter.render_type(ty, Direction::Input, &member)?, "[BindingCallback]");

	Ok(())
}

#[rstest]
#[case::predicate("function([string]):[boolean]", "[String]", "[Predicate]<[String]>")]
#[case::consumer("function([string])", "[String]", "[Consumer]<[String]>")]
#[case::runnable("function()", "", "[Runnable]")]
fn java_format_function(#[case] expression: &str, #[case] args: &str, #[case] expected: &str) -> DocResult<()> {
	let ty = Type::parse(expression, Vec::new())?;
	let formatter = formatter_for(Lang::Java, HashSet::new());
	assert_eq!(formatter.format_function(args, None, &ty), expected);

	Ok(())
}

#[rstest]
#[case::java_unmapped(Lang::Java, "[Widget]")]
#[case::java_arity(Lang::Java, "function([string], [int])")]
#[case::csharp_unmapped(Lang::Csharp, "[Widget]")]
#[case::csharp_arity(Lang::Csharp, "function([int], [int], [int], [int])")]
fn render_type_errors(#[case] lang: Lang, #[case] expression: &str) {
	let member = property("value", expression);
	let formatter = formatter_for(lang, HashSet::new());
	let ty = member.r#type.as_ref().unwrap_or_else(|| panic!("type"));
	let result = formatter.render_type(ty, Direction::Input, &member);
	assert!(
		matches!(
			result,
			Err(DocError::UnmappedType { .. } | DocError::UnsupportedArity { .. })
		),
		"{result:?}"
	);
}

#[test]
fn known_classes_render_in_java() -> DocResult<()> {
	let member = property("value", "[Widget]");
	let formatter = formatter_for(Lang::Java, HashSet::from(["Widget".to_string()]));
	let ty = member.r#type.as_ref().unwrap_or_else(|| panic!("type"));
	assert_eq!(formatter.render_type(ty, Direction::Output, &member)?, "[Widget]");

	Ok(())
}

#[test]
fn python_comment_keywords() {
	let formatter = formatter_for(Lang::Python, HashSet::new());
	let docs = formatter.preprocess_comment(vec![MarkdownNode::text("Returns `null` or `true`.")]);
	assert_eq!(docs, vec![MarkdownNode::text("Returns `None` or `True`.")]);
}

#[rstest]
#[case::snake(to_snake_case("colorScheme"), "color_scheme")]
#[case::snake_acronym(to_snake_case("APIRequest"), "api_request")]
#[case::kebab(to_kebab_case("BrowserContext"), "browser-context")]
#[case::kebab_overload(to_kebab_case("goto#2"), "goto-2")]
#[case::pascal(to_pascal_case("no-preference"), "NoPreference")]
#[case::var(var_name("APIRequest"), "apiRequest")]
fn case_conversions(#[case] converted: String, #[case] expected: &str) {
	assert_eq!(converted, expected);
}

#[rstest]
#[case::event(MemberKind::Event, "close", "page-event-close")]
#[case::method(MemberKind::Method, "goto", "page-goto")]
#[case::overload(MemberKind::Method, "click#2", "page-click-2")]
fn member_anchors(#[case] kind: MemberKind, #[case] name: &str, #[case] expected: &str) {
	let member = Member::new(kind, name, None);
	assert_eq!(member_anchor("Page", &member), expected);
}

// --- Config and sources ---

#[test]
fn config_defaults() {
	let config = ApirefConfig::default();
	assert_eq!(config.source_dir, Path::new("docs/src"));
	assert_eq!(config.languages, Lang::ALL.to_vec());
	assert_eq!(config.extension(), "mdx");
	assert_eq!(config.output_root(Path::new("/root"), Lang::Java), Path::new("/root/out/java"));
	assert_eq!(
		config.language_links_path(Path::new("/root"), Lang::Python),
		Path::new("/root/docs/src/links-python.md")
	);
}

#[test]
fn config_loads_from_file() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	std::fs::write(
		tmp.path().join("apiref.toml"),
		"languages = [\"java\"]\nmdx = false\n\n[guides]\nexclude = [\"draft-*.md\"]\n",
	)
	.unwrap_or_else(|e| panic!("write: {e}"));

	let config = ApirefConfig::load(tmp.path())?.unwrap_or_else(|| panic!("config"));
	assert_eq!(config.languages, vec![Lang::Java]);
	assert_eq!(config.extension(), "md");
	assert_eq!(config.guides.exclude, vec!["draft-*.md"]);
	assert_eq!(config.source_dir, Path::new("docs/src"));

	Ok(())
}

#[test]
fn config_missing_and_invalid() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	assert!(ApirefConfig::load(tmp.path())?.is_none());

	std::fs::write(tmp.path().join(".apiref.toml"), "languages = [\"cobol\"]\n")
		.unwrap_or_else(|e| panic!("write: {e}"));
	let result = ApirefConfig::load(tmp.path());
	assert!(matches!(result, Err(DocError::ConfigParse(_))), "{result:?}");

	Ok(())
}

#[test]
fn source_dir_override() {
	let config = ApirefConfig::default().with_source_dir_override(Some("site/src".into()));
	assert_eq!(config.source_dir, Path::new("site/src"));

	let config = ApirefConfig::default().with_source_dir_override(None);
	assert_eq!(config.source_dir, Path::new("docs/src"));
}

#[test]
fn guide_front_matter() -> DocResult<()> {
	let nodes = markdown::parse(GUIDE)?;
	let front_matter = parse_front_matter(&nodes, Path::new("intro.md"))?;
	assert_eq!(front_matter.id.as_deref(), Some("intro"));
	assert_eq!(front_matter.title.as_deref(), Some("Intro"));

	Ok(())
}

#[test]
fn code_fences_are_gated_by_language() -> DocResult<()> {
	let nodes = markdown::parse(GUIDE)?;
	let mut fences = Vec::new();
	markdown::visit_all(&gate_code_fences(nodes, Lang::Python), &mut |node| {
		if let MarkdownNode::Code { lang, .. } = node {
			fences.push(lang.clone());
		}
	});
	assert_eq!(fences, vec!["python"]);

	Ok(())
}

// --- Generator ---

#[test]
fn generate_java_subclass_page() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(tmp.path(), &[("class-foo.md", FOO_API)], &[]);
	let config = ApirefConfig {
		languages: vec![Lang::Java],
		..ApirefConfig::default()
	};

	let generation = Generator::new(tmp.path(), config).generate(&[])?;
	assert!(generation.diagnostics.is_empty(), "{:?}", generation.diagnostics);
	assert_eq!(generation.files.len(), 2);

	let foo = generation
		.files
		.iter()
		.find(|file| file.path.ends_with("out/java/class-foo.mdx"))
		.unwrap_or_else(|| panic!("class-foo.mdx"));
	let content = &foo.content;

	assert!(content.starts_with("---\nid: class-foo\ntitle: \"Foo\"\n---\n"), "{content}");
	assert!(content.contains("Extends: [Bar]"), "{content}");
	let events = content.find("## Events").unwrap_or_else(|| panic!("{content}"));
	let methods = content.find("## Methods").unwrap_or_else(|| panic!("{content}"));
	assert!(events < methods);
	assert!(content.contains("### foo.onReady(handler) {#foo-event-ready}"), "{content}");
	assert!(content.contains("### foo.go([options]) {#foo-go}"), "{content}");
	assert!(content.contains("`setMode` [enum Mode { A, B }]|[int] *(optional)*"), "{content}");
	assert!(content.contains("## Inherited from Bar"), "{content}");
	assert!(content.contains("- [foo.stop()](./class-bar.mdx#bar-stop)"), "{content}");
	assert!(content.contains("[Bar]: ./class-bar.mdx \"Bar\""), "{content}");

	Ok(())
}

#[test]
fn generate_js_pages_and_guides() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(
		tmp.path(),
		&[("class-page.md", PAGE_API), ("class-foo.md", FOO_API)],
		&[
			("intro.md", GUIDE),
			("links.md", "[EventEmitter]: https://nodejs.org/api/events.html \"EventEmitter\"\n"),
		],
	);
	let generator = Generator::new(tmp.path(), ApirefConfig::default());
	let generation = generator.generate(&[Lang::Js, Lang::Python])?;

	let find = |suffix: &str| {
		generation
			.files
			.iter()
			.find(|file| file.path.ends_with(suffix))
			.map(|file| file.content.as_str())
			.unwrap_or_else(|| panic!("{suffix} not generated"))
	};

	let page = find("out/js/class-page.mdx");
	assert!(page.contains("### page.goto(url[, options]) {#page-goto}"), "{page}");
	assert!(page.contains("Added in: v1.8"), "{page}");
	assert!(page.contains("- [Promise]<[null]|[Response]>"), "{page}");
	assert!(page.contains("Navigates to a URL. Pass `url` and maybe `timeout`."), "{page}");
	assert!(page.contains("[page.goto(url[, options])](./class-page.mdx#page-goto)"), "{page}");
	assert!(page.contains("- `url` [string]"), "{page}");
	assert!(page.contains("`timeout` [number] *(optional)*"), "{page}");
	assert!(page.contains("[EventEmitter]: https://nodejs.org/api/events.html"), "{page}");

	let js_guide = find("out/js/intro.mdx");
	assert!(js_guide.contains("- [Install](#install)"), "{js_guide}");
	assert!(js_guide.contains("const foo = 1;"), "{js_guide}");
	assert!(!js_guide.contains("```python"), "{js_guide}");
	assert!(!js_guide.contains("Only for Python"), "{js_guide}");

	let python_guide = find("out/python/intro.mdx");
	assert!(python_guide.contains("- [Python only](#python-only)"), "{python_guide}");
	assert!(python_guide.contains("```python"), "{python_guide}");
	assert!(!python_guide.contains("const foo"), "{python_guide}");

	assert!(
		!generation
			.files
			.iter()
			.any(|file| file.path.ends_with("links.mdx"))
	);

	Ok(())
}

#[test]
fn check_and_write_outputs() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(tmp.path(), &[("class-foo.md", FOO_API)], &[]);
	let config = ApirefConfig {
		languages: vec![Lang::Js],
		..ApirefConfig::default()
	};
	let generation = Generator::new(tmp.path(), config).generate(&[])?;

	let statuses = check_outputs(&generation.files)?;
	assert!(statuses.iter().all(|(_, status)| *status == FileStatus::Missing));

	write_outputs(&generation.files)?;
	let statuses = check_outputs(&generation.files)?;
	assert!(statuses.iter().all(|(_, status)| *status == FileStatus::UpToDate));

	std::fs::write(&generation.files[0].path, "edited\n").unwrap_or_else(|e| panic!("write: {e}"));
	let statuses = check_outputs(&generation.files)?;
	assert_eq!(statuses[0].1, FileStatus::Stale {
		current: "edited\n".to_string(),
	});

	Ok(())
}

#[test]
fn lint_collects_ordering_diagnostics() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(
		tmp.path(),
		&[("class-foo.md", "# class: Foo\n\n## method: Foo.b\n\n## method: Foo.a\n")],
		&[],
	);

	let (_, diagnostics) = Generator::new(tmp.path(), ApirefConfig::default()).lint()?;
	assert_eq!(diagnostics.len(), 1);
	assert!(diagnostics[0].message.starts_with("Bad alphabetic ordering"));

	Ok(())
}

#[test]
fn json_model_for_language() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(tmp.path(), &[("class-page.md", PAGE_API)], &[]);

	let json = Generator::new(tmp.path(), ApirefConfig::default()).json(Lang::Java)?;
	let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_else(|e| panic!("json: {e}"));
	assert_eq!(value[0]["name"], "Page");
	assert_eq!(value[0]["members"][1]["name"], "goto");

	Ok(())
}

#[test]
fn api_errors_name_the_file() {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(tmp.path(), &[("class-bad.md", "# class: A\n\n## property: A.b\n")], &[]);

	let result = Generator::new(tmp.path(), ApirefConfig::default()).generate(&[]);
	match result {
		Err(DocError::InFile { path, source }) => {
			assert!(path.ends_with("class-bad.md"), "{path}");
			assert!(matches!(*source, DocError::InvalidArgument(_)));
		}
		other => panic!("expected a file error, got {other:?}"),
	}
}

#[traced_test]
#[test]
fn generation_logs_each_language() -> DocResult<()> {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	write_project(tmp.path(), &[("class-foo.md", FOO_API)], &[]);
	let config = ApirefConfig {
		languages: vec![Lang::Csharp],
		..ApirefConfig::default()
	};

	Generator::new(tmp.path(), config).generate(&[])?;
	assert!(logs_contain("generating language"));
	assert!(logs_contain("language pass finished"));

	Ok(())
}
