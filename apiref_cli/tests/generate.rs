mod common;

use apiref_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn generate_writes_pages_for_every_language() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated 8 file(s)."));

	for lang in ["js", "python", "java", "csharp"] {
		let out = tmp.path().join("out").join(lang);
		assert!(out.join("class-page.mdx").is_file(), "{lang} class page");
		assert!(out.join("intro.mdx").is_file(), "{lang} guide");
	}

	let js = std::fs::read_to_string(tmp.path().join("out/js/class-page.mdx"))?;
	assert!(js.contains("page.goto(url)"), "{js}");

	let java = std::fs::read_to_string(tmp.path().join("out/java/class-page.mdx"))?;
	assert!(java.contains("page.onClose(handler)"), "{java}");

	Ok(())
}

#[test]
fn generate_limits_languages() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--lang")
		.arg("python")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(tmp.path().join("out/python/class-page.mdx").is_file());
	assert!(!tmp.path().join("out/js").exists());

	Ok(())
}

#[test]
fn generate_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Would write:")
				.and(predicates::str::contains("class-page.mdx"))
				.and(predicates::str::contains("8 file(s) would be written")),
		);

	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn generate_honours_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;
	std::fs::write(
		tmp.path().join("apiref.toml"),
		"languages = [\"js\"]\nmdx = false\noutput_dir = \"site\"\n",
	)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated 2 file(s)."));

	assert!(tmp.path().join("site/js/class-page.md").is_file());
	assert!(tmp.path().join("site/js/intro.md").is_file());

	Ok(())
}

#[test]
fn generate_rejects_unknown_language() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--lang")
		.arg("cobol")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("cobol"));

	Ok(())
}

#[test]
fn generate_fails_on_invalid_source() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), "# class: Page\n\n## property: Page.url\n\nNo type.\n")?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("apiref::in_file"));

	assert!(!tmp.path().join("out").exists());

	Ok(())
}
