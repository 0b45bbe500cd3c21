mod common;

use apiref_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

#[test]
fn check_fails_when_output_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("missing:")
				.and(predicates::str::contains("Check failed:")),
		);

	Ok(())
}

#[test]
fn check_passes_after_generate() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::apiref_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	Ok(())
}

#[test]
fn check_reports_stale_file_with_diff() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("generate")
		.arg("--lang")
		.arg("js")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	std::fs::write(
		tmp.path().join("out/js/class-page.mdx"),
		"edited by hand\n",
	)?;

	common::apiref_cmd()
		.arg("check")
		.arg("--lang")
		.arg("js")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("stale:")
				.and(predicates::str::contains("-edited by hand"))
				.and(predicates::str::contains("+---")),
		);

	Ok(())
}
