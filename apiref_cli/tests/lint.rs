mod common;

use apiref_core::AnyEmptyResult;
use serde_json::Value;

const BAD_ORDER_API: &str = r#"# class: Page
* since: v1.0

## method: Page.reload
* since: v1.0

## method: Page.goto
* since: v1.0
"#;

#[test]
fn lint_passes_for_ordered_sources() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	common::apiref_cmd()
		.arg("lint")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No problems found in 1 class(es)."));

	Ok(())
}

#[test]
fn lint_fails_on_bad_member_order() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), BAD_ORDER_API)?;

	common::apiref_cmd()
		.arg("lint")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains(
			"error[Page.reload]: Bad alphabetic ordering of Page members: Page.reload() should go after \
			 Page.goto()",
		));

	Ok(())
}

#[test]
fn lint_prints_json_diagnostics() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), BAD_ORDER_API)?;

	let output = common::apiref_cmd()
		.arg("lint")
		.arg("--json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert_eq!(output.status.code(), Some(1));
	let value: Value = serde_json::from_slice(&output.stdout)?;
	let diagnostics = value.as_array().ok_or("expected an array")?;
	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0]["severity"], "error");
	assert_eq!(diagnostics[0]["location"], "Page.reload");

	Ok(())
}

#[test]
fn json_prints_the_filtered_model() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write_project(tmp.path(), common::PAGE_API)?;

	let output = common::apiref_cmd()
		.arg("json")
		.arg("--lang")
		.arg("python")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	let value: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(value[0]["name"], "Page");
	assert_eq!(value[0]["members"][1]["name"], "goto");

	Ok(())
}
