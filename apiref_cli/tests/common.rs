#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;

pub const PAGE_API: &str = r#"# class: Page
* since: v1.0

A single browser tab.

## event: Page.close
* since: v1.0
- argument: <[Page]>

Emitted when the page closes.

## async method: Page.goto
* since: v1.0

Navigates to [`param: url`].

### param: Page.goto.url
* since: v1.0
- `url` <[string]> Where to go.

## property: Page.url
* since: v1.0
- type: <[string]>

The current url.
"#;

pub const GUIDE: &str = r#"---
id: intro
title: "Intro"
---

Start with [Page].
"#;

pub fn apiref_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_apiref"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("APIREF_SRC_DIR");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Lay out a project using the default config.
pub fn write_project(root: &Path, api: &str) -> std::io::Result<()> {
	let api_dir = root.join("docs/src/api");
	std::fs::create_dir_all(&api_dir)?;
	std::fs::write(api_dir.join("class-page.md"), api)?;
	std::fs::write(root.join("docs/src/intro.md"), GUIDE)?;
	Ok(())
}
