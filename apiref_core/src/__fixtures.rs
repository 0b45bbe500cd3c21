use std::path::Path;

use crate::documentation::Member;
use crate::documentation::Type;

/// A small API source covering events, async methods, params, options and a
/// property.
pub(crate) const PAGE_API: &str = r#"# class: Page
* since: v1.8
* extends: [EventEmitter]

Page provides methods to interact with a single tab. See [Frame].

## event: Page.close
* since: v1.8
- argument: <[Page]>

Emitted when the page closes.

## async method: Page.goto
* since: v1.8
- returns: <[null]|[Response]>

Navigates to a URL. Pass [`param: url`] and maybe [`option: timeout`].

### param: Page.goto.url
* since: v1.8
- `url` <[string]> URL to navigate to.

### option: Page.goto.timeout
* since: v1.8
- `timeout` <[float]> Maximum time in milliseconds.

### option: Page.goto.waitUntil
* since: v1.8
- `waitUntil` <[WaitUntilState]<"load"|"domcontentloaded">> When to consider navigation done.

## property: Page.url
* since: v1.8
- type: <[string]>

The current url. Also see [`method: Page.goto`].

# class: Frame
* since: v1.8

A frame inside a [Page].

# class: Response
* since: v1.8

A network response.
"#;

/// A subclass, its superclass and a method with a mixed literal union option.
pub(crate) const FOO_API: &str = r#"# class: Bar
* since: v1.0

The base.

## method: Bar.stop
* since: v1.0

Stops everything.

# class: Foo
* since: v1.0
* extends: [Bar]

The subclass.

## event: Foo.ready
* since: v1.0

Emitted when ready.

## method: Foo.go
* since: v1.0

Goes.

### option: Foo.go.mode
* since: v1.0
- `mode` <"a"|"b"|[int]> The mode.
"#;

pub(crate) const GUIDE: &str = r#"---
id: intro
title: "Intro"
---

<!-- TOC -->

## Install

Use [Foo] to start.

```js
const foo = 1;
```

```python
foo = 1
```

## Python only

* langs: python

Only for Python.
"#;

pub(crate) fn property(name: &str, expression: &str) -> Member {
	let ty = Type::parse(expression, Vec::new()).unwrap_or_else(|e| panic!("type `{expression}`: {e}"));
	Member::property(name, ty, true)
}

/// Lay out a project with the default config: API sources under
/// `docs/src/api`, guides under `docs/src`.
pub(crate) fn write_project(root: &Path, api: &[(&str, &str)], guides: &[(&str, &str)]) {
	let api_dir = root.join("docs/src/api");
	std::fs::create_dir_all(&api_dir).unwrap_or_else(|e| panic!("mkdir: {e}"));

	for (name, content) in api {
		std::fs::write(api_dir.join(name), content).unwrap_or_else(|e| panic!("write {name}: {e}"));
	}
	for (name, content) in guides {
		std::fs::write(root.join("docs/src").join(name), content)
			.unwrap_or_else(|e| panic!("write {name}: {e}"));
	}
}
