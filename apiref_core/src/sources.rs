//! Source discovery: API directories, guides and link reference files.

use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use serde::Deserialize;
use tracing::debug;

use crate::DocError;
use crate::DocResult;
use crate::markdown;
use crate::markdown::MarkdownNode;

/// Build a `GlobSet` from `[guides] exclude` patterns.
pub fn build_glob_set(patterns: &[String]) -> DocResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern)
			.map_err(|e| DocError::ConfigParse(format!("invalid guide exclude pattern `{pattern}`: {e}")))?;
		builder.add(glob);
	}
	builder
		.build()
		.map_err(|e| DocError::ConfigParse(format!("failed to build guide exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the source tree's `.gitignore` file (if
/// any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules"
}

fn is_markdown_file(path: &Path) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext == "md")
}

/// Collect every markdown file under `root`, skipping the directories in
/// `skip_dirs`, hidden directories and anything the tree's `.gitignore`
/// excludes. The result is sorted.
pub fn collect_markdown_files(root: &Path, skip_dirs: &[PathBuf]) -> DocResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let gitignore = build_gitignore(root);
	walk_dir(root, skip_dirs, &gitignore, &mut files)?;
	files.sort();
	Ok(files)
}

fn walk_dir(dir: &Path, skip_dirs: &[PathBuf], gitignore: &Gitignore, files: &mut Vec<PathBuf>) -> DocResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if path
			.file_name()
			.and_then(|name| name.to_str())
			.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		let is_dir = path.is_dir();
		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			if skip_dirs.iter().any(|skip| skip == &path) {
				continue;
			}
			walk_dir(&path, skip_dirs, gitignore, files)?;
		} else if is_markdown_file(&path) {
			files.push(path);
		}
	}

	Ok(())
}

/// The YAML front matter fields a guide may carry.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FrontMatter {
	/// Names the output file.
	pub id: Option<String>,
	pub title: Option<String>,
}

/// A free-standing documentation page.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
	/// Path relative to the source root.
	pub relative_path: PathBuf,
	pub front_matter: FrontMatter,
	pub nodes: Vec<MarkdownNode>,
}

impl Guide {
	/// The output file stem: the front matter `id`, else the file stem.
	pub fn output_stem(&self) -> String {
		self.front_matter.id.clone().unwrap_or_else(|| {
			self.relative_path
				.file_stem()
				.map(|stem| stem.to_string_lossy().into_owned())
				.unwrap_or_default()
		})
	}
}

/// Parse the front matter block at the start of `nodes`, if there is one.
pub fn parse_front_matter(nodes: &[MarkdownNode], path: &Path) -> DocResult<FrontMatter> {
	let Some(MarkdownNode::Properties { lines }) = nodes.first() else {
		return Ok(FrontMatter::default());
	};

	serde_yaml_ng::from_str::<Option<FrontMatter>>(&lines.join("\n"))
		.map(Option::unwrap_or_default)
		.map_err(|e| {
			DocError::FrontMatter {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})
}

/// Load every guide under `source_root`. API directories, the link reference
/// files and anything matching `exclude` are skipped.
pub fn load_guides(
	source_root: &Path,
	api_roots: &[PathBuf],
	link_files: &[PathBuf],
	exclude: &GlobSet,
) -> DocResult<Vec<Guide>> {
	let mut guides = Vec::new();

	for path in collect_markdown_files(source_root, api_roots)? {
		if link_files.contains(&path) {
			continue;
		}
		let relative_path = path.strip_prefix(source_root).unwrap_or(&path).to_path_buf();
		if exclude.is_match(&relative_path) {
			debug!(path = %relative_path.display(), "guide excluded");
			continue;
		}

		let content = std::fs::read_to_string(&path)?;
		let nodes = markdown::parse(&content).map_err(|error| error.in_file(relative_path.display()))?;
		let front_matter = parse_front_matter(&nodes, &relative_path)?;

		guides.push(Guide {
			relative_path,
			front_matter,
			nodes,
		});
	}

	debug!(count = guides.len(), "loaded guides");
	Ok(guides)
}

/// Read a link reference file. A missing file yields no lines.
pub fn read_link_file(path: &Path) -> DocResult<Vec<String>> {
	if !path.is_file() {
		debug!(path = %path.display(), "link file not found");
		return Ok(Vec::new());
	}

	let content = std::fs::read_to_string(path)?;
	Ok(content
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.is_empty())
		.map(str::to_string)
		.collect())
}
