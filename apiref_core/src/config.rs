use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::DocError;
use crate::DocResult;
use crate::Lang;
use crate::documentation::FilterOptions;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["apiref.toml", ".apiref.toml", ".config/apiref.toml"];

/// Overrides `source_dir` when set.
pub const SOURCE_DIR_ENV: &str = "APIREF_SRC_DIR";

/// Configuration loaded from `apiref.toml`.
///
/// ```toml
/// source_dir = "docs/src"
/// api_dirs = ["api", "test-api"]
/// output_dir = "out"
/// languages = ["js", "python"]
///
/// [guides]
/// exclude = ["release-notes-*.md"]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApirefConfig {
	/// Root of the markdown source tree, relative to the project root.
	pub source_dir: PathBuf,
	/// API source directories relative to `source_dir`. Each one is parsed on
	/// its own and the results are merged.
	pub api_dirs: Vec<PathBuf>,
	/// Output root. Every language gets its own sub-directory.
	pub output_dir: PathBuf,
	pub languages: Vec<Lang>,
	/// Write `.mdx` files instead of `.md`.
	pub mdx: bool,
	/// Wrap rendered paragraphs at this column. `0` disables wrapping.
	pub max_columns: usize,
	pub include_experimental: bool,
	pub csharp_short_notation: bool,
	pub links: LinksConfig,
	pub guides: GuidesConfig,
}

impl Default for ApirefConfig {
	fn default() -> Self {
		Self {
			source_dir: PathBuf::from("docs/src"),
			api_dirs: vec![PathBuf::from("api")],
			output_dir: PathBuf::from("out"),
			languages: Lang::ALL.to_vec(),
			mdx: true,
			max_columns: 0,
			include_experimental: false,
			csharp_short_notation: false,
			links: LinksConfig::default(),
			guides: GuidesConfig::default(),
		}
	}
}

/// Link reference files appended to every generated page.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinksConfig {
	pub common: PathBuf,
	/// `{lang}` is replaced by the language name.
	pub per_language: String,
}

impl Default for LinksConfig {
	fn default() -> Self {
		Self {
			common: PathBuf::from("links.md"),
			per_language: "links-{lang}.md".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GuidesConfig {
	/// Glob patterns, relative to `source_dir`, of guides to skip.
	pub exclude: Vec<String>,
}

impl ApirefConfig {
	/// Find the first config file that exists at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if there is no config file.
	pub fn load(root: &Path) -> DocResult<Option<ApirefConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: ApirefConfig =
			toml::from_str(&content).map_err(|e| DocError::ConfigParse(e.to_string()))?;
		debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to the defaults, and apply
	/// environment overrides.
	pub fn load_or_default(root: &Path) -> DocResult<ApirefConfig> {
		let config = Self::load(root)?.unwrap_or_default();
		Ok(config.with_source_dir_override(std::env::var_os(SOURCE_DIR_ENV).map(PathBuf::from)))
	}

	/// Replace `source_dir` when an override is given.
	pub fn with_source_dir_override(mut self, source_dir: Option<PathBuf>) -> Self {
		if let Some(source_dir) = source_dir.filter(|dir| !dir.as_os_str().is_empty()) {
			debug!(source_dir = %source_dir.display(), "source dir overridden by environment");
			self.source_dir = source_dir;
		}
		self
	}

	pub fn source_root(&self, root: &Path) -> PathBuf {
		root.join(&self.source_dir)
	}

	pub fn api_roots(&self, root: &Path) -> Vec<PathBuf> {
		let source_root = self.source_root(root);
		self.api_dirs.iter().map(|dir| source_root.join(dir)).collect()
	}

	pub fn output_root(&self, root: &Path, lang: Lang) -> PathBuf {
		root.join(&self.output_dir).join(lang.as_str())
	}

	pub fn common_links_path(&self, root: &Path) -> PathBuf {
		self.source_root(root).join(&self.links.common)
	}

	pub fn language_links_path(&self, root: &Path, lang: Lang) -> PathBuf {
		self.source_root(root)
			.join(self.links.per_language.replace("{lang}", lang.as_str()))
	}

	pub fn extension(&self) -> &'static str {
		if self.mdx { "mdx" } else { "md" }
	}

	pub fn filter_options(&self) -> FilterOptions {
		FilterOptions {
			csharp_short_notation: self.csharp_short_notation,
		}
	}
}
