use std::path::PathBuf;

use apiref_core::Lang;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Generate per-language API reference pages from one markdown source of truth.",
	long_about = "apiref reads API documentation written once in a small markdown dialect and \
	              renders reference pages for JavaScript, Python, Java and C#.\n\nQuick start:\n  \
	              apiref lint      Validate the API sources\n  apiref generate  Write the \
	              reference pages\n  apiref check     Verify the pages on disk are up to date\n  \
	              apiref json      Dump the model for one language"
)]
pub struct ApirefCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Generate reference pages for every configured language.
	///
	/// Parses the API sources, copies documentation down class hierarchies,
	/// filters the model per language and renders one page per class plus one
	/// per guide into `<output_dir>/<lang>/`.
	Generate {
		/// Only generate these languages. Repeat the flag for several.
		#[arg(long, short)]
		lang: Vec<Lang>,

		/// List the files that would be written without touching the disk.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Check that the generated pages on disk are up to date.
	///
	/// Regenerates everything in memory and compares it with the existing
	/// output. Exits with a non-zero status code when a file is missing or
	/// stale, which makes it suitable for CI.
	Check {
		/// Only check these languages. Repeat the flag for several.
		#[arg(long, short)]
		lang: Vec<Lang>,

		/// Show a line diff for each stale file.
		#[arg(long, default_value_t = false)]
		diff: bool,
	},
	/// Validate the API sources and print every diagnostic.
	///
	/// Reports superclass documentation overrides, unknown superclasses and
	/// member ordering problems. Exits with a non-zero status code when any
	/// diagnostic is an error.
	Lint {
		/// Print the diagnostics as JSON.
		#[arg(long, default_value_t = false)]
		json: bool,
	},
	/// Print the documentation model filtered for one language as JSON.
	Json {
		/// The language to filter the model for.
		#[arg(long, short)]
		lang: Lang,
	},
}
