use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use apiref_core::AnyEmptyResult;
use apiref_core::ApirefConfig;
use apiref_core::Diagnostics;
use apiref_core::DocError;
use apiref_core::Lang;
use apiref_core::Severity;
use apiref_core::generator::FileStatus;
use apiref_core::generator::Generator;
use apiref_core::generator::check_outputs;
use apiref_core::generator::write_outputs;
use apiref_cli::ApirefCli;
use apiref_cli::Commands;
use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = ApirefCli::parse();

	// Respect NO_COLOR, --no-color and terminals without color support.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Generate { lang, dry_run }) => run_generate(&args, lang, *dry_run),
		Some(Commands::Check { lang, diff }) => run_check(&args, lang, *diff),
		Some(Commands::Lint { json }) => run_lint(&args, *json),
		Some(Commands::Json { lang }) => run_json(&args, *lang),
		None => {
			eprintln!("No subcommand specified. Run `apiref --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<DocError>() {
			Ok(doc_err) => {
				let report: miette::Report = (*doc_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so that `apiref json` output stays parseable.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(verbose)
		.init();
}

fn resolve_root(args: &ApirefCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_generator(args: &ApirefCli) -> Result<Generator, DocError> {
	let root = resolve_root(args);
	let config = ApirefConfig::load_or_default(&root)?;
	debug!(root = %root.display(), languages = ?config.languages, "resolved project");
	Ok(Generator::new(root, config))
}

fn run_generate(args: &ApirefCli, langs: &[Lang], dry_run: bool) -> AnyEmptyResult {
	let generator = load_generator(args)?;
	let generation = generator.generate(langs)?;
	let root = generator.root();

	print_diagnostics(&generation.diagnostics, true);

	if dry_run {
		for file in &generation.files {
			println!("Would write: {}", make_relative(&file.path, root));
		}
		println!(
			"\nDry run: {} file(s) would be written.",
			generation.files.len()
		);
	} else {
		write_outputs(&generation.files)?;
		println!(
			"{}",
			colored!(format!("Generated {} file(s).", generation.files.len()), green)
		);
	}

	if generation.diagnostics.has_errors() {
		process::exit(1);
	}

	Ok(())
}

fn run_check(args: &ApirefCli, langs: &[Lang], show_diff: bool) -> AnyEmptyResult {
	let generator = load_generator(args)?;
	let generation = generator.generate(langs)?;
	let root = generator.root();

	print_diagnostics(&generation.diagnostics, true);

	let statuses = check_outputs(&generation.files)?;
	let mut outdated = 0;

	for (file, status) in &statuses {
		let rel = make_relative(&file.path, root);
		match status {
			FileStatus::UpToDate => {}
			FileStatus::Missing => {
				outdated += 1;
				eprintln!("{} {rel}", colored!("missing:", red));
			}
			FileStatus::Stale { current } => {
				outdated += 1;
				eprintln!("{} {rel}", colored!("stale:", yellow));
				if show_diff {
					print_diff(current, &file.content);
				}
			}
		}
	}

	if outdated == 0 {
		println!(
			"Check passed: all {} generated file(s) are up to date.",
			statuses.len()
		);
		return Ok(());
	}

	eprintln!(
		"\n{} {outdated} of {} generated file(s) are out of date. Run `apiref generate` to update \
		 them.",
		colored!("Check failed:", red),
		statuses.len()
	);
	process::exit(1);
}

fn run_lint(args: &ApirefCli, json: bool) -> AnyEmptyResult {
	let generator = load_generator(args)?;
	let (documentation, diagnostics) = generator.lint()?;

	if json {
		println!("{}", serde_json::to_string_pretty(&diagnostics)?);
	} else if diagnostics.is_empty() {
		println!(
			"{}",
			colored!(
				format!(
					"No problems found in {} class(es).",
					documentation.classes().len()
				),
				green
			)
		);
	} else {
		print_diagnostics(&diagnostics, false);
		let errors = diagnostics
			.iter()
			.filter(|diagnostic| diagnostic.severity == Severity::Error)
			.count();
		println!(
			"\n{}: {errors} error(s), {} warning(s)",
			colored!("Lint summary", bold),
			diagnostics.len() - errors
		);
	}

	if diagnostics.has_errors() {
		process::exit(1);
	}

	Ok(())
}

fn run_json(args: &ApirefCli, lang: Lang) -> AnyEmptyResult {
	let generator = load_generator(args)?;
	println!("{}", generator.json(lang)?);
	Ok(())
}

fn print_diagnostics(diagnostics: &Diagnostics, to_stderr: bool) {
	for diagnostic in diagnostics.iter() {
		let label = match diagnostic.severity {
			Severity::Error => colored!("error", red),
			Severity::Warning => colored!("warning", yellow),
		};
		let line = format!("{label}[{}]: {}", diagnostic.location, diagnostic.message);
		if to_stderr {
			eprintln!("{line}");
		} else {
			println!("{line}");
		}
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
