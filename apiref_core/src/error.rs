use std::fmt;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, miette::Diagnostic, Error)]
#[non_exhaustive]
pub enum DocError {
	#[error(transparent)]
	#[diagnostic(code(apiref::io_error))]
	Io(#[from] std::io::Error),

	#[error("bad {kind} block:\n{snippet}")]
	#[diagnostic(
		code(apiref::bad_block),
		help("every line inside a fenced block must keep the indentation of its opening marker")
	)]
	BadBlock { kind: &'static str, snippet: String },

	#[error("enum must have a name: `{0}`")]
	#[diagnostic(
		code(apiref::anonymous_enum),
		help("wrap string literal unions in a named generic, e.g. `Color<\"red\"|\"blue\">`")
	)]
	AnonymousEnum(String),

	#[error("number types should be either int or float, not number in: `{0}`")]
	#[diagnostic(code(apiref::number_type))]
	NumberType(String),

	#[error("invalid argument: `{0}`")]
	#[diagnostic(
		code(apiref::invalid_argument),
		help("type lines look like `- `name` <[Type]> comment` or `- returns: <[Type]>`")
	)]
	InvalidArgument(String),

	#[error("nested properties given to a non-object type: `{0}`")]
	#[diagnostic(
		code(apiref::properties_on_non_object),
		help("nested type lines need an `[Object]` somewhere in the parent type")
	)]
	PropertiesOnNonObject(String),

	#[error("invalid api heading: `{0}`")]
	#[diagnostic(
		code(apiref::invalid_api_heading),
		help("expected `class: Name`, `method: Class.name`, `param: Class.method.name`, etc.")
	)]
	InvalidApiHeading(String),

	#[error("undefined member reference: `{0}`")]
	#[diagnostic(code(apiref::undefined_member))]
	UndefinedMember(String),

	#[error("referenced parameter `{param}` not found in the parent method `{method}`")]
	#[diagnostic(code(apiref::undefined_param))]
	UndefinedParam { param: String, method: String },

	#[error("undefined link prefix, expected event|method|property|param|option, got: `{0}`")]
	#[diagnostic(code(apiref::unknown_link_kind))]
	UnknownLinkKind(String),

	#[error("cannot render type `{name}` for {lang}")]
	#[diagnostic(
		code(apiref::unmapped_type),
		help("add the type to the formatter's lookup table or declare it as a class")
	)]
	UnmappedType { name: String, lang: String },

	#[error("{lang} cannot render a function with {arity} argument(s) in `{context}`")]
	#[diagnostic(
		code(apiref::unsupported_arity),
		help("add an explicit entry to the function override table")
	)]
	UnsupportedArity {
		lang: String,
		arity: usize,
		context: String,
	},

	#[error("csharp option `{option}` has unsupported type overload `{type_name}`")]
	#[diagnostic(code(apiref::unsupported_overload))]
	UnsupportedOverload { option: String, type_name: String },

	#[error("override does not have lang: `{0}`")]
	#[diagnostic(
		code(apiref::override_without_lang),
		help("a parameter documented twice must restrict the second copy with `* langs:`")
	)]
	TypeOverrideWithoutLang(String),

	#[error("unknown language: `{0}`")]
	#[diagnostic(code(apiref::unknown_language), help("supported languages: js, python, java, csharp"))]
	UnknownLanguage(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(code(apiref::config_parse), help("check that apiref.toml is valid TOML"))]
	ConfigParse(String),

	#[error("failed to parse front matter in `{path}`: {reason}")]
	#[diagnostic(code(apiref::front_matter))]
	FrontMatter { path: String, reason: String },

	#[error("{path}: {source}")]
	#[diagnostic(code(apiref::in_file))]
	InFile {
		path: String,
		#[source]
		source: Box<DocError>,
	},
}

impl DocError {
	/// Attach the source file to an error raised while processing it.
	pub fn in_file(self, path: impl fmt::Display) -> Self {
		match self {
			Self::InFile { .. } | Self::Io(_) => self,
			other => {
				Self::InFile {
					path: path.to_string(),
					source: Box::new(other),
				}
			}
		}
	}
}

pub type DocResult<T> = Result<T, DocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;

/// How seriously a collected [`Diagnostic`] should be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	Warning,
	Error,
}

/// A recoverable model-consistency issue. These never abort a run; they are
/// collected and reported once the whole pass has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
	pub severity: Severity,
	/// The class (and optionally member) the issue was found on, e.g.
	/// `Page.goto`.
	pub location: String,
	pub message: String,
}

impl Diagnostic {
	pub fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Error,
			location: location.into(),
			message: message.into(),
		}
	}

	pub fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			severity: Severity::Warning,
			location: location.into(),
			message: message.into(),
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self.severity {
			Severity::Warning => "warning",
			Severity::Error => "error",
		};
		write!(f, "{label}[{}]: {}", self.location, self.message)
	}
}

/// Diagnostics accumulated over a generation pass.
#[derive(Debug, Clone, Default, Deref, DerefMut, Serialize)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn has_errors(&self) -> bool {
		self.0.iter().any(|d| d.severity == Severity::Error)
	}

	pub fn into_inner(self) -> Vec<Diagnostic> {
		self.0
	}
}
