use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::DocError;

/// A target language that reference pages are generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
	Js,
	Python,
	Java,
	Csharp,
}

impl Lang {
	pub const ALL: [Lang; 4] = [Lang::Js, Lang::Python, Lang::Java, Lang::Csharp];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Js => "js",
			Self::Python => "python",
			Self::Java => "java",
			Self::Csharp => "csharp",
		}
	}

	/// Parse a language name as written in sources. Accepts the common
	/// aliases used in code fence info strings.
	pub fn parse(name: &str) -> Option<Self> {
		match name {
			"js" | "ts" | "javascript" | "typescript" => Some(Self::Js),
			"python" | "py" => Some(Self::Python),
			"java" => Some(Self::Java),
			"csharp" | "cs" | "c#" => Some(Self::Csharp),
			_ => None,
		}
	}
}

impl fmt::Display for Lang {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Lang {
	type Err = DocError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s.trim()).ok_or_else(|| DocError::UnknownLanguage(s.to_string()))
	}
}

/// One optional value per [`Lang`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LangMap<T> {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub js: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub python: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub java: Option<T>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub csharp: Option<T>,
}

impl<T> Default for LangMap<T> {
	fn default() -> Self {
		Self {
			js: None,
			python: None,
			java: None,
			csharp: None,
		}
	}
}

impl<T> LangMap<T> {
	pub fn get(&self, lang: Lang) -> Option<&T> {
		match lang {
			Lang::Js => self.js.as_ref(),
			Lang::Python => self.python.as_ref(),
			Lang::Java => self.java.as_ref(),
			Lang::Csharp => self.csharp.as_ref(),
		}
	}

	pub fn set(&mut self, lang: Lang, value: T) {
		let slot = match lang {
			Lang::Js => &mut self.js,
			Lang::Python => &mut self.python,
			Lang::Java => &mut self.java,
			Lang::Csharp => &mut self.csharp,
		};
		*slot = Some(value);
	}

	pub fn is_empty(&self) -> bool {
		self.js.is_none() && self.python.is_none() && self.java.is_none() && self.csharp.is_none()
	}
}
