//! Parsing of the compact `name|usage` binding declarations.

const SEPARATOR: char = '|';
const ALIAS_SEPARATOR: char = ',';
const TRIMMED: [char; 4] = [' ', '\n', '\r', '\t'];

/// A parsed binding declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    /// Primary name first, then aliases. Empty when the declaration is blank.
    pub names: Vec<String>,
    pub usage: String,
}

impl Tag {
    /// The primary name, or `""` when the declaration binds nothing.
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn aliases(&self) -> &[String] {
        self.names.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parse `name|usage` or `name1,name2|usage`.
///
/// Splits on the first `|` only; a missing `|` gives an empty usage. Each
/// part is trimmed of spaces, tabs and newlines. Blank input yields an empty
/// tag, which means "no binding" rather than an error.
pub fn parse_tag(raw: &str) -> Tag {
    let (names, usage) = raw.split_once(SEPARATOR).unwrap_or((raw, ""));

    let names = names
        .split(ALIAS_SEPARATOR)
        .map(|name| name.trim_matches(TRIMMED))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();

    Tag {
        names,
        usage: usage.trim_matches(TRIMMED).to_string(),
    }
}
