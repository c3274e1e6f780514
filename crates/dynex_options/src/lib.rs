//! dynex_options: Parser and binder options.
//!
//! Options are plain data, loadable from camelCase JSON:
//!
//! ```json
//! { "maxRecursionDepth": 64, "implicitMemberAccess": false }
//! ```
//!
//! Omitted keys fall back to their defaults.

use serde::{Deserialize, Serialize};

/// Default limit on expression nesting before the parser gives up.
pub const DEFAULT_MAX_RECURSION_DEPTH: u32 = 200;

/// Options controlling how expression text is parsed and bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    /// Nesting depth past which parsing fails with a syntax error.
    pub max_recursion_depth: u32,
    /// Resolve bare identifiers against the members of the implicit `it` parameter.
    pub implicit_member_access: bool,
    /// Treat `+` with a String operand as concatenation.
    pub string_concatenation: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            implicit_member_access: true,
            string_concatenation: true,
        }
    }
}

impl ParserOptions {
    pub fn with_max_recursion_depth(mut self, depth: u32) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    pub fn with_implicit_member_access(mut self, enabled: bool) -> Self {
        self.implicit_member_access = enabled;
        self
    }

    pub fn with_string_concatenation(mut self, enabled: bool) -> Self {
        self.string_concatenation = enabled;
        self
    }
}

/// Parse options from JSON content.
pub fn parse_options(content: &str) -> Result<ParserOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse options from a JSON file on disk.
pub fn parse_options_file(path: &str) -> Result<ParserOptions, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let options = parse_options(&content)?;
    Ok(options)
}
