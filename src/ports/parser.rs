// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which turns the text of a
//! configuration file (YAML, dotenv, ...) into a [`ConfigTree`].

use crate::domain::{ConfigTree, Result};

/// A trait for parsing configuration file content.
///
/// # Key Format
///
/// Parsers may return nested trees, dotted keys, or a mix. A dotenv file like:
///
/// ```text
/// DATABASE_HOST=localhost
/// DATABASE_PORT=5432
/// ```
///
/// can be returned flat as `database.host` / `database.port`; the merge engine
/// expands the dots into `{database: {host, port}}` when the tree is folded.
///
/// # Examples
///
/// ```rust
/// use tierconf::ports::ConfigParser;
/// use tierconf::domain::{ConfigTree, ConfigValue, Result};
///
/// struct KeyOnlyParser;
///
/// impl ConfigParser for KeyOnlyParser {
///     fn parse(&self, content: &str) -> Result<ConfigTree> {
///         Ok(content
///             .lines()
///             .map(|line| (line.trim().to_string(), ConfigValue::from(true)))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["flags"]
///     }
/// }
///
/// let tree = KeyOnlyParser.parse("verbose\ncolor").unwrap();
/// assert_eq!(tree.get("color"), Some(&ConfigValue::Bool(true)));
/// ```
pub trait ConfigParser {
    /// Parses configuration content into a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed. Parsers never return a
    /// partial tree.
    fn parse(&self, content: &str) -> Result<ConfigTree>;

    /// Returns the file extensions (without the leading dot) this parser
    /// understands.
    fn supported_extensions(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigError, ConfigValue};

    struct PairParser;

    impl ConfigParser for PairParser {
        fn parse(&self, content: &str) -> Result<ConfigTree> {
            let mut tree = ConfigTree::new();
            for line in content.lines().filter(|l| !l.trim().is_empty()) {
                let (k, v) = line.split_once(':').ok_or_else(|| ConfigError::ParseError {
                    message: format!("missing ':' in {}", line),
                    source: None,
                })?;
                tree.insert(k.trim().to_string(), ConfigValue::from(v.trim()));
            }
            Ok(tree)
        }

        fn supported_extensions(&self) -> &[&str] {
            &["pairs", "kv"]
        }
    }

    #[test]
    fn test_parser_parse() {
        let tree = PairParser.parse("a.b: 1\nc: two").unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("a.b"), Some(&ConfigValue::from("1")));
    }

    #[test]
    fn test_parser_parse_empty_content() {
        assert!(PairParser.parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parser_rejects_whole_input() {
        assert!(PairParser.parse("ok: 1\nbroken").is_err());
    }

    #[test]
    fn test_parser_supported_extensions() {
        assert_eq!(PairParser.supported_extensions(), &["pairs", "kv"]);
    }
}
