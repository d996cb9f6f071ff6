//! Argument extraction
//!
//! Each argument's regex fragment becomes a named group; the groups are
//! joined by whitespace and anchored so the whole remainder must match.

use regex::Regex;
use std::collections::HashMap;

use crate::commands::definition::CommandArgument;

/// Compiled form of a command's argument list.
#[derive(Debug, Clone)]
pub struct ArgumentPattern {
    regex: Regex,
    arguments: Vec<(String, bool)>,
}

impl ArgumentPattern {
    /// Compose the anchored pattern source for `arguments`.
    ///
    /// `[n: \d+, name: \w+ (optional)]` becomes
    /// `^(?P<n>\d+)(?:\s+(?P<name>\w+))?$`.
    pub fn compose(arguments: &[CommandArgument]) -> String {
        let body: String = arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| {
                let mut group = if index == 0 {
                    format!("(?P<{}>{})", argument.alias, argument.pattern)
                } else {
                    format!(r"(?:\s+(?P<{}>{}))", argument.alias, argument.pattern)
                };
                if argument.optional {
                    group.push('?');
                }
                group
            })
            .collect();
        format!("^{body}$")
    }

    /// `Ok(None)` when there are no arguments to extract.
    pub fn compile(arguments: &[CommandArgument]) -> Result<Option<Self>, regex::Error> {
        if arguments.is_empty() {
            return Ok(None);
        }
        let regex = Regex::new(&Self::compose(arguments))?;
        Ok(Some(Self {
            regex,
            arguments: arguments
                .iter()
                .map(|a| (a.alias.clone(), a.optional))
                .collect(),
        }))
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match the text left after the trigger.
    ///
    /// An optional argument that matched nothing resolves to `""`.
    pub fn extract(&self, remainder: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(remainder)?;

        let mut parsed = HashMap::with_capacity(self.arguments.len());
        for (alias, optional) in &self.arguments {
            match captures.name(alias) {
                Some(value) => {
                    parsed.insert(alias.clone(), value.as_str().to_string());
                }
                None if *optional => {
                    parsed.insert(alias.clone(), String::new());
                }
                None => return None,
            }
        }

        (parsed.len() == self.arguments.len()).then_some(parsed)
    }
}

/// Extract arguments from a message whose trigger already fired.
///
/// `matched_trigger` is stripped from the front of `raw` and the rest is
/// trimmed before matching. No pattern means no arguments, which always
/// succeeds.
pub fn extract_arguments(
    raw: &str,
    matched_trigger: &str,
    pattern: Option<&ArgumentPattern>,
) -> Option<HashMap<String, String>> {
    let Some(pattern) = pattern else {
        return Some(HashMap::new());
    };
    let remainder = raw.strip_prefix(matched_trigger).unwrap_or(raw).trim();
    pattern.extract(remainder)
}
