//! Filename pattern matching for structure rules.
//!
//! Supports glob patterns like `*.nfo` or `*.r??`, single brace expansion
//! like `*.{mkv,mp4}`, and full regex patterns when a rule opts in.

use glob::Pattern;
use regex::Regex;

use crate::error::{CheckError, Result};

/// Match a bare file or directory name against a rule pattern.
///
/// Priority order: regex when `is_regex` is set, then brace expansion when
/// the pattern carries a `{...}` group, then plain glob. Only the first
/// brace group is expanded; nested or repeated groups are not supported.
/// A malformed regex or glob is a configuration error surfaced here, on
/// first use.
pub fn match_name(name: &str, pattern: &str, is_regex: bool) -> Result<bool> {
    if is_regex {
        let re = Regex::new(pattern).map_err(|e| CheckError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(re.is_match(name));
    }

    if let (Some(start), Some(end)) = (pattern.find('{'), pattern.find('}')) {
        if start < end {
            let prefix = &pattern[..start];
            let suffix = &pattern[end + 1..];
            let options = &pattern[start + 1..end];

            for option in options.split(',') {
                let expanded = format!("{}{}{}", prefix, option.trim(), suffix);
                // An option that expands to a malformed glob is skipped,
                // matching the leniency of the flat-pattern path below
                if let Ok(compiled) = Pattern::new(&expanded) {
                    if compiled.matches(name) {
                        return Ok(true);
                    }
                }
            }
            return Ok(false);
        }
    }

    let compiled = Pattern::new(pattern).map_err(|e| CheckError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })?;
    Ok(compiled.matches(name))
}

/// Split a nested `dir/file` rule pattern at its first separator.
/// Returns `None` for flat patterns.
pub fn split_nested(pattern: &str) -> Option<(&str, &str)> {
    pattern.split_once('/')
}
