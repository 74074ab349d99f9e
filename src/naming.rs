//! Filename parsing for the `NNN-Title` convention used by prose sections.
//!
//! `sections/010-About-Me.md` sorts by its number prefix and renders under the
//! heading "About Me". Files without a number prefix are drafts and are left
//! off the page.

/// Result of parsing a file stem like `010-About-Me`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (`10` from `010-About-Me`)
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. For unnumbered stems this is
    /// the full input.
    pub name: String,
    /// Heading text: name with dashes converted to spaces.
    pub display_title: String,
}

impl ParsedName {
    /// Whether this entry belongs on the page.
    pub fn is_published(&self) -> bool {
        self.number.is_some() && !self.name.is_empty()
    }
}

/// Parse a stem following the `NNN-name` convention.
///
/// - `"010-About-Me"` → number=Some(10), display_title="About Me"
/// - `"020"` → number=Some(20), empty name
/// - `"notes"` → number=None, display_title="notes"
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            name: rest.to_string(),
            display_title: rest.replace('-', " "),
        };
    }
    if let Ok(num) = stem.parse::<u32>() {
        return ParsedName {
            number: Some(num),
            name: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        number: None,
        name: stem.to_string(),
        display_title: stem.replace('-', " "),
    }
}
