//! Content records shared across all pipeline stages.
//!
//! These are loaded from `education.json` and `publications.json` in the
//! content root and serialized unchanged through the scan and process
//! manifests. They are trusted, flat data: list order is render order.

use serde::{Deserialize, Serialize};

/// One degree in the education history.
///
/// ```json
/// {
///   "degree": "PhD, Computer Science",
///   "university": "Yale University",
///   "advisor": { "name": "Zhong Shao", "url": "https://flint.cs.yale.edu/shao/" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub degree: String,
    pub university: String,
    pub advisor: Advisor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisor {
    pub name: String,
    pub url: String,
}

/// One entry in the publication list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub url: String,
    /// Author line exactly as it should be displayed.
    pub authors: String,
    /// Venue line exactly as it should be displayed.
    pub conference: String,
}

/// A prose section of the page, loaded from `sections/NNN-Title.md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Heading shown above the section (filename with number stripped, dashes → spaces)
    pub title: String,
    /// Sort key from the number prefix
    pub sort_key: u32,
    /// Raw markdown body
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn education_parses_nested_advisor() {
        let json = r#"{
            "degree": "MS, Computer Science",
            "university": "Kansas State University",
            "advisor": {"name": "Dr. Example", "url": "https://example.edu/~ex"}
        }"#;
        let e: Education = serde_json::from_str(json).unwrap();
        assert_eq!(e.degree, "MS, Computer Science");
        assert_eq!(e.advisor.name, "Dr. Example");
        assert_eq!(e.advisor.url, "https://example.edu/~ex");
    }

    #[test]
    fn publication_list_keeps_file_order() {
        let json = r#"[
            {"title": "B", "url": "https://b", "authors": "X", "conference": "C1"},
            {"title": "A", "url": "https://a", "authors": "Y", "conference": "C2"}
        ]"#;
        let pubs: Vec<Publication> = serde_json::from_str(json).unwrap();
        let titles: Vec<&str> = pubs.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn publication_missing_field_is_error() {
        let json = r#"{"title": "A", "url": "https://a", "authors": "X"}"#;
        let result: Result<Publication, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
