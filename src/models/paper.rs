//! Paper model: the flat, fixed-field record every search result is
//! normalized into.

use serde::{Deserialize, Serialize};

/// A single search result in normalized form.
///
/// Every field is a `String` and every field is always present; data the
/// upstream API did not supply is an empty string, never a null or a missing
/// key. Records are built once by the normalizer and not mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Semantic Scholar paper id
    pub paper_id: String,

    /// Paper title
    pub title: String,

    /// Author names (comma-separated)
    pub authors: String,

    /// Publication year
    pub year: String,

    /// Citation count
    pub citations: String,

    /// Influential citation count
    pub influential_citations: String,

    /// Machine-generated TLDR summary
    pub tldr: String,

    /// Abstract text
    pub abstract_text: String,

    /// Publication type labels (comma-separated)
    pub publication_types: String,

    /// Digital Object Identifier
    pub doi: String,

    /// Open-access PDF URL
    pub pdf_url: String,

    /// Paper page URL
    pub url: String,

    /// BibTeX citation text
    pub bibtex: String,
}

impl Paper {
    /// Returns the text of one filterable field.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Authors => &self.authors,
            Field::Year => &self.year,
            Field::Citations => &self.citations,
            Field::InfluentialCitations => &self.influential_citations,
            Field::Tldr => &self.tldr,
            Field::Abstract => &self.abstract_text,
            Field::Publication => &self.publication_types,
            Field::Doi => &self.doi,
            Field::PdfUrl => &self.pdf_url,
            Field::Url => &self.url,
        }
    }
}

/// The fields a sift expression can scope a term to.
///
/// `paper_id` and `bibtex` are carried on the record for export but are not
/// addressable from filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Authors,
    Year,
    Citations,
    InfluentialCitations,
    Tldr,
    Abstract,
    Publication,
    Doi,
    PdfUrl,
    Url,
}

impl Field {
    /// All filterable fields, in record order.
    pub const ALL: [Field; 11] = [
        Field::Title,
        Field::Authors,
        Field::Year,
        Field::Citations,
        Field::InfluentialCitations,
        Field::Tldr,
        Field::Abstract,
        Field::Publication,
        Field::Doi,
        Field::PdfUrl,
        Field::Url,
    ];

    /// Canonical lowercase name of this field.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Authors => "authors",
            Field::Year => "year",
            Field::Citations => "citations",
            Field::InfluentialCitations => "influential_citations",
            Field::Tldr => "tldr",
            Field::Abstract => "abstract",
            Field::Publication => "publication",
            Field::Doi => "doi",
            Field::PdfUrl => "pdf_url",
            Field::Url => "url",
        }
    }

    /// Resolves a field name from a sift expression. Accepts the canonical
    /// names plus a few aliases; returns `None` for anything unrecognized.
    pub fn parse(name: &str) -> Option<Field> {
        match name {
            "title" => Some(Field::Title),
            "authors" => Some(Field::Authors),
            "year" => Some(Field::Year),
            "citations" => Some(Field::Citations),
            "influential_citations" | "influential" => Some(Field::InfluentialCitations),
            "tldr" | "summary" => Some(Field::Tldr),
            "abstract" => Some(Field::Abstract),
            "publication" | "venue" => Some(Field::Publication),
            "doi" => Some(Field::Doi),
            "pdf_url" | "pdf" => Some(Field::PdfUrl),
            "url" => Some(Field::Url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_is_addressable() {
        let paper = Paper {
            title: "Test Paper".to_string(),
            ..Default::default()
        };

        for field in Field::ALL {
            // Missing data reads as empty text, not as an absent key.
            let text = paper.field(field);
            if field == Field::Title {
                assert_eq!(text, "Test Paper");
            } else {
                assert_eq!(text, "");
            }
        }
    }

    #[test]
    fn field_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::parse(field.name()), Some(field));
        }
    }

    #[test]
    fn field_aliases() {
        assert_eq!(Field::parse("summary"), Some(Field::Tldr));
        assert_eq!(Field::parse("venue"), Some(Field::Publication));
        assert_eq!(Field::parse("pdf"), Some(Field::PdfUrl));
        assert_eq!(
            Field::parse("influential"),
            Some(Field::InfluentialCitations)
        );
        assert_eq!(Field::parse("nonexistent"), None);
    }
}
