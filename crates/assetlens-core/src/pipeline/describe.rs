//! Description and keyword synthesis from tags and metadata.

use indexmap::IndexMap;

const DESCRIPTION_PREFIX: &str = "This image likely contains: ";

/// Generated text for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub description: String,
    pub keywords: Vec<String>,
}

/// Builds the searchable text of an asset.
pub struct DescriptionSynthesizer;

impl DescriptionSynthesizer {
    /// Combine tags and metadata into a description and keyword list.
    ///
    /// Keywords are the tags verbatim followed by every non-blank metadata
    /// value, lower-cased with spaces replaced by underscores.
    pub fn synthesize(tags: &[String], metadata: &IndexMap<String, String>) -> Synthesis {
        let mut keywords = tags.to_vec();
        keywords.extend(
            metadata
                .values()
                .filter(|value| !value.trim().is_empty())
                .map(|value| value.to_lowercase().replace(' ', "_")),
        );

        Synthesis {
            description: format!("{DESCRIPTION_PREFIX}{}.", tags.join(", ")),
            keywords,
        }
    }
}
