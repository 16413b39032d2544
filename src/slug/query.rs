use crate::slug::transliterate;
use crate::FinderError;

/// A search query and the slug variants searched for it
///
/// The raw query is turned into a slug (alphanumerics kept, whitespace runs
/// collapsed into `-`, other punctuation dropped). When transliteration is on
/// and yields a different slug, both are searched and their hits merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    slug: String,
    transliterated: Option<String>,
}

impl SearchQuery {
    /// Builds the query variants
    ///
    /// # Returns
    ///
    /// * `Ok(SearchQuery)` - At least one non-empty slug exists
    /// * `Err(FinderError::EmptyQuery)` - The query has no usable characters
    pub fn new(raw: &str, with_transliteration: bool) -> Result<Self, FinderError> {
        let slug = slugify(raw);
        if slug.is_empty() {
            return Err(FinderError::EmptyQuery(raw.to_string()));
        }

        let transliterated = if with_transliteration {
            Some(slugify(&transliterate(raw)))
                .filter(|t| !t.is_empty())
                .filter(|t| *t != slug)
        } else {
            None
        };

        Ok(Self {
            raw: raw.to_string(),
            slug,
            transliterated,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn transliterated(&self) -> Option<&str> {
        self.transliterated.as_deref()
    }

    /// All slug variants to search, the plain slug first
    pub fn variants(&self) -> Vec<String> {
        let mut variants = vec![self.slug.clone()];
        variants.extend(self.transliterated.clone());
        variants
    }
}

/// Turns free text into a slug of letters, digits and single hyphens
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("test"), "test");
        assert_eq!(slugify("  my   query "), "my-query");
        assert_eq!(slugify("what's new?"), "whats-new");
        assert_eq!(slugify("a - b"), "a-b");
        assert_eq!(slugify("Привет мир"), "Привет-мир");
    }

    #[test]
    fn test_ascii_query_has_single_variant() {
        let query = SearchQuery::new("test", true).unwrap();
        assert_eq!(query.variants(), vec!["test".to_string()]);
        assert_eq!(query.transliterated(), None);
    }

    #[test]
    fn test_cyrillic_query_adds_transliteration() {
        let query = SearchQuery::new("Привет мир", true).unwrap();
        assert_eq!(
            query.variants(),
            vec!["Привет-мир".to_string(), "privet-mir".to_string()]
        );
    }

    #[test]
    fn test_transliteration_disabled() {
        let query = SearchQuery::new("Привет мир", false).unwrap();
        assert_eq!(query.variants().len(), 1);
    }

    #[test]
    fn test_empty_query_is_rejected() {
        assert!(matches!(
            SearchQuery::new("  ?! ", true),
            Err(FinderError::EmptyQuery(_))
        ));
    }

    #[test]
    fn test_transliterated_variant_follows_slug_rules() {
        let query = SearchQuery::new(" test", true).unwrap();
        assert_eq!(query.variants(), vec!["test".to_string()]);

        let query = SearchQuery::new("hello  world", true).unwrap();
        assert_eq!(query.variants(), vec!["hello-world".to_string()]);

        let query = SearchQuery::new("Привет - мир", true).unwrap();
        assert_eq!(
            query.variants(),
            vec!["Привет-мир".to_string(), "privet-mir".to_string()]
        );

        let query = SearchQuery::new("-Ёж-", true).unwrap();
        assert_eq!(query.transliterated(), Some("yozh"));
    }
}
