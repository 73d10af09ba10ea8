//! Translation-unit predicate.
//!
//! Translation units produce sub-resources of another unit and are generated
//! inline by their owner, so the planner never schedules them.

use crate::unit::GenerationUnit;

/// Decides whether a unit is a translation / sub-resource unit.
pub trait TranslationPredicate: Send + Sync {
    fn is_translation_unit(&self, unit: &GenerationUnit) -> bool;
}

/// Matches units whose name ends with one of the configured suffixes,
/// ignoring ASCII case. `ProductTranslationFactory` style names are covered by
/// also stripping a trailing `factory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPredicate {
    suffixes: Vec<String>,
}

impl SuffixPredicate {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Default for SuffixPredicate {
    fn default() -> Self {
        Self::new(["translation"])
    }
}

impl TranslationPredicate for SuffixPredicate {
    fn is_translation_unit(&self, unit: &GenerationUnit) -> bool {
        let name = unit.name.to_ascii_lowercase();
        let stem = name.strip_suffix("factory").unwrap_or(&name);
        self.suffixes.iter().any(|suffix| stem.ends_with(suffix.as_str()))
    }
}

impl<F: Fn(&GenerationUnit) -> bool + Send + Sync> TranslationPredicate for F {
    fn is_translation_unit(&self, unit: &GenerationUnit) -> bool {
        self(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str) -> GenerationUnit {
        GenerationUnit::new(name, "catalog.any")
    }

    #[test]
    fn test_default_suffix() {
        let pred = SuffixPredicate::default();
        assert!(pred.is_translation_unit(&unit("ProductTranslation")));
        assert!(pred.is_translation_unit(&unit("ProductTranslationFactory")));
        assert!(pred.is_translation_unit(&unit("product_translation")));
        assert!(!pred.is_translation_unit(&unit("Product")));
        assert!(!pred.is_translation_unit(&unit("TranslationMemory")));
    }

    #[test]
    fn test_custom_suffixes_skip_blank() {
        let pred = SuffixPredicate::new(["  ", "Locale"]);
        assert!(pred.is_translation_unit(&unit("PageLocale")));
        assert!(!pred.is_translation_unit(&unit("Page")));
    }

    #[test]
    fn test_closure_predicate() {
        let pred = |u: &GenerationUnit| u.record_kind.ends_with("_i18n");
        assert!(pred.is_translation_unit(&GenerationUnit::new("X", "blog.post_i18n")));
        assert!(!pred.is_translation_unit(&GenerationUnit::new("X", "blog.post")));
    }
}
