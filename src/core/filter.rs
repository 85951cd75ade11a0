use serde::{Deserialize, Serialize};

/// Two-tier keyword policy: an exclusion hit rejects the text unless an
/// override keyword is also present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordFilter {
    pub exclusion: Vec<String>,
    pub overrides: Vec<String>,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self::new(
            [
                "bhk",
                "flat",
                "apartment",
                "house",
                "rent",
                "rooms",
                "halls",
                "balconies",
                "independent",
                "spacious",
                "property",
                "parking",
            ],
            ["car cover", "body cover", "seat cover", "car mat"],
        )
    }
}

impl KeywordFilter {
    pub fn new<I, J, S, T>(exclusion: I, overrides: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            exclusion: exclusion.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
            overrides: overrides.into_iter().map(|k| k.as_ref().to_lowercase()).collect(),
        }
    }

    pub fn accepts(&self, text: &str) -> bool {
        is_in_category(text, &self.exclusion, &self.overrides)
    }
}

/// Case-insensitive substring policy behind [`KeywordFilter::accepts`].
pub fn is_in_category<S: AsRef<str>>(text: &str, exclusion: &[S], overrides: &[S]) -> bool {
    let text = text.to_lowercase();
    let contains_any = |keywords: &[S]| {
        keywords
            .iter()
            .any(|k| text.contains(k.as_ref().to_lowercase().as_str()))
    };

    !contains_any(exclusion) || contains_any(overrides)
}
