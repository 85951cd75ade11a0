use crate::core::extractor::{Element, FieldExtractor};
use crate::core::filter::KeywordFilter;
use crate::domain::model::ListingRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    pub records: Vec<ListingRecord>,
    pub examined: usize,
    pub untitled: usize,
    pub filtered: usize,
}

impl Harvest {
    pub fn skipped(&self) -> usize {
        self.untitled + self.filtered
    }
}

/// Extracts and filters elements in order, stopping once `limit` records
/// have been accepted.
pub fn harvest<E, I>(
    elements: I,
    extractor: &FieldExtractor,
    filter: &KeywordFilter,
    limit: Option<usize>,
) -> Harvest
where
    E: Element,
    I: IntoIterator<Item = E>,
{
    let mut outcome = Harvest::default();

    for element in elements {
        if limit.is_some_and(|max| outcome.records.len() >= max) {
            break;
        }
        outcome.examined += 1;

        let record = extractor.extract(&element);
        if !record.has_title() {
            outcome.untitled += 1;
            continue;
        }
        if !filter.accepts(&record.title) {
            tracing::debug!("Filtered out: {}", record.title);
            outcome.filtered += 1;
            continue;
        }

        tracing::debug!("[{}] ✓ {}", outcome.records.len() + 1, preview(&record.title, 60));
        outcome.records.push(record);
    }

    outcome
}

pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dedupe::dedupe_by_title;
    use crate::domain::model::UNKNOWN;
    use std::collections::HashMap;

    /// Element double keyed by selector.
    struct MockElement {
        by_selector: HashMap<&'static str, &'static str>,
        text: &'static str,
    }

    impl MockElement {
        fn new(pairs: &[(&'static str, &'static str)]) -> Self {
            Self {
                by_selector: pairs.iter().copied().collect(),
                text: "",
            }
        }

        fn blank() -> Self {
            Self::new(&[])
        }
    }

    impl Element for MockElement {
        fn find_text(&self, selector: &str) -> Option<String> {
            self.by_selector.get(selector).map(|s| s.to_string())
        }

        fn full_text(&self) -> String {
            self.text.to_string()
        }
    }

    const TITLE: &str = r#"span[data-aut-id="itemTitle"]"#;
    const PRICE: &str = r#"span[data-aut-id="itemPrice"]"#;
    const ALT_TITLE: &str = "span._2tW1I";

    #[test]
    fn test_pipeline_over_mock_elements() {
        let elements = vec![
            MockElement::new(&[(TITLE, "Car cover XL"), (PRICE, "₹ 1,200")]),
            MockElement::blank(),
            MockElement::new(&[(ALT_TITLE, "Body cover for Creta")]),
            MockElement::blank(),
            MockElement::new(&[(TITLE, "Car mat set"), (PRICE, "₹ 650")]),
        ];

        let outcome = harvest(
            elements,
            &FieldExtractor::default(),
            &KeywordFilter::default(),
            None,
        );
        let records = dedupe_by_title(outcome.records);

        assert_eq!(outcome.examined, 5);
        assert_eq!(outcome.untitled, 2);
        assert_eq!(outcome.filtered, 0);
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Car cover XL", "Body cover for Creta", "Car mat set"]);
        assert_eq!(records[1].price, UNKNOWN);
    }

    #[test]
    fn test_filtered_titles_are_counted() {
        let elements = vec![
            MockElement::new(&[(TITLE, "2 BHK flat for rent")]),
            MockElement::new(&[(TITLE, "Car cover, fits 3bhk garage")]),
        ];

        let outcome = harvest(
            elements,
            &FieldExtractor::default(),
            &KeywordFilter::default(),
            None,
        );

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.filtered, 1);
        assert_eq!(outcome.skipped(), 1);
    }

    #[test]
    fn test_limit_counts_accepted_records_only() {
        let elements = vec![
            MockElement::blank(),
            MockElement::new(&[(TITLE, "Cover A")]),
            MockElement::new(&[(TITLE, "Independent house")]),
            MockElement::new(&[(TITLE, "Cover B")]),
            MockElement::new(&[(TITLE, "Cover C")]),
        ];

        let outcome = harvest(
            elements,
            &FieldExtractor::default(),
            &KeywordFilter::default(),
            Some(2),
        );

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.examined, 4);
        assert_eq!(outcome.records[1].title, "Cover B");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("₹₹₹₹", 2), "₹₹...");
        assert_eq!(preview("short", 60), "short");
    }
}
