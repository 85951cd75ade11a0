use crate::domain::model::{ListingRecord, UNKNOWN};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

/// Minimal view of a DOM element needed by the locators.
pub trait Element {
    /// Trimmed text of the first descendant matching `selector`, if any.
    fn find_text(&self, selector: &str) -> Option<String>;
    /// Rendered text of the whole element, one visual line per text node.
    fn full_text(&self) -> String;
}

impl Element for ElementRef<'_> {
    fn find_text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let found = self.select(&selector).next()?;
        Some(normalize_whitespace(&found.text().collect::<String>()))
    }

    fn full_text(&self) -> String {
        self.text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One strategy for finding a field value inside an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// Text of the first descendant matching a CSS selector.
    Css(String),
    /// N-th line (0-based) of the element's rendered text.
    Line(usize),
}

impl Locator {
    pub fn css(selector: &str) -> Self {
        Locator::Css(selector.to_string())
    }

    pub fn locate<E: Element + ?Sized>(&self, element: &E) -> Option<String> {
        let text = match self {
            Locator::Css(selector) => element.find_text(selector)?,
            Locator::Line(index) => element.full_text().lines().nth(*index)?.to_string(),
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Tries each locator in order; falls back to [`UNKNOWN`].
pub fn extract_field<E: Element + ?Sized>(element: &E, locators: &[Locator]) -> String {
    locators
        .iter()
        .find_map(|locator| locator.locate(element))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldExtractor {
    pub title: Vec<Locator>,
    pub description: Vec<Locator>,
    pub price: Vec<Locator>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self {
            title: vec![
                Locator::css(r#"span[data-aut-id="itemTitle"]"#),
                Locator::css("span._2tW1I"),
            ],
            description: vec![
                Locator::css(r#"div[data-aut-id="itemDetails"]"#),
                Locator::css("span._2tW1I ~ span"),
                Locator::Line(1),
            ],
            price: vec![
                Locator::css(r#"span[data-aut-id="itemPrice"]"#),
                Locator::css("span._89yzn"),
            ],
        }
    }
}

impl FieldExtractor {
    pub fn extract<E: Element + ?Sized>(&self, element: &E) -> ListingRecord {
        ListingRecord {
            title: extract_field(element, &self.title),
            description: extract_field(element, &self.description),
            price: extract_field(element, &self.price),
        }
    }

    pub fn css_selectors(&self) -> impl Iterator<Item = (&'static str, &str)> {
        let fields = [
            ("title", &self.title),
            ("description", &self.description),
            ("price", &self.price),
        ];
        fields.into_iter().flat_map(|(name, locators)| {
            locators.iter().filter_map(move |locator| match locator {
                Locator::Css(selector) => Some((name, selector.as_str())),
                Locator::Line(_) => None,
            })
        })
    }
}

/// Container elements from the first selector that matches anything.
pub fn select_containers<'a>(document: &'a Html, selectors: &[String]) -> Vec<ElementRef<'a>> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            tracing::warn!("Skipping unparsable container selector: {}", raw);
            continue;
        };
        let found: Vec<_> = document.select(&selector).collect();
        if !found.is_empty() {
            tracing::debug!("Container selector '{}' matched {} elements", raw, found.len());
            return found;
        }
        tracing::debug!("Container selector '{}' matched nothing, trying next", raw);
    }
    Vec::new()
}
