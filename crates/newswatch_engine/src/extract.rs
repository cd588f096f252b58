use newswatch_core::CandidateItem;
use newswatch_logging::{watch_debug, watch_info, watch_warn};
use scraper::{ElementRef, Html, Selector};

use crate::decode::{decode_document, DecodeError};
use crate::links::SourceBase;

/// Links logged when no strategy recognises the page structure.
const DIAGNOSTIC_LINK_COUNT: usize = 15;
const DIAGNOSTIC_TEXT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::Selector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

/// Turns a fetched document into candidate items, in document order.
pub trait Extractor: Send + Sync {
    fn extract(
        &self,
        document: &[u8],
        content_type: Option<&str>,
    ) -> Result<Vec<CandidateItem>, ExtractError>;
}

/// One way of locating the repeating article containers on a page.
pub trait ContainerStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;
}

/// Every element matching a CSS selector is a container.
#[derive(Debug)]
pub struct TagStrategy {
    name: String,
    selector: Selector,
}

impl TagStrategy {
    pub fn new(selector: &str) -> Result<Self, ExtractError> {
        Ok(Self {
            name: format!("'{selector}' elements"),
            selector: parse_selector(selector)?,
        })
    }
}

impl ContainerStrategy for TagStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document.select(&self.selector).collect()
    }
}

/// `tag` elements whose class attribute contains any of the given fragments.
#[derive(Debug)]
pub struct ClassPatternStrategy {
    name: String,
    selector: Selector,
    patterns: Vec<String>,
}

impl ClassPatternStrategy {
    pub fn new(tag: &str, patterns: &[&str]) -> Result<Self, ExtractError> {
        Ok(Self {
            name: format!("'{tag}' elements with class like {}", patterns.join("/")),
            selector: parse_selector(&format!("{tag}[class]"))?,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        })
    }
}

impl ContainerStrategy for ClassPatternStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn containers<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        document
            .select(&self.selector)
            .filter(|element| {
                let class = element.value().attr("class").unwrap_or_default();
                self.patterns.iter().any(|pattern| class.contains(pattern.as_str()))
            })
            .collect()
    }
}

/// The built-in strategy order: semantic `<article>` tags first, then
/// card-like anchors, then card/post/article divs.
pub fn default_strategies() -> Result<Vec<Box<dyn ContainerStrategy>>, ExtractError> {
    Ok(vec![
        Box::new(TagStrategy::new("article")?),
        Box::new(ClassPatternStrategy::new(
            "a",
            &["card", "article-card", "news-card", "featured", "article-link"],
        )?),
        Box::new(ClassPatternStrategy::new("div", &["card", "post", "article"])?),
    ])
}

pub struct ArticleExtractor {
    base: SourceBase,
    strategies: Vec<Box<dyn ContainerStrategy>>,
    anchor: Selector,
    heading: Selector,
}

impl ArticleExtractor {
    pub fn new(base: SourceBase) -> Result<Self, ExtractError> {
        Self::with_strategies(base, default_strategies()?)
    }

    pub fn with_strategies(
        base: SourceBase,
        strategies: Vec<Box<dyn ContainerStrategy>>,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            base,
            strategies,
            anchor: parse_selector("a[href]")?,
            heading: parse_selector("h1, h2, h3, h4, h5, h6")?,
        })
    }

    /// Extracts items from already decoded HTML.
    pub fn extract_html(&self, html: &str) -> Vec<CandidateItem> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let containers = strategy.containers(&document);
            if containers.is_empty() {
                watch_debug!("No containers found with {}", strategy.name());
                continue;
            }
            watch_info!("Found {} containers with {}", containers.len(), strategy.name());
            return containers
                .into_iter()
                .filter_map(|container| self.item_from_container(container))
                .collect();
        }

        self.log_unrecognised_page(&document);
        Vec::new()
    }

    fn item_from_container(&self, container: ElementRef<'_>) -> Option<CandidateItem> {
        let anchor = if container.value().name() == "a" {
            container
        } else {
            container.select(&self.anchor).next()?
        };
        let Some(href) = anchor.value().attr("href") else {
            watch_debug!("Skipping anchor container without href");
            return None;
        };
        let link = self.base.resolve(href);

        let title = match anchor.select(&self.heading).next() {
            Some(heading) => collapsed_text(heading),
            None => collapsed_text(anchor),
        };
        if title.is_empty() {
            watch_debug!("Skipping empty title for link: {}", link);
            return None;
        }

        Some(CandidateItem { title, link })
    }

    fn log_unrecognised_page(&self, document: &Html) {
        watch_warn!(
            "No articles found with any of {} strategies; first links on page:",
            self.strategies.len()
        );
        for (index, (href, text)) in diagnostic_links(document, &self.anchor)
            .into_iter()
            .enumerate()
        {
            watch_warn!("Link {}: {} - Text: {}", index, href, text);
        }
    }
}

/// The first page links as `(href, text)`, text cut to a log-friendly length.
fn diagnostic_links(document: &Html, anchor: &Selector) -> Vec<(String, String)> {
    document
        .select(anchor)
        .take(DIAGNOSTIC_LINK_COUNT)
        .map(|element| {
            let href = element.value().attr("href").unwrap_or_default().to_string();
            let text = collapsed_text(element)
                .chars()
                .take(DIAGNOSTIC_TEXT_CHARS)
                .collect();
            (href, text)
        })
        .collect()
}

impl Extractor for ArticleExtractor {
    fn extract(
        &self,
        document: &[u8],
        content_type: Option<&str>,
    ) -> Result<Vec<CandidateItem>, ExtractError> {
        let decoded = decode_document(document, content_type)?;
        watch_debug!(
            "Decoded {} bytes as {}",
            document.len(),
            decoded.encoding_label
        );
        Ok(self.extract_html(&decoded.text))
    }
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
