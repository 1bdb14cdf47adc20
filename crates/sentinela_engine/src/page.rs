use scraper::{ElementRef, Html, Selector};
use sentinela_core::{PageSnapshot, Region, TabId};

use crate::highlight::strip_text_markers;

/// The fixed selector batteries, in the order the scan expects them.
const BATTERIES: [(Region, &str); 6] = [
    (
        Region::OrderContext,
        r#"[class*="order"], [class*="venda"], [class*="pedido"], [id*="order"], [id*="venda"], [id*="pedido"], h1, h2, h3, h4, h5, h6, .title, .header, .info"#,
    ),
    (Region::Quantity, ".sc-quantity.sc-quantity__unique span"),
    (
        Region::Sublabel,
        ".sc-title-subtitle-action__sublabel, .section-item-information",
    ),
    (Region::DetailTitle, ".sc-detail-title__text"),
    (
        Region::TitleDescription,
        r#".sc-detail-title__text, .andes-list__item-primary, .sc-title-subtitle-action__sublabel, [class*="title"], [class*="description"]"#,
    ),
    (Region::MessageButton, ".andes-button__content"),
];

/// Elements whose text never counts as visible page content.
const HIDDEN_CONTAINERS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Turns raw page markup into the pure snapshot the scanner consumes.
///
/// The same underlying element lands in the snapshot once per battery that
/// selects it; the scanner checks each occurrence independently.
#[derive(Debug, Clone)]
pub struct PageParser {
    batteries: Vec<(Region, Selector)>,
}

impl PageParser {
    pub fn new() -> Self {
        let batteries = BATTERIES
            .iter()
            .map(|(region, css)| (*region, Selector::parse(css).expect("static selector")))
            .collect();
        Self { batteries }
    }

    /// Parses `html` into a snapshot for `tab_id`.
    ///
    /// Any highlight markup of ours that leaked into the source is stripped
    /// first, so a scan never reacts to its own annotations.
    pub fn parse(&self, tab_id: TabId, url: &str, html: &str) -> PageSnapshot {
        let clean = strip_text_markers(html);
        let doc = Html::parse_document(&clean);

        let mut snapshot = PageSnapshot::new(tab_id, url, visible_text(&doc));
        for (region, selector) in &self.batteries {
            for element in doc.select(selector) {
                snapshot.push_element(*region, element_text(&element), element.inner_html());
            }
        }
        snapshot
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Visible text of the whole document: text nodes outside script/style
/// containers, trimmed, joined with newlines.
fn visible_text(doc: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in doc.root_element().descendants() {
        if let scraper::Node::Text(text) = node.value() {
            if is_hidden(node.parent().and_then(ElementRef::wrap)) {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    parts.join("\n")
}

fn element_text(element: &ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in element.descendants() {
        if let scraper::Node::Text(text) = node.value() {
            if is_hidden(node.parent().and_then(ElementRef::wrap)) {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    parts.join(" ")
}

fn is_hidden(parent: Option<ElementRef<'_>>) -> bool {
    parent.is_some_and(|el| {
        HIDDEN_CONTAINERS
            .iter()
            .any(|name| el.value().name().eq_ignore_ascii_case(name))
    })
}
