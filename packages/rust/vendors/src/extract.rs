//! Listing extraction from a directory search page.
//!
//! Two passes over the same document:
//! - [`ListingExtractor::cards`] walks structural listing cards
//! - [`ListingExtractor::anchors`] is the relaxed pass over every vendor link

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use smartbuy_shared::{Result, SmartBuyError, UNKNOWN_VENDOR, VendorRecord};

/// Card selectors, tried in order; matches are merged and deduplicated.
pub const CARD_SELECTORS: [&str; 5] = [
    r#"div[class*="card"]"#,
    r#"div[class*="product"]"#,
    r#"div[class*="listing"]"#,
    "div[data-itemid]",
    r#"div[itemprop="itemListElement"]"#,
];

/// Longest vendor name kept from a listing.
const MAX_NAME_CHARS: usize = 100;

pub const PRICE_PLACEHOLDER: &str = "Contact for price";
pub const CONTACT_PLACEHOLDER: &str = "Contact vendor for details";
pub const DEFAULT_LOCATION: &str = "India";
pub const DEFAULT_UNIT: &str = "Unit";

static CARD_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    CARD_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("valid selector"))
        .collect()
});

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

static PRICE_HOLDER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, div, span").expect("valid selector"));

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£]\s*[\d,]+").expect("valid regex"));

/// Ancestor levels searched for a price in the relaxed pass. The search also
/// stops at the first ancestor holding another vendor's link.
const PRICE_SEARCH_DEPTH: usize = 3;

// ---------------------------------------------------------------------------
// ListingExtractor
// ---------------------------------------------------------------------------

/// Turns a parsed search page into vendor records.
///
/// Records whose vendor name cannot be found are still returned, named
/// [`UNKNOWN_VENDOR`]; the validator decides what to keep.
pub struct ListingExtractor {
    vendor_link: Regex,
    max_candidates: usize,
}

impl ListingExtractor {
    pub fn new(vendor_link_pattern: &str, max_candidates: usize) -> Result<Self> {
        let vendor_link = Regex::new(vendor_link_pattern).map_err(|e| {
            SmartBuyError::config(format!(
                "invalid vendor link pattern '{vendor_link_pattern}': {e}"
            ))
        })?;
        Ok(Self {
            vendor_link,
            max_candidates,
        })
    }

    /// Structural pass: one record per listing card. Cards come in selector
    /// order, and in document order within one selector.
    pub fn cards(&self, doc: &Html, location: &str) -> Vec<VendorRecord> {
        let mut seen = HashSet::new();
        let mut cards = Vec::new();

        for selector in CARD_SELS.iter() {
            for card in doc.select(selector) {
                if seen.insert(card.id()) {
                    cards.push(card);
                }
            }
        }
        cards.truncate(self.max_candidates);
        debug!(cards = cards.len(), "matched listing cards");

        cards
            .into_iter()
            .map(|card| {
                let (name, website) = match self.vendor_anchor(card) {
                    Some(anchor) => (
                        anchor_text(anchor),
                        anchor.value().attr("href").map(str::to_string),
                    ),
                    None => (UNKNOWN_VENDOR.to_string(), None),
                };
                listing_record(name, website, card_price(card), location)
            })
            .collect()
    }

    /// Relaxed pass: every vendor link anywhere in the page, one record per
    /// distinct name. Prices come from the link's nearest enclosing elements.
    pub fn anchors(&self, doc: &Html, location: &str) -> Vec<VendorRecord> {
        let mut seen_names = HashSet::new();
        let mut records = Vec::new();

        for anchor in doc.select(&ANCHOR_SEL) {
            if records.len() >= self.max_candidates {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if !self.vendor_link.is_match(href) {
                continue;
            }
            let name = anchor_text(anchor);
            if name.is_empty() || !seen_names.insert(name.to_lowercase()) {
                continue;
            }

            let price = anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(PRICE_SEARCH_DEPTH)
                .take_while(|el| self.vendor_links_in(*el) <= 1)
                .find_map(|el| {
                    let text = el.text().collect::<String>();
                    PRICE_RE.find(&text).map(|m| m.as_str().to_string())
                });

            records.push(listing_record(
                name,
                Some(href.to_string()),
                price,
                location,
            ));
        }

        debug!(anchors = records.len(), "matched vendor links");
        records
    }

    /// Number of vendor links inside `el`.
    fn vendor_links_in(&self, el: ElementRef<'_>) -> usize {
        el.select(&ANCHOR_SEL)
            .filter(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|href| self.vendor_link.is_match(href))
            })
            .count()
    }

    fn vendor_anchor<'a>(&self, card: ElementRef<'a>) -> Option<ElementRef<'a>> {
        card.select(&ANCHOR_SEL).find(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| self.vendor_link.is_match(href))
        })
    }
}

/// First price found in a `p`/`div`/`span` inside the card, matched against
/// the element's own text only.
fn card_price(card: ElementRef<'_>) -> Option<String> {
    card.select(&PRICE_HOLDER_SEL)
        .filter(|el| el.id() != card.id())
        .find_map(|el| {
            let own_text: String = el
                .children()
                .filter_map(|child| child.value().as_text())
                .map(|t| &**t)
                .collect();
            PRICE_RE.find(&own_text).map(|m| m.as_str().to_string())
        })
}

/// Whitespace-normalised link text, capped at [`MAX_NAME_CHARS`].
fn anchor_text(anchor: ElementRef<'_>) -> String {
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_NAME_CHARS)
        .collect()
}

fn listing_record(
    vendor_name: String,
    website: Option<String>,
    price: Option<String>,
    location: &str,
) -> VendorRecord {
    let location = location.trim();
    VendorRecord {
        id: 0,
        item_name: format!("{vendor_name} Product"),
        vendor_name,
        website,
        rating: None,
        rating_count: None,
        item_price: price.unwrap_or_else(|| PRICE_PLACEHOLDER.to_string()),
        item_unit: DEFAULT_UNIT.to_string(),
        verified_gst: false,
        verified_trustseal: false,
        member_since: None,
        location: if location.is_empty() {
            DEFAULT_LOCATION.to_string()
        } else {
            location.to_string()
        },
        contact: CONTACT_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINK_PATTERN: &str = r".*indiamart\.com/[^/]+/?";

    fn extractor() -> ListingExtractor {
        ListingExtractor::new(LINK_PATTERN, 30).unwrap()
    }

    fn fixture() -> Html {
        let html = std::fs::read_to_string("../../../fixtures/html/directory_listing.html")
            .expect("read listing fixture");
        Html::parse_document(&html)
    }

    #[test]
    fn cards_follow_selector_then_document_order() {
        let records = extractor().cards(&fixture(), "Pune");
        let names: Vec<&str> = records.iter().map(|r| r.vendor_name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Shree Balaji Steel Traders",
                "Maharashtra Cement Depot",
                "Om Hardware Mart",
                UNKNOWN_VENDOR,
            ]
        );

        let first = &records[0];
        assert_eq!(first.item_price, "₹ 52,000");
        assert_eq!(first.item_name, "Shree Balaji Steel Traders Product");
        assert_eq!(first.item_unit, "Unit");
        assert_eq!(first.location, "Pune");
        assert_eq!(first.contact, CONTACT_PLACEHOLDER);
        assert_eq!(
            first.website.as_deref(),
            Some("https://www.indiamart.com/shree-balaji-steel/")
        );
        assert!(!first.verified_gst && first.rating.is_none());
    }

    #[test]
    fn card_without_price_gets_placeholder() {
        let records = extractor().cards(&fixture(), "");
        let depot = records
            .iter()
            .find(|r| r.vendor_name == "Maharashtra Cement Depot")
            .unwrap();
        assert_eq!(depot.item_price, "$1,250");
        let mart = records
            .iter()
            .find(|r| r.vendor_name == "Om Hardware Mart")
            .unwrap();
        assert_eq!(mart.item_price, PRICE_PLACEHOLDER);
        assert_eq!(mart.location, DEFAULT_LOCATION);
    }

    #[test]
    fn overlapping_selectors_do_not_duplicate_cards() {
        let html = r#"<html><body>
            <div class="product-card" data-itemid="7">
              <a href="https://www.indiamart.com/acme-steel/">Acme Steel Co</a>
            </div>
        </body></html>"#;
        let records = extractor().cards(&Html::parse_document(html), "");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn candidates_are_capped() {
        let cards: String = (0..40)
            .map(|i| {
                format!(
                    r#"<div class="card"><a href="https://www.indiamart.com/v{i}/">Vendor {i}</a></div>"#
                )
            })
            .collect();
        let html = format!("<html><body>{cards}</body></html>");
        let records = extractor().cards(&Html::parse_document(&html), "");
        assert_eq!(records.len(), 30);
    }

    #[test]
    fn long_names_are_truncated() {
        let long = "X".repeat(150);
        let html = format!(
            r#"<div class="card"><a href="https://www.indiamart.com/x/">{long}</a></div>"#
        );
        let records = extractor().cards(&Html::parse_document(&html), "");
        assert_eq!(records[0].vendor_name.chars().count(), 100);
    }

    #[test]
    fn relaxed_pass_finds_links_outside_cards() {
        let html = r#"<html><body>
            <ul>
              <li><span>Rs</span> <a href="https://www.indiamart.com/kaveri-glass/">Kaveri Glass House</a> <b>₹ 900</b></li>
              <li><a href="https://www.indiamart.com/kaveri-glass/">Kaveri  Glass House</a></li>
              <li><a href="https://example.com/other/">Not A Vendor</a></li>
              <li><a href="https://www.indiamart.com/deccan-tiles/">Deccan Tiles</a></li>
            </ul>
        </body></html>"#;
        let records = extractor().anchors(&Html::parse_document(html), "Nashik");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vendor_name, "Kaveri Glass House");
        assert_eq!(records[0].item_price, "₹ 900");
        assert_eq!(records[1].vendor_name, "Deccan Tiles");
        assert_eq!(records[1].item_price, PRICE_PLACEHOLDER);
        assert_eq!(records[1].location, "Nashik");
    }

    #[test]
    fn invalid_pattern_is_config_error() {
        assert!(matches!(
            ListingExtractor::new("(", 30),
            Err(SmartBuyError::Config { .. })
        ));
    }
}
