//! The three vendor strategies: live fetch, relaxed re-read, placeholders.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use smartbuy_core::Strategy;
use smartbuy_shared::{StrategyError, StrategyResult, VendorRecord, VendorRequest, VendorSource};

use crate::extract::ListingExtractor;
use crate::fetch::{PageFetcher, jittered_delay, search_url};
use crate::synthetic::synthetic_vendors;

// ---------------------------------------------------------------------------
// VendorSearch
// ---------------------------------------------------------------------------

/// State of one vendor lookup, shared by the strategies of a single run.
///
/// The live strategy stores the page it fetched so later strategies can
/// re-read it without another request.
#[derive(Debug)]
pub struct VendorSearch {
    pub request: VendorRequest,
    document: OnceLock<String>,
}

impl VendorSearch {
    pub fn new(request: VendorRequest) -> Self {
        Self {
            request,
            document: OnceLock::new(),
        }
    }

    /// The fetched search page, if the live strategy got one.
    pub fn document(&self) -> Option<&str> {
        self.document.get().map(String::as_str)
    }

    fn store_document(&self, body: String) -> &str {
        self.document.get_or_init(|| body)
    }
}

// ---------------------------------------------------------------------------
// Live strategy
// ---------------------------------------------------------------------------

/// Fetches the directory search page and extracts listing cards.
pub struct LiveStrategy {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<ListingExtractor>,
    search_url: String,
    delay_ms: (u64, u64),
}

impl LiveStrategy {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<ListingExtractor>,
        search_url: impl Into<String>,
        delay_ms: (u64, u64),
    ) -> Self {
        Self {
            fetcher,
            extractor,
            search_url: search_url.into(),
            delay_ms,
        }
    }
}

#[async_trait]
impl Strategy<VendorSearch, VendorRecord, VendorSource> for LiveStrategy {
    fn name(&self) -> &str {
        "live"
    }

    fn source(&self) -> VendorSource {
        VendorSource::Live
    }

    async fn attempt(&self, search: &VendorSearch) -> StrategyResult<Vec<VendorRecord>> {
        let url = search_url(&self.search_url, &search.request)?;

        let delay = jittered_delay(self.delay_ms);
        debug!(delay_ms = delay.as_millis() as u64, %url, "waiting before directory request");
        tokio::time::sleep(delay).await;

        let body = self.fetcher.fetch(&url).await?;
        let body = search.store_document(body);

        let records = self
            .extractor
            .cards(&Html::parse_document(body), &search.request.location);
        if records.is_empty() {
            return Err(StrategyError::EmptyResult("no listing cards on page".into()));
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Heuristic strategy
// ---------------------------------------------------------------------------

/// Re-reads the already-fetched page with relaxed matching.
pub struct HeuristicStrategy {
    extractor: Arc<ListingExtractor>,
}

impl HeuristicStrategy {
    pub fn new(extractor: Arc<ListingExtractor>) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl Strategy<VendorSearch, VendorRecord, VendorSource> for HeuristicStrategy {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn source(&self) -> VendorSource {
        VendorSource::Heuristic
    }

    async fn attempt(&self, search: &VendorSearch) -> StrategyResult<Vec<VendorRecord>> {
        let body = search.document().ok_or_else(|| {
            StrategyError::SourceUnavailable("no fetched page to re-read".into())
        })?;

        let records = self
            .extractor
            .anchors(&Html::parse_document(body), &search.request.location);
        if records.is_empty() {
            return Err(StrategyError::EmptyResult("no vendor links on page".into()));
        }
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Synthetic strategy
// ---------------------------------------------------------------------------

/// Templated placeholder vendors. Always succeeds.
pub struct SyntheticStrategy;

#[async_trait]
impl Strategy<VendorSearch, VendorRecord, VendorSource> for SyntheticStrategy {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> VendorSource {
        VendorSource::Synthetic
    }

    async fn attempt(&self, search: &VendorSearch) -> StrategyResult<Vec<VendorRecord>> {
        Ok(synthetic_vendors(&search.request))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    pub(crate) const LINK_PATTERN: &str = r".*indiamart\.com/[^/]+/?";

    /// Fetcher returning a canned result and counting calls.
    pub(crate) struct CannedFetcher {
        pub response: StrategyResult<String>,
        pub calls: AtomicUsize,
    }

    impl CannedFetcher {
        pub(crate) fn new(response: StrategyResult<String>) -> Self {
            Self {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for CannedFetcher {
        async fn fetch(&self, _url: &Url) -> StrategyResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn extractor() -> Arc<ListingExtractor> {
        Arc::new(ListingExtractor::new(LINK_PATTERN, 30).unwrap())
    }

    fn search() -> VendorSearch {
        VendorSearch::new(VendorRequest {
            material_name: "TMT Bars".into(),
            location: "Pune".into(),
        })
    }

    fn live(fetcher: Arc<CannedFetcher>) -> LiveStrategy {
        LiveStrategy::new(
            fetcher,
            extractor(),
            "https://dir.indiamart.com/search.mp",
            (0, 0),
        )
    }

    #[tokio::test]
    async fn live_extracts_cards_and_keeps_the_page() {
        let page = std::fs::read_to_string("../../../fixtures/html/directory_listing.html")
            .expect("read listing fixture");
        let fetcher = Arc::new(CannedFetcher::new(Ok(page)));
        let search = search();

        let records = live(fetcher.clone()).attempt(&search).await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(search.document().is_some());
    }

    #[tokio::test]
    async fn live_propagates_fetch_errors() {
        let fetcher = Arc::new(CannedFetcher::new(Err(StrategyError::Timeout { secs: 30 })));
        let search = search();

        let err = live(fetcher).attempt(&search).await.unwrap_err();
        assert_eq!(err, StrategyError::Timeout { secs: 30 });
        assert!(search.document().is_none());
    }

    #[tokio::test]
    async fn live_page_without_cards_is_empty_result() {
        let fetcher = Arc::new(CannedFetcher::new(Ok("<html><body></body></html>".into())));
        let err = live(fetcher).attempt(&search()).await.unwrap_err();
        assert_eq!(err.kind(), "empty_result");
    }

    #[tokio::test]
    async fn heuristic_needs_a_fetched_page() {
        let err = HeuristicStrategy::new(extractor())
            .attempt(&search())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "source_unavailable");
    }

    #[tokio::test]
    async fn heuristic_reads_stored_page() {
        let search = search();
        search.store_document(
            r#"<table><tr><td><a href="https://www.indiamart.com/sai-steel/">Sai Steel Centre</a></td>
               <td>₹ 48,500</td></tr></table>"#
                .into(),
        );

        let records = HeuristicStrategy::new(extractor())
            .attempt(&search)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vendor_name, "Sai Steel Centre");
        assert_eq!(records[0].item_price, "₹ 48,500");
    }

    #[tokio::test]
    async fn synthetic_always_succeeds() {
        let records = SyntheticStrategy.attempt(&search()).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].vendor_name, "ABC TMT Bars Suppliers");
    }
}
