use tracing::{debug, error, info};
use wallet_core::Signature;

use crate::{SignatureSource, MAX_SIGNATURE_PAGE};

/// How a signature walk ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerCompletion {
    /// An empty page came back: the history is exhausted
    Exhausted,
    /// A page failed for a reason other than rate limiting
    FailStopped { error: String },
}

/// Everything collected by one walk over an address's signature history
#[derive(Debug, Clone)]
pub struct SignatureHistory {
    /// Pages concatenated in fetch order (newest first)
    pub signatures: Vec<Signature>,
    pub pages_fetched: usize,
    /// `before` cursor for the next page: the last signature seen
    pub cursor: Option<String>,
    pub completion: PagerCompletion,
}

impl SignatureHistory {
    pub fn is_complete(&self) -> bool {
        self.completion == PagerCompletion::Exhausted
    }
}

/// Walks `getSignaturesForAddress` backward in time until an empty page
pub struct SignaturePager<S> {
    source: S,
    page_size: u32,
}

impl<S: SignatureSource> SignaturePager<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.clamp(1, MAX_SIGNATURE_PAGE),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the whole history of `address`.
    ///
    /// Rate limits are waited out inside the source. Any other failure ends
    /// the walk and whatever was gathered so far is returned.
    pub async fn fetch_all(&self, address: &str) -> SignatureHistory {
        let mut signatures: Vec<Signature> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages_fetched = 0;

        let completion = loop {
            let page = match self
                .source
                .signatures_before(address, cursor.as_deref(), self.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    error!(
                        "Error fetching signatures for {} (after {} pages, {} signatures): {}",
                        address,
                        pages_fetched,
                        signatures.len(),
                        e
                    );
                    break PagerCompletion::FailStopped {
                        error: e.to_string(),
                    };
                }
            };

            let Some(last) = page.last() else {
                debug!("Empty page for {}, history exhausted", address);
                break PagerCompletion::Exhausted;
            };

            cursor = Some(last.signature.clone());
            pages_fetched += 1;
            signatures.extend(page);

            debug!(
                "Page {} for {}: cursor now {:?}, {} signatures so far",
                pages_fetched,
                address,
                cursor,
                signatures.len()
            );
        };

        info!(
            "Fetched {} signatures for {} in {} pages ({:?})",
            signatures.len(),
            address,
            pages_fetched,
            completion
        );

        SignatureHistory {
            signatures,
            pages_fetched,
            cursor,
            completion,
        }
    }
}
