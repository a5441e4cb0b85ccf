//! One page: fetch, extract, normalize.

use ringscan_extract::phones_in;
use ringscan_http::{HttpClient, RequestOpts};
use std::time::Instant;

use crate::{PageOutcome, PageResult, ScanError, ScanSettings};

/// Fetch `url` through the shared client and collect its phone numbers.
///
/// Never fails: fetch and decode errors end up in [`PageOutcome::Failed`] so
/// one bad page cannot take its siblings down.
pub async fn fetch_and_extract(
    client: &HttpClient,
    url: &str,
    settings: &ScanSettings,
) -> PageResult {
    let started = Instant::now();
    let opts = RequestOpts {
        timeout: Some(settings.timeout),
    };

    let outcome = match client.get_text(url, opts).await {
        Ok(html) => {
            let page = phones_in(&html, settings.policy);
            for raw in &page.rejected {
                tracing::warn!(url, raw = %raw, "scan.page.rejected_match");
            }
            tracing::info!(
                url,
                phones = page.phones.len(),
                rejected = page.rejected.len(),
                html_len = html.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "scan.page.done"
            );
            PageOutcome::Phones {
                phones: page.phones,
                rejected: page.rejected,
            }
        }
        Err(err) => {
            let error = ScanError::from(err);
            tracing::warn!(
                url,
                kind = error.kind(),
                error = %error,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "scan.page.failed"
            );
            PageOutcome::Failed { error }
        }
    };

    PageResult {
        url: url.to_string(),
        outcome,
    }
}
