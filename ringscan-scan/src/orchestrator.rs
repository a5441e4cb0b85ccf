//! Fan-out over a URL list and join in input order.
//!
//! Every URL gets its own task on a `JoinSet`; all are spawned before any is
//! awaited. Completion order is whatever the network makes it, so results are
//! slotted back by input index.

use ringscan_http::HttpClient;
use std::collections::HashMap;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::task::fetch_and_extract;
use crate::{PageResult, ScanError, ScanSettings, ScanSummary};

#[derive(Clone)]
pub struct Scanner {
    client: HttpClient,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(client: HttpClient, settings: ScanSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan every URL concurrently; one result per URL, in input order.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S]) -> Vec<PageResult> {
        self.run_until_cancelled(urls, CancellationToken::new())
            .await
    }

    /// Like [`Scanner::run`], but stops waiting once `cancel` fires.
    ///
    /// Pages still in flight at that point are aborted and reported as
    /// [`ScanError::Cancelled`]; pages that already finished keep their result.
    pub async fn run_until_cancelled<S: AsRef<str>>(
        &self,
        urls: &[S],
        cancel: CancellationToken,
    ) -> Vec<PageResult> {
        let client = self.client.clone();
        let settings = self.settings.clone();
        join_in_order(urls, cancel, move |url| {
            let client = client.clone();
            let settings = settings.clone();
            async move { fetch_and_extract(&client, &url, &settings).await }
        })
        .await
    }
}

/// Spawn `page(url)` for every URL and slot the results back by input index.
///
/// A task that panics fills its own slot with [`ScanError::TaskAborted`].
async fn join_in_order<S, F, Fut>(
    urls: &[S],
    cancel: CancellationToken,
    mut page: F,
) -> Vec<PageResult>
where
    S: AsRef<str>,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = PageResult> + Send + 'static,
{
    tracing::info!(url_count = urls.len(), "scan.start");

    let mut tasks = JoinSet::new();
    let mut slot_of: HashMap<Id, usize> = HashMap::with_capacity(urls.len());
    for (idx, url) in urls.iter().enumerate() {
        let handle = tasks.spawn(page(url.as_ref().to_string()));
        slot_of.insert(handle.id(), idx);
    }

    let mut slots: Vec<Option<PageResult>> = urls.iter().map(|_| None).collect();
    let mut cancelled = false;

    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled(), if !cancelled => {
                tracing::warn!(pending = tasks.len(), "scan.cancelled");
                cancelled = true;
                tasks.abort_all();
                continue;
            }
            joined = tasks.join_next_with_id() => joined,
        };

        match joined {
            None => break,
            Some(Ok((id, result))) => {
                if let Some(&idx) = slot_of.get(&id) {
                    slots[idx] = Some(result);
                }
            }
            Some(Err(err)) if err.is_cancelled() => {}
            Some(Err(err)) => {
                if let Some(&idx) = slot_of.get(&err.id()) {
                    let url = urls[idx].as_ref();
                    tracing::error!(url, error = %err, "scan.task.aborted");
                    slots[idx] = Some(PageResult::failed(
                        url,
                        ScanError::TaskAborted(err.to_string()),
                    ));
                }
            }
        }
    }

    let results: Vec<PageResult> = slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| PageResult::failed(url.as_ref(), ScanError::Cancelled))
        })
        .collect();

    let summary = ScanSummary::from_results(&results);
    tracing::info!(
        pages = summary.pages,
        failed = summary.failed,
        numbers = summary.numbers,
        "scan.done"
    );
    results
}

/// Scan `urls` with a client created for this call and default settings.
///
/// The connection pool lives exactly as long as the scan.
pub async fn run<S: AsRef<str>>(urls: &[S]) -> Result<Vec<PageResult>, ScanError> {
    let settings = ScanSettings::default();
    let client = HttpClient::new()?.with_timeout(settings.timeout);
    let scanner = Scanner::new(client, settings);
    Ok(scanner.run(urls).await)
}
