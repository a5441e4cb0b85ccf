//! Tokio runtime used by the ringscan binary.
//!
//! Scans run on a single current-thread runtime: every page task is
//! interleaved cooperatively at I/O await points, so extraction code needs no
//! synchronisation. The runtime also owns the cancellation token that Ctrl-C
//! handling and the scanner share.
use ringscan_common::Result;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct ScanHandle {
    inner: Handle,
    cancel: CancellationToken,
}

pub struct ScanRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl ScanRuntime {
    /// Build a current-thread Tokio runtime with I/O and timers enabled.
    ///
    /// ```
    /// use ringscan_runtime::ScanRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = ScanRuntime::build("doctest-runtime").expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(thread_name)
            .build()?;
        Ok(Self {
            runtime,
            cancel: CancellationToken::new(),
        })
    }

    /// Obtain a cloned handle for Ctrl-C watching and sharing cancellation.
    ///
    /// ```
    /// use ringscan_runtime::ScanRuntime;
    ///
    /// let runtime = ScanRuntime::build("handle-example").unwrap();
    /// let handle = runtime.handle();
    /// assert!(!handle.cancellation().is_cancelled());
    /// ```
    pub fn handle(&self) -> ScanHandle {
        ScanHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Run a future to completion on the runtime.
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and shut the runtime down gracefully.
    pub fn shutdown(self, graceful: Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl ScanHandle {
    /// Clone the shared cancellation token to coordinate shutdown.
    ///
    /// ```
    /// use ringscan_runtime::ScanRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = ScanRuntime::build("cancel-example").unwrap();
    /// let cancel = runtime.handle().cancellation();
    /// cancel.cancel();
    /// assert!(cancel.is_cancelled());
    /// runtime.shutdown(Duration::from_millis(5));
    /// ```
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the shared token when the process receives Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) -> JoinHandle<()> {
        let cancel = self.cancel.clone();
        self.inner.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                res = tokio::signal::ctrl_c() => {
                    if res.is_ok() {
                        cancel.cancel();
                    }
                }
            }
        })
    }
}
