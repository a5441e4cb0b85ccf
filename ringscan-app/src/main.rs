mod cli;
mod render;

use anyhow::Result;
use clap::Parser;
use ringscan_common::observability::{LogConfig, init_logging};
use ringscan_http::{ClientOptions, HttpClient};
use ringscan_runtime::ScanRuntime;
use ringscan_scan::{ScanSettings, Scanner};
use std::process::ExitCode;
use std::time::Duration;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ringscan: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // 1) Config: file, then env, then flags
    let cfg = cli.load_config()?;

    let log_path = init_logging(LogConfig {
        app_name: "ringscan",
        log_dir: cfg.log.dir.clone(),
        emit_stderr: cfg.log.stderr,
        format: cfg.log.format,
        default_filter: cfg.log.filter.clone(),
    })?;
    tracing::debug!(path = %log_path.display(), "log.ready");

    let urls = cli.collect_urls(&cfg)?;

    // 2) One pooled client shared by every page task
    let options = ClientOptions {
        connect_timeout: cfg.scan.connect_timeout(),
        user_agent: cfg.scan.user_agent.clone(),
    };
    let settings = ScanSettings {
        timeout: cfg.scan.timeout(),
        policy: cfg.scan.normalization,
    };
    let client = HttpClient::with_options(options)?.with_timeout(settings.timeout);
    let scanner = Scanner::new(client, settings);

    // 3) Scan on a single-threaded runtime; Ctrl-C cancels what is left
    let runtime = ScanRuntime::build("ringscan")?;
    let handle = runtime.handle();
    let results = runtime.block_on(async {
        let ctrl_c = handle.cancel_on_ctrl_c();
        let results = scanner
            .run_until_cancelled(&urls, handle.cancellation())
            .await;
        ctrl_c.abort();
        results
    });
    runtime.shutdown(Duration::from_millis(250));

    render::render(&mut std::io::stdout().lock(), cfg.output.format, &results)
}
