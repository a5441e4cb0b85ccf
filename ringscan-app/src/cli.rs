use anyhow::{Context as _, Result};
use clap::Parser;
use ringscan_common::{OutputFormat, RingscanError};
use ringscan_config::{RingscanConfig, RingscanConfigLoader, default_config_path};
use ringscan_extract::NormalizePolicy;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(
    name = "ringscan",
    version,
    about = "Collect normalized phone numbers from web pages"
)]
pub struct Cli {
    /// Pages to scan; results keep this order.
    pub urls: Vec<String>,
    /// YAML config file. Defaults to the per-user config if it exists.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// File with one URL per line; blank lines and `#` comments are skipped.
    #[arg(long, value_name = "FILE")]
    pub urls_file: Option<PathBuf>,
    /// Per-page timeout.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Keep matches whose digit count fits no known layout.
    #[arg(long)]
    pub permissive: bool,
    #[arg(long, value_name = "text|json")]
    pub format: Option<OutputFormat>,
    /// Mirror log events to stderr.
    #[arg(long)]
    pub log_stderr: bool,
}

impl Cli {
    pub fn load_config(&self) -> Result<RingscanConfig> {
        let loader = RingscanConfigLoader::new();
        let loader = match (&self.config, default_config_path()) {
            (Some(path), _) => loader.with_file(path),
            (None, Some(path)) => loader.with_optional_file(path),
            (None, None) => loader,
        };
        let mut cfg = loader.load().context("load config")?;
        self.apply(&mut cfg);
        Ok(cfg)
    }

    /// Flags win over file and environment values.
    pub fn apply(&self, cfg: &mut RingscanConfig) {
        if let Some(secs) = self.timeout {
            cfg.scan.timeout_secs = secs;
        }
        if self.permissive {
            cfg.scan.normalization = NormalizePolicy::Permissive;
        }
        if let Some(format) = self.format {
            cfg.output.format = format;
        }
        if self.log_stderr {
            cfg.log.stderr = true;
        }
    }

    /// Config URLs, then positional URLs, then the URLs file.
    ///
    /// Fails with [`RingscanError::Input`] when all three are empty.
    pub fn collect_urls(&self, cfg: &RingscanConfig) -> Result<Vec<String>> {
        let mut urls = cfg.urls.clone();
        urls.extend(self.urls.iter().cloned());
        if let Some(path) = &self.urls_file {
            urls.extend(read_urls_file(path)?);
        }
        if urls.is_empty() {
            return Err(RingscanError::Input(
                "no URLs to scan; pass them as arguments, with --urls-file, or under `urls` in the config"
                    .to_string(),
            )
            .into());
        }
        Ok(urls)
    }
}

pub fn read_urls_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read urls file {}", path.display()))?;
    Ok(parse_url_list(&text))
}

fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn url_list_skips_blanks_and_comments() {
        let text = "# contacts\nhttps://a.example\n\n   \n  https://b.example  \n#https://c.example\n";
        assert_eq!(
            parse_url_list(text),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ringscan",
            "--timeout",
            "5",
            "--permissive",
            "--format",
            "json",
            "--log-stderr",
        ]);
        let mut cfg = RingscanConfig::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.scan.timeout_secs, 5);
        assert_eq!(cfg.scan.normalization, NormalizePolicy::Permissive);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(cfg.log.stderr);
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let cli = Cli::parse_from(["ringscan"]);
        let mut cfg = RingscanConfig::default();
        cfg.scan.timeout_secs = 12;
        cfg.output.format = OutputFormat::Json;
        cli.apply(&mut cfg);
        assert_eq!(cfg.scan.timeout_secs, 12);
        assert_eq!(cfg.scan.normalization, NormalizePolicy::Strict);
        assert_eq!(cfg.output.format, OutputFormat::Json);
        assert!(!cfg.log.stderr);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["ringscan", "--format", "xml"]).is_err());
    }

    #[test]
    fn urls_are_collected_config_then_args_then_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "https://file.example").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from([
            "ringscan",
            "https://arg.example",
            "--urls-file",
            path.as_str(),
        ]);
        let cfg = RingscanConfig {
            urls: vec!["https://config.example".to_string()],
            ..RingscanConfig::default()
        };

        assert_eq!(
            cli.collect_urls(&cfg).unwrap(),
            vec![
                "https://config.example",
                "https://arg.example",
                "https://file.example",
            ]
        );
    }

    #[test]
    fn no_urls_anywhere_is_an_input_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "# nothing yet\n\n").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["ringscan", "--urls-file", path.as_str()]);
        let err = cli.collect_urls(&RingscanConfig::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RingscanError>(),
            Some(RingscanError::Input(_))
        ));
        assert!(err.to_string().contains("no URLs to scan"));
    }

    #[test]
    fn missing_urls_file_is_an_error() {
        let cli = Cli::parse_from(["ringscan", "--urls-file", "/nonexistent/ringscan-urls.txt"]);
        let err = cli.collect_urls(&RingscanConfig::default()).unwrap_err();
        assert!(err.to_string().contains("read urls file"));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let cli = Cli::parse_from(["ringscan", "-c", "/nonexistent/ringscan.yaml"]);
        assert!(cli.load_config().is_err());
    }
}
