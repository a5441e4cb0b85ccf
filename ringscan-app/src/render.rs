use anyhow::Result;
use ringscan_common::OutputFormat;
use ringscan_scan::{PageOutcome, PageResult};
use std::io::Write;

pub fn render<W: Write>(out: &mut W, format: OutputFormat, results: &[PageResult]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, results)?;
            writeln!(out)?;
        }
        OutputFormat::Text => render_text(out, results)?,
    }
    out.flush()?;
    Ok(())
}

fn render_text<W: Write>(out: &mut W, results: &[PageResult]) -> Result<()> {
    for page in results {
        writeln!(out, "{}", page.url)?;
        match &page.outcome {
            PageOutcome::Phones { phones, rejected } => {
                for number in phones {
                    writeln!(out, "  {number}")?;
                }
                for raw in rejected {
                    writeln!(out, "  rejected: {raw}")?;
                }
            }
            PageOutcome::Failed { error } => {
                writeln!(out, "  error: {} ({error})", error.kind())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringscan_extract::{RawMatch, normalize};
    use ringscan_scan::ScanError;

    fn sample() -> Vec<PageResult> {
        vec![
            PageResult {
                url: "https://a.example".into(),
                outcome: PageOutcome::Phones {
                    phones: ["9161234567", "4951234567"].iter().map(|n| normalize(n)).collect(),
                    rejected: vec![RawMatch::new("123 45 678")],
                },
            },
            PageResult::failed("https://b.example", ScanError::Status { status: 404 }),
            PageResult {
                url: "https://c.example".into(),
                outcome: PageOutcome::Phones {
                    phones: Default::default(),
                    rejected: Vec::new(),
                },
            },
        ]
    }

    #[test]
    fn text_lists_each_url_with_numbers_or_error() {
        let mut out = Vec::new();
        render(&mut out, OutputFormat::Text, &sample()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "https://a.example\n  84951234567\n  89161234567\n  rejected: 123 45 678\n\
             https://b.example\n  error: fetch_failure (HTTP status 404)\n\
             https://c.example\n"
        );
    }

    #[test]
    fn json_is_an_array_in_input_order() {
        let mut out = Vec::new();
        render(&mut out, OutputFormat::Json, &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let pages = value.as_array().unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0]["url"], "https://a.example");
        assert_eq!(pages[0]["phones"][1], "89161234567");
        assert_eq!(pages[1]["status"], "failed");
        assert_eq!(pages[1]["error"]["kind"], "fetch_failure");
        assert_eq!(pages[2]["phones"], serde_json::json!([]));
    }
}
