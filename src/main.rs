mod cli;
mod csv_out;
mod errors;
mod extract;
mod inputs;
mod line_parser;
mod lookup;
mod merge;
mod model;
mod summary;

use crate::errors::AppError;
use crate::line_parser::LineClassifier;
use crate::model::FileTables;
use anyhow::Context;
use chrono_tz::Tz;
use env_logger::Env;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

fn setup_logging(level: &str) {
    let env = Env::default().filter_or("RUST_LOG", match level {
        "essential" => "info",
        "debug" => "debug",
        "trace" => "trace",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    });
    env_logger::Builder::from_env(env).init();
}

fn parse_tz(args_tz: &Option<String>) -> Option<Tz> {
    let tzname = args_tz.as_ref()?;
    match tzname.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            warn!("Timezone parse failed; hourly activity falls back to UTC");
            None
        }
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = cli::parse_cli();
    setup_logging(&args.log_level);

    // Lookup tables are checked before any input is touched.
    let lookups = lookup::Lookups::load(args.sites.as_deref(), args.talkgroups.as_deref())
        .context("loading site/talkgroup lookup tables")?;
    let classifier = Arc::new(LineClassifier::new()?);
    let tz = parse_tz(&args.tz);

    let files = inputs::collect_inputs(&args.inputs)?;
    info!("Starting: processing {} files", files.len());

    let mut tasks = Vec::new();
    for path in files {
        let classifier = Arc::clone(&classifier);
        tasks.push(tokio::spawn(async move {
            match extract_path(classifier, &path).await {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("{}: extraction failed: {}", path.display(), e);
                    None
                }
            }
        }));
    }

    // Awaited in input order, so concatenation order follows the inputs.
    let mut extracted = Vec::with_capacity(tasks.len());
    for t in tasks {
        match t.await {
            Ok(Some(tables)) => extracted.push(tables),
            Ok(None) => {}
            Err(e) => warn!("extraction task join: {}", e),
        }
    }

    let tables = merge::merge(extracted, &lookups);
    csv_out::write_tables(&args.out_dir, &tables).context("writing output tables")?;

    let s = summary::summarize(&tables, tz);
    summary::log_summary(&tables, &s);
    if !args.no_summary {
        summary::write_summary(&args.out_dir, &s)?;
    }

    info!("Done.");
    Ok(())
}

async fn extract_path(classifier: Arc<LineClassifier>, path: &Path) -> Result<FileTables, AppError> {
    info!("Reading file {}", path.display());
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::IO(format!("open {}: {}", path.display(), e)))?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    let tables = tokio::task::spawn_blocking(move || {
        let text = merge::decode_text(&bytes);
        merge::extract_file(&classifier, &name, &text)
    })
    .await
    .map_err(|e| AppError::IO(format!("extract join {}: {}", path.display(), e)))?;

    debug!(
        "{}: {} channels, {} registrations, {} affiliations",
        path.display(),
        tables.channels.len(),
        tables.registrations.len(),
        tables.affiliations.len()
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_is_decoded_and_extracted_off_the_runtime() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("13.txt");
        let mut bytes = b"Site ID: 2\nChannel 9 Logical: 9 SourceID: 1 TargetID: 10\xff1 CallType:group-voice-call Status: Busy Allocated Time: 12\n".to_vec();
        bytes.extend_from_slice(b"source:32001 username: siteID:1 TGList:601,602 active:true\n");
        std::fs::write(&path, bytes).unwrap();

        let classifier = Arc::new(LineClassifier::new().unwrap());
        let t = extract_path(classifier, &path).await.unwrap();
        assert_eq!(t.channels.len(), 1);
        assert_eq!(t.channels[0].target_id, crate::model::TargetId::Numeric(101));
        assert!(t.registrations.iter().all(|r| r.capture_hour == Some(13)));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let tmp = TempDir::new().unwrap();
        let classifier = Arc::new(LineClassifier::new().unwrap());
        let err = extract_path(classifier, &tmp.path().join("absent.txt")).await.unwrap_err();
        assert!(matches!(err, AppError::IO(_)));
    }
}
