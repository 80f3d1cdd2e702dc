//! locate-inspect
//!
//! Decode hex-encoded user-info records through a fresh session and print the
//! merged cache entries as JSON, followed by the session counters.
//!
//! Usage: `locate-inspect [--config locate.yaml] <hex-record>...`

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use locate_core::error::{LocateError, Result};
use locate_core::handle::handles_equal;
use locate_core::protocol::ByteCursor;
use locate_session::{config, LocateConfig, LocateSession, NoopObserver};

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "locate-inspect failed");
            eprintln!("error [{}]: {e}", e.code().as_str());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<()> {
    let mut cfg_path = None;
    let mut records = Vec::new();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        if arg == "--config" {
            let path = it
                .next()
                .ok_or_else(|| LocateError::BadConfig("--config needs a path".into()))?;
            cfg_path = Some(path);
        } else {
            records.push(arg);
        }
    }

    let cfg = match cfg_path {
        Some(p) => config::load_from_file(&p)?,
        None => LocateConfig::default(),
    };
    let mut session = LocateSession::new(cfg, Box::new(NoopObserver));

    let mut handles = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let raw = hex::decode(rec.trim())
            .map_err(|e| LocateError::Internal(format!("record {i}: invalid hex: {e}")))?;
        let mut peek = ByteCursor::new(&raw);
        let handle = peek
            .read_length_prefixed_string()
            .map(|h| String::from_utf8_lossy(&h).into_owned())?;
        let outcome = session.handle_user_info(&raw)?;
        tracing::info!(record = i, handle = %handle, outcome = outcome.as_str(), "decoded");
        if !handles.iter().any(|h: &String| handles_equal(h, &handle)) {
            handles.push(handle);
        }
    }

    for h in &handles {
        if let Some(rec) = session.find(h) {
            let json = serde_json::to_string_pretty(rec)
                .map_err(|e| LocateError::Internal(format!("json encode failed: {e}")))?;
            println!("{json}");
        }
    }
    print!("{}", session.metrics().render());
    Ok(())
}
