//! Replay a scripted annotation session and print the resulting regions.
//!
//! Usage: `mmat-replay <session.json> [config.json]`
//!
//! Without a config argument the user config file is used if it exists.
//! `RUST_LOG` overrides the configured log level.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::Path;
    use std::process::ExitCode;

    use mmat::config::EditorConfig;
    use mmat::model::regions_to_json;
    use mmat::session::{Session, replay};

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(session_path) = args.first() else {
        eprintln!("Usage: mmat-replay <session.json> [config.json]");
        return ExitCode::from(2);
    };

    let config = EditorConfig::load_or_default(args.get(1).map(Path::new));
    let default_level = config.log_level.to_level_filter().to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let session = match Session::load(Path::new(session_path)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = match replay(session, config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Replay error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match regions_to_json(&report.regions) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize regions: {}", e);
            ExitCode::FAILURE
        }
    }
}

// The replay tool needs a filesystem; wasm builds only use the library
#[cfg(target_arch = "wasm32")]
fn main() {}
