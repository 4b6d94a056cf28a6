use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Route `log` output to a file; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default `info` filter. Without a path the
/// output is discarded.
pub fn init(path: Option<&Path>) -> std::io::Result<()> {
    let target: Box<dyn Write + Send + 'static> = match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            Box::new(OpenOptions::new().create(true).append(true).open(path)?)
        }
        None => Box::new(std::io::sink()),
    };

    // a logger may already be installed (tests, embedding)
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(target))
        .format_timestamp_millis()
        .try_init();
    Ok(())
}

/// Plain stderr logging for the non-interactive subcommands
pub fn init_stderr() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}
