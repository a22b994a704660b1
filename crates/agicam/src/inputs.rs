use std::fs;
use std::io::{self, Read};
use std::path::Path;

use agicam_core::ingestion::ReadingInput;
use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

pub const STDIN_MARKER: &str = "-";

/// Raw contents of one reading and where it came from.
#[derive(Debug)]
pub struct InputSource {
    pub label: String,
    pub contents: Vec<u8>,
}

impl InputSource {
    pub fn as_input(&self) -> ReadingInput<'_> {
        ReadingInput {
            label: &self.label,
            contents: &self.contents,
        }
    }
}

/// Expands the command-line inputs: `-` reads stdin, an existing path is read
/// as-is, anything else is treated as a glob pattern that must match a file.
pub fn collect_inputs(args: &[String]) -> Result<Vec<InputSource>> {
    let mut sources = Vec::new();
    let mut stdin_used = false;

    for arg in args {
        if arg == STDIN_MARKER {
            if stdin_used {
                bail!("stdin ('-') can only be given once");
            }
            stdin_used = true;
            let mut contents = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut contents)
                .context("failed to read reading from stdin")?;
            sources.push(InputSource {
                label: "<stdin>".to_string(),
                contents,
            });
            continue;
        }

        let path = Path::new(arg);
        if path.is_file() {
            sources.push(read_source(path)?);
            continue;
        }

        if !is_glob_pattern(arg) {
            bail!("input '{}' does not exist", arg);
        }

        let mut matched = 0usize;
        for entry in glob::glob(arg).with_context(|| format!("invalid glob pattern '{arg}'"))? {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    warn!(pattern = arg.as_str(), error = %err, "could not read path from glob");
                    continue;
                }
            };
            if path.is_file() {
                sources.push(read_source(&path)?);
                matched += 1;
            }
        }

        if matched == 0 {
            bail!("pattern '{}' matched no files", arg);
        }
        debug!(pattern = arg.as_str(), matched, "expanded input pattern");
    }

    Ok(sources)
}

fn read_source(path: &Path) -> Result<InputSource> {
    let contents =
        fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    Ok(InputSource {
        label: path.display().to_string(),
        contents,
    })
}

fn is_glob_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}
