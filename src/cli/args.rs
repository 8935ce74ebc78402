use crate::memory::manager::EvictionPolicy;
use anyhow::{Context, Result, anyhow, bail};
use std::path::PathBuf;

/// Parsed command line:
/// `<description> <output_log> <seed> [--eviction fifo|slot-order] [--report <path>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub description: PathBuf,
    pub log_path: PathBuf,
    pub seed: u64,
    pub eviction: EvictionPolicy,
    pub report: Option<PathBuf>,
}

pub fn usage(program: &str) -> String {
    format!(
        "Usage: {} <input file> <output file> <RNG seed> \
         [--eviction fifo|slot-order] [--report <json file>]",
        program
    )
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut eviction = EvictionPolicy::default();
        let mut report = None;

        let mut iter = args.iter().map(|a| a.as_ref());
        while let Some(arg) = iter.next() {
            match arg {
                "--eviction" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow!("--eviction needs a value"))?;
                    eviction = value.parse()?;
                }
                "--report" => {
                    let value = iter.next().ok_or_else(|| anyhow!("--report needs a path"))?;
                    report = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => bail!("unknown option '{}'", flag),
                other => positional.push(other),
            }
        }

        if positional.len() < 3 {
            bail!("expected 3 arguments, got {}", positional.len());
        }
        let seed = positional[2]
            .parse::<u64>()
            .with_context(|| format!("invalid seed '{}'", positional[2]))?;

        Ok(CliArgs {
            description: PathBuf::from(positional[0]),
            log_path: PathBuf::from(positional[1]),
            seed,
            eviction,
            report,
        })
    }
}
