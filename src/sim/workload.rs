use crate::memory::manager::{EvictionPolicy, MemoryManager, table_size};
use anyhow::{Context, Result, anyhow, bail};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Simulation parameters: the workload description plus CLI options.
///
/// The description is whitespace separated:
///
/// ```text
/// <memory_size> <page_size> <num_processes>
/// <trace path for process 0>
/// ...
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SimConfig {
    pub memory_size: u64,
    pub page_size: u64,
    pub num_processes: usize,
    pub trace_paths: Vec<PathBuf>,
    pub eviction: EvictionPolicy,
    /// Accepted and reported; has no effect on the simulation.
    pub seed: u64,
}

fn next_field<T>(tokens: &mut std::str::SplitWhitespace<'_>, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let tok = tokens
        .next()
        .ok_or_else(|| anyhow!("workload description is missing {}", name))?;
    tok.parse::<T>()
        .map_err(|e| anyhow!("invalid {} '{}': {}", name, tok, e))
}

impl SimConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let mut tokens = content.split_whitespace();
        let memory_size: u64 = next_field(&mut tokens, "memory size")?;
        let page_size: u64 = next_field(&mut tokens, "page size")?;
        let num_processes: usize = next_field(&mut tokens, "process count")?;

        if page_size == 0 {
            bail!("page size must be non-zero");
        }
        if memory_size < page_size {
            bail!(
                "memory size {} is smaller than one page of {} bytes",
                memory_size,
                page_size
            );
        }
        if num_processes == 0 {
            bail!("process count must be at least 1");
        }
        table_size(memory_size, page_size, num_processes)?;

        let trace_paths: Vec<PathBuf> = tokens.take(num_processes).map(PathBuf::from).collect();
        if trace_paths.len() < num_processes {
            bail!(
                "expected {} trace paths, found {}",
                num_processes,
                trace_paths.len()
            );
        }

        Ok(SimConfig {
            memory_size,
            page_size,
            num_processes,
            trace_paths,
            eviction: EvictionPolicy::default(),
            seed: 0,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading workload description {:?}", path))?;
        Self::parse(&content).with_context(|| format!("parsing workload description {:?}", path))
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn num_frames(&self) -> usize {
        (self.memory_size / self.page_size) as usize
    }

    pub fn build_manager(&self) -> Result<MemoryManager> {
        MemoryManager::new(
            self.memory_size,
            self.page_size,
            self.num_processes,
            self.eviction,
        )
    }
}
