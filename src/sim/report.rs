use crate::memory::frame_pool::FrameIndex;
use crate::memory::manager::{AccessError, AccessOutcome, Disposition};
use crate::memory::page_table::{PageKey, ProcessId};
use crate::sim::workload::SimConfig;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Access counters for one process, or totals across all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub process: Option<ProcessId>,
    pub accesses: u64,
    pub hits: u64,
    pub allocations: u64,
    pub evictions: u64,
    pub exhaustions: u64,
    pub translation_misses: u64,
    /// False when the trace file could not be opened.
    pub trace_loaded: bool,
}

impl ProcessStats {
    pub fn for_process(process: ProcessId) -> Self {
        ProcessStats {
            process: Some(process),
            ..Default::default()
        }
    }

    pub fn record(&mut self, result: &Result<AccessOutcome, AccessError>) {
        self.accesses += 1;
        match result {
            Ok(outcome) => match outcome.disposition {
                Disposition::Resident => self.hits += 1,
                Disposition::Allocated => self.allocations += 1,
                Disposition::Evicted { .. } => {
                    self.allocations += 1;
                    self.evictions += 1;
                }
            },
            Err(AccessError::FrameExhaustion) => self.exhaustions += 1,
            Err(AccessError::TranslationMiss { .. }) => self.translation_misses += 1,
        }
    }

    pub fn merge(&mut self, other: &ProcessStats) {
        self.accesses += other.accesses;
        self.hits += other.hits;
        self.allocations += other.allocations;
        self.evictions += other.evictions;
        self.exhaustions += other.exhaustions;
        self.translation_misses += other.translation_misses;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResidentPage {
    pub process: ProcessId,
    pub page_number: u64,
    pub frame: FrameIndex,
}

impl From<(PageKey, FrameIndex)> for ResidentPage {
    fn from((key, frame): (PageKey, FrameIndex)) -> Self {
        ResidentPage {
            process: key.process,
            page_number: key.page_number,
            frame,
        }
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub config: SimConfig,
    pub num_frames: usize,
    pub processes: Vec<ProcessStats>,
    pub totals: ProcessStats,
    pub resident: Vec<ResidentPage>,
}

impl SimulationReport {
    pub fn new(
        config: SimConfig,
        num_frames: usize,
        processes: Vec<ProcessStats>,
        resident: Vec<(PageKey, FrameIndex)>,
    ) -> Self {
        let mut totals = ProcessStats {
            trace_loaded: processes.iter().all(|p| p.trace_loaded),
            ..Default::default()
        };
        for p in &processes {
            totals.merge(p);
        }
        SimulationReport {
            config,
            num_frames,
            processes,
            totals,
            resident: resident.into_iter().map(ResidentPage::from).collect(),
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let body = serde_json::to_string_pretty(self).context("serializing simulation report")?;
        fs::write(path, body).with_context(|| format!("writing report to {:?}", path))?;
        Ok(())
    }
}
