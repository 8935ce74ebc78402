use crate::memory::manager::{AccessError, AccessOutcome, Disposition};
use crate::memory::page_table::ProcessId;
use crate::memory::shared::SharedMemoryManager;
use crate::sim::log_sink::LogSink;
use crate::sim::report::ProcessStats;
use crate::sim::trace::{Instruction, load_trace};
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Base of the placeholder value reported for each successful load.
pub const SYNTHETIC_BASE: u32 = 0x67c6_6973;

/// Placeholder memory content for the `sequence`-th successful access of a
/// process (0-based).
pub fn synthetic_value(sequence: u64) -> u32 {
    SYNTHETIC_BASE.wrapping_add(sequence as u32)
}

/// Everything one simulated process needs. Dropped when it finishes.
pub struct ProcessContext {
    pub process_id: ProcessId,
    pub trace_path: PathBuf,
    pub log: LogSink,
    pub memory: SharedMemoryManager,
}

/// Format the log lines for one resolved (or failed) access. `sequence` is
/// advanced on every successful translation.
pub fn describe_access(
    pid: ProcessId,
    ins: &Instruction,
    result: &Result<AccessOutcome, AccessError>,
    sequence: &mut u64,
) -> Vec<String> {
    let va = ins.virtual_address;
    let mut lines = vec![format!(
        "P{} OPERATION: {} {} {:#010x}",
        pid, ins.op, ins.register, va
    )];
    match result {
        Ok(outcome) => {
            let page = outcome.key.page_number;
            lines.push(match outcome.disposition {
                Disposition::Resident => format!(
                    "P{}: valid translation from page {} to frame {}",
                    pid, page, outcome.frame
                ),
                Disposition::Allocated => format!(
                    "P{}: page {} not resident in memory, using free frame {}",
                    pid, page, outcome.frame
                ),
                Disposition::Evicted { victim } => format!(
                    "P{}: page {} not resident in memory, evicted page {} of P{} from frame {}",
                    pid, page, victim.page_number, victim.process, outcome.frame
                ),
            });
            lines.push(format!(
                "P{}: translated VA {:#010x} to PA {:#010x}",
                pid, va, outcome.physical_address
            ));
            lines.push(format!(
                "P{}: {} = {:#010x} (mem at virtual addr {:#010x})",
                pid,
                ins.register,
                synthetic_value(*sequence),
                va
            ));
            *sequence += 1;
        }
        Err(AccessError::FrameExhaustion) => lines.push(format!(
            "P{}: no free frames available, unable to allocate memory",
            pid
        )),
        Err(e @ AccessError::TranslationMiss { .. }) => lines.push(format!("P{}: {}", pid, e)),
    }
    lines
}

/// Replay one process's trace against the shared manager.
///
/// A trace that cannot be opened ends the process without writing to the
/// log. Per-access failures are logged and skipped. Only a failure to write
/// the log itself is returned as an error.
pub async fn run_process(ctx: ProcessContext) -> Result<ProcessStats> {
    let pid = ctx.process_id;
    let mut stats = ProcessStats::for_process(pid);

    let trace = match load_trace(&ctx.trace_path).await {
        Ok(trace) => trace,
        Err(e) => {
            error!(process = pid, error = ?e, "unable to open trace, process not started");
            return Ok(stats);
        }
    };
    stats.trace_loaded = true;

    ctx.log.write_line(&format!("Process {} started", pid))?;
    info!(process = pid, instructions = trace.instructions.len(), "process started");

    let mut sequence = 0u64;
    for ins in &trace.instructions {
        let result = ctx.memory.access(pid, ins.virtual_address);
        if let Err(e) = &result {
            warn!(process = pid, va = ins.virtual_address, error = %e, "access failed");
        }
        stats.record(&result);
        let lines = describe_access(pid, ins, &result, &mut sequence);
        ctx.log.write_block(&lines)?;
        tokio::task::yield_now().await;
    }

    if let Some((line_no, reason)) = &trace.malformed {
        warn!(process = pid, line = line_no, %reason, "malformed trace line, stopping");
        ctx.log.write_line(&format!(
            "P{}: malformed trace line {}: {}",
            pid, line_no, reason
        ))?;
    }

    ctx.log.write_line(&format!("Process {} complete", pid))?;
    info!(process = pid, accesses = stats.accesses, "process complete");
    Ok(stats)
}
