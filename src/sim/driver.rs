use crate::memory::shared::SharedMemoryManager;
use crate::sim::log_sink::LogSink;
use crate::sim::process::{ProcessContext, run_process};
use crate::sim::report::{ProcessStats, SimulationReport};
use crate::sim::workload::SimConfig;
use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::{error, info};

/// Run every process of `config` concurrently against one shared memory
/// manager, writing the access log to `log_path`.
///
/// Returns once all processes have finished. A process that panics or fails
/// to write the log does not stop the others; the first such failure is
/// returned after everyone has been joined.
pub async fn run_simulation<P: AsRef<Path>>(
    config: &SimConfig,
    log_path: P,
) -> Result<SimulationReport> {
    let manager = config.build_manager()?;
    let memory = SharedMemoryManager::new(manager);
    let log = LogSink::create(log_path)?;

    info!(
        memory_size = config.memory_size,
        page_size = config.page_size,
        frames = config.num_frames(),
        processes = config.num_processes,
        eviction = %config.eviction,
        seed = config.seed,
        "starting simulation"
    );

    let mut handles = Vec::with_capacity(config.num_processes);
    for (process_id, trace_path) in config.trace_paths.iter().enumerate() {
        let ctx = ProcessContext {
            process_id,
            trace_path: trace_path.clone(),
            log: log.clone(),
            memory: memory.clone(),
        };
        handles.push(tokio::task::spawn(run_process(ctx)));
    }

    let mut stats = Vec::with_capacity(handles.len());
    let mut first_failure = None;
    for (process_id, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok(Ok(s)) => stats.push(s),
            Ok(Err(e)) => {
                error!(process = process_id, error = ?e, "process failed");
                stats.push(ProcessStats::for_process(process_id));
                if first_failure.is_none() {
                    first_failure = Some(e.context(format!("process {}", process_id)));
                }
            }
            Err(join_err) => {
                error!(process = process_id, error = %join_err, "process task did not complete");
                stats.push(ProcessStats::for_process(process_id));
                if first_failure.is_none() {
                    first_failure = Some(anyhow!(
                        "process {} task did not complete: {}",
                        process_id,
                        join_err
                    ));
                }
            }
        }
    }

    log.flush()?;
    if let Some(e) = first_failure {
        return Err(e);
    }

    memory
        .check_invariants()
        .context("memory manager inconsistent after simulation")?;
    let report = SimulationReport::new(
        config.clone(),
        memory.num_frames(),
        stats,
        memory.resident_set(),
    );
    info!(
        accesses = report.totals.accesses,
        hits = report.totals.hits,
        evictions = report.totals.evictions,
        resident = report.resident.len(),
        "simulation complete"
    );
    Ok(report)
}
