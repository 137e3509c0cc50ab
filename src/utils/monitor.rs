#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub phase_time: Duration,
    pub total_time: Duration,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    pid: Pid,
    last_mark: Instant,
    peak_memory_mb: u64,
}

/// Per-phase timing and resident memory of the pricing run.
#[cfg(feature = "cli")]
pub struct RunMonitor {
    state: Option<Mutex<MonitorState>>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let started = Instant::now();
        let state = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => Some(Mutex::new(MonitorState {
                    system: System::new(),
                    pid,
                    last_mark: started,
                    peak_memory_mb: 0,
                })),
                Err(e) => {
                    tracing::warn!("⚠️ Monitoring disabled, cannot resolve own pid: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self { state, started }
    }

    /// Closes the current phase and returns its stats.
    pub fn mark(&self, phase: &str) -> Option<PhaseStats> {
        let mut state = self.state.as_ref()?.lock().ok()?;
        let pid = state.pid;
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );

        let memory_mb = state
            .system
            .process(pid)
            .map(|p| p.memory() / 1024 / 1024)
            .unwrap_or(0);
        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);

        let now = Instant::now();
        let phase_time = now.duration_since(state.last_mark);
        state.last_mark = now;

        Some(PhaseStats {
            phase: phase.to_string(),
            phase_time,
            total_time: now.duration_since(self.started),
            memory_mb,
            peak_memory_mb: state.peak_memory_mb,
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.mark(phase) {
            tracing::info!(
                "📊 {} - Phase: {:?}, Memory: {}MB, Peak: {}MB",
                stats.phase,
                stats.phase_time,
                stats.memory_mb,
                stats.peak_memory_mb
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.mark("final") {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.total_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct RunMonitor;

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_reports_nothing() {
        let monitor = RunMonitor::new(false);
        assert!(!monitor.is_enabled());
        assert!(monitor.mark("extract").is_none());
    }

    #[test]
    fn test_enabled_monitor_tracks_phases() {
        let monitor = RunMonitor::new(true);
        assert!(monitor.is_enabled());
        let first = monitor.mark("extract").unwrap();
        let second = monitor.mark("transform").unwrap();
        assert_eq!(second.phase, "transform");
        assert!(second.total_time >= first.total_time);
        assert!(second.peak_memory_mb >= first.memory_mb);
    }
}
