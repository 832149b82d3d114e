#[cfg(feature = "cli")]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage and sampling throughput at the end of an experiment phase.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub samples_drawn: u64,
    pub elapsed: Duration,
}

#[cfg(feature = "cli")]
impl PhaseStats {
    /// Points sampled per second since the run started.
    pub fn samples_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.samples_drawn as f64 / secs
        } else {
            0.0
        }
    }
}

/// Tracks the current process and the number of points sampled so far.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    started: Instant,
    peak_memory_mb: AtomicU64,
    samples_drawn: AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid().ok()
        } else {
            None
        };
        if enabled && pid.is_none() {
            tracing::warn!("Could not determine current PID, process stats disabled");
        }

        let mut system = System::new();
        if let Some(pid) = pid {
            system.refresh_memory();
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::everything(),
            );
        }

        Self {
            system: Mutex::new(system),
            pid,
            started: Instant::now(),
            peak_memory_mb: AtomicU64::new(0),
            samples_drawn: AtomicU64::new(0),
            enabled,
        }
    }

    /// Add `count` points to the running sample total.
    pub fn record_samples(&self, count: u64) {
        let _ = self
            .samples_drawn
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(count))
            });
    }

    pub fn samples_drawn(&self) -> u64 {
        self.samples_drawn.load(Ordering::Relaxed)
    }

    pub fn phase_stats(&self) -> Option<PhaseStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        let peak_memory_mb = self
            .peak_memory_mb
            .fetch_max(memory_mb, Ordering::Relaxed)
            .max(memory_mb);

        Some(PhaseStats {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb,
            samples_drawn: self.samples_drawn(),
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str) {
        if let Some(stats) = self.phase_stats() {
            tracing::info!(
                "📊 {} - samples: {} ({:.0}/s), CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.samples_drawn,
                stats.samples_per_second(),
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }

    pub fn log_summary(&self) {
        if let Some(stats) = self.phase_stats() {
            tracing::info!(
                "📊 Run finished - {} points sampled in {:?}, peak memory {}MB",
                stats.samples_drawn,
                stats.elapsed,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// Without the cli feature there is no sysinfo; monitoring is a no-op.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record_samples(&self, _count: u64) {}

    pub fn samples_drawn(&self) -> u64 {
        0
    }

    pub fn log_phase(&self, _phase: &str) {}

    pub fn log_summary(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
