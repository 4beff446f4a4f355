//! Paired EBU R128 meters for the main and side signals
//!
//! Both signals are fed block by block. Once per update interval the monitor
//! reads momentary, short-term and integrated loudness from each meter and
//! reports them together with the main signal's sample peak over the interval.

use ebur128::{EbuR128, Mode};
use lmatch_core::{Measurement, SILENCE_FLOOR_DBFS, SILENCE_FLOOR_LUFS};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{MonitorError, Result};

/// Monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Sample rate in Hz (8000-384000)
    pub sample_rate: u32,
    /// Channels per signal (1-8)
    pub channels: u32,
    /// Time between measurements in seconds
    pub update_interval_secs: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            update_interval_secs: 0.1,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000..=384000).contains(&self.sample_rate) {
            return Err(MonitorError::InvalidSampleRate(self.sample_rate));
        }
        if !(1..=8).contains(&self.channels) {
            return Err(MonitorError::InvalidChannelCount(self.channels));
        }
        if !self.update_interval_secs.is_finite() || self.update_interval_secs <= 0.0 {
            return Err(MonitorError::InvalidInterval(self.update_interval_secs));
        }
        Ok(())
    }

    /// Update interval in frames (at least one)
    pub fn interval_frames(&self) -> usize {
        ((self.update_interval_secs * self.sample_rate as f64).round() as usize).max(1)
    }
}

/// Measures main and side loudness side by side
///
/// # Example
///
/// ```
/// use lmatch_core::GainTracker;
/// use lmatch_monitor::{LoudnessMonitor, MonitorConfig};
///
/// let mut monitor = LoudnessMonitor::new(MonitorConfig::default())?;
/// let tracker = GainTracker::<f64>::new();
///
/// let main = vec![0.0_f32; 9600];
/// let side = vec![0.0_f32; 9600];
/// if let Some(measurement) = monitor.process(&main, &side)? {
///     tracker.set_position(4800);
///     tracker.learn(&measurement);
/// }
/// # Ok::<(), lmatch_monitor::MonitorError>(())
/// ```
pub struct LoudnessMonitor {
    config: MonitorConfig,
    main: EbuR128,
    side: EbuR128,
    /// Frames left until the next measurement
    frames_until_update: usize,
    /// Largest main sample magnitude since the last measurement
    window_peak: f32,
}

fn new_meter(config: &MonitorConfig) -> Result<EbuR128> {
    // Mode::S implies Mode::M
    let mode = Mode::M | Mode::S | Mode::I;
    Ok(EbuR128::new(config.channels, config.sample_rate, mode)?)
}

/// Replace non-finite or too quiet levels with `floor`
fn floor_db(value: f64, floor: f64) -> f64 {
    if value.is_finite() {
        value.max(floor)
    } else {
        floor
    }
}

impl LoudnessMonitor {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            main: new_meter(&config)?,
            side: new_meter(&config)?,
            frames_until_update: config.interval_frames(),
            window_peak: 0.0,
            config,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Feed one block of interleaved samples for each signal
    ///
    /// Returns a measurement when this block completes an update interval.
    /// Blocks longer than the interval still yield a single measurement.
    pub fn process(&mut self, main: &[f32], side: &[f32]) -> Result<Option<Measurement<f64>>> {
        if main.len() != side.len() {
            return Err(MonitorError::LengthMismatch {
                main: main.len(),
                side: side.len(),
            });
        }
        if main.len() % self.config.channels as usize != 0 {
            return Err(MonitorError::PartialFrame {
                len: main.len(),
                channels: self.config.channels,
            });
        }
        if main.is_empty() {
            return Ok(None);
        }

        self.main.add_frames_f32(main)?;
        self.side.add_frames_f32(side)?;
        self.window_peak = main
            .iter()
            .fold(self.window_peak, |peak, sample| peak.max(sample.abs()));

        let frames = main.len() / self.config.channels as usize;
        if frames < self.frames_until_update {
            self.frames_until_update -= frames;
            return Ok(None);
        }

        let measurement = self.measure()?;
        self.frames_until_update = self.config.interval_frames();
        self.window_peak = 0.0;
        trace!(?measurement, "Loudness window complete");
        Ok(Some(measurement))
    }

    /// Current readings without closing the update interval
    pub fn measure(&self) -> Result<Measurement<f64>> {
        Ok(Measurement {
            main: Self::read(&self.main)?,
            target: Self::read(&self.side)?,
            peak: self.peak_dbfs(),
        })
    }

    /// Main sample peak since the last measurement (dBFS)
    pub fn peak_dbfs(&self) -> f64 {
        floor_db(
            20.0 * f64::from(self.window_peak).log10(),
            SILENCE_FLOOR_DBFS,
        )
    }

    /// Reset both meters for reuse
    pub fn reset(&mut self) -> Result<()> {
        // ebur128 has no reset, rebuild the meters instead
        self.main = new_meter(&self.config)?;
        self.side = new_meter(&self.config)?;
        self.frames_until_update = self.config.interval_frames();
        self.window_peak = 0.0;
        debug!("Loudness monitor reset");
        Ok(())
    }

    fn read(meter: &EbuR128) -> Result<[f64; 3]> {
        Ok([
            floor_db(meter.loudness_momentary()?, SILENCE_FLOOR_LUFS),
            floor_db(meter.loudness_shortterm()?, SILENCE_FLOOR_LUFS),
            floor_db(meter.loudness_global()?, SILENCE_FLOOR_LUFS),
        ])
    }
}
