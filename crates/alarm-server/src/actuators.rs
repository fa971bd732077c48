//! Host-side actuator ports.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use alarm_core::{ActuatorPort, SILENCE};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Logs indicator changes and counts emitted samples.
#[derive(Debug, Default)]
pub struct LogActuator {
    indicator: Option<bool>,
    samples: u64,
}

impl LogActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator(&self) -> Option<bool> {
        self.indicator
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl ActuatorPort for LogActuator {
    fn set_indicator(&mut self, on: bool) {
        if self.indicator != Some(on) {
            info!("Indicator {}", if on { "ON" } else { "OFF" });
        }
        self.indicator = Some(on);
    }

    fn emit_sample(&mut self, _sample: u8) {
        self.samples += 1;
    }
}

/// Streams samples as raw unsigned 8-bit PCM to a file or FIFO.
///
/// Play a FIFO with e.g. `aplay -f U8 -r 1000 <fifo>`; the rate must match the
/// configured tick. Samples are buffered and flushed whenever silence is
/// written, which closes every clip and every stop. A write failure disables
/// the sink instead of stalling the audio loop.
pub struct PcmSink {
    writer: Option<BufWriter<File>>,
    indicator: LogActuator,
}

impl PcmSink {
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening PCM sink {}", path.display()))?;
        info!("Writing alarm audio to {}", path.display());
        Ok(Self {
            writer: Some(BufWriter::with_capacity(256, file)),
            indicator: LogActuator::new(),
        })
    }
}

impl PcmSink {
    fn flush(&mut self) {
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = writer.flush() {
            warn!("PCM sink flush failed, disabling audio output: {}", err);
            self.writer = None;
        }
    }
}

impl ActuatorPort for PcmSink {
    fn set_indicator(&mut self, on: bool) {
        self.indicator.set_indicator(on);
        self.flush();
    }

    fn emit_sample(&mut self, sample: u8) {
        self.indicator.emit_sample(sample);
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        if let Err(err) = writer.write_all(&[sample]) {
            warn!("PCM sink write failed, disabling audio output: {}", err);
            self.writer = None;
            return;
        }
        if sample == SILENCE {
            self.flush();
        }
    }
}

impl Drop for PcmSink {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.as_mut() {
            let _ = writer.flush();
        }
    }
}
