//! Alarm clip loading.

use std::path::Path;

use alarm_core::ClipBank;
use anyhow::{Context, Result};
use tracing::info;

/// File names looked up in the clip directory, for levels 1 to 3.
pub const CLIP_FILES: [&str; 3] = ["level1.u8", "level2.u8", "level3.u8"];

/// Load raw unsigned 8-bit PCM clips from `dir`, or synthesize tones for
/// `sample_rate_hz` when no directory is configured.
pub fn load_clip_bank(dir: Option<&Path>, sample_rate_hz: u32) -> Result<ClipBank> {
    let Some(dir) = dir else {
        info!("Using synthesized alarm clips at {} Hz", sample_rate_hz);
        return Ok(ClipBank::synthesized(sample_rate_hz));
    };

    let mut clips: [Vec<u8>; 3] = Default::default();
    for (slot, name) in clips.iter_mut().zip(CLIP_FILES) {
        let path = dir.join(name);
        *slot = std::fs::read(&path).with_context(|| format!("reading clip {}", path.display()))?;
    }

    let bank = ClipBank::new(clips).with_context(|| format!("loading clips from {}", dir.display()))?;
    info!("Loaded alarm clips from {}", dir.display());
    Ok(bank)
}
