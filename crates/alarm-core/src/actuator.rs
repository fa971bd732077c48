//! Output seam for the indicator light and the audio transducer.

/// Unsigned 8-bit PCM midpoint; emitting it keeps the transducer quiet.
pub const SILENCE: u8 = 128;

/// Output-only side effects driven by the engine.
///
/// Implementations must return quickly: `emit_sample` runs once per audio
/// tick while the engine lock is held.
pub trait ActuatorPort: Send {
    fn set_indicator(&mut self, on: bool);
    fn emit_sample(&mut self, sample: u8);
}

impl<P: ActuatorPort + ?Sized> ActuatorPort for Box<P> {
    fn set_indicator(&mut self, on: bool) {
        (**self).set_indicator(on)
    }

    fn emit_sample(&mut self, sample: u8) {
        (**self).emit_sample(sample)
    }
}

/// Map an 8-bit sample onto an output range of `0..=max`, e.g. a 10-bit PWM
/// duty cycle with `max = 1023`.
pub fn scale_sample(sample: u8, max: u16) -> u16 {
    ((u32::from(sample) * u32::from(max) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_sample_covers_full_range() {
        assert_eq!(scale_sample(0, 1023), 0);
        assert_eq!(scale_sample(255, 1023), 1023);
        assert_eq!(scale_sample(SILENCE, 1023), 514);
        assert_eq!(scale_sample(200, 255), 200);
    }
}
