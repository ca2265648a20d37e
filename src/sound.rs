/// Cue played by the host when sound is enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SoundEvent {
    Start,
    Pause,
    Resume,
    Complete,
    Record,
    Restart,
    Error,
}

/// A short sine beep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration_secs: f32,
}

impl SoundEvent {
    pub fn tone(&self) -> Tone {
        let (frequency_hz, duration_secs) = match self {
            SoundEvent::Start => (523.25, 0.2),    // C5
            SoundEvent::Pause => (392.0, 0.15),    // G4
            SoundEvent::Resume => (493.88, 0.15),  // B4
            SoundEvent::Complete => (659.25, 0.3), // E5
            SoundEvent::Record => (783.99, 0.4),   // G5
            SoundEvent::Restart => (349.23, 0.15), // F4
            SoundEvent::Error => (220.0, 0.1),     // A3
        };
        Tone {
            frequency_hz,
            duration_secs,
        }
    }

    /// Cues a terminal can only signal with the bell
    pub fn rings_bell(&self) -> bool {
        matches!(
            self,
            SoundEvent::Complete | SoundEvent::Record | SoundEvent::Error
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_the_highest_and_longest_tone() {
        let record = SoundEvent::Record.tone();
        for ev in [
            SoundEvent::Start,
            SoundEvent::Pause,
            SoundEvent::Resume,
            SoundEvent::Complete,
            SoundEvent::Restart,
            SoundEvent::Error,
        ] {
            assert!(ev.tone().frequency_hz < record.frequency_hz, "{ev}");
            assert!(ev.tone().duration_secs < record.duration_secs, "{ev}");
        }
    }

    #[test]
    fn names_are_lowercase() {
        assert_eq!(SoundEvent::Complete.to_string(), "complete");
        assert_eq!(SoundEvent::Error.to_string(), "error");
    }
}
