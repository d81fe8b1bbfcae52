use std::path::PathBuf;

/// what the gui tells the audio thread
pub struct Message {
    pub kind: MessageType,
    pub alarm_id: u64,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_id: u64) -> Self {
        Self { kind, alarm_id }
    }
}

#[derive(Debug, Clone)]
pub enum MessageType {
    /// start playing, looping until stopped. `None` means the built in beep
    Ring { sound: Option<PathBuf> },
    // sent when the alarm is dismissed/snoozed/disabled/removed
    Stop,
}
