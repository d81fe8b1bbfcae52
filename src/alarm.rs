use std::path::PathBuf;

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use eframe::egui::{self, RichText};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// one letter per weekday, monday first, used for the repeat row and the checkboxes
pub const DAY_LABELS: [&str; 7] = ["M", "T", "W", "Th", "F", "Sa", "Su"];

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

/// represents an alarm
/// contains the time that the alarm should go off at,
/// an optional label, repeat days and sound file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Alarm {
    pub id: u64,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default = "always_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// monday..sunday, absent for a one-shot alarm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<[bool; 7]>,
    /// there is a built in beep when no sound file is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<PathBuf>,
    /// minute the alarm last went off, so it doesn't go off twice in one minute
    #[serde(skip)]
    pub last_fired: Option<NaiveDateTime>,
    #[serde(skip)]
    pub snoozed_until: Option<NaiveDateTime>,
    #[serde(skip)]
    pub ringing: bool,
}

impl Alarm {
    #[must_use]
    pub const fn new(
        id: u64,
        time: NaiveTime,
        label: Option<String>,
        repeat: Option<[bool; 7]>,
        sound: Option<PathBuf>,
    ) -> Self {
        Self {
            id,
            time,
            enabled: true,
            label,
            repeat,
            sound,
            last_fired: None,
            snoozed_until: None,
            ringing: false,
        }
    }

    #[must_use]
    pub const fn is_repeating(&self) -> bool {
        self.repeat.is_some()
    }

    #[must_use]
    pub fn repeats_on(&self, weekday: Weekday) -> bool {
        self.repeat
            .is_some_and(|days| days[weekday.num_days_from_monday() as usize])
    }

    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("alarm")
    }

    /// day row like "M T W Th F - -", or "once" for a one-shot
    #[must_use]
    pub fn repeat_summary(&self) -> String {
        match self.repeat {
            None => "once".to_string(),
            Some(days) => days
                .iter()
                .zip(DAY_LABELS)
                .map(|(on, label)| if *on { label } else { "-" })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// reschedules the alarm a few minutes from now without touching its set time.
    /// re-enables it too, since a one-shot disables itself when it goes off
    pub fn snooze(&mut self, now: NaiveDateTime, minutes: i64) {
        self.snoozed_until = Some(now + chrono::Duration::minutes(minutes));
        self.enabled = true;
        self.ringing = false;
    }

    // returns true if the enabled checkbox was clicked
    pub(crate) fn render_row(&mut self, time_format: &str, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        if ui
            .checkbox(&mut self.enabled, "")
            .on_hover_text("enabled")
            .clicked()
        {
            changed = true;
            self.ringing = false;
            self.snoozed_until = None;
            if self.enabled {
                // re-arming clears the refire guard
                self.last_fired = None;
            }
        }
        // gray out a disabled alarm
        let text = |s: String| {
            if self.enabled {
                RichText::new(s)
            } else {
                RichText::new(s).weak()
            }
        };
        ui.label(text(self.display_label().to_string()));
        ui.label(text(self.time.format(time_format).to_string()));
        ui.label(text(self.repeat_summary()));
        changed
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid alarm time {input:?}: expected HH:MM with hour 0-23 and minute 0-59")]
pub struct ValidationError {
    pub input: String,
}

/// parses user entered "HH:MM" text, rejecting out of range times like "24:00"
pub fn parse_time(input: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(input.trim(), hhmm::FORMAT).map_err(|_| ValidationError {
        input: input.to_string(),
    })
}

/// serde adapter storing a [`NaiveTime`] as "HH:MM"
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_time, Alarm};
    use chrono::NaiveTime;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn boundary_times_validate() {
        assert_eq!(parse_time("00:00"), Ok(time(0, 0)));
        assert_eq!(parse_time("23:59"), Ok(time(23, 59)));
    }

    #[test]
    fn out_of_range_times_fail() {
        for input in ["24:00", "12:60", "7", "", "late", "07:30:00"] {
            assert!(parse_time(input).is_err(), "{input:?} should not validate");
        }
    }

    #[test]
    fn time_is_stored_as_hhmm() {
        let alarm = Alarm::new(1, time(6, 5), None, None, None);
        let json = serde_json::to_value(&alarm).unwrap();
        assert_eq!(json["time"], "06:05");
    }

    #[test]
    fn minimal_record_gets_defaults() {
        let alarm: Alarm = serde_json::from_str(r#"{"id": 3, "time": "07:30"}"#).unwrap();
        assert!(alarm.enabled);
        assert_eq!(alarm.label, None);
        assert_eq!(alarm.repeat, None);
        assert_eq!(alarm.sound, None);
        assert_eq!(alarm.time, time(7, 30));
    }

    #[test]
    fn repeat_summary_formats() {
        let mut alarm = Alarm::new(1, time(7, 0), None, None, None);
        assert_eq!(alarm.repeat_summary(), "once");
        alarm.repeat = Some([true, true, true, true, true, false, false]);
        assert_eq!(alarm.repeat_summary(), "M T W Th F - -");
    }

    #[test]
    fn snooze_rearms_a_disabled_alarm() {
        let mut alarm = Alarm::new(1, time(7, 0), None, None, None);
        alarm.enabled = false;
        alarm.ringing = true;
        let now = chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(7, 0, 30)
            .unwrap();
        alarm.snooze(now, 5);
        assert!(alarm.enabled);
        assert!(!alarm.ringing);
        assert_eq!(
            alarm.snoozed_until,
            Some(now + chrono::Duration::minutes(5))
        );
    }
}
