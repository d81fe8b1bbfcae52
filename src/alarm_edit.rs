use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};
use eframe::egui::{self, TextEdit, Widget, Window};

use crate::{
    alarm::{Alarm, DAY_LABELS},
    list::AlarmEdit,
    AlarmBuilder,
};

impl From<&Alarm> for AlarmBuilder {
    fn from(alarm: &Alarm) -> Self {
        Self {
            label: alarm.label.clone().unwrap_or_default(),
            hour: alarm.time.hour() as u8,
            minute: alarm.time.minute() as u8,
            hour_string: alarm.time.hour().to_string(),
            minute_string: alarm.time.minute().to_string(),
            repeat: alarm.repeat.unwrap_or([false; 7]),
            sound: alarm.sound.clone(),
        }
    }
}

impl AlarmBuilder {
    fn time(&self) -> NaiveTime {
        // the selectors clamp to 0-23/0-59 so this can't be out of range
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or_default()
    }

    /// the validated pieces an alarm is created from
    pub(crate) fn parts(&self) -> (NaiveTime, Option<String>, Option<[bool; 7]>, Option<PathBuf>) {
        let label = if self.label.is_empty() {
            None
        } else {
            Some(self.label.clone())
        };
        // no day checked means a one-shot
        let repeat = if self.repeat.iter().any(|day| *day) {
            Some(self.repeat)
        } else {
            None
        };
        (self.time(), label, repeat, self.sound.clone())
    }

    /// the same pieces as field rewrites, for editing an existing alarm in place
    pub(crate) fn edits(&self) -> Vec<AlarmEdit> {
        let (time, label, repeat, sound) = self.parts();
        vec![
            AlarmEdit::Time(time),
            AlarmEdit::Label(label),
            AlarmEdit::Repeat(repeat),
            AlarmEdit::Sound(sound),
        ]
    }

    pub(crate) fn edit_alarm(&mut self, ui: &mut egui::Ui) {
        ui.text_edit_singleline(&mut self.label);
        ui.horizontal(|ui| {
            self.render_time_editor(ui);
            self.render_sound_picker(ui);
        });
        self.render_repeat_selector(ui);
    }

    pub(crate) fn render_time_editor(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // hour selector
            self.render_hour_selector(ui);
            // minute selector
            self.render_minute_selector(ui);
        });
    }

    pub(crate) fn render_minute_selector(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label("Minute");
            if ui.button("Up").clicked() && self.minute < 59 {
                self.minute += 1;
                self.minute_string = self.minute.to_string();
            }
            if TextEdit::singleline(&mut self.minute_string)
                .desired_width(20.0)
                .char_limit(2)
                .ui(ui)
                .lost_focus()
            {
                // if the input value is valid, update the value
                if let Ok(parsed_value) = self.minute_string.parse::<u8>() {
                    self.minute = parsed_value.clamp(0, 59);
                }
                // sync the input value and the value regardless
                self.minute_string = self.minute.to_string();
            }

            if ui.button("Down").clicked() && self.minute > 0 {
                self.minute -= 1;
                self.minute_string = self.minute.to_string();
            }
        });
    }

    pub(crate) fn render_hour_selector(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label("Hour");
            if ui.button("Up").clicked() && self.hour < 23 {
                self.hour += 1;
                self.hour_string = self.hour.to_string();
            }
            if TextEdit::singleline(&mut self.hour_string)
                .desired_width(20.0)
                .char_limit(2)
                .ui(ui)
                .lost_focus()
            {
                // if the input value is valid, update the value
                if let Ok(parsed_value) = self.hour_string.parse::<u8>() {
                    self.hour = parsed_value.clamp(0, 23);
                }
                // sync the input value and the value regardless
                self.hour_string = self.hour.to_string();
            }

            if ui.button("Down").clicked() && self.hour > 0 {
                self.hour -= 1;
                self.hour_string = self.hour.to_string();
            }
        });
    }

    pub(crate) fn render_repeat_selector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for (day, label) in self.repeat.iter_mut().zip(DAY_LABELS) {
                ui.checkbox(day, label);
            }
        });
    }

    pub(crate) fn render_sound_picker(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label(format!("sound: {}", self.sound_name()));
            ui.horizontal(|ui| {
                if ui.button("pick sound").clicked() {
                    // TODO: rfd with gnome opens Recents not audio folder https://github.com/PolyMeilex/rfd/issues/237
                    let file_dialog = rfd::FileDialog::new()
                        .set_title("Pick alarm sound")
                        .add_filter("audio", &["wav", "mp3", "ogg", "flac", "aac", "m4a"]);
                    let file_dialog = match directories::UserDirs::new()
                        .and_then(|u| u.audio_dir().map(Path::to_path_buf))
                    {
                        Some(audio_path) => file_dialog.set_directory(audio_path),
                        None => file_dialog,
                    };
                    if let Some(path) = file_dialog.pick_file() {
                        self.sound = Some(path);
                    }
                }
                if ui
                    .button("beep")
                    .on_hover_text("use the built in beep")
                    .clicked()
                {
                    self.sound = None;
                }
            });
        });
    }

    fn sound_name(&self) -> String {
        self.sound
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(
                || "built in beep".to_string(),
                |name| name.to_string_lossy().into_owned(),
            )
    }

    pub fn render_alarm_editor(&mut self, ctx: &egui::Context) -> EditingState {
        let mut ret = EditingState::Editing;
        // if no label is set we still need a way to differentiate between different alarms
        Window::new(format!("editing alarm {}", self.label)).show(ctx, |ui| {
            self.edit_alarm(ui);
            ui.horizontal(|ui| {
                if ui.button("done").clicked() {
                    ret = EditingState::Done;
                } else if ui.button("cancel").clicked() {
                    ret = EditingState::Cancelled;
                } else {
                    ret = EditingState::Editing;
                }
            });
        });
        ret
    }
}

pub enum EditingState {
    Cancelled,
    Editing,
    Done,
}
