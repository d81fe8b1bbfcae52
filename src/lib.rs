#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::{ops::Not, path::PathBuf, sync::mpsc::Sender, time::Duration};

use chrono::Timelike;
use eframe::egui::{
    self, Button, CentralPanel, Context, Grid, ScrollArea, TopBottomPanel, Window,
};

use crate::{
    alarm_edit::EditingState,
    checker::Checker,
    communication::{Message, MessageType},
    list::AlarmList,
    store::AlarmStore,
};

pub mod alarm;
/// implementation of alarm editing for egui
pub mod alarm_edit;
pub mod checker;
pub mod communication;
pub mod list;
pub mod store;

/// 24 hour clock everywhere
const TIME_FORMAT: &str = "%H:%M";
const SNOOZE_MINUTES: i64 = 5;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Not for Theme {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl From<Theme> for egui::Visuals {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }
}

/// dialog state while an alarm is being created or edited.
/// the selectors keep hour/minute in range, which is how invalid times are
/// rejected at the gui boundary
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmBuilder {
    pub(crate) label: String,
    pub(crate) hour: u8,
    pub(crate) minute: u8,
    pub(crate) hour_string: String,
    pub(crate) minute_string: String,
    pub(crate) repeat: [bool; 7],
    pub(crate) sound: Option<PathBuf>,
}

impl Default for AlarmBuilder {
    fn default() -> Self {
        let time = chrono::Local::now().naive_local().time();
        Self {
            label: String::default(),
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            hour_string: time.hour().to_string(),
            minute_string: time.minute().to_string(),
            repeat: [false; 7],
            sound: None,
        }
    }
}

pub struct Chime {
    alarms: AlarmList,
    store: AlarmStore,
    checker: Checker,
    sender: Sender<Message>,
    theme: Theme,
    adding_alarm: Option<AlarmBuilder>,
    editing_alarm: Option<(u64, AlarmBuilder)>,
    load_warning: Option<String>,
    save_error: Option<String>,
}

impl Chime {
    /// a broken alarm file downgrades to an empty list plus a warning
    /// instead of refusing to start
    #[must_use]
    pub fn new(store: AlarmStore, sender: Sender<Message>) -> Self {
        let (alarms, load_warning) = match store.load() {
            Ok(alarms) => (alarms, None),
            Err(e) => {
                log::warn!("starting with an empty alarm list: {e}");
                (Vec::new(), Some(format!("{e}; starting with an empty alarm list")))
            }
        };
        Self {
            alarms: AlarmList::from_alarms(alarms),
            store,
            checker: Checker::new(),
            sender,
            theme: Theme::default(),
            adding_alarm: None,
            editing_alarm: None,
            load_warning,
            save_error: None,
        }
    }

    // write changes to disk; keep them in memory and tell the user if that fails
    fn save(&mut self) {
        if let Err(e) = self.store.save(self.alarms.alarms()) {
            log::error!("{e}");
            self.save_error = Some(e.to_string());
        }
    }

    fn silence(&self, id: u64) {
        // the audio thread only dies with the process, but don't panic if it did
        let _ = self.sender.send(Message::new(MessageType::Stop, id));
    }

    fn run_checker(&mut self) {
        let fired = self.checker.tick(&mut self.alarms);
        if fired.is_empty() {
            return;
        }
        for id in &fired {
            if let Some(alarm) = self.alarms.get(*id) {
                let _ = self.sender.send(Message::new(
                    MessageType::Ring {
                        sound: alarm.sound.clone(),
                    },
                    *id,
                ));
            }
        }
        // a fired one-shot just disabled itself
        self.save();
    }

    fn render_header(&mut self, ctx: &Context) {
        TopBottomPanel::top("time_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_btn = ui.add(Button::new({
                    if self.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }
                }));
                if theme_btn.clicked() {
                    self.theme = !self.theme;
                }
                ui.centered_and_justified(|ui| {
                    ui.label(format!(
                        "Time: {}",
                        chrono::Local::now().naive_local().format("%H:%M:%S")
                    ));
                });
            });
        });
    }

    fn render_add_dialog(&mut self, ctx: &Context) {
        let Some(adding) = &mut self.adding_alarm else {
            return;
        };
        match adding.render_alarm_editor(ctx) {
            EditingState::Done => {
                let (time, label, repeat, sound) = adding.parts();
                self.adding_alarm = None;
                self.alarms.add(time, label, repeat, sound);
                self.save();
            }
            EditingState::Cancelled => self.adding_alarm = None,
            EditingState::Editing => {}
        }
    }

    fn render_edit_dialog(&mut self, ctx: &Context) {
        let Some((id, editing)) = &mut self.editing_alarm else {
            return;
        };
        let id = *id;
        match editing.render_alarm_editor(ctx) {
            EditingState::Done => {
                let edits = editing.edits();
                self.editing_alarm = None;
                for edit in edits {
                    self.alarms.update(id, edit);
                }
                // it may be ringing under its old schedule
                self.silence(id);
                self.save();
            }
            EditingState::Cancelled => self.editing_alarm = None,
            EditingState::Editing => {}
        }
    }

    fn render_ringing(&mut self, ctx: &Context) {
        let now = chrono::Local::now().naive_local();
        let mut dismissed = Vec::new();
        let mut snoozed = Vec::new();
        for alarm in self.alarms.iter_mut() {
            if !alarm.ringing {
                continue;
            }
            Window::new("Alarm Triggered")
                .id(egui::Id::new(("ringing", alarm.id)))
                .auto_sized()
                .show(ctx, |ui| {
                    ui.label(format!(
                        "{} at {}",
                        alarm.display_label(),
                        alarm.time.format(TIME_FORMAT)
                    ));
                    ui.horizontal(|ui| {
                        if ui.button("stop").clicked() {
                            alarm.ringing = false;
                            dismissed.push(alarm.id);
                        }
                        if ui.button(format!("snooze {SNOOZE_MINUTES} min")).clicked() {
                            alarm.snooze(now, SNOOZE_MINUTES);
                            snoozed.push(alarm.id);
                        }
                    });
                });
        }
        for id in dismissed.iter().chain(snoozed.iter()) {
            self.silence(*id);
        }
        if !snoozed.is_empty() {
            // snoozing re-arms a one-shot
            self.save();
        }
    }

    fn list_alarms(&mut self, ui: &mut egui::Ui) {
        let mut toggled = Vec::new();
        let mut delete = None;
        let mut edit = None;
        for alarm in self.alarms.iter_mut() {
            if ui.button("x").on_hover_text("delete alarm").clicked() {
                delete = Some(alarm.id);
            }
            if alarm.render_row(TIME_FORMAT, ui) {
                toggled.push(alarm.id);
            }
            if ui.button("edit").clicked() {
                edit = Some(alarm.id);
            }
            ui.end_row();
        }
        // a toggle may have turned off a ringing alarm
        for id in &toggled {
            self.silence(*id);
        }
        if let Some(id) = delete {
            self.silence(id);
            self.alarms.remove(id);
        }
        if let Some(id) = edit {
            if let Some(alarm) = self.alarms.get(id) {
                self.editing_alarm = Some((id, AlarmBuilder::from(alarm)));
            }
        }
        if !toggled.is_empty() || delete.is_some() {
            // write changes to disk
            self.save();
        }
    }

    fn render_notices(&mut self, ctx: &Context) {
        if let Some(warning) = self.load_warning.clone() {
            if render_notice(ctx, "couldn't load alarms", &warning) {
                self.load_warning = None;
            }
        }
        if let Some(error) = self.save_error.clone() {
            if render_notice(ctx, "couldn't save alarms", &error) {
                self.save_error = None;
            }
        }
    }
}

// true once the user has seen it
fn render_notice(ctx: &Context, title: &str, text: &str) -> bool {
    let mut dismissed = false;
    Window::new(title).auto_sized().show(ctx, |ui| {
        ui.label(text);
        if ui.button("ok").clicked() {
            dismissed = true;
        }
    });
    dismissed
}

impl eframe::App for Chime {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(self.theme.into());
        // alarms are checked from the gui loop, so one thread owns all the state
        self.run_checker();
        self.render_header(ctx);
        // alarm creation
        self.render_add_dialog(ctx);
        self.render_edit_dialog(ctx);
        self.render_ringing(ctx);
        self.render_notices(ctx);
        // show all alarms
        CentralPanel::default().show(ctx, |ui| {
            if ui.button("+").on_hover_text("add alarm").clicked() {
                self.adding_alarm = Some(AlarmBuilder::default());
            }

            ScrollArea::vertical().show(ui, |ui| {
                Grid::new("alarms").show(ui, |ui| {
                    self.list_alarms(ui);
                });
            });
        });
        // minute resolution checks only need coarse wakeups
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
