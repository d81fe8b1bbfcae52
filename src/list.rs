use std::path::PathBuf;

use chrono::NaiveTime;

use crate::alarm::Alarm;

/// a single field rewrite applied through [`AlarmList::update`]
#[derive(Debug, Clone)]
pub enum AlarmEdit {
    Time(NaiveTime),
    Label(Option<String>),
    Repeat(Option<[bool; 7]>),
    Sound(Option<PathBuf>),
    Enable(bool),
}

/// the in-memory alarm collection, in the order alarms were created.
/// owns id assignment so ids stay unique across the life of the file
#[derive(Debug, Default)]
pub struct AlarmList {
    alarms: Vec<Alarm>,
    next_id: u64,
}

impl AlarmList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
        }
    }

    /// seeds the id counter past anything already on disk
    #[must_use]
    pub fn from_alarms(alarms: Vec<Alarm>) -> Self {
        let next_id = alarms.iter().map(|alarm| alarm.id).max().unwrap_or(0) + 1;
        Self { alarms, next_id }
    }

    pub fn add(
        &mut self,
        time: NaiveTime,
        label: Option<String>,
        repeat: Option<[bool; 7]>,
        sound: Option<PathBuf>,
    ) -> &Alarm {
        let id = self.next_id;
        self.next_id += 1;
        self.alarms.push(Alarm::new(id, time, label, repeat, sound));
        // just pushed
        &self.alarms[self.alarms.len() - 1]
    }

    /// no-op when the id is unknown
    pub fn remove(&mut self, id: u64) {
        self.alarms.retain(|alarm| alarm.id != id);
    }

    /// flips `enabled`, returning the new state, or `None` for an unknown id
    pub fn toggle(&mut self, id: u64) -> Option<bool> {
        let target = !self.get(id)?.enabled;
        self.update(id, AlarmEdit::Enable(target));
        Some(target)
    }

    /// rewrites one field, returning false for an unknown id.
    /// editing the time or re-enabling clears the firing state so the
    /// alarm can go off under its new schedule
    pub fn update(&mut self, id: u64, edit: AlarmEdit) -> bool {
        let Some(alarm) = self.get_mut(id) else {
            return false;
        };
        match edit {
            AlarmEdit::Time(time) => {
                alarm.time = time;
                alarm.last_fired = None;
                alarm.snoozed_until = None;
            }
            AlarmEdit::Label(label) => alarm.label = label,
            AlarmEdit::Repeat(repeat) => alarm.repeat = repeat,
            AlarmEdit::Sound(sound) => alarm.sound = sound,
            AlarmEdit::Enable(enabled) => {
                alarm.enabled = enabled;
                alarm.ringing = false;
                alarm.snoozed_until = None;
                if enabled {
                    alarm.last_fired = None;
                }
            }
        }
        true
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Alarm> {
        self.alarms.iter_mut().find(|alarm| alarm.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Alarm> {
        self.alarms.iter_mut()
    }

    /// the whole collection, for persisting
    #[must_use]
    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{AlarmEdit, AlarmList};
    use crate::alarm::Alarm;
    use chrono::NaiveTime;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn add_assigns_unique_increasing_ids() {
        let mut list = AlarmList::new();
        let first = list.add(time(6, 0), None, None, None).id;
        let second = list.add(time(7, 0), None, None, None).id;
        let third = list.add(time(8, 0), None, None, None).id;
        assert_eq!((first, second, third), (1, 2, 3));
        let order: Vec<u64> = list.iter().map(|alarm| alarm.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn ids_stay_unique_after_reload() {
        let loaded = vec![
            Alarm::new(2, time(6, 0), None, None, None),
            Alarm::new(7, time(7, 0), None, None, None),
        ];
        let mut list = AlarmList::from_alarms(loaded);
        assert_eq!(list.add(time(8, 0), None, None, None).id, 8);
    }

    #[test]
    fn toggle_twice_restores_enabled() {
        let mut list = AlarmList::new();
        let id = list.add(time(6, 0), None, None, None).id;
        assert_eq!(list.toggle(id), Some(false));
        assert_eq!(list.toggle(id), Some(true));
        assert!(list.get(id).unwrap().enabled);
    }

    #[test]
    fn toggle_unknown_id_is_none() {
        let mut list = AlarmList::new();
        assert_eq!(list.toggle(42), None);
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut list = AlarmList::new();
        list.add(time(6, 0), None, None, None);
        list.remove(42);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn remove_deletes_the_entry() {
        let mut list = AlarmList::new();
        let first = list.add(time(6, 0), None, None, None).id;
        let second = list.add(time(7, 0), None, None, None).id;
        list.remove(first);
        assert_eq!(list.len(), 1);
        assert!(list.get(second).is_some());
        assert!(list.get(first).is_none());
    }

    #[test]
    fn updating_the_time_clears_the_refire_guard() {
        let mut list = AlarmList::new();
        let id = list.add(time(6, 0), None, None, None).id;
        list.get_mut(id).unwrap().last_fired = Some(
            chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
        );
        assert!(list.update(id, AlarmEdit::Time(time(6, 30))));
        let alarm = list.get(id).unwrap();
        assert_eq!(alarm.time, time(6, 30));
        assert_eq!(alarm.last_fired, None);
    }

    #[test]
    fn update_unknown_id_returns_false() {
        let mut list = AlarmList::new();
        assert!(!list.update(42, AlarmEdit::Enable(false)));
    }
}
