use chrono::{Datelike, NaiveDateTime, Timelike};
use log::info;

use crate::list::AlarmList;

/// where the checker gets the current time from, so ticking can be
/// driven by a fake clock in tests
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

/// the system wall clock in local time
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalTime;

impl TimeSource for LocalTime {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// compares the clock against every enabled alarm once per tick.
/// comparisons are at minute resolution, and firing is tracked per alarm,
/// so it doesn't matter how often or how unevenly ticks arrive
#[derive(Debug)]
pub struct Checker<C = LocalTime> {
    clock: C,
}

impl Checker {
    #[must_use]
    pub const fn new() -> Self {
        Self { clock: LocalTime }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: TimeSource> Checker<C> {
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// fires every alarm that is due, returning their ids.
    /// a fired one-shot disables itself; a repeating alarm goes off at
    /// most once per day, matching only the weekdays it is set for
    pub fn tick(&self, alarms: &mut AlarmList) -> Vec<u64> {
        let now = self.clock.now();
        let mut fired = Vec::new();
        for alarm in alarms.iter_mut() {
            if !alarm.enabled {
                continue;
            }
            let due = match alarm.snoozed_until {
                Some(deadline) => now >= deadline,
                None => {
                    alarm.time.hour() == now.hour()
                        && alarm.time.minute() == now.minute()
                        && (!alarm.is_repeating() || alarm.repeats_on(now.weekday()))
                }
            };
            if !due {
                continue;
            }
            // refire guards: state-based, so a clock set backwards across the
            // alarm time still rings exactly once more
            match alarm.last_fired {
                // a repeating alarm already went off today (snoozes are exempt,
                // they land on the same day on purpose)
                Some(last)
                    if alarm.is_repeating()
                        && alarm.snoozed_until.is_none()
                        && last.date() == now.date() =>
                {
                    continue
                }
                // still inside the minute it just fired in
                Some(last) if minute_of(last) == minute_of(now) => continue,
                _ => {}
            }
            alarm.last_fired = Some(now);
            alarm.snoozed_until = None;
            alarm.ringing = true;
            if !alarm.is_repeating() {
                alarm.enabled = false;
            }
            info!("alarm {} ({}) fired", alarm.id, alarm.display_label());
            fired.push(alarm.id);
        }
        fired
    }
}

fn minute_of(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use super::{Checker, TimeSource};
    use crate::list::AlarmList;

    #[derive(Clone)]
    struct TestClock(Rc<Cell<NaiveDateTime>>);

    impl TimeSource for TestClock {
        fn now(&self) -> NaiveDateTime {
            self.0.get()
        }
    }

    // 2024-06-03 is a monday
    fn monday(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn checker_at(start: NaiveDateTime) -> (Checker<TestClock>, Rc<Cell<NaiveDateTime>>) {
        let handle = Rc::new(Cell::new(start));
        (Checker::with_clock(TestClock(Rc::clone(&handle))), handle)
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn one_shot_fires_once_then_disables() {
        let (checker, clock) = checker_at(monday(7, 0, 30));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, None, None).id;

        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);

        clock.set(monday(7, 1, 10));
        assert_eq!(checker.tick(&mut alarms), vec![id]);
        let alarm = alarms.get(id).unwrap();
        assert!(!alarm.enabled);
        assert!(alarm.ringing);

        // later in the same minute
        clock.set(monday(7, 1, 40));
        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);
    }

    #[test]
    fn alarms_sharing_a_minute_all_fire_on_one_tick() {
        let (checker, _clock) = checker_at(monday(7, 1, 0));
        let mut alarms = AlarmList::new();
        let first = alarms.add(time(7, 1), Some("one".to_string()), None, None).id;
        let second = alarms.add(time(7, 1), Some("two".to_string()), None, None).id;

        assert_eq!(checker.tick(&mut alarms), vec![first, second]);
    }

    #[test]
    fn disabled_alarms_never_fire() {
        let (checker, _clock) = checker_at(monday(7, 1, 0));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, None, None).id;
        alarms.toggle(id);

        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);
    }

    #[test]
    fn repeating_alarm_stays_enabled_and_respects_the_day_set() {
        let tuesday_only = Some([false, true, false, false, false, false, false]);
        let (checker, clock) = checker_at(monday(7, 1, 0));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, tuesday_only, None).id;

        // monday: not in the day set
        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);

        clock.set(monday(7, 1, 0) + chrono::Duration::days(1));
        assert_eq!(checker.tick(&mut alarms), vec![id]);
        assert!(alarms.get(id).unwrap().enabled);
    }

    #[test]
    fn repeating_alarm_fires_at_most_once_per_day() {
        let every_day = Some([true; 7]);
        let (checker, clock) = checker_at(monday(7, 1, 5));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, every_day, None).id;

        assert_eq!(checker.tick(&mut alarms), vec![id]);

        // clock set backwards into the scheduled minute again
        clock.set(monday(7, 1, 0));
        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);

        clock.set(monday(7, 1, 5) + chrono::Duration::days(1));
        assert_eq!(checker.tick(&mut alarms), vec![id]);
    }

    #[test]
    fn empty_day_set_never_fires() {
        // only reachable by hand-editing the file
        let (checker, _clock) = checker_at(monday(7, 1, 0));
        let mut alarms = AlarmList::new();
        alarms.add(time(7, 1), None, Some([false; 7]), None);

        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);
    }

    #[test]
    fn snoozed_alarm_fires_again_at_the_deadline() {
        let (checker, clock) = checker_at(monday(7, 1, 10));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, None, None).id;

        assert_eq!(checker.tick(&mut alarms), vec![id]);

        let now = clock.get();
        alarms.get_mut(id).unwrap().snooze(now, 5);
        assert!(alarms.get(id).unwrap().enabled);

        clock.set(monday(7, 5, 0));
        assert_eq!(checker.tick(&mut alarms), vec![] as Vec<u64>);

        clock.set(monday(7, 6, 30));
        assert_eq!(checker.tick(&mut alarms), vec![id]);
        let alarm = alarms.get(id).unwrap();
        assert!(!alarm.enabled);
        assert_eq!(alarm.snoozed_until, None);
    }

    #[test]
    fn snoozing_a_repeating_alarm_refires_the_same_day() {
        let every_day = Some([true; 7]);
        let (checker, clock) = checker_at(monday(7, 1, 10));
        let mut alarms = AlarmList::new();
        let id = alarms.add(time(7, 1), None, every_day, None).id;

        assert_eq!(checker.tick(&mut alarms), vec![id]);

        let now = clock.get();
        alarms.get_mut(id).unwrap().snooze(now, 5);

        clock.set(monday(7, 6, 30));
        assert_eq!(checker.tick(&mut alarms), vec![id]);
        assert!(alarms.get(id).unwrap().enabled);
    }
}
