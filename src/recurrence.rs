//! Recurrence rules and the per-kind reset predicates.
//!
//! A [`Recurrence`] is a closed set of kinds. On the wire it is the loose record
//! `{ kind, time?, dayOfWeek?, dayOfMonth? }`; decoding never fails; anything that
//! doesn't describe a known kind becomes [`Recurrence::Unrecognized`], which keeps
//! the raw JSON so it is written back untouched and never resets.
//!
//! Predicates fall into four families:
//! - elapsed duration (`daily`, `biweekly`), measured on absolute instants;
//! - day-of-week (`weekly_*`, `weekdays`, `weekends`, `biweekly_even/odd`);
//! - day-of-month and Nth weekday of month;
//! - period index (`quarterly`, `yearly`).
//!
//! Everything except the elapsed family compares local calendar fields.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::calendar::*;
use crate::fields::*;

/// Recurrence kinds accepted by the persisted task format.
///
/// `<ordinal>_<weekday>` is accepted for every ordinal/weekday pair; only the
/// historically used ones are listed here.
pub const KIND_CATALOG: &[&str] = &[
    "none",
    "daily",
    "weekdays",
    "weekends",
    "weekly",
    "weekly_sunday",
    "weekly_monday",
    "weekly_tuesday",
    "weekly_wednesday",
    "weekly_thursday",
    "weekly_friday",
    "weekly_saturday",
    "biweekly",
    "biweekly_even",
    "biweekly_odd",
    "monthly",
    "monthly_15",
    "monthly_last",
    "first_sunday",
    "first_monday",
    "first_tuesday",
    "first_wednesday",
    "first_thursday",
    "first_friday",
    "first_saturday",
    "second_sunday",
    "second_monday",
    "second_tuesday",
    "second_wednesday",
    "second_thursday",
    "second_friday",
    "second_saturday",
    "third_friday",
    "last_sunday",
    "last_monday",
    "last_friday",
    "quarterly",
    "yearly",
];

/// Day-of-week rule: reset once past `day`, or on `day` from the reset hour on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyRule {
    pub day: Weekday,
    /// Raw `HH:MM`, kept as written.
    pub time: Option<String>,
}

impl WeeklyRule {
    pub fn new(day: Weekday) -> Self {
        WeeklyRule { day, time: None }
    }

    pub fn reset_hour(&self) -> u32 {
        parse_reset_hour(self.time.as_deref())
    }
}

/// How often a completed task is cleared again.
#[derive(Debug, Clone, PartialEq)]
pub enum Recurrence {
    None,
    Daily,
    Class(DayClass),
    /// `weekly_<weekday>`.
    Weekly(WeeklyRule),
    /// `weekly` with a numeric `dayOfWeek` (Sunday = 0).
    LegacyWeekly(WeeklyRule),
    Biweekly,
    BiweeklyParity(WeekParity),
    /// `monthly` with `dayOfMonth` (1-31), clamped to short months.
    Monthly { day: u32 },
    Monthly15,
    MonthlyLast,
    NthWeekday { ordinal: Ordinal, day: Weekday },
    Quarterly,
    Yearly,
    /// Unknown or malformed rule, kept verbatim.
    Unrecognized(Value),
}

/// Wire shape of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRecord {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_of_week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    day_of_month: Option<i64>,
}

impl ScheduleRecord {
    fn kind(kind: impl Into<String>) -> Self {
        ScheduleRecord {
            kind: kind.into(),
            ..Default::default()
        }
    }

    fn into_recurrence(self) -> Option<Recurrence> {
        let kind = self.kind.as_str();
        let rule = match kind {
            "none" => Recurrence::None,
            "daily" => Recurrence::Daily,
            "weekdays" => Recurrence::Class(DayClass::Weekdays),
            "weekends" => Recurrence::Class(DayClass::Weekends),
            "weekly" => Recurrence::LegacyWeekly(WeeklyRule {
                day: weekday_from_index(self.day_of_week?)?,
                time: self.time,
            }),
            "biweekly" => Recurrence::Biweekly,
            "biweekly_even" => Recurrence::BiweeklyParity(WeekParity::Even),
            "biweekly_odd" => Recurrence::BiweeklyParity(WeekParity::Odd),
            "monthly" => {
                let day = self.day_of_month.unwrap_or(1);
                if !(1..=31).contains(&day) {
                    return None;
                }
                Recurrence::Monthly { day: day as u32 }
            }
            "monthly_15" => Recurrence::Monthly15,
            "monthly_last" => Recurrence::MonthlyLast,
            "quarterly" => Recurrence::Quarterly,
            "yearly" => Recurrence::Yearly,
            _ => {
                let (prefix, day) = kind.split_once('_')?;
                let day = parse_weekday_name(day)?;
                if prefix == "weekly" {
                    Recurrence::Weekly(WeeklyRule { day, time: self.time })
                } else {
                    Recurrence::NthWeekday {
                        ordinal: Ordinal::parse(prefix)?,
                        day,
                    }
                }
            }
        };
        Some(rule)
    }
}

impl Recurrence {
    /// Decode a persisted rule; never fails.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value::<ScheduleRecord>(value.clone())
            .ok()
            .and_then(ScheduleRecord::into_recurrence)
            .unwrap_or(Recurrence::Unrecognized(value))
    }

    /// Rule for a bare kind name with default fields.
    pub fn from_kind(kind: &str) -> Self {
        Self::from_value(serde_json::json!({ "kind": kind }))
    }

    /// Whether the rule can ever reset a task.
    pub fn is_active(&self) -> bool {
        !matches!(self, Recurrence::None | Recurrence::Unrecognized(_))
    }

    /// Wire kind name.
    pub fn kind_name(&self) -> String {
        match self {
            Recurrence::None => "none".into(),
            Recurrence::Daily => "daily".into(),
            Recurrence::Class(class) => class.as_str().into(),
            Recurrence::Weekly(rule) => format!("weekly_{}", weekday_name(rule.day)),
            Recurrence::LegacyWeekly(_) => "weekly".into(),
            Recurrence::Biweekly => "biweekly".into(),
            Recurrence::BiweeklyParity(parity) => format!("biweekly_{}", parity.as_str()),
            Recurrence::Monthly { .. } => "monthly".into(),
            Recurrence::Monthly15 => "monthly_15".into(),
            Recurrence::MonthlyLast => "monthly_last".into(),
            Recurrence::NthWeekday { ordinal, day } => {
                format!("{}_{}", ordinal.as_str(), weekday_name(*day))
            }
            Recurrence::Quarterly => "quarterly".into(),
            Recurrence::Yearly => "yearly".into(),
            Recurrence::Unrecognized(raw) => raw
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or("unrecognized")
                .into(),
        }
    }

    fn to_record(&self) -> ScheduleRecord {
        let mut record = ScheduleRecord::kind(self.kind_name());
        match self {
            Recurrence::Weekly(rule) => record.time = rule.time.clone(),
            Recurrence::LegacyWeekly(rule) => {
                record.time = rule.time.clone();
                record.day_of_week = Some(weekday_index(rule.day));
            }
            Recurrence::Monthly { day } => record.day_of_month = Some(i64::from(*day)),
            _ => {}
        }
        record
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Weekly(rule) | Recurrence::LegacyWeekly(rule) => write!(
                f,
                "{} (from {:02}:00 on {})",
                self.kind_name(),
                rule.reset_hour(),
                weekday_name(rule.day)
            ),
            Recurrence::Monthly { day } => write!(f, "monthly (day {day})"),
            Recurrence::Unrecognized(_) => write!(f, "{} (ignored)", self.kind_name()),
            _ => f.write_str(&self.kind_name()),
        }
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Recurrence::Unrecognized(raw) => raw.serialize(serializer),
            rule => rule.to_record().serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Recurrence::from_value)
    }
}

/// A persisted rule: the decoded [`Recurrence`] plus the JSON it was read from.
///
/// Serialises as that JSON, so app-owned keys in the schedule object (labels,
/// a `time` on a kind that ignores it) survive a save.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    rule: Recurrence,
    raw: Value,
}

impl Schedule {
    pub fn from_value(raw: Value) -> Self {
        Schedule {
            rule: Recurrence::from_value(raw.clone()),
            raw,
        }
    }

    pub fn rule(&self) -> &Recurrence {
        &self.rule
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl From<Recurrence> for Schedule {
    fn from(rule: Recurrence) -> Self {
        let raw = match &rule {
            Recurrence::Unrecognized(raw) => raw.clone(),
            known => serde_json::to_value(known.to_record()).unwrap_or_default(),
        };
        Schedule { rule, raw }
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Schedule::from_value)
    }
}

/// The two instants a predicate compares, already projected onto one local calendar.
#[derive(Debug, Clone, Copy)]
struct Moments {
    now: NaiveDateTime,
    last: NaiveDateTime,
    elapsed: Duration,
}

/// Whether a new period of `rule` has begun since `last_completed_at`.
///
/// Calendar fields are read in the time zone of `now`.
pub fn should_reset<Tz: TimeZone>(
    rule: &Recurrence,
    last_completed_at: &DateTime<Utc>,
    now: &DateTime<Tz>,
) -> bool {
    let m = Moments {
        now: now.naive_local(),
        last: last_completed_at.with_timezone(&now.timezone()).naive_local(),
        elapsed: now.with_timezone(&Utc).signed_duration_since(*last_completed_at),
    };

    match rule {
        Recurrence::None | Recurrence::Unrecognized(_) => false,
        Recurrence::Daily => m.elapsed > Duration::hours(24),
        Recurrence::Biweekly => m.elapsed.num_days() / 7 >= 2,
        Recurrence::BiweeklyParity(parity) => week_parity_flipped(&m, *parity),
        Recurrence::Weekly(rule) | Recurrence::LegacyWeekly(rule) => past_weekday(&m, rule),
        Recurrence::Class(class) => {
            let today = m.now.weekday();
            class.contains(today) && today != m.last.weekday()
        }
        Recurrence::Monthly { day } => on_day_of_month(&m, *day),
        Recurrence::Monthly15 => m.now.day() >= 15 && m.last.day() < 15,
        Recurrence::MonthlyLast => {
            m.now.day() + 2 >= days_in_month(m.now.year(), m.now.month())
        }
        Recurrence::NthWeekday { ordinal, day } => past_nth_weekday(&m, *ordinal, *day),
        Recurrence::Quarterly => quarter_index(m.now.date()) != quarter_index(m.last.date()),
        Recurrence::Yearly => m.now.year() != m.last.year(),
    }
}

fn week_parity_flipped(m: &Moments, parity: WeekParity) -> bool {
    let current = WeekParity::of(week_of_year(m.now.date()));
    let previous = WeekParity::of(week_of_year(m.last.date()));
    current == parity && previous != parity
}

fn past_weekday(m: &Moments, rule: &WeeklyRule) -> bool {
    let today = weekday_index(m.now.weekday());
    let delta = (today - weekday_index(rule.day) + 7) % 7;
    delta > 0 || m.now.hour() >= rule.reset_hour()
}

fn on_day_of_month(m: &Moments, day: u32) -> bool {
    let target = day.min(days_in_month(m.now.year(), m.now.month()));
    if m.now.day() != target {
        return false;
    }
    let same_month = (m.last.year(), m.last.month()) == (m.now.year(), m.now.month());
    !same_month || m.last.day() != target
}

fn past_nth_weekday(m: &Moments, ordinal: Ordinal, day: Weekday) -> bool {
    let (now, last) = (m.now.date(), m.last.date());
    let Some(occurrence) = nth_weekday_of_month(now.year(), now.month(), day, ordinal) else {
        return false;
    };
    if now < occurrence {
        return false;
    }
    if (last.year(), last.month()) != (now.year(), now.month()) {
        return true;
    }
    // Same month: the completion must predate this month's occurrence.
    last < occurrence
}
