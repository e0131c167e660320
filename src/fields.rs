//! Enumerations used to spell recurrence kinds.
//!
//! Kind names on the wire are built from these pieces, e.g. `second_friday`
//! is `Ordinal::Second` + `Weekday::Fri` and `biweekly_even` is `WeekParity::Even`.

use chrono::Weekday;

/// Which occurrence of a weekday inside a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Ordinal {
    pub const ALL: [Ordinal; 5] = [
        Ordinal::First,
        Ordinal::Second,
        Ordinal::Third,
        Ordinal::Fourth,
        Ordinal::Last,
    ];

    /// Kind-name prefix (`first`, `second`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Ordinal::First => "first",
            Ordinal::Second => "second",
            Ordinal::Third => "third",
            Ordinal::Fourth => "fourth",
            Ordinal::Last => "last",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == s)
    }

    /// 1-based position for counted ordinals, `None` for `Last`.
    pub fn position(self) -> Option<u32> {
        match self {
            Ordinal::First => Some(1),
            Ordinal::Second => Some(2),
            Ordinal::Third => Some(3),
            Ordinal::Fourth => Some(4),
            Ordinal::Last => None,
        }
    }
}

/// Parity of the simplified week-of-year number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekParity {
    Even,
    Odd,
}

impl WeekParity {
    pub fn of(week: u32) -> Self {
        if week % 2 == 0 {
            WeekParity::Even
        } else {
            WeekParity::Odd
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeekParity::Even => "even",
            WeekParity::Odd => "odd",
        }
    }
}

/// A class of weekdays that re-triggers daily while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayClass {
    /// Monday to Friday.
    Weekdays,
    /// Saturday and Sunday.
    Weekends,
}

impl DayClass {
    pub fn contains(self, day: Weekday) -> bool {
        let weekend = matches!(day, Weekday::Sat | Weekday::Sun);
        match self {
            DayClass::Weekdays => !weekend,
            DayClass::Weekends => weekend,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayClass::Weekdays => "weekdays",
            DayClass::Weekends => "weekends",
        }
    }
}

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

/// Lowercase English weekday name as used in kind names.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES
        .iter()
        .find(|(_, d)| *d == day)
        .map(|(name, _)| *name)
        .unwrap_or("sunday")
}

pub fn parse_weekday_name(s: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .find(|(name, _)| *name == s)
        .map(|(_, d)| *d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_class_membership() {
        assert!(DayClass::Weekdays.contains(Weekday::Mon));
        assert!(DayClass::Weekdays.contains(Weekday::Fri));
        assert!(!DayClass::Weekdays.contains(Weekday::Sat));
        assert!(DayClass::Weekends.contains(Weekday::Sun));
        assert!(!DayClass::Weekends.contains(Weekday::Wed));
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(parse_weekday_name("friday"), Some(Weekday::Fri));
        assert_eq!(parse_weekday_name("Friday"), None);
        assert_eq!(weekday_name(Weekday::Sat), "saturday");
    }

    #[test]
    fn test_ordinal_parse() {
        assert_eq!(Ordinal::parse("third"), Some(Ordinal::Third));
        assert_eq!(Ordinal::parse("fifth"), None);
        assert_eq!(Ordinal::Last.position(), None);
        assert_eq!(WeekParity::of(4), WeekParity::Even);
    }
}
