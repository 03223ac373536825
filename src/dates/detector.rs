//! Natural-language date phrase detection.
//!
//! [`EnglishDateDetector`] finds small fragments (weekday, calendar date,
//! relative day, time of day) and merges neighbours on the same line into a
//! single phrase, so `Monday Jan 15 at 3pm` is one match rather than three.

use std::ops::Range;
use std::sync::LazyLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use regex::{Captures, Regex};

const WEEKDAY: &str = r"(?:mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)";
const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("iso date pattern"));
static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTH})\.?[ \t]+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?[ \t]+(\d{{4}})\b)?"
    ))
    .expect("month-day pattern")
});
static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?[ \t]+(?:of[ \t]+)?({MONTH})\b(?:,?[ \t]+(\d{{4}})\b)?"
    ))
    .expect("day-month pattern")
});
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("numeric date pattern")
});
static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(today|tonight|tomorrow|next[ \t]+week|this[ \t]+week)\b")
        .expect("relative day pattern")
});
static NEXT_WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(next|this)[ \t]+({WEEKDAY})\b")).expect("next weekday pattern")
});
static WEEKDAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b({WEEKDAY})\b")).expect("weekday pattern"));
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?::([0-5]\d))?[ \t]?(am|pm)\b|\b([01]?\d|2[0-3]):([0-5]\d)\b|\b(noon|midnight)\b",
    )
    .expect("time pattern")
});
static JOIN_GAP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[ \t]*(?:,[ \t]*)?(?:(?:at|on|@)[ \t]*)?$").expect("join gap pattern")
});

/// Time assumed when a phrase names a day but no time of day.
pub const DEFAULT_TIME: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// A date mention found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedDate {
    /// Byte range of the matched phrase.
    pub range: Range<usize>,
    /// Resolved point in time (noon when no time was given).
    pub date_time: NaiveDateTime,
    /// The phrase names a day (weekday, calendar date or relative day).
    pub has_date: bool,
    /// The phrase names a time of day.
    pub has_time: bool,
}

impl DetectedDate {
    /// A bare time of day such as `3pm`, with no day attached.
    pub const fn is_time_fragment(&self) -> bool {
        self.has_time && !self.has_date
    }

    pub fn is_noon(&self) -> bool {
        self.date_time.time() == DEFAULT_TIME
    }
}

/// Locale-aware date phrase detection capability.
pub trait DatePhraseDetector {
    /// Detect date mentions in `text`, resolving relative phrases against `now`.
    ///
    /// Returned matches are sorted by start and never overlap.
    fn detect(&self, text: &str, now: NaiveDateTime) -> Vec<DetectedDate>;
}

/// English date phrase detector backed by regexes and `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishDateDetector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relative {
    Today,
    Tomorrow,
    NextWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Day {
    Calendar {
        month: u32,
        day: u32,
        year: Option<i32>,
    },
    Relative(Relative),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fragment {
    Weekday { weekday: Weekday, skip_today: bool },
    Day(Day),
    Time(NaiveTime),
}

#[derive(Debug, Clone)]
struct Atom {
    range: Range<usize>,
    fragment: Fragment,
}

#[derive(Debug, Default)]
struct Phrase {
    range: Option<Range<usize>>,
    weekday: Option<(Weekday, bool)>,
    day: Option<Day>,
    time: Option<NaiveTime>,
}

impl Phrase {
    fn accepts(&self, fragment: Fragment) -> bool {
        match fragment {
            Fragment::Weekday { .. } => self.weekday.is_none() && self.day.is_none(),
            Fragment::Day(_) => self.day.is_none(),
            Fragment::Time(_) => self.time.is_none(),
        }
    }

    fn push(&mut self, atom: &Atom) {
        self.range = Some(match self.range.take() {
            Some(range) => range.start..atom.range.end,
            None => atom.range.clone(),
        });
        match atom.fragment {
            Fragment::Weekday {
                weekday,
                skip_today,
            } => self.weekday = Some((weekday, skip_today)),
            Fragment::Day(day) => self.day = Some(day),
            Fragment::Time(time) => self.time = Some(time),
        }
    }

    fn resolve(&self, now: NaiveDateTime) -> Option<DetectedDate> {
        let range = self.range.clone()?;
        let today = now.date();
        let date = match (self.day, self.weekday) {
            (Some(day), _) => resolve_day(day, today)?,
            (None, Some((weekday, skip_today))) => next_weekday(today, weekday, skip_today),
            (None, None) => today,
        };
        Some(DetectedDate {
            range,
            date_time: date.and_time(self.time.unwrap_or(DEFAULT_TIME)),
            has_date: self.day.is_some() || self.weekday.is_some(),
            has_time: self.time.is_some(),
        })
    }
}

impl DatePhraseDetector for EnglishDateDetector {
    fn detect(&self, text: &str, now: NaiveDateTime) -> Vec<DetectedDate> {
        let atoms = scan_atoms(text);
        let mut detected = Vec::new();
        let mut phrase = Phrase::default();
        let mut phrase_end = 0;

        for atom in atoms {
            let joinable = phrase.range.is_some()
                && phrase.accepts(atom.fragment)
                && text
                    .get(phrase_end..atom.range.start)
                    .is_some_and(|gap| JOIN_GAP_RE.is_match(gap));
            if !joinable {
                if let Some(found) = phrase.resolve(now) {
                    detected.push(found);
                }
                phrase = Phrase::default();
            }
            phrase_end = atom.range.end;
            phrase.push(&atom);
        }
        if let Some(found) = phrase.resolve(now) {
            detected.push(found);
        }
        detected
    }
}

fn scan_atoms(text: &str) -> Vec<Atom> {
    let mut atoms = Vec::new();
    collect(&mut atoms, &ISO_RE, text, |caps| {
        Some(Fragment::Day(Day::Calendar {
            year: Some(caps[1].parse().ok()?),
            month: caps[2].parse().ok()?,
            day: caps[3].parse().ok()?,
        }))
    });
    collect(&mut atoms, &MONTH_DAY_RE, text, |caps| {
        Some(Fragment::Day(Day::Calendar {
            month: month_number(&caps[1])?,
            day: caps[2].parse().ok()?,
            year: caps.get(3).and_then(|y| y.as_str().parse().ok()),
        }))
    });
    collect(&mut atoms, &DAY_MONTH_RE, text, |caps| {
        Some(Fragment::Day(Day::Calendar {
            month: month_number(&caps[2])?,
            day: caps[1].parse().ok()?,
            year: caps.get(3).and_then(|y| y.as_str().parse().ok()),
        }))
    });
    collect(&mut atoms, &NUMERIC_RE, text, |caps| {
        let year = match caps.get(3) {
            Some(y) if y.as_str().len() == 2 => Some(2000 + y.as_str().parse::<i32>().ok()?),
            Some(y) => Some(y.as_str().parse().ok()?),
            None => None,
        };
        Some(Fragment::Day(Day::Calendar {
            month: caps[1].parse().ok()?,
            day: caps[2].parse().ok()?,
            year,
        }))
    });
    collect(&mut atoms, &RELATIVE_RE, text, |caps| {
        let word = normalize_phrase(&caps[1]);
        let relative = match word.as_str() {
            "tomorrow" => Relative::Tomorrow,
            "next week" => Relative::NextWeek,
            _ => Relative::Today,
        };
        Some(Fragment::Day(Day::Relative(relative)))
    });
    collect(&mut atoms, &NEXT_WEEKDAY_RE, text, |caps| {
        Some(Fragment::Weekday {
            weekday: weekday_from_name(&caps[2])?,
            skip_today: caps[1].eq_ignore_ascii_case("next"),
        })
    });
    collect(&mut atoms, &WEEKDAY_RE, text, |caps| {
        Some(Fragment::Weekday {
            weekday: weekday_from_name(&caps[1])?,
            skip_today: false,
        })
    });
    collect(&mut atoms, &TIME_RE, text, parse_time);

    // Earliest first; on a tie the longer fragment wins. Overlaps are dropped.
    atoms.sort_by(|a, b| {
        a.range
            .start
            .cmp(&b.range.start)
            .then(b.range.end.cmp(&a.range.end))
    });
    let mut kept: Vec<Atom> = Vec::with_capacity(atoms.len());
    for atom in atoms {
        if kept.last().is_none_or(|last| atom.range.start >= last.range.end) {
            kept.push(atom);
        }
    }
    kept
}

fn collect(
    atoms: &mut Vec<Atom>,
    re: &Regex,
    text: &str,
    parse: impl Fn(&Captures<'_>) -> Option<Fragment>,
) {
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if let Some(fragment) = parse(&caps) {
            atoms.push(Atom {
                range: whole.range(),
                fragment,
            });
        }
    }
}

fn parse_time(caps: &Captures<'_>) -> Option<Fragment> {
    if let Some(hour) = caps.get(1) {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.get(3)?.as_str().eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0).map(Fragment::Time);
    }
    if let (Some(hour), Some(minute)) = (caps.get(4), caps.get(5)) {
        return NaiveTime::from_hms_opt(
            hour.as_str().parse().ok()?,
            minute.as_str().parse().ok()?,
            0,
        )
        .map(Fragment::Time);
    }
    let word = caps.get(6)?.as_str();
    if word.eq_ignore_ascii_case("noon") {
        Some(Fragment::Time(DEFAULT_TIME))
    } else {
        Some(Fragment::Time(NaiveTime::MIN))
    }
}

fn resolve_day(day: Day, today: NaiveDate) -> Option<NaiveDate> {
    match day {
        Day::Relative(Relative::Today) => Some(today),
        Day::Relative(Relative::Tomorrow) => today.checked_add_signed(Duration::days(1)),
        Day::Relative(Relative::NextWeek) => today.checked_add_signed(Duration::days(7)),
        Day::Calendar {
            month,
            day,
            year: Some(year),
        } => NaiveDate::from_ymd_opt(year, month, day),
        Day::Calendar {
            month,
            day,
            year: None,
        } => {
            // Next occurrence on or after today; Feb 29 may be up to four years out.
            (0..=4).find_map(|ahead| {
                NaiveDate::from_ymd_opt(today.year() + ahead, month, day)
                    .filter(|date| *date >= today)
            })
        }
    }
}

fn next_weekday(today: NaiveDate, weekday: Weekday, skip_today: bool) -> NaiveDate {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let mut ahead = (target + 7 - current) % 7;
    if ahead == 0 && skip_today {
        ahead = 7;
    }
    today + Duration::days(i64::from(ahead))
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let lower = name.to_ascii_lowercase();
    let weekday = match lower.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

/// Lowercase and collapse internal whitespace.
pub(crate) fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
