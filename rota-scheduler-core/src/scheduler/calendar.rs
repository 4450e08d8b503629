/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Month expansion and the holiday oracle.

use crate::model::rows::DayType;
use chrono::{Datelike, NaiveDate, Weekday};
use log::warn;
use std::collections::HashSet;

/// The ordered days of one calendar month.
#[derive(Debug, Clone)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    days: Vec<NaiveDate>,
}

impl MonthCalendar {
    pub fn new(year: i32, month: u32) -> Option<MonthCalendar> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let mut days = Vec::with_capacity(31);
        let mut day = first;
        while day.month() == month {
            days.push(day);
            day = day.succ_opt()?;
        }
        Some(MonthCalendar { year, month, days })
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// `YYYY-MM`, the namespace used to persist assignments of this month.
    pub fn plan_period(&self) -> String {
        plan_period(self.year, self.month)
    }
}

pub fn plan_period(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Year and month of the preceding calendar month.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

pub fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn day_type(day: NaiveDate) -> DayType {
    if is_weekend(day) { DayType::Weekend } else { DayType::Weekday }
}

/// National holiday membership. Loaded from a JSON array of ISO dates; a
/// missing or unparsable source degrades to an empty calendar, which is an
/// allowed behaviour for planning.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn empty() -> HolidayCalendar {
        HolidayCalendar::default()
    }

    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> HolidayCalendar {
        HolidayCalendar {
            dates: dates.into_iter().collect(),
        }
    }

    pub fn load_from_file(path: &str) -> HolidayCalendar {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::load_from_json(&json),
            Err(e) => {
                warn!("Holiday calendar '{}' not readable ({}), assuming no holidays", path, e);
                HolidayCalendar::empty()
            }
        }
    }

    pub fn load_from_json(json: &str) -> HolidayCalendar {
        let entries = match serde_json::from_str::<Vec<String>>(json) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to parse holiday calendar JSON ({}), assuming no holidays", e);
                return HolidayCalendar::empty();
            }
        };
        let mut dates = HashSet::new();
        for entry in entries {
            match NaiveDate::parse_from_str(entry.trim(), "%Y-%m-%d") {
                Ok(date) => {
                    dates.insert(date);
                }
                Err(e) => warn!("Skipping invalid holiday date '{}': {}", entry, e),
            }
        }
        HolidayCalendar { dates }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.dates.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
