//! Birth moment → four pillars.
//!
//! Uses the simplified Gregorian offsets: the year pillar turns on 1 January
//! and the month pillar on the civil month, not on solar terms.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cycle::{Branch, Pillar, Stem};
use crate::error::{BaziError, Result};

/// 1900-01-01 is a 庚子 day.
const DAY_EPOCH: (i32, u32, u32) = (1900, 1, 1);
const DAY_EPOCH_STEM: i64 = 6;
const DAY_EPOCH_BRANCH: i64 = 0;

/// A validated civil birth moment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthMoment {
    pub date: NaiveDate,
    pub hour: u32,
}

impl BirthMoment {
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Result<Self> {
        let date = validate_date(year, month, day)?;
        if hour > 23 {
            return Err(BaziError::InvalidInput(format!(
                "hour {} outside 0..=23",
                hour
            )));
        }
        Ok(Self { date, hour })
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(BaziError::InvalidInput(format!(
            "month {} outside 1..=12",
            month
        )));
    }
    Ok(())
}

fn validate_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    validate_month(month)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        BaziError::InvalidInput(format!("{:04}-{:02}-{:02} is not a calendar date", year, month, day))
    })
}

/// The four pillars of a birth moment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
    /// Eight-character concatenation, year first
    pub symbol: String,
}

impl FourPillars {
    pub fn new(year: Pillar, month: Pillar, day: Pillar, hour: Pillar) -> Self {
        let symbol = format!("{}{}{}{}", year, month, day, hour);
        Self {
            year,
            month,
            day,
            hour,
            symbol,
        }
    }

    /// Year, month, day, hour
    pub fn pillars(&self) -> [Pillar; 4] {
        [self.year, self.month, self.day, self.hour]
    }

    pub fn branches(&self) -> [Branch; 4] {
        self.pillars().map(|p| p.branch)
    }

    /// 納音 of each pillar, year first
    pub fn na_yin(&self) -> [Option<&'static str>; 4] {
        self.pillars().map(|p| p.na_yin())
    }
}

fn year_stem_index(year: i32) -> i64 {
    (year as i64 - 4).rem_euclid(10)
}

pub fn year_pillar(year: i32) -> Pillar {
    let offset = year as i64 - 4;
    Pillar::new(Stem::from_index(offset), Branch::from_index(offset))
}

pub fn month_pillar(year: i32, month: u32) -> Result<Pillar> {
    validate_month(month)?;
    Ok(month_pillar_for(year, month))
}

fn month_pillar_for(year: i32, month: u32) -> Pillar {
    let stem = Stem::from_index(year_stem_index(year) * 2 + month as i64 - 1);
    let branch = Branch::from_index(month as i64 + 1);
    Pillar::new(stem, branch)
}

/// Whole days from the epoch to `date`, counted on calendar dates.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    let (y, m, d) = DAY_EPOCH;
    // The epoch is a valid constant date.
    let epoch = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);
    date.signed_duration_since(epoch).num_days()
}

pub fn day_pillar(year: i32, month: u32, day: u32) -> Result<Pillar> {
    let date = validate_date(year, month, day)?;
    Ok(day_pillar_for(date))
}

fn day_pillar_for(date: NaiveDate) -> Pillar {
    let offset = days_since_epoch(date);
    Pillar::new(
        Stem::from_index(offset + DAY_EPOCH_STEM),
        Branch::from_index(offset + DAY_EPOCH_BRANCH),
    )
}

/// Stem of the 子 hour for a given day stem (甲己還加甲 …).
fn rat_hour_stem(day_stem: Stem) -> i64 {
    match day_stem {
        Stem::Jia | Stem::Ji => 0,
        Stem::Yi | Stem::Geng => 2,
        Stem::Bing | Stem::Xin => 4,
        Stem::Ding | Stem::Ren => 6,
        Stem::Wu | Stem::Gui => 8,
    }
}

pub fn hour_pillar(year: i32, month: u32, day: u32, hour: u32) -> Result<Pillar> {
    let moment = BirthMoment::new(year, month, day, hour)?;
    let day_stem = day_pillar_for(moment.date).stem;
    Ok(hour_pillar_for(day_stem, moment.hour))
}

fn hour_pillar_for(day_stem: Stem, hour: u32) -> Pillar {
    let branch = Branch::for_hour(hour);
    let stem = Stem::from_index(rat_hour_stem(day_stem) + branch.index() as i64);
    Pillar::new(stem, branch)
}

pub fn calculate(year: i32, month: u32, day: u32, hour: u32) -> Result<FourPillars> {
    let moment = BirthMoment::new(year, month, day, hour)?;
    Ok(calculate_for(&moment))
}

pub fn calculate_for(moment: &BirthMoment) -> FourPillars {
    let year = moment.year();
    let day = day_pillar_for(moment.date);
    let pillars = FourPillars::new(
        year_pillar(year),
        month_pillar_for(year, moment.month()),
        day,
        hour_pillar_for(day.stem, moment.hour),
    );
    tracing::debug!(date = %moment.date, hour = moment.hour, pillars = %pillars.symbol, "Calculated pillars");
    pillars
}
