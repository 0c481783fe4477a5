//! Shift catalog.
//!
//! A catalog lists the shift codes that must be staffed each day, split
//! by day type. Every shift in the catalog is one slot per day that the
//! coverage constraint requires exactly one employee for.
//!
//! # Default Catalog
//!
//! | Code | Hours | Day type | Class |
//! |------|-------|----------|-------|
//! | FA, FB | 2.5 | weekday | morning |
//! | AA, AB | 6.0 | weekday | evening |
//! | SA, SB | 12.5 | weekend | all-day |

use serde::{Deserialize, Serialize};

use super::horizon::{day_type, DayType};

/// Shift class, used for workload mix analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftClass {
    /// Early weekday shift.
    Morning,
    /// Late weekday shift.
    Evening,
    /// Full-day weekend shift.
    AllDay,
}

/// A staffable shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftType {
    /// Shift code (e.g. "FA"). The second character is the variant.
    pub code: String,
    /// Duration in hours.
    pub hours: f64,
    /// Day type this shift is staffed on.
    pub day_type: DayType,
    /// Shift class.
    pub class: ShiftClass,
}

impl ShiftType {
    /// Creates a shift type.
    pub fn new(code: impl Into<String>, hours: f64, day_type: DayType, class: ShiftClass) -> Self {
        Self {
            code: code.into(),
            hours,
            day_type,
            class,
        }
    }

    /// Duration in tenths of an hour (fixed-point, one decimal of precision).
    #[inline]
    pub fn tenths(&self) -> i64 {
        (self.hours * 10.0).round() as i64
    }

    /// Variant symbol: the second character of the code, if any.
    pub fn variant(&self) -> Option<char> {
        self.code.chars().nth(1)
    }
}

/// The set of shifts staffed per day type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCatalog {
    /// All shifts, in the order they are laid out per day.
    pub shifts: Vec<ShiftType>,
}

impl Default for ShiftCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShiftCatalog {
    /// Creates a catalog from an explicit shift list.
    pub fn new(shifts: Vec<ShiftType>) -> Self {
        Self { shifts }
    }

    /// The default two-morning / two-evening / two-weekend catalog.
    pub fn standard() -> Self {
        use DayType::{Weekday, Weekend};
        use ShiftClass::{AllDay, Evening, Morning};
        Self::new(vec![
            ShiftType::new("FA", 2.5, Weekday, Morning),
            ShiftType::new("FB", 2.5, Weekday, Morning),
            ShiftType::new("AA", 6.0, Weekday, Evening),
            ShiftType::new("AB", 6.0, Weekday, Evening),
            ShiftType::new("SA", 12.5, Weekend, AllDay),
            ShiftType::new("SB", 12.5, Weekend, AllDay),
        ])
    }

    /// Shifts staffed on a given day type.
    pub fn shifts_for(&self, day_type: DayType) -> impl Iterator<Item = &ShiftType> {
        self.shifts.iter().filter(move |s| s.day_type == day_type)
    }

    /// Shifts staffed on a given day index.
    pub fn shifts_on(&self, day: u32) -> impl Iterator<Item = &ShiftType> {
        self.shifts_for(day_type(day))
    }

    /// Looks up a shift by code.
    pub fn get(&self, code: &str) -> Option<&ShiftType> {
        self.shifts.iter().find(|s| s.code == code)
    }

    /// Distinct variant symbols, in catalog order.
    pub fn variants(&self) -> Vec<char> {
        let mut out = Vec::new();
        for v in self.shifts.iter().filter_map(ShiftType::variant) {
            if !out.contains(&v) {
                out.push(v);
            }
        }
        out
    }

    /// Total hours required to staff every slot of a day.
    pub fn daily_hours(&self, day: u32) -> f64 {
        self.shifts_on(day).map(|s| s.hours).sum()
    }
}
