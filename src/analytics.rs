//! Workload analytics.
//!
//! Computes per-employee workload and shift-mix indicators from a solved
//! schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Hours % | scheduled hours / target hours |
//! | Weekday / weekend share | of all shifts worked |
//! | Morning / evening share | of weekday shifts of those classes |
//! | Variant share | by the shift code's second symbol, of all shifts |
//!
//! Percentages are rounded to one decimal. A zero denominator yields 0.

use serde::Serialize;

use crate::models::{DayType, Employee, Schedule, ShiftCatalog, ShiftClass};

/// Count and share of shifts carrying one variant symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantShare {
    /// Variant symbol (e.g. 'A').
    pub variant: char,
    /// Shifts with this variant.
    pub count: usize,
    /// Share of all shifts (%).
    pub pct: f64,
}

/// Per-employee workload summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsRecord {
    /// Employee name.
    pub employee: String,
    /// Target / base hours, two decimals.
    pub multiplier: f64,
    /// Recurring unavailable weekday names.
    pub regularly_unavailable: Vec<String>,
    /// Individually unavailable day indices, ascending.
    pub individually_unavailable: Vec<u32>,
    /// Target hours.
    pub target_hours: f64,
    /// Scheduled hours.
    pub scheduled_hours: f64,
    /// Scheduled / target (%).
    pub hours_pct: f64,
    /// Shifts on weekdays.
    pub weekday_shifts: usize,
    /// Shifts on weekends.
    pub weekend_shifts: usize,
    /// Weekday share of all shifts (%).
    pub weekday_pct: f64,
    /// Weekend share of all shifts (%).
    pub weekend_pct: f64,
    /// Morning-class weekday shifts.
    pub morning_shifts: usize,
    /// Evening-class weekday shifts.
    pub evening_shifts: usize,
    /// Morning share of morning + evening weekday shifts (%).
    pub morning_pct: f64,
    /// Evening share of morning + evening weekday shifts (%).
    pub evening_pct: f64,
    /// Variant counts, in catalog variant order.
    pub variants: Vec<VariantShare>,
}

impl AnalyticsRecord {
    /// Total shifts worked.
    pub fn total_shifts(&self) -> usize {
        self.weekday_shifts + self.weekend_shifts
    }

    /// Share for one variant, if the catalog defines it.
    pub fn variant(&self, variant: char) -> Option<&VariantShare> {
        self.variants.iter().find(|v| v.variant == variant)
    }
}

/// `part / whole × 100`, rounded to one decimal; 0 when `whole` is 0.
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round_to(part / whole * 100.0, 1)
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Computes `AnalyticsRecord`s.
pub struct AnalyticsAggregator<'a> {
    catalog: &'a ShiftCatalog,
    base_hours: f64,
}

impl<'a> AnalyticsAggregator<'a> {
    /// Creates an aggregator. `base_hours` is used to report multipliers.
    pub fn new(catalog: &'a ShiftCatalog, base_hours: f64) -> Self {
        Self {
            catalog,
            base_hours,
        }
    }

    /// One record per employee, in roster order.
    pub fn calculate(&self, schedule: &Schedule, employees: &[Employee]) -> Vec<AnalyticsRecord> {
        employees
            .iter()
            .map(|e| self.calculate_one(schedule, e))
            .collect()
    }

    /// Record for a single employee.
    pub fn calculate_one(&self, schedule: &Schedule, employee: &Employee) -> AnalyticsRecord {
        let worked = schedule.assignments_for_employee(&employee.name);
        let scheduled_hours: f64 = worked.iter().map(|a| a.hours).sum();

        let mut weekday_shifts = 0;
        let mut weekend_shifts = 0;
        let mut morning_shifts = 0;
        let mut evening_shifts = 0;

        for a in &worked {
            match a.day_type() {
                DayType::Weekday => {
                    weekday_shifts += 1;
                    match self.catalog.get(&a.shift).map(|s| s.class) {
                        Some(ShiftClass::Morning) => morning_shifts += 1,
                        Some(ShiftClass::Evening) => evening_shifts += 1,
                        _ => {}
                    }
                }
                DayType::Weekend => weekend_shifts += 1,
            }
        }

        let total = worked.len() as f64;
        let class_total = (morning_shifts + evening_shifts) as f64;

        let variants = self
            .catalog
            .variants()
            .into_iter()
            .map(|variant| {
                let count = worked
                    .iter()
                    .filter(|a| a.shift.chars().nth(1) == Some(variant))
                    .count();
                VariantShare {
                    variant,
                    count,
                    pct: percent(count as f64, total),
                }
            })
            .collect();

        let multiplier = if self.base_hours > 0.0 {
            round_to(employee.target_hours / self.base_hours, 2)
        } else {
            0.0
        };

        AnalyticsRecord {
            employee: employee.name.clone(),
            multiplier,
            regularly_unavailable: employee
                .unavailable_weekday_names()
                .into_iter()
                .map(String::from)
                .collect(),
            individually_unavailable: employee.unavailable_days.iter().copied().collect(),
            target_hours: employee.target_hours,
            scheduled_hours,
            hours_pct: if employee.target_hours > 0.0 {
                percent(scheduled_hours, employee.target_hours)
            } else {
                0.0
            },
            weekday_shifts,
            weekend_shifts,
            weekday_pct: percent(weekday_shifts as f64, total),
            weekend_pct: percent(weekend_shifts as f64, total),
            morning_shifts,
            evening_shifts,
            morning_pct: percent(morning_shifts as f64, class_total),
            evening_pct: percent(evening_shifts as f64, class_total),
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Assignment;

    fn sample() -> (Schedule, Vec<Employee>) {
        let employees = vec![
            Employee::with_multiplier("Alice", 420.0, 0.5)
                .with_unavailable_weekdays([4, 1])
                .with_unavailable_days([30, 3]),
            Employee::with_multiplier("Bob", 420.0, 0.35),
        ];
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new("Alice", 0, "FA", 2.5));
        s.add_assignment(Assignment::new("Alice", 2, "FB", 2.5));
        s.add_assignment(Assignment::new("Alice", 7, "AA", 6.0));
        s.add_assignment(Assignment::new("Alice", 5, "SA", 12.5));
        (s, employees)
    }

    #[test]
    fn test_basic_record() {
        let (s, employees) = sample();
        let catalog = ShiftCatalog::standard();
        let records = AnalyticsAggregator::new(&catalog, 420.0).calculate(&s, &employees);
        let r = &records[0];

        assert_eq!(r.employee, "Alice");
        assert!((r.multiplier - 0.5).abs() < 1e-10);
        assert_eq!(r.regularly_unavailable, vec!["Tuesday", "Friday"]);
        assert_eq!(r.individually_unavailable, vec![3, 30]);
        assert!((r.scheduled_hours - 23.5).abs() < 1e-10);
        // 23.5 / 210 = 11.19% → 11.2
        assert!((r.hours_pct - 11.2).abs() < 1e-10);
        assert_eq!(r.weekday_shifts, 3);
        assert_eq!(r.weekend_shifts, 1);
        assert_eq!(r.total_shifts(), 4);
        assert!((r.weekday_pct - 75.0).abs() < 1e-10);
        assert!((r.weekend_pct - 25.0).abs() < 1e-10);
        assert_eq!(r.morning_shifts, 2);
        assert_eq!(r.evening_shifts, 1);
        assert!((r.morning_pct - 66.7).abs() < 1e-10);
        assert!((r.evening_pct - 33.3).abs() < 1e-10);
    }

    #[test]
    fn test_variant_shares() {
        let (s, employees) = sample();
        let catalog = ShiftCatalog::standard();
        let r = AnalyticsAggregator::new(&catalog, 420.0).calculate_one(&s, &employees[0]);

        let a = r.variant('A').unwrap();
        let b = r.variant('B').unwrap();
        assert_eq!(a.count, 3);
        assert_eq!(b.count, 1);
        assert!((a.pct - 75.0).abs() < 1e-10);
        assert!((b.pct - 25.0).abs() < 1e-10);
        assert!(r.variant('Z').is_none());
    }

    #[test]
    fn test_zero_shifts_safe_division() {
        let (s, employees) = sample();
        let catalog = ShiftCatalog::standard();
        let r = AnalyticsAggregator::new(&catalog, 420.0).calculate_one(&s, &employees[1]);

        assert_eq!(r.total_shifts(), 0);
        assert_eq!(r.scheduled_hours, 0.0);
        assert_eq!(r.hours_pct, 0.0);
        assert_eq!(r.weekday_pct, 0.0);
        assert_eq!(r.weekend_pct, 0.0);
        assert_eq!(r.morning_pct, 0.0);
        assert_eq!(r.evening_pct, 0.0);
        assert!(r.variants.iter().all(|v| v.count == 0 && v.pct == 0.0));
    }

    #[test]
    fn test_zero_target() {
        let catalog = ShiftCatalog::standard();
        let e = Employee::new("Zed", 0.0);
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new("Zed", 0, "FA", 2.5));
        let r = AnalyticsAggregator::new(&catalog, 420.0).calculate_one(&s, &e);
        assert_eq!(r.hours_pct, 0.0);
        assert_eq!(r.multiplier, 0.0);

        let r = AnalyticsAggregator::new(&catalog, 0.0).calculate_one(&s, &e);
        assert_eq!(r.multiplier, 0.0);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1.0, 3.0), 33.3);
        assert_eq!(percent(2.0, 3.0), 66.7);
        assert_eq!(percent(5.0, 0.0), 0.0);
        assert_eq!(percent(0.0, 0.0), 0.0);
    }
}
