//! Rostering domain models.
//!
//! Provides the data types for rostering problems and their solutions.
//!
//! # Domain Mappings
//!
//! | u-roster | Retail | Care home | Helpdesk |
//! |----------|--------|-----------|----------|
//! | Employee | Clerk | Carer | Agent |
//! | ShiftType | Till shift | Day/night cover | Queue slot |
//! | Schedule | Rota | Staffing plan | On-call plan |

mod catalog;
mod employee;
pub mod horizon;
mod schedule;

pub use catalog::{ShiftCatalog, ShiftClass, ShiftType};
pub use employee::Employee;
pub use horizon::{day_type, weekday, DayType, Horizon};
pub use schedule::{Assignment, Schedule, Violation, ViolationType};
