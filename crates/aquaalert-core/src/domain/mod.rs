//! Domain module containing the surveillance entities and reference data.
//!
//! - **Entities**: records with identity (HealthReport, WaterQualityReport, User)
//! - **Value Objects**: immutable values (Decimal2, Alert)
//! - **Reference Data**: the static village registry

pub mod alert;
pub mod decimal;
pub mod report;
pub mod user;
pub mod village;

pub use alert::*;
pub use decimal::*;
pub use report::*;
pub use user::*;
pub use village::*;
