//! Rule-based normalization of scraped listing text.

pub mod location;
pub mod role;
pub mod salary;
pub mod tables;

pub use location::{CarryForward, normalize_location};
pub use role::RoleClassifier;
pub use salary::{MIN_ANNUAL_SALARY, normalize_salary};
