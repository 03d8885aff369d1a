pub mod commands;
pub mod errors;
pub mod item;
pub mod loan;
pub mod user;
pub mod value_objects;

pub use errors::*;
pub use loan::{LoanEvent, LoanLine, LoanStatus, StatusFilter};
pub use value_objects::*;
