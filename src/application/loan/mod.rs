mod errors;
mod loan_service;
mod loan_store;

#[allow(unused_imports)]
pub use errors::{LoanAdminError, Result};
#[allow(unused_imports)]
pub use loan_service::{
    LoanPage, RefreshOutcome, ServiceDependencies, query_loans, refresh_loans, update_loan_status,
};
#[allow(unused_imports)]
pub use loan_store::{LoanFilter, LoanStore, Notice, paginate};
