pub mod job_params;
pub mod result_row;

pub use job_params::JobParams;
pub use result_row::ResultRow;
