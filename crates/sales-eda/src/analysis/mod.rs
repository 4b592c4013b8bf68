//! Downstream analysis of the clean table.
//!
//! Nothing here feeds back into cleaning; every function reads a table that
//! has already been through [`Cleaner`](crate::Cleaner).

mod performance;
mod statistics;

pub use performance::{
    DailyTotal, Performers, PriorityTotal, SalespersonSummary, daily_totals, priority_totals,
    salesperson_summary, summary_frame, top_and_bottom_performer,
};
pub use statistics::{
    CorrelationMatrix, DescriptiveStats, GroupStats, correlation_matrix, describe_numeric,
    grouped_describe, pearson, priority_value_correlation,
};
