pub mod args;
pub mod error;
pub mod filter;
pub mod host;
pub mod report;
pub mod sqlite;
pub mod stats;
pub mod utils;
pub mod visit;

pub use args::Args;
pub use error::QueryError;
pub use filter::{filter_visits, VisitFilter};
pub use host::extract_host;
pub use stats::{
    count_by_domain, count_by_time_scale, count_by_time_scale_in, to_sorted_entries, Entry,
    SortBy, TimeScale,
};
pub use visit::{Transition, Visit, VisitStore};
