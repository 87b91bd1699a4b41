mod filter;
mod movie;

pub use filter::{FilterField, FilterSet, FilterState};
pub use movie::{display_name, FilterOptions, MovieResult, OptionChoice};
