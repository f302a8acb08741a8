pub mod filters;

pub use filters::{
    parser::{parse_query, render_query},
    state::FilterState,
    ActiveFilter, FilterKey, SearchFilters, DEFAULT_LIMIT, DEFAULT_PAGE,
};
