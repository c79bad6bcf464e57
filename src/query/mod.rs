//! Query state, filter parsing, escaping, and display formatting.

pub mod context;
pub mod escape;
pub mod filter;
pub mod formatter;

pub use context::{QueryContext, RefinementParams, EMPTY_QUERIES};
pub use escape::{facet_escape, lesser_escape, strip_slashes};
pub use filter::{parse_filter, parse_range, split_field_value, ParsedFilter, RangeBounds};
pub use formatter::{format_query_display, humanize_query, FilterDescriptor, FilterFormatter};
