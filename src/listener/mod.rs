pub mod error_listener;
pub mod facet_filter;

pub use error_listener::{
    BackendError, BackendSet, ErrorEvent, ParserErrorListener, TAG_PARSER_ERROR,
};
pub use facet_filter::{facet_rules, FacetRules, FacetValueFilter};
