//! Natural-language date handling: the temporal pattern catalog, a
//! single-date phrase parser, and the range resolver built on both.

pub mod lexicon;
pub mod phrase;
pub mod resolver;

pub use phrase::parse_date_phrase;
pub use resolver::{resolve, resolve_now};
