//! Reading and editing git config files
//!
//! Only the operations gitctx needs: query a section, drop a section, append a
//! value. Everything else in the file is carried through untouched.

mod document;
mod value;

pub use document::{GitConfigDocument, SectionHeader};
pub use value::{format_value, parse_value};
