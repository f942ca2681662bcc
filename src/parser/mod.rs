//! DOCX parsing module.

mod docx_parser;
mod options;
pub(crate) mod part;
pub(crate) mod rels;

pub use docx_parser::DocxParser;
pub(crate) use docx_parser::main_part_name;
pub use options::{ErrorMode, ParseOptions};
