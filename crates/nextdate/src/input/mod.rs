//! Input parsing and data source handling.

mod parser;
mod source;
mod workbook;

pub use parser::{Parser, ParserConfig};
pub use source::{
    is_spreadsheet, load_source, raw_records, read_table, DataTable, LoadedSource, SourceMetadata,
    StructuredRow, TableRow,
};
pub use workbook::read_workbook;
