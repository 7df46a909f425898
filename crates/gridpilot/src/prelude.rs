//! Prelude module - common imports for gridpilot users
//!
//! ```rust
//! use gridpilot::prelude::*;
//! ```

pub use crate::{
    // Assistant payloads
    AssistantAction,
    AssistantRequest,
    AssistantResponse,

    // Cell types
    Cell,
    CellCoordinate,
    CellRange,
    CellStyle,
    CellValue,

    // Error types
    Error,
    ExportOptions,
    FileFormat,
    ImportOptions,
    Result,

    // Main types
    Session,
    SheetData,
    Spreadsheet,
    SpreadsheetData,

    // Extension traits
    SpreadsheetExt,
};
