//! Loading and saving PDF documents.

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadedPdf, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
