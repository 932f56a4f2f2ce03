//! UIコンポーネントモジュール

pub mod drop_zone;
pub mod file_row;
pub mod options;
pub mod result_card;

pub use drop_zone::DropZone;
pub use file_row::FileRow;
pub use options::ToolOptionsPanel;
pub use result_card::{ProgressIndicator, ResultArea};
