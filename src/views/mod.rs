//! ビューモジュール
//!
//! ツールごとのパネル。タブを切り替えてもパネルはマウントしたままにして状態を保つ

pub mod merge_panel;
pub mod tool_panel;

pub use merge_panel::MergePanel;
pub use tool_panel::ToolPanel;
