//! ユーティリティモジュール

pub mod api;
pub mod download;
pub mod format;
pub mod log_trace;
pub mod settings;

use web_sys::{File, FileList};

// 共通ヘルパー

/// FileListをVecに変換（順序を保つ）
pub fn file_list_to_vec(list: &FileList) -> Vec<File> {
    (0..list.length()).filter_map(|i| list.get(i)).collect()
}
