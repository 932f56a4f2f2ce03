//! 時系列トレースログ
//! 選択・送信・結果・エラーを記録し、LocalStorageに保持する

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;

const MAX_LOG_ENTRIES: usize = 1000;
const STORAGE_KEY: &str = "pdf_toolkit_log_trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub category: String, // "tool", "merge", "api", "download", "settings"
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

pub struct LogTrace {
    logs: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogTrace {
    fn with_capacity(capacity: usize) -> Self {
        LogTrace {
            logs: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn load() -> Self {
        let mut trace = Self::with_capacity(MAX_LOG_ENTRIES);
        let stored = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten());
        if let Some(logs) = stored.and_then(|json| serde_json::from_str::<Vec<LogEntry>>(&json).ok()) {
            for entry in logs {
                trace.push(entry);
            }
        }
        trace
    }

    /// 上限を超えたら古いものから捨てる
    pub fn push(&mut self, entry: LogEntry) {
        if self.logs.len() >= self.capacity {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.logs).unwrap_or_else(|_| "[]".to_string())
    }

    fn persist(&self) {
        if let Some(window) = web_sys::window() {
            if let Ok(Some(storage)) = window.local_storage() {
                let json = serde_json::to_string(&self.logs).unwrap_or_else(|_| "[]".to_string());
                let _ = storage.set_item(STORAGE_KEY, &json);
            }
        }
    }
}

// グローバルなログトレースインスタンス
thread_local! {
    static LOG_TRACE: RefCell<LogTrace> = RefCell::new(LogTrace::load());
}

pub fn log(level: LogLevel, category: &str, message: &str, data: Option<serde_json::Value>) {
    let line = wasm_bindgen::JsValue::from_str(&format!("[{}] {}", category, message));
    match level {
        LogLevel::Error => web_sys::console::error_1(&line),
        LogLevel::Warn => web_sys::console::warn_1(&line),
        LogLevel::Info => web_sys::console::log_1(&line),
    }

    let entry = LogEntry {
        timestamp: js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_default(),
        level,
        category: category.to_string(),
        message: message.to_string(),
        data,
    };
    LOG_TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();
        trace.push(entry);
        trace.persist();
    });
}

pub fn log_info(category: &str, message: &str) {
    log(LogLevel::Info, category, message, None);
}

pub fn log_info_with_data(category: &str, message: &str, data: serde_json::Value) {
    log(LogLevel::Info, category, message, Some(data));
}

pub fn log_warn(category: &str, message: &str) {
    log(LogLevel::Warn, category, message, None);
}

pub fn log_error(category: &str, message: &str) {
    log(LogLevel::Error, category, message, None);
}

pub fn get_logs_json() -> String {
    LOG_TRACE.with(|trace| trace.borrow().to_json())
}

pub fn clear_logs() {
    LOG_TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();
        trace.logs.clear();
        trace.persist();
    });
}

/// ログをJSONファイルとして保存
pub fn download_logs() {
    let timestamp = js_sys::Date::new_0().to_iso_string().as_string().unwrap_or_default();
    let filename = format!("log_trace_{}.json", timestamp.replace([':', '.'], "-"));
    if let Err(e) = super::download::download_text(&get_logs_json(), &filename, "application/json") {
        log_error("download", &format!("ログの保存失敗: {:?}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            level: LogLevel::Info,
            category: "tool".to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_push_drops_oldest_at_capacity() {
        let mut trace = LogTrace::with_capacity(2);
        trace.push(entry("a"));
        trace.push(entry("b"));
        trace.push(entry("c"));
        let messages: Vec<_> = trace.logs.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["b", "c"]);
    }

    #[test]
    fn test_json_uses_lowercase_level() {
        let mut trace = LogTrace::with_capacity(4);
        let mut e = entry("failed");
        e.level = LogLevel::Warn;
        trace.push(e);
        let json = trace.to_json();
        assert!(json.contains("\"level\": \"warn\""));
        assert!(!json.contains("\"data\""));
    }
}
