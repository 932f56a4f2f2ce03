//! 設定（API接続先・タイムアウト・アップロード上限）
//!
//! LocalStorageのJSONから読み込む。`?api=xxx` による接続先の上書きは
//! 開いているページの間だけ有効で、保存はしない。

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

const SETTINGS_KEY: &str = "pdf_toolkit_settings";

pub const DEFAULT_TIMEOUT_MS: u32 = 300_000;
/// バックエンドのMAX_CONTENT_LENGTHと同じ50MB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// 空なら同一オリジン。
    /// 別オリジンの場合、バックエンドがCORSで公開しているのは `X-*` のサイズヘッダーだけなので
    /// Content-Dispositionは読めず、保存名は常に "download" になる
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 0ならタイムアウト無し
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u32,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_api_base() -> String {
    // ビルド時に埋め込み
    option_env!("PDF_TOOLKIT_API_BASE").unwrap_or("").to_string()
}

fn default_timeout_ms() -> u32 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    /// 接続先とパスをスラッシュ1つで結合
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.api_base.trim().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

// `?api=` で指定された接続先（このページ限り）
thread_local! {
    static API_OVERRIDE: RefCell<Option<String>> = RefCell::new(None);
}

/// 保存済みの設定に、ページ限りの接続先を重ねる
fn with_api_override(mut settings: Settings, api_override: Option<String>) -> Settings {
    if let Some(api_base) = api_override {
        settings.api_base = api_base;
    }
    settings
}

/// 保存済みの設定だけを読み込み（無ければ既定値）
fn load_stored_settings() -> Settings {
    let stored = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(SETTINGS_KEY).ok().flatten());
    stored
        .and_then(|json| serde_json::from_str(&json).ok())
        .unwrap_or_default()
}

/// 設定を読み込み（無ければ既定値）。`?api=` の上書きを含む
pub fn load_settings() -> Settings {
    let api_override = API_OVERRIDE.with(|o| o.borrow().clone());
    with_api_override(load_stored_settings(), api_override)
}

/// クエリ文字列から `api` パラメータ（エンコード済み）を取り出す
fn api_param(search: &str) -> Option<&str> {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| pair.strip_prefix("api="))
        .filter(|v| !v.is_empty())
}

/// クエリ文字列の接続先をこのページ限りで適用する。LocalStorageには書かない
fn apply_api_param(search: &str) -> Option<String> {
    let encoded = api_param(search)?;
    let decoded = js_sys::decode_uri_component(encoded).ok()?.as_string()?;
    API_OVERRIDE.with(|o| *o.borrow_mut() = Some(decoded.clone()));
    Some(decoded)
}

/// URLパラメータから接続先を読み込み、アドレスバーから消す
pub fn init_settings_from_url_params() -> Option<String> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let decoded = apply_api_param(&search)?;

    let pathname = window.location().pathname().ok()?;
    let hash = window.location().hash().ok().unwrap_or_default();
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(
            &JsValue::NULL,
            "",
            Some(&format!("{}{}", pathname, hash)),
        );
    }
    Some(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_base(base: &str) -> Settings {
        Settings {
            api_base: base.to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_endpoint_url_same_origin() {
        assert_eq!(with_base("").endpoint_url("/api/convert"), "/api/convert");
    }

    #[test]
    fn test_endpoint_url_joins_single_slash() {
        assert_eq!(
            with_base("https://pdf.example.com/").endpoint_url("/api/merge"),
            "https://pdf.example.com/api/merge"
        );
        assert_eq!(
            with_base("https://pdf.example.com/v1").endpoint_url("api/ocr"),
            "https://pdf.example.com/v1/api/ocr"
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"timeout_ms": 1000}"#).unwrap();
        assert_eq!(settings.timeout_ms, 1000);
        assert_eq!(settings.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(settings.api_base, Settings::default().api_base);
    }

    #[test]
    fn test_api_param() {
        assert_eq!(api_param("?api=https%3A%2F%2Fx.dev"), Some("https%3A%2F%2Fx.dev"));
        assert_eq!(api_param("?lang=en&api=http%3A%2F%2Flocalhost%3A5000"), Some("http%3A%2F%2Flocalhost%3A5000"));
        assert_eq!(api_param("?api="), None);
        assert_eq!(api_param("?gas=abc"), None);
        assert_eq!(api_param(""), None);
    }

    #[test]
    fn test_api_override_replaces_only_api_base() {
        let stored = Settings {
            api_base: "https://pdf.example.com".to_string(),
            timeout_ms: 1000,
            max_upload_bytes: 10,
        };
        let settings = with_api_override(stored.clone(), Some("http://localhost:5000".to_string()));
        assert_eq!(settings.api_base, "http://localhost:5000");
        assert_eq!(settings.timeout_ms, 1000);
        assert_eq!(settings.max_upload_bytes, 10);
        assert_eq!(with_api_override(stored.clone(), None), stored);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn storage() -> web_sys::Storage {
        web_sys::window().unwrap().local_storage().unwrap().unwrap()
    }

    #[wasm_bindgen_test]
    fn api_param_is_not_persisted() {
        storage().remove_item(SETTINGS_KEY).unwrap();

        let applied = apply_api_param("?api=https%3A%2F%2Fother.example");
        assert_eq!(applied.as_deref(), Some("https://other.example"));
        assert_eq!(load_settings().api_base, "https://other.example");

        assert!(storage().get_item(SETTINGS_KEY).unwrap().is_none());
        assert_eq!(load_stored_settings().api_base, Settings::default().api_base);

        API_OVERRIDE.with(|o| *o.borrow_mut() = None);
    }
}
