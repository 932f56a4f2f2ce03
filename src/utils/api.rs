//! バックエンドAPI呼び出し
//!
//! multipart/form-dataでPOSTし、レスポンスを `PanelResult` に変換する。
//! 送信ごとに `AbortController` を持ち、キャンセル・タイムアウトで中断できる。

use gloo::timers::callback::Timeout;
use serde::Deserialize;
use std::rc::Rc;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal, Blob, File, FormData, Request, RequestInit, Response};

use crate::models::{merge, FileResult, PanelResult, SizeStats, TextResult, ToolKind, FILE_FIELD};
use crate::utils::download::ObjectUrl;
use crate::utils::format::{filename_from_disposition, FALLBACK_FILENAME};
use crate::utils::log_trace::{log_error, log_warn};
use crate::utils::settings::load_settings;

/// abortの理由
const ABORT_TIMEOUT: &str = "timeout";
const ABORT_CANCELLED: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// 2xx以外。本文の `error` か既定メッセージ
    #[error("{0}")]
    Api(String),
    #[error("Connection error. Please try again.")]
    Connection,
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Request cancelled")]
    Cancelled,
}

impl SubmitError {
    /// エラーカードに出す結果。キャンセルは何も出さない
    pub fn into_result(self) -> Option<PanelResult> {
        match self {
            SubmitError::Cancelled => None,
            other => Some(PanelResult::Error(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// エラーレスポンス本文 `{ "error": "..." }` からメッセージを取り出す
pub fn error_message_from_body(body: Option<&str>, fallback: &str) -> String {
    body.and_then(|b| serde_json::from_str::<ApiErrorBody>(b).ok())
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn js_failure(context: &str, err: JsValue) -> SubmitError {
    log_error("api", &format!("{}: {:?}", context, err));
    SubmitError::Connection
}

/// fetch/本文読み込みの失敗を分類
fn classify_failure(signal: &AbortSignal, err: JsValue) -> SubmitError {
    if signal.aborted() {
        if signal.reason().as_string().as_deref() == Some(ABORT_TIMEOUT) {
            SubmitError::Timeout
        } else {
            SubmitError::Cancelled
        }
    } else {
        js_failure("fetch失敗", err)
    }
}

// ============================================
// 送信中リクエストのハンドル
// ============================================

/// 送信中のリクエスト。パネルごとに最大1つ保持する。
/// 最後のクローンが破棄されるとタイムアウトのタイマーも解除される
#[derive(Clone)]
pub struct PendingRequest {
    controller: AbortController,
    _timeout: Option<Rc<Timeout>>,
}

impl PendingRequest {
    /// `timeout_ms` が0より大きければ、その時間後に中断する
    pub fn start(timeout_ms: u32) -> Result<Self, SubmitError> {
        let controller = AbortController::new().map_err(|e| js_failure("AbortController作成失敗", e))?;
        let timeout = (timeout_ms > 0).then(|| {
            let timer = controller.clone();
            Rc::new(Timeout::new(timeout_ms, move || {
                if !timer.signal().aborted() {
                    timer.abort_with_reason(&JsValue::from_str(ABORT_TIMEOUT));
                }
            }))
        });
        Ok(Self {
            controller,
            _timeout: timeout,
        })
    }

    pub fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    pub fn cancel(&self) {
        if !self.controller.signal().aborted() {
            self.controller.abort_with_reason(&JsValue::from_str(ABORT_CANCELLED));
        }
    }
}

// ============================================
// 送信
// ============================================

async fn read_text(resp: &Response) -> Option<String> {
    let promise = resp.text().ok()?;
    JsFuture::from(promise).await.ok()?.as_string()
}

/// フォームをPOSTし、2xxならResponseを返す
async fn post_form(path: &str, form: &FormData, signal: &AbortSignal, fallback: &str) -> Result<Response, SubmitError> {
    let url = load_settings().endpoint_url(path);

    let opts = RequestInit::new();
    opts.set_method("POST");
    let body: &JsValue = form.as_ref();
    opts.set_body(body);
    opts.set_signal(Some(signal));

    let request = Request::new_with_str_and_init(&url, &opts)
        .map_err(|e| js_failure("Request作成失敗", e))?;

    let window = web_sys::window().ok_or(SubmitError::Connection)?;
    let resp_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| classify_failure(signal, e))?;

    let resp: Response = resp_value
        .dyn_into()
        .map_err(|e| js_failure("Responseへの変換失敗", e))?;

    if !resp.ok() {
        let body = read_text(&resp).await;
        let message = error_message_from_body(body.as_deref(), fallback);
        log_warn("api", &format!("{} -> {}: {}", path, resp.status(), message));
        return Err(SubmitError::Api(message));
    }
    Ok(resp)
}

fn header(resp: &Response, name: &str) -> Option<String> {
    resp.headers().get(name).ok().flatten()
}

/// バイナリ本文をダウンロード用URLに変換
async fn read_file_result(resp: &Response, signal: &AbortSignal) -> Result<FileResult, SubmitError> {
    let filename = filename_from_disposition(header(resp, "Content-Disposition").as_deref())
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string());
    let stats = SizeStats::from_headers(
        header(resp, "X-Original-Size").as_deref(),
        header(resp, "X-Compressed-Size").as_deref(),
    );

    let promise = resp.blob().map_err(|e| js_failure("blob()失敗", e))?;
    let blob: Blob = JsFuture::from(promise)
        .await
        .map_err(|e| classify_failure(signal, e))?
        .dyn_into()
        .map_err(|e| js_failure("Blobへの変換失敗", e))?;
    let url = ObjectUrl::from_blob(&blob).map_err(|e| js_failure("createObjectURL失敗", e))?;

    Ok(FileResult {
        url: Rc::new(url),
        filename,
        stats,
    })
}

/// OCRのJSON本文 `{ text, page_count }` を読む
async fn read_text_result(resp: &Response, signal: &AbortSignal, fallback: &str) -> Result<TextResult, SubmitError> {
    let promise = resp.json().map_err(|e| js_failure("json()失敗", e))?;
    let json = JsFuture::from(promise)
        .await
        .map_err(|e| classify_failure(signal, e))?;
    serde_wasm_bindgen::from_value(json).map_err(|e| {
        log_error("api", &format!("デシリアライズ失敗: {:?}", e));
        SubmitError::Api(fallback.to_string())
    })
}

/// 単一ファイルツールの送信
pub async fn submit_tool(
    kind: ToolKind,
    file: &File,
    fields: &[(&'static str, String)],
    request: &PendingRequest,
) -> Result<PanelResult, SubmitError> {
    let form = FormData::new().map_err(|e| js_failure("FormData作成失敗", e))?;
    form.append_with_blob_and_filename(FILE_FIELD, file, &file.name())
        .map_err(|e| js_failure("FormData追加失敗", e))?;
    for (name, value) in fields {
        form.append_with_str(name, value)
            .map_err(|e| js_failure("FormData追加失敗", e))?;
    }

    let signal = request.signal();
    let resp = post_form(kind.endpoint(), &form, &signal, kind.failure_message()).await?;
    if kind.returns_text() {
        read_text_result(&resp, &signal, kind.failure_message())
            .await
            .map(PanelResult::Text)
    } else {
        read_file_result(&resp, &signal).await.map(PanelResult::File)
    }
}

/// マージの送信。同じフィールド名でリスト順に追加する
pub async fn submit_merge(files: &[File], request: &PendingRequest) -> Result<PanelResult, SubmitError> {
    let form = FormData::new().map_err(|e| js_failure("FormData作成失敗", e))?;
    for file in files {
        form.append_with_blob_and_filename(merge::FIELD, file, &file.name())
            .map_err(|e| js_failure("FormData追加失敗", e))?;
    }

    let signal = request.signal();
    let resp = post_form(merge::ENDPOINT, &form, &signal, merge::FAILURE_MESSAGE).await?;
    read_file_result(&resp, &signal).await.map(PanelResult::File)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_json_body() {
        assert_eq!(
            error_message_from_body(Some(r#"{"error": "bad password"}"#), "Processing failed"),
            "bad password"
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message_from_body(None, "Merge failed"), "Merge failed");
        assert_eq!(error_message_from_body(Some("<html>502</html>"), "Merge failed"), "Merge failed");
        assert_eq!(error_message_from_body(Some(r#"{"error": ""}"#), "Processing failed"), "Processing failed");
        assert_eq!(error_message_from_body(Some(r#"{"detail": "x"}"#), "Processing failed"), "Processing failed");
    }

    #[test]
    fn test_error_display_texts() {
        assert_eq!(SubmitError::Connection.to_string(), "Connection error. Please try again.");
        assert_eq!(
            SubmitError::Api("bad password".to_string()).into_result(),
            Some(PanelResult::Error("bad password".to_string()))
        );
        assert_eq!(
            SubmitError::Connection.into_result(),
            Some(PanelResult::Error("Connection error. Please try again.".to_string()))
        );
        assert_eq!(SubmitError::Cancelled.into_result(), None);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn timeout_abort_is_classified_as_timeout() {
        let request = PendingRequest::start(0).unwrap();
        request
            .controller
            .abort_with_reason(&JsValue::from_str(ABORT_TIMEOUT));

        let err = classify_failure(&request.signal(), JsValue::NULL);
        assert_eq!(err, SubmitError::Timeout);
        assert_eq!(
            err.into_result(),
            Some(PanelResult::Error("Request timed out. Please try again.".to_string()))
        );
    }

    #[wasm_bindgen_test]
    fn user_cancel_shows_nothing() {
        let request = PendingRequest::start(0).unwrap();
        request.cancel();

        let err = classify_failure(&request.signal(), JsValue::NULL);
        assert_eq!(err, SubmitError::Cancelled);
        assert_eq!(err.into_result(), None);
    }

    #[wasm_bindgen_test]
    async fn timer_aborts_with_timeout_reason() {
        let request = PendingRequest::start(10).unwrap();
        gloo::timers::future::TimeoutFuture::new(50).await;

        assert!(request.signal().aborted());
        assert_eq!(classify_failure(&request.signal(), JsValue::NULL), SubmitError::Timeout);
    }

    #[wasm_bindgen_test]
    async fn dropping_request_cancels_timer() {
        let request = PendingRequest::start(10).unwrap();
        let signal = request.signal();
        drop(request);
        gloo::timers::future::TimeoutFuture::new(50).await;

        assert!(!signal.aborted());
    }

    #[wasm_bindgen_test]
    fn failure_without_abort_is_connection_error() {
        let request = PendingRequest::start(0).unwrap();
        let err = classify_failure(&request.signal(), JsValue::from_str("TypeError: Failed to fetch"));
        assert_eq!(err, SubmitError::Connection);
    }
}
