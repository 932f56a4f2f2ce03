//! 結果表示コンポーネント
//!
//! ファイル結果・抽出テキスト・エラーの各カードと進捗表示。
//! レスポンス由来の文字列はすべてテキストノード／プロパティとして挿入する。

use gloo::timers::future::TimeoutFuture;
use leptos::*;

use crate::models::{FileResult, PanelResult, TextResult};
use crate::utils::download::{copy_to_clipboard, download_text};
use crate::utils::format::{format_size, pages_label};
use crate::utils::log_trace::{log_error, log_info, log_warn};

/// 「Copied!」表示を戻すまでの時間
const COPY_FEEDBACK_MS: u32 = 2000;
const TEXT_DOWNLOAD_NAME: &str = "extracted_text.txt";

#[component]
pub fn ProgressIndicator(
    message: &'static str,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <div class="progress">
            <div class="spinner"></div>
            <p class="progress-text">{message}</p>
            <button class="btn-cancel" on:click=move |_| on_cancel.call(())>"Cancel"</button>
        </div>
    }
}

/// 結果エリア。結果が差し替わると古いカード（とそのURL）は破棄される
#[component]
pub fn ResultArea(
    id: String,
    #[prop(into)] result: Signal<Option<PanelResult>>,
) -> impl IntoView {
    view! {
        <div id=id class="result" class:hidden=move || result.with(Option::is_none)>
            {move || result.get().map(|r| match r {
                PanelResult::File(file) => view! { <FileResultCard result=file /> }.into_view(),
                PanelResult::Text(text) => view! { <TextResultCard result=text /> }.into_view(),
                PanelResult::Error(message) => view! { <ErrorCard message=message /> }.into_view(),
            })}
        </div>
    }
}

#[component]
pub fn ErrorCard(message: String) -> impl IntoView {
    view! {
        <div class="result-error">
            <span class="error-icon">"✗"</span>
            <span class="error-message">{message}</span>
        </div>
    }
}

#[component]
pub fn FileResultCard(result: FileResult) -> impl IntoView {
    let href = result.url.as_str().to_string();
    let filename = result.filename.clone();

    view! {
        <div class="result-success">
            <div class="check-icon">"✓"</div>
            <p>"Your file is ready!"</p>
            {result.stats.map(|stats| view! {
                <div class="compress-stats">
                    <div class="stat">
                        <div class="stat-value">{format_size(stats.original)}</div>
                        <div class="stat-label">"Original"</div>
                    </div>
                    <div class="stat">
                        <div class="stat-value">{format_size(stats.processed)}</div>
                        <div class="stat-label">"Compressed"</div>
                    </div>
                    <div class="stat">
                        <div class="stat-value">{format!("{}%", stats.saved_percent())}</div>
                        <div class="stat-label">"Saved"</div>
                    </div>
                </div>
            })}
            <a href=href download=filename.clone() class="btn-download">
                "Download " {filename}
            </a>
        </div>
    }
}

#[component]
pub fn TextResultCard(result: TextResult) -> impl IntoView {
    let (copied, set_copied) = create_signal(false);
    let pages = pages_label(result.page_count);
    let text = store_value(result.text);

    let on_copy = move |_| {
        let text = text.get_value();
        spawn_local(async move {
            match copy_to_clipboard(&text).await {
                Ok(()) => {
                    set_copied.set(true);
                    TimeoutFuture::new(COPY_FEEDBACK_MS).await;
                    set_copied.set(false);
                }
                Err(e) => log_warn("download", &format!("クリップボードへのコピー失敗: {:?}", e)),
            }
        });
    };

    let on_download = move |_| {
        let result = text.with_value(|t| download_text(t, TEXT_DOWNLOAD_NAME, "text/plain"));
        match result {
            Ok(()) => log_info("download", TEXT_DOWNLOAD_NAME),
            Err(e) => log_error("download", &format!("テキストの保存失敗: {:?}", e)),
        }
    };

    view! {
        <div class="result-success">
            <div class="check-icon">"✓"</div>
            <p>{format!("Text extracted from {}!", pages)}</p>
        </div>
        <div class="ocr-output">
            <div class="ocr-toolbar">
                <button class="btn-secondary copy-text-btn" on:click=on_copy>
                    {move || if copied.get() { "Copied!" } else { "Copy Text" }}
                </button>
                <button class="btn-secondary download-text-btn" on:click=on_download>
                    "Download .txt"
                </button>
            </div>
            <textarea class="ocr-textarea" readonly prop:value=move || text.get_value()></textarea>
            <p class="page-count">{format!("{} processed", pages)}</p>
        </div>
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn mount_host<F, N>(f: F) -> web_sys::HtmlElement
    where
        F: FnOnce() -> N + 'static,
        N: IntoView,
    {
        let document = web_sys::window().unwrap().document().unwrap();
        let host: web_sys::HtmlElement = document.create_element("div").unwrap().unchecked_into();
        document.body().unwrap().append_child(&host).unwrap();
        mount_to(host.clone(), f);
        host
    }

    #[wasm_bindgen_test]
    fn error_card_shows_markup_as_text() {
        let host = mount_host(|| view! { <ErrorCard message="<b>bad password</b>".to_string() /> });
        assert!(host.query_selector("b").unwrap().is_none());
        assert!(host.text_content().unwrap().contains("<b>bad password</b>"));
    }

    #[wasm_bindgen_test]
    fn text_card_keeps_script_out_of_dom() {
        let result = TextResult {
            text: "<script>alert(1)</script>".to_string(),
            page_count: 2,
        };
        let host = mount_host(move || view! { <TextResultCard result=result /> });
        assert!(host.query_selector("script").unwrap().is_none());

        let area: web_sys::HtmlTextAreaElement =
            host.query_selector("textarea").unwrap().unwrap().unchecked_into();
        assert_eq!(area.value(), "<script>alert(1)</script>");
        assert!(host.text_content().unwrap().contains("Text extracted from 2 pages!"));
    }

    #[wasm_bindgen_test]
    fn connection_error_is_rendered() {
        let result = crate::utils::api::SubmitError::Connection.into_result();
        let host = mount_host(move || view! { <ResultArea id="t-result".to_string() result=Signal::derive(move || result.clone()) /> });
        assert!(host.text_content().unwrap().contains("Connection error. Please try again."));
    }

    #[wasm_bindgen_test]
    fn timeout_error_is_rendered() {
        let result = crate::utils::api::SubmitError::Timeout.into_result();
        let host = mount_host(move || view! { <ResultArea id="t-timeout".to_string() result=Signal::derive(move || result.clone()) /> });
        assert!(host.text_content().unwrap().contains("Request timed out. Please try again."));
    }

    #[wasm_bindgen_test]
    fn cancelled_request_renders_no_card() {
        let result = crate::utils::api::SubmitError::Cancelled.into_result();
        let host = mount_host(move || view! { <ResultArea id="t-cancel".to_string() result=Signal::derive(move || result.clone()) /> });
        assert!(host.query_selector(".result-error").unwrap().is_none());
        assert!(host.query_selector(".result.hidden").unwrap().is_some());
    }
}
