//! ダウンロード・クリップボード補助

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlElement, Url};

/// `URL.createObjectURL` の結果。破棄時にrevokeする
#[derive(Debug, PartialEq, Eq)]
pub struct ObjectUrl {
    url: String,
}

impl ObjectUrl {
    pub fn from_blob(blob: &Blob) -> Result<Self, JsValue> {
        Url::create_object_url_with_blob(blob).map(|url| Self { url })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        let _ = Url::revoke_object_url(&self.url);
    }
}

pub fn text_blob(text: &str, mime: &str) -> Result<Blob, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(text));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_str_sequence_and_options(&parts, &options)
}

/// 一時的な<a download>をクリックしてダウンロードを開始
pub fn trigger_download(url: &str, filename: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("documentがありません"))?;
    let a = document.create_element("a")?;
    a.set_attribute("href", url)?;
    a.set_attribute("download", filename)?;
    let element = a
        .dyn_ref::<HtmlElement>()
        .ok_or_else(|| JsValue::from_str("HtmlElementへの変換失敗"))?;
    element.click();
    Ok(())
}

/// テキストをファイルとして保存。URLはクリック後すぐにrevokeされる
pub fn download_text(text: &str, filename: &str, mime: &str) -> Result<(), JsValue> {
    let blob = text_blob(text, mime)?;
    let url = ObjectUrl::from_blob(&blob)?;
    trigger_download(url.as_str(), filename)
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("windowがありません"))?;
    let clipboard = window.navigator().clipboard();
    JsFuture::from(clipboard.write_text(text)).await.map(|_| ())
}
