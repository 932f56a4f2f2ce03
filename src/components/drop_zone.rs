//! ドロップゾーンコンポーネント
//!
//! ドラッグ&ドロップとクリックでのファイル選択を受け付ける

use leptos::html::Input;
use leptos::*;
use web_sys::{DragEvent, File};

use crate::models::ACCEPTED_EXTENSION;
use crate::utils::file_list_to_vec;

#[component]
pub fn DropZone(
    /// `{id}-drop` / `{id}-input` のid接頭辞
    id: &'static str,
    #[prop(into)] hidden: Signal<bool>,
    #[prop(into)] on_files: Callback<Vec<File>>,
    #[prop(optional)] multiple: bool,
    /// 「ファイルを追加」ボタンなど外部から選択ダイアログを開く場合に渡す
    #[prop(optional)] input_ref: Option<NodeRef<Input>>,
) -> impl IntoView {
    let input_ref = input_ref.unwrap_or_else(create_node_ref::<Input>);
    let (dragging, set_dragging) = create_signal(false);

    let on_drag_over = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(true);
    };

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) else { return };
        let files = file_list_to_vec(&files);
        if !files.is_empty() {
            on_files.call(files);
        }
    };

    let open_picker = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_change = move |_| {
        let Some(input) = input_ref.get() else { return };
        let Some(files) = input.files() else { return };
        let files = file_list_to_vec(&files);
        // 同じファイルを再選択してもchangeが発火するようにリセット
        input.set_value("");
        if !files.is_empty() {
            on_files.call(files);
        }
    };

    let prompt = if multiple { "Drop your PDF files here" } else { "Drop your PDF here" };

    view! {
        <div
            id=format!("{}-drop", id)
            class="drop-zone"
            class:dragover=move || dragging.get()
            class:hidden=move || hidden.get()
            on:dragenter=on_drag_over
            on:dragover=on_drag_over
            on:dragleave=on_drag_leave
            on:drop=on_drop
            on:click=open_picker
        >
            <div class="drop-icon">"📄"</div>
            <p class="drop-text">{prompt}</p>
            <p class="drop-hint">"or click to browse"</p>
        </div>
        <input
            type="file"
            id=format!("{}-input", id)
            class="hidden"
            accept=ACCEPTED_EXTENSION
            multiple=multiple
            node_ref=input_ref
            on:change=on_change
        />
    }
}
