//! 選択済みファイルの表示行

use leptos::*;

use crate::utils::format::format_size;

/// ファイル名・サイズ・削除ボタン。マージ一覧では順番も表示する
#[component]
pub fn FileRow(
    name: String,
    size: u64,
    #[prop(into)] on_remove: Callback<()>,
    #[prop(optional)] order: Option<usize>,
) -> impl IntoView {
    let class = if order.is_some() { "file-list-item" } else { "file-info" };

    view! {
        <div class=class>
            <div class="file-details">
                {order.map(|n| view! { <span class="file-order">{n}</span> })}
                <span class="file-name">{name}</span>
                <span class="file-size">{format_size(size)}</span>
            </div>
            <button class="btn-remove" title="Remove" on:click=move |_| on_remove.call(())>"×"</button>
        </div>
    }
}
