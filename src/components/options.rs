//! ツール別オプション入力
//!
//! 値は `ToolOptions` シグナルに保持し、送信時に読み取る

use leptos::*;

use crate::models::{CompressQuality, SplitMode, ToolKind, ToolOptions, OCR_LANGUAGES};

#[component]
pub fn ToolOptionsPanel(
    kind: ToolKind,
    options: RwSignal<ToolOptions>,
    #[prop(into)] hidden: Signal<bool>,
) -> impl IntoView {
    let body = match kind {
        ToolKind::Convert => return ().into_view(),
        ToolKind::Compress => view! { <CompressOptions options=options /> }.into_view(),
        ToolKind::Ocr => view! { <OcrOptions options=options /> }.into_view(),
        ToolKind::Split => view! { <SplitOptions options=options /> }.into_view(),
        ToolKind::Unlock => view! { <UnlockOptions options=options /> }.into_view(),
    };

    view! {
        <div id=format!("{}-options", kind.id()) class="tool-options" class:hidden=move || hidden.get()>
            {body}
        </div>
    }
    .into_view()
}

#[component]
fn CompressOptions(options: RwSignal<ToolOptions>) -> impl IntoView {
    view! {
        <div class="option-group">
            <span class="option-label">"Compression level"</span>
            {CompressQuality::ALL.into_iter().map(|quality| view! {
                <label class="radio-label">
                    <input type="radio" name="quality" value=quality.as_str()
                        prop:checked=move || options.with(|o| o.quality == quality)
                        on:change=move |_| options.update(|o| o.quality = quality)
                    />
                    {quality.label()}
                </label>
            }).collect_view()}
        </div>
    }
}

#[component]
fn OcrOptions(options: RwSignal<ToolOptions>) -> impl IntoView {
    view! {
        <div class="option-group">
            <label class="option-label" for="ocr-language">"Document language"</label>
            <select id="ocr-language"
                on:change=move |ev| {
                    let language = event_target_value(&ev);
                    options.update(|o| o.language = language);
                }
            >
                {OCR_LANGUAGES.iter().map(|(code, name)| view! {
                    <option value=*code selected=move || options.with(|o| o.language == *code)>
                        {*name}
                    </option>
                }).collect_view()}
            </select>
        </div>
    }
}

#[component]
fn SplitOptions(options: RwSignal<ToolOptions>) -> impl IntoView {
    let mode_radio = move |mode: SplitMode, label: &'static str| view! {
        <label class="radio-label">
            <input type="radio" name="split-mode" value=mode.as_str()
                prop:checked=move || options.with(|o| o.split_mode == mode)
                on:change=move |_| options.update(|o| o.split_mode = mode)
            />
            {label}
        </label>
    };

    view! {
        <div class="option-group">
            {mode_radio(SplitMode::All, "Extract every page")}
            {mode_radio(SplitMode::Range, "Select a page range")}
            // rangeの時だけ表示
            <input type="text" id="split-pages" placeholder="e.g. 1-3, 5, 8-10"
                class:hidden=move || options.with(|o| o.split_mode != SplitMode::Range)
                prop:value=move || options.with(|o| o.pages.clone())
                on:input=move |ev| {
                    let pages = event_target_value(&ev);
                    options.update(|o| o.pages = pages);
                }
            />
        </div>
    }
}

#[component]
fn UnlockOptions(options: RwSignal<ToolOptions>) -> impl IntoView {
    view! {
        <div class="option-group">
            <label class="option-label" for="unlock-password">"PDF password"</label>
            <input type="password" id="unlock-password" autocomplete="off"
                prop:value=move || options.with(|o| o.password.clone())
                on:input=move |ev| {
                    let password = event_target_value(&ev);
                    options.update(|o| o.password = password);
                }
            />
        </div>
    }
}
