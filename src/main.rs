use leptos::*;

mod components;
mod models;
mod utils;
mod views;

use models::ToolKind;
use utils::log_trace::{clear_logs, download_logs, log_info};
use utils::settings::init_settings_from_url_params;
use views::{MergePanel, ToolPanel};

// ============================================
// メインアプリ（タブ切り替え）
// ============================================

#[derive(Clone, Copy, PartialEq)]
enum Tab {
    Tool(ToolKind),
    Merge,
}

const TABS: [Tab; 6] = [
    Tab::Tool(ToolKind::Convert),
    Tab::Tool(ToolKind::Compress),
    Tab::Merge,
    Tab::Tool(ToolKind::Split),
    Tab::Tool(ToolKind::Ocr),
    Tab::Tool(ToolKind::Unlock),
];

impl Tab {
    fn label(self) -> &'static str {
        match self {
            Tab::Tool(ToolKind::Convert) => "PDF to Word",
            Tab::Tool(ToolKind::Compress) => "Compress",
            Tab::Merge => "Merge",
            Tab::Tool(ToolKind::Split) => "Split",
            Tab::Tool(ToolKind::Ocr) => "OCR",
            Tab::Tool(ToolKind::Unlock) => "Unlock",
        }
    }
}

#[component]
fn App() -> impl IntoView {
    let (current_tab, set_current_tab) = create_signal(Tab::Tool(ToolKind::Convert));

    view! {
        <div class="app">
            <header class="app-header">
                <h1>"PDF Toolkit"</h1>
                <nav class="tabs">
                    {TABS.into_iter().map(|tab| view! {
                        <button
                            class=move || if current_tab.get() == tab { "tab active" } else { "tab" }
                            on:click=move |_| set_current_tab.set(tab)
                        >
                            {tab.label()}
                        </button>
                    }).collect_view()}
                </nav>
            </header>

            // 非表示のパネルも選択状態を保つためマウントしたまま
            <main class="container">
                {ToolKind::ALL.into_iter().map(|kind| view! {
                    <ToolPanel kind=kind hidden=Signal::derive(move || current_tab.get() != Tab::Tool(kind)) />
                }).collect_view()}
                <MergePanel hidden=Signal::derive(move || current_tab.get() != Tab::Merge) />
            </main>

            <LogFooter />
        </div>
    }
}

/// 動作ログの保存・消去
#[component]
fn LogFooter() -> impl IntoView {
    view! {
        <footer class="app-footer">
            <span class="footer-note">"Files are processed by the server and not stored."</span>
            <button class="btn-link" on:click=move |_| download_logs()>"Download log"</button>
            <button class="btn-link" on:click=move |_| clear_logs()>"Clear log"</button>
        </footer>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    if let Some(api_base) = init_settings_from_url_params() {
        log_info("settings", &format!("API接続先: {}", api_base));
    }
    mount_to_body(App);
}
