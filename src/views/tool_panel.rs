//! 単一ファイルツールのパネル
//!
//! convert / compress / ocr / split / unlock で共通。
//! 選択状態は `ToolSession` に集約し、イベントハンドラはそのメソッド経由で更新する。

use leptos::*;
use web_sys::File;

use crate::components::{DropZone, FileRow, ProgressIndicator, ResultArea, ToolOptionsPanel};
use crate::models::{SelectedFile, Ticket, ToolKind, ToolOptions, ToolSession};
use crate::utils::api::{submit_tool, PendingRequest};
use crate::utils::log_trace::{log_info, log_info_with_data, log_warn};
use crate::utils::settings::load_settings;

#[component]
pub fn ToolPanel(kind: ToolKind, #[prop(into)] hidden: Signal<bool>) -> impl IntoView {
    let id = kind.id();
    let session = create_rw_signal(ToolSession::<File>::default());
    let options = create_rw_signal(ToolOptions::default());
    // 送信中のリクエスト（最大1つ）
    let pending = store_value(None::<(Ticket, PendingRequest)>);

    let abort_pending = move || {
        pending.update_value(|p| {
            if let Some((_, request)) = p.take() {
                request.cancel();
            }
        });
    };
    on_cleanup(abort_pending);

    let on_files = Callback::new(move |files: Vec<File>| {
        let Some(file) = files.into_iter().next() else { return };
        let file = SelectedFile::from_file(file);
        let name = file.name.clone();
        let limit = load_settings().max_upload_bytes;
        match session.try_update(|s| s.select(file, limit)) {
            Some(Ok(())) => {
                abort_pending();
                log_info("tool", &format!("[{}] 選択: {}", id, name));
            }
            Some(Err(e)) => log_warn("tool", &format!("[{}] {}", id, e)),
            None => {}
        }
    });

    let on_remove = Callback::new(move |_: ()| {
        abort_pending();
        session.update(|s| s.remove());
    });

    let on_cancel = Callback::new(move |_: ()| {
        log_info("tool", &format!("[{}] キャンセル", id));
        abort_pending();
    });

    let on_submit = move |_| {
        let Some((ticket, file)) = session.try_update(|s| s.begin_submit()).flatten() else { return };

        let request = match PendingRequest::start(load_settings().timeout_ms) {
            Ok(request) => request,
            Err(e) => {
                session.update(|s| {
                    s.finish(ticket, e.into_result());
                });
                return;
            }
        };
        pending.set_value(Some((ticket, request.clone())));

        let fields = options.with_untracked(|o| o.form_fields(kind));
        // パスワード等の値は記録しない
        let field_names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        log_info_with_data(
            "tool",
            &format!("[{}] 送信: {}", id, file.name),
            serde_json::json!({ "size": file.size, "fields": field_names }),
        );

        spawn_local(async move {
            let result = match submit_tool(kind, &file.handle, &fields, &request).await {
                Ok(result) => Some(result),
                Err(e) => {
                    log_warn("tool", &format!("[{}] {}", id, e));
                    e.into_result()
                }
            };
            let applied = session.try_update(|s| s.finish(ticket, result)).unwrap_or(false);
            if !applied {
                log_info("tool", &format!("[{}] 古いレスポンスを破棄", id));
            }
            pending.update_value(|p| {
                if p.as_ref().is_some_and(|(t, _)| *t == ticket) {
                    *p = None;
                }
            });
        });
    };

    view! {
        <section id=format!("{}-panel", id) class="panel" class:hidden=move || hidden.get()>
            <h2>{kind.title()}</h2>
            <p class="panel-description">{kind.description()}</p>

            <DropZone
                id=id
                hidden=Signal::derive(move || session.with(|s| !s.show_drop_prompt()))
                on_files=on_files
            />

            <div id=format!("{}-file-info", id)>
                {move || session.with(|s| s.selected().map(|f| (f.name.clone(), f.size))).map(|(name, size)| view! {
                    <FileRow name=name size=size on_remove=on_remove />
                })}
            </div>

            <ToolOptionsPanel
                kind=kind
                options=options
                hidden=Signal::derive(move || session.with(|s| !s.show_options()))
            />

            <button
                id=format!("{}-btn", id)
                class="btn-primary"
                class:hidden=move || session.with(|s| !s.submit_visible())
                on:click=on_submit
            >
                {kind.action_label()}
            </button>

            <Show when=move || session.with(|s| s.in_flight())>
                <ProgressIndicator message=kind.progress_message() on_cancel=on_cancel />
            </Show>

            <ResultArea
                id=format!("{}-result", id)
                result=create_memo(move |_| session.with(|s| s.result().cloned()))
            />
        </section>
    }
}
