//! マージパネル
//!
//! 複数ファイルを順番付きリストで保持し、2件以上で送信可能にする

use leptos::html::Input;
use leptos::*;
use web_sys::File;

use crate::components::{DropZone, FileRow, ProgressIndicator, ResultArea};
use crate::models::{merge, MergeSession, SelectedFile, Ticket};
use crate::utils::api::{submit_merge, PendingRequest};
use crate::utils::log_trace::{log_info, log_info_with_data, log_warn};
use crate::utils::settings::load_settings;

#[component]
pub fn MergePanel(#[prop(into)] hidden: Signal<bool>) -> impl IntoView {
    let session = create_rw_signal(MergeSession::<File>::default());
    let pending = store_value(None::<(Ticket, PendingRequest)>);
    let input_ref = create_node_ref::<Input>();

    let abort_pending = move || {
        pending.update_value(|p| {
            if let Some((_, request)) = p.take() {
                request.cancel();
            }
        });
    };
    on_cleanup(abort_pending);

    let on_files = Callback::new(move |files: Vec<File>| {
        let limit = load_settings().max_upload_bytes;
        let files = files.into_iter().map(SelectedFile::from_file);
        let Some(outcome) = session.try_update(|s| s.add_files(files, limit)) else { return };
        for rejected in &outcome.rejected {
            log_warn("merge", &rejected.to_string());
        }
        if outcome.accepted > 0 {
            abort_pending();
            log_info("merge", &format!("{}件追加", outcome.accepted));
        }
    });

    let remove_at = move |index: usize| {
        if session.try_update(|s| s.remove_at(index)).flatten().is_some() {
            abort_pending();
        }
    };

    let clear_all = move |_| {
        abort_pending();
        session.update(|s| s.clear_all());
    };

    let add_more = move |_| {
        if let Some(input) = input_ref.get() {
            input.click();
        }
    };

    let on_cancel = Callback::new(move |_: ()| {
        log_info("merge", "キャンセル");
        abort_pending();
    });

    let on_submit = move |_| {
        let Some((ticket, files)) = session.try_update(|s| s.begin_submit()).flatten() else { return };

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

        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        log_info_with_data("merge", "送信", serde_json::json!({ "files": names }));
        let handles: Vec<File> = files.into_iter().map(|f| f.handle).collect();

        spawn_local(async move {
            let result = match submit_merge(&handles, &request).await {
                Ok(result) => Some(result),
                Err(e) => {
                    log_warn("merge", &e.to_string());
                    e.into_result()
                }
            };
            let applied = session.try_update(|s| s.finish(ticket, result)).unwrap_or(false);
            if !applied {
                log_info("merge", "古いレスポンスを破棄");
            }
            pending.update_value(|p| {
                if p.as_ref().is_some_and(|(t, _)| *t == ticket) {
                    *p = None;
                }
            });
        });
    };

    let rows = create_memo(move |_| {
        session.with(|s| s.files().iter().map(|f| (f.name.clone(), f.size)).collect::<Vec<_>>())
    });

    view! {
        <section id="merge-panel" class="panel" class:hidden=move || hidden.get()>
            <h2>"Merge PDF"</h2>
            <p class="panel-description">"Combine several PDFs into one, in the order listed."</p>

            <DropZone
                id=merge::ID
                hidden=Signal::derive(move || session.with(|s| !s.show_drop_prompt()))
                on_files=on_files
                multiple=true
                input_ref=input_ref
            />

            <div id="merge-file-list" class="file-list" class:hidden=move || rows.with(Vec::is_empty)>
                {move || rows.get().into_iter().enumerate().map(|(index, (name, size))| view! {
                    <FileRow
                        name=name
                        size=size
                        order=index + 1
                        on_remove=Callback::new(move |_: ()| remove_at(index))
                    />
                }).collect_view()}
                <div class="file-list-actions">
                    <button class="btn-add-more" on:click=add_more>"+ Add more files"</button>
                    <button class="btn-clear-all" on:click=clear_all>"Clear all"</button>
                </div>
            </div>

            <button
                id="merge-btn"
                class="btn-primary"
                class:hidden=move || session.with(|s| !s.submit_visible())
                on:click=on_submit
            >
                "Merge PDFs"
            </button>

            <Show when=move || session.with(|s| s.in_flight())>
                <ProgressIndicator message=merge::PROGRESS_MESSAGE on_cancel=on_cancel />
            </Show>

            <ResultArea
                id="merge-result".to_string()
                result=create_memo(move |_| session.with(|s| s.result().cloned()))
            />
        </section>
    }
}
