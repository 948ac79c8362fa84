//! Chat Page

use leptos::prelude::*;
use leptos::task::spawn_local;

use finmentor_core::{AnalysisMode, ChatSession, PendingRequest, RequestKind};

use crate::api;
use crate::components::MessageBubble;

#[component]
pub fn ChatPage() -> impl IntoView {
    let session = RwSignal::new(ChatSession::new());
    let (input, set_input) = signal(String::new());
    let pending = move || session.with(ChatSession::is_pending);

    let dispatch = move |request: PendingRequest| {
        spawn_local(async move {
            let reply = match &request.kind {
                RequestKind::Query { message, history } => {
                    api::send_chat(request.mode, message, history).await
                }
                RequestKind::MarketUpdate => api::market_update().await,
            };
            // No-op if the session was reset meanwhile
            session.update(|s| {
                s.complete(&request, reply);
            });
        });
    };

    let send = move || {
        let text = input.get_untracked();
        let mut request = None;
        session.update(|s| request = s.begin_send(&text));
        if let Some(request) = request {
            set_input.set(String::new());
            dispatch(request);
        }
    };

    let market_update = move |_| {
        let mut request = None;
        session.update(|s| request = s.begin_market_update());
        if let Some(request) = request {
            dispatch(request);
        }
    };

    let start_over = move |_| session.update(ChatSession::reset);

    view! {
        <div class="chat">
            <header class="chat-header">
                <h3>"AI Chat"</h3>
                <div class="actions">
                    <button on:click=market_update disabled=pending>
                        "Market Update"
                    </button>
                    <button on:click=start_over disabled=pending>
                        "New Chat"
                    </button>
                </div>
            </header>

            <div class="messages">
                <For
                    each=move || {
                        session.with(|s| {
                            s.transcript().messages().iter().cloned().enumerate().collect::<Vec<_>>()
                        })
                    }
                    key=|(i, msg)| (*i, msg.timestamp)
                    children=move |(_, msg)| view! { <MessageBubble message=msg /> }
                />
                <Show when=pending>
                    <div class="message loading">"FinMentor AI is thinking..."</div>
                </Show>
            </div>

            <div class="mode-selector">
                <span>"Analysis Mode:"</span>
                {AnalysisMode::ALL
                    .into_iter()
                    .map(|mode| view! {
                        <button
                            class:active=move || session.with(|s| s.mode() == mode)
                            on:click=move |_| session.update(|s| s.set_mode(mode))
                        >
                            {mode.label()}
                        </button>
                    })
                    .collect_view()}
            </div>

            <div class="input-area">
                <input
                    type="text"
                    placeholder="Ask a financial question..."
                    prop:value=move || input.get()
                    on:input=move |ev| set_input.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" && !ev.shift_key() {
                            ev.prevent_default();
                            send();
                        }
                    }
                    disabled=pending
                />
                <button
                    on:click=move |_| send()
                    disabled=move || pending() || input.with(|i| i.trim().is_empty())
                >
                    {move || if pending() { "..." } else { "Send" }}
                </button>
            </div>
        </div>
    }
}
