/// Popup UI: lists hidden videos, offers per-row removal and the global
/// show-hidden toggle.

use crate::messages::PageMessage;
use crate::storage::{HIDDEN_VIDEOS_KEY, HiddenList, SHOW_HIDDEN_KEY, normalize_entries};
use crate::video_data::{StoredEntry, VideoRecord};
use patternfly_yew::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/popup_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    fn addStorageListener(callback: &js_sys::Function);

    fn sendMessageToFeedTabs(message: JsValue);
}

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Error(String),
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let hidden = use_state(HiddenList::new);
    let show_hidden = use_state(|| false);

    // Load flag and list on mount, and reload the list whenever the stored
    // hidden set changes, regardless of which surface changed it.
    {
        let state = state.clone();
        let hidden = hidden.clone();
        let show_hidden = show_hidden.clone();

        use_effect_with((), move |_| {
            {
                let state = state.clone();
                let hidden = hidden.clone();
                spawn_local(async move {
                    show_hidden.set(load_show_hidden().await);
                    match load_hidden_list().await {
                        Ok(list) => {
                            hidden.set(list);
                            state.set(PopupState::Idle);
                        }
                        Err(e) => state.set(PopupState::Error(format!("Failed to load: {e}"))),
                    }
                });
            }

            let listener =
                Closure::<dyn FnMut(JsValue, JsValue)>::new(move |changes: JsValue, area: JsValue| {
                    if area.as_string().as_deref() != Some("sync") {
                        return;
                    }
                    let changed =
                        js_sys::Reflect::has(&changes, &JsValue::from_str(HIDDEN_VIDEOS_KEY))
                            .unwrap_or(false);
                    if changed {
                        let hidden = hidden.clone();
                        spawn_local(async move {
                            if let Ok(list) = load_hidden_list().await {
                                hidden.set(list);
                            }
                        });
                    }
                });
            addStorageListener(listener.as_ref().unchecked_ref());
            // Listener lives for the whole popup lifetime.
            listener.forget();

            || ()
        });
    }

    // Show-hidden toggle: persist, then tell the feed page.
    let on_toggle = {
        let state = state.clone();
        let show_hidden = show_hidden.clone();

        Callback::from(move |e: Event| {
            let Some(input) = e.target_dyn_into::<HtmlInputElement>() else {
                return;
            };
            let value = input.checked();
            show_hidden.set(value);

            let state = state.clone();
            spawn_local(async move {
                match set_show_hidden(value).await {
                    Ok(()) => {
                        let message = if value {
                            PageMessage::UnhideAll
                        } else {
                            PageMessage::RehideAll
                        };
                        send_page_message(&message);
                    }
                    Err(e) => state.set(PopupState::Error(format!("Failed to save: {e}"))),
                }
            });
        })
    };

    // Per-row removal: rewrite the stored list, then tell the feed page.
    let on_remove = {
        let state = state.clone();
        let hidden = hidden.clone();

        Callback::from(move |video_id: String| {
            let state = state.clone();
            let hidden = hidden.clone();

            spawn_local(async move {
                let result = async {
                    let mut list = load_hidden_list().await?;
                    list.remove(&video_id);
                    save_hidden_list(&list).await?;
                    Ok::<HiddenList, String>(list)
                }
                .await;

                match result {
                    Ok(list) => {
                        hidden.set(list);
                        send_page_message(&PageMessage::PermanentUnhide { video_id });
                    }
                    Err(e) => state.set(PopupState::Error(format!("Failed to remove: {e}"))),
                }
            });
        })
    };

    html! {
        <div class="popup-container">
            <h1 class="popup-title">{"Vid Hider"}</h1>

            <label class="toggle-row">
                <input
                    type="checkbox"
                    checked={*show_hidden}
                    onchange={on_toggle}
                />
                {" Show hidden videos"}
            </label>

            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading hidden videos..."}</p>
                    </div>
                },
                PopupState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PopupState::Idle => html! {}
            }}

            if *state != PopupState::Loading {
                if hidden.is_empty() {
                    <p class="empty-state">{"No hidden videos."}</p>
                } else {
                    <div class="hidden-list">
                        {for hidden.videos.iter().map(|video| html! {
                            <HiddenRow
                                key={video.id.clone()}
                                video={video.clone()}
                                on_remove={on_remove.clone()}
                            />
                        })}
                    </div>
                }
            }

            <p class="footer-popup">
                {format!("{} hidden", hidden.videos.len())}
            </p>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct HiddenRowProps {
    video: VideoRecord,
    on_remove: Callback<String>,
}

#[function_component(HiddenRow)]
fn hidden_row(props: &HiddenRowProps) -> Html {
    let video = &props.video;
    let href = if video.url.is_empty() {
        "#".to_string()
    } else {
        video.url.clone()
    };

    let meta: Vec<&str> = [video.author.as_str(), video.upload_time.as_str()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();

    html! {
        <div class="video-item">
            <div class="video-info">
                <a
                    href={href}
                    class="video-title"
                    target="_blank"
                    rel="noopener noreferrer"
                >
                    {video.display_title()}
                </a>
                <span class="video-meta">{meta.join(" | ")}</span>
            </div>
            <Button
                onclick={props.on_remove.reform({
                    let video_id = video.id.clone();
                    move |_| video_id.clone()
                })}
                variant={ButtonVariant::Danger}
                size={ButtonSize::Small}
            >
                {"\u{d7}"}
            </Button>
        </div>
    }
}

// Helper functions

/// Read the stored list for display. Legacy entries are normalized in memory
/// only; the popup never runs the page-side migration write.
async fn load_hidden_list() -> Result<HiddenList, String> {
    let value = getSyncStorage(HIDDEN_VIDEOS_KEY)
        .await
        .map_err(|e| format!("failed to get storage: {e:?}"))?;

    if value.is_null() || value.is_undefined() {
        return Ok(HiddenList::new());
    }
    let entries: Vec<StoredEntry> = serde_wasm_bindgen::from_value(value)
        .map_err(|e| format!("failed to parse storage: {e}"))?;
    Ok(normalize_entries(entries, |_| None).list)
}

async fn save_hidden_list(list: &HiddenList) -> Result<(), String> {
    let value = list
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("failed to serialize storage: {e}"))?;
    setSyncStorage(HIDDEN_VIDEOS_KEY, value)
        .await
        .map_err(|e| format!("failed to save storage: {e:?}"))
}

async fn load_show_hidden() -> bool {
    getSyncStorage(SHOW_HIDDEN_KEY)
        .await
        .map(|value| value.is_truthy())
        .unwrap_or(false)
}

async fn set_show_hidden(value: bool) -> Result<(), String> {
    setSyncStorage(SHOW_HIDDEN_KEY, JsValue::from_bool(value))
        .await
        .map_err(|e| format!("failed to save flag: {e:?}"))
}

fn send_page_message(message: &PageMessage) {
    match message.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(value) => sendMessageToFeedTabs(value),
        Err(e) => log::warn!("failed to serialize page message: {e}"),
    }
}
