/// Content script for the subscriptions feed page.
///
/// Wires the three triggers (storage changes, DOM mutations, popup messages)
/// into reconciliation passes, and handles hide-button clicks.
use crate::extract::{extract_record, find_item_by_id};
use crate::messages::PageMessage;
use crate::reconcile::apply_visibility;
use crate::storage::{HIDDEN_VIDEOS_KEY, HiddenList, SHOW_HIDDEN_KEY, normalize_entries};
use crate::video_data::StoredEntry;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

// Bridge to the chrome.* APIs, same shape as the popup bridge.
#[wasm_bindgen(module = "/js/content_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getSyncStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    fn addStorageListener(callback: &js_sys::Function);

    fn addMessageListener(callback: &js_sys::Function);
}

/// Entry point: register listeners, then migrate legacy entries and run the
/// first reconciliation pass.
pub fn run() {
    register_storage_listener();
    register_message_listener();
    observe_feed_mutations();

    spawn_local(async {
        if let Err(e) = migrate_and_reconcile().await {
            log::warn!("initial migration failed: {e}");
        }
    });
}

fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

// --- storage access -------------------------------------------------------

async fn load_entries() -> Result<Vec<StoredEntry>, String> {
    let value = getSyncStorage(HIDDEN_VIDEOS_KEY)
        .await
        .map_err(|e| format!("failed to read hidden videos: {e:?}"))?;

    if value.is_null() || value.is_undefined() {
        return Ok(Vec::new());
    }
    match serde_wasm_bindgen::from_value(value) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            // A list we cannot parse is treated as empty rather than fatal.
            log::warn!("discarding unreadable hidden-video list: {e}");
            Ok(Vec::new())
        }
    }
}

async fn load_show_hidden() -> bool {
    match getSyncStorage(SHOW_HIDDEN_KEY).await {
        Ok(value) => value.is_truthy(),
        Err(e) => {
            log::warn!("failed to read show-hidden flag: {e:?}");
            false
        }
    }
}

async fn save_hidden_list(list: &HiddenList) -> Result<(), String> {
    let value = list
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("failed to serialize hidden videos: {e}"))?;
    setSyncStorage(HIDDEN_VIDEOS_KEY, value)
        .await
        .map_err(|e| format!("failed to write hidden videos: {e:?}"))
}

async fn set_show_hidden(value: bool) -> Result<(), String> {
    setSyncStorage(SHOW_HIDDEN_KEY, JsValue::from_bool(value))
        .await
        .map_err(|e| format!("failed to write show-hidden flag: {e:?}"))
}

/// Read the stored entries and resolve legacy shapes against the live page.
/// Never writes back; the startup migration owns that.
async fn load_hidden_list(document: &Document) -> Result<HiddenList, String> {
    let entries = load_entries().await?;
    let outcome = normalize_entries(entries, |id| {
        find_item_by_id(document, id).and_then(|item| extract_record(&item, id))
    });
    Ok(outcome.list)
}

// --- reconciliation flows -------------------------------------------------

async fn reconcile(document: &Document, list: &HiddenList) {
    let show_hidden = load_show_hidden().await;
    apply_visibility(document, list, show_hidden, hide_video);
}

/// Re-read persisted state and re-apply visibility.
async fn refresh() -> Result<(), String> {
    let Some(document) = document() else {
        return Ok(());
    };
    let list = load_hidden_list(&document).await?;
    reconcile(&document, &list).await;
    Ok(())
}

/// One-time startup pass: normalize legacy entries, write back only when
/// something was altered, then reconcile with the resulting list.
async fn migrate_and_reconcile() -> Result<(), String> {
    let Some(document) = document() else {
        return Ok(());
    };
    let entries = load_entries().await?;
    let outcome = normalize_entries(entries, |id| {
        find_item_by_id(&document, id).and_then(|item| extract_record(&item, id))
    });
    if outcome.changed {
        log::debug!("migrated hidden-video entries to record form");
        save_hidden_list(&outcome.list).await?;
    }
    reconcile(&document, &outcome.list).await;
    Ok(())
}

/// Hide-button click: extract the record, merge it into the stored set, and
/// hide the item as soon as the write lands.
fn hide_video(item: Element) {
    spawn_local(async move {
        let Some(document) = document() else {
            return;
        };
        let Some(record) = extract_record(&item, "") else {
            log::warn!("clicked item has no video id, not hiding");
            return;
        };

        let result = async {
            let mut list = load_hidden_list(&document).await?;
            list.insert(record);
            save_hidden_list(&list).await?;
            Ok::<HiddenList, String>(list)
        }
        .await;

        match result {
            Ok(list) => reconcile(&document, &list).await,
            Err(e) => log::warn!("failed to hide video: {e}"),
        }
    });
}

// --- triggers -------------------------------------------------------------

fn register_storage_listener() {
    let callback = Closure::<dyn FnMut(JsValue, JsValue)>::new(|changes: JsValue, area: JsValue| {
        if area.as_string().as_deref() != Some("sync") {
            return;
        }
        let relevant = js_sys::Reflect::has(&changes, &JsValue::from_str(HIDDEN_VIDEOS_KEY))
            .unwrap_or(false)
            || js_sys::Reflect::has(&changes, &JsValue::from_str(SHOW_HIDDEN_KEY)).unwrap_or(false);
        if relevant {
            spawn_local(async {
                if let Err(e) = refresh().await {
                    log::warn!("refresh after storage change failed: {e}");
                }
            });
        }
    });
    addStorageListener(callback.as_ref().unchecked_ref());
    callback.forget();
}

fn register_message_listener() {
    let callback = Closure::<dyn FnMut(JsValue)>::new(|message: JsValue| {
        let Ok(message) = serde_wasm_bindgen::from_value::<PageMessage>(message) else {
            return;
        };
        spawn_local(async move {
            let result = match message {
                PageMessage::UnhideAll => set_show_hidden(true).await,
                PageMessage::RehideAll => set_show_hidden(false).await,
                PageMessage::PermanentUnhide { video_id } => {
                    permanently_unhide(&video_id).await
                }
            };
            if let Err(e) = result {
                log::warn!("popup message handling failed: {e}");
            }
        });
    });
    addMessageListener(callback.as_ref().unchecked_ref());
    callback.forget();
}

async fn permanently_unhide(video_id: &str) -> Result<(), String> {
    let Some(document) = document() else {
        return Ok(());
    };
    let mut list = load_hidden_list(&document).await?;
    list.remove(video_id);
    save_hidden_list(&list).await?;
    reconcile(&document, &list).await;
    Ok(())
}

/// Infinite scroll and re-renders add items that need buttons and visibility
/// applied; every mutation batch triggers one reconciliation pass.
fn observe_feed_mutations() {
    let Some(document) = document() else {
        return;
    };
    let Some(body) = document.body() else {
        return;
    };

    let callback = Closure::<dyn FnMut()>::new(|| {
        spawn_local(async {
            if let Err(e) = refresh().await {
                log::warn!("refresh after DOM mutation failed: {e}");
            }
        });
    });

    match web_sys::MutationObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => {
            let options = web_sys::MutationObserverInit::new();
            options.set_child_list(true);
            options.set_subtree(true);
            if let Err(e) = observer.observe_with_options(&body, &options) {
                log::warn!("failed to observe feed mutations: {e:?}");
            }
            callback.forget();
        }
        Err(e) => log::warn!("failed to create mutation observer: {e:?}"),
    }
}
