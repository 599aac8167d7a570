/// Visibility reconciliation: keeps on-page item visibility in line with the
/// persisted hidden set and the show-hidden override.
use crate::extract::{feed_items, item_video_id};
use crate::storage::HiddenList;
use std::collections::HashSet;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

const HIDE_BUTTON_CLASS: &str = "vh-hide-btn";
const STYLE_ELEMENT_ID: &str = "vh-hide-btn-style";
const THUMBNAIL_SELECTOR: &str = "ytd-thumbnail";

const HIDE_BUTTON_CSS: &str = "
.vh-hide-btn {
    position: absolute !important;
    top: 8px;
    left: 8px;
    z-index: 10;
    background: rgba(255,255,255,0.85);
    border: none;
    color: #c00;
    font-size: 1.5em;
    font-weight: bold;
    border-radius: 50%;
    width: 32px;
    height: 32px;
    cursor: pointer;
}
.vh-hide-btn:hover {
    background: #ffeaea;
    color: #a00;
}
";

/// Whether one item should be hidden. The override flag wins over
/// hidden-set membership.
pub fn should_hide(id: &str, hidden_ids: &HashSet<String>, show_hidden: bool) -> bool {
    !show_hidden && hidden_ids.contains(id)
}

/// One reconciliation pass over every feed item in the DOM: attach missing
/// hide buttons, then set each item's display state. Re-running with the
/// same inputs is a no-op.
pub fn apply_visibility(
    document: &Document,
    hidden: &HiddenList,
    show_hidden: bool,
    on_hide: fn(Element),
) {
    ensure_hide_buttons(document, on_hide);

    let hidden_ids = hidden.ids();
    for item in feed_items(document) {
        let Some(id) = item_video_id(&item) else {
            continue;
        };
        set_item_hidden(&item, should_hide(&id, &hidden_ids, show_hidden));
    }
}

fn set_item_hidden(item: &Element, hidden: bool) {
    let Some(elem) = item.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = elem.style();
    let result = if hidden {
        style.set_property("display", "none")
    } else {
        style.remove_property("display").map(|_| ())
    };
    if let Err(e) = result {
        log::warn!("failed to set item visibility: {e:?}");
    }
}

/// Attach a hide button to every trackable item that does not have one yet.
fn ensure_hide_buttons(document: &Document, on_hide: fn(Element)) {
    inject_button_css(document);

    for item in feed_items(document) {
        if item_video_id(&item).is_none() {
            continue;
        }
        let has_button = matches!(
            item.query_selector(&format!(".{HIDE_BUTTON_CLASS}")),
            Ok(Some(_))
        );
        if !has_button {
            attach_hide_button(document, &item, on_hide);
        }
    }
}

fn attach_hide_button(document: &Document, item: &Element, on_hide: fn(Element)) {
    let Ok(Some(thumb)) = item.query_selector(THUMBNAIL_SELECTOR) else {
        return;
    };
    if let Some(thumb) = thumb.dyn_ref::<HtmlElement>() {
        let _ = thumb.style().set_property("position", "relative");
    }

    let Ok(button) = document.create_element("button") else {
        return;
    };
    button.set_text_content(Some("\u{d7}"));
    button.set_class_name(HIDE_BUTTON_CLASS);
    let _ = button.set_attribute("title", "Hide this video");

    if let Some(button) = button.dyn_ref::<HtmlElement>() {
        let item = item.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            event.stop_propagation();
            on_hide(item.clone());
        });
        button.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        // The button lives as long as the page; the closure leaks with it.
        onclick.forget();
    }

    if let Err(e) = thumb.append_child(&button) {
        log::warn!("failed to attach hide button: {e:?}");
    }
}

fn inject_button_css(document: &Document) {
    if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
        return;
    }
    let Ok(style) = document.create_element("style") else {
        return;
    };
    style.set_id(STYLE_ELEMENT_ID);
    style.set_text_content(Some(HIDE_BUTTON_CSS));
    if let Some(head) = document.head() {
        let _ = head.append_child(&style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_data::VideoRecord;

    fn hidden_ids(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_hidden_set_member_is_hidden() {
        let ids = hidden_ids(&["abc"]);

        assert!(should_hide("abc", &ids, false));
        assert!(!should_hide("other", &ids, false));
    }

    #[test]
    fn test_show_hidden_flag_overrides_membership() {
        let ids = hidden_ids(&["abc", "def"]);

        assert!(!should_hide("abc", &ids, true));
        assert!(!should_hide("def", &ids, true));
    }

    #[test]
    fn test_decision_is_idempotent() {
        let ids = hidden_ids(&["abc"]);

        let first = should_hide("abc", &ids, false);
        let second = should_hide("abc", &ids, false);

        assert_eq!(first, second);
    }

    #[test]
    fn test_toggle_returns_to_prior_state() {
        // Flag on then off again: the same set of items ends up hidden.
        let ids = hidden_ids(&["abc", "def"]);
        let all = ["abc", "def", "ghi"];

        let before: Vec<bool> = all.iter().map(|id| should_hide(id, &ids, false)).collect();
        let shown: Vec<bool> = all.iter().map(|id| should_hide(id, &ids, true)).collect();
        let after: Vec<bool> = all.iter().map(|id| should_hide(id, &ids, false)).collect();

        assert_eq!(shown, vec![false, false, false]);
        assert_eq!(before, after);
        assert_eq!(before, vec![true, true, false]);
    }

    #[test]
    fn test_decision_follows_hidden_list() {
        let mut list = HiddenList::new();
        list.insert(VideoRecord::id_only("abc".to_string()));

        assert!(should_hide("abc", &list.ids(), false));

        list.remove("abc");
        assert!(!should_hide("abc", &list.ids(), false));
    }
}
