/// Feed-item extraction: video ids and display metadata from the
/// subscriptions page DOM.
use crate::video_data::VideoRecord;
use url::Url;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlAnchorElement};

/// Root element of one feed item on the subscriptions page.
pub const FEED_ITEM_SELECTOR: &str = "ytd-rich-item-renderer";

const THUMBNAIL_LINK_SELECTOR: &str = "a#thumbnail";
const TITLE_SELECTOR: &str = "#video-title";
const AUTHOR_SELECTOR: &str = "ytd-channel-name a, #channel-name a";
const METADATA_SELECTOR: &str = "div#metadata-line span";

/// Pull the video id out of a watch URL (`.../watch?v=VIDEO_ID`).
pub fn video_id_from_url(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

/// All feed items currently in the DOM.
pub fn feed_items(document: &Document) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(FEED_ITEM_SELECTOR) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// The stable identifier of one feed item, from its thumbnail link.
/// None means the item cannot be tracked and is skipped everywhere.
pub fn item_video_id(item: &Element) -> Option<String> {
    video_id_from_url(&thumbnail_href(item)?)
}

/// Absolute watch URL of the item's thumbnail link. The href attribute is
/// page-relative; the anchor's `href` property resolves it.
fn thumbnail_href(item: &Element) -> Option<String> {
    let link = item.query_selector(THUMBNAIL_LINK_SELECTOR).ok()??;
    let anchor = link.dyn_into::<HtmlAnchorElement>().ok()?;
    let href = anchor.href();
    if href.is_empty() { None } else { Some(href) }
}

/// Find the live feed item carrying a given video id, if it is on the page.
pub fn find_item_by_id(document: &Document, id: &str) -> Option<Element> {
    feed_items(document)
        .into_iter()
        .find(|item| item_video_id(item).as_deref() == Some(id))
}

/// Extract a full record for one feed item. Metadata fields degrade to empty
/// strings when the expected sub-element is missing; only a missing id (with
/// no fallback) short-circuits.
pub fn extract_record(item: &Element, fallback_id: &str) -> Option<VideoRecord> {
    let id = match item_video_id(item) {
        Some(id) => id,
        None if !fallback_id.is_empty() => fallback_id.to_string(),
        None => return None,
    };

    let url = thumbnail_href(item).unwrap_or_default();

    Some(VideoRecord::new(
        id,
        selector_text(item, TITLE_SELECTOR),
        selector_text(item, AUTHOR_SELECTOR),
        upload_time(item),
        url,
    ))
}

fn selector_text(item: &Element, selector: &str) -> String {
    item.query_selector(selector)
        .ok()
        .flatten()
        .and_then(|elem| elem.text_content())
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

/// The metadata line holds "views" then "upload time"; single-span lines
/// only carry one of the two.
fn upload_time(item: &Element) -> String {
    let Ok(spans) = item.query_selector_all(METADATA_SELECTOR) else {
        return String::new();
    };
    let index = if spans.length() > 1 { 1 } else { 0 };
    spans
        .item(index)
        .and_then(|node| node.text_content())
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
