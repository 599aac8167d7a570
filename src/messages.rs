/// Popup -> content-script messages
///
/// Wire format matches the legacy extension: a tagged `action` field, with
/// `permanentUnhide` carrying the affected video id.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PageMessage {
    /// Show everything; the hidden set is kept but filtering is suppressed.
    UnhideAll,
    /// Re-apply hidden-set filtering.
    RehideAll,
    /// One video was removed from the hidden set for good.
    #[serde(rename_all = "camelCase")]
    PermanentUnhide { video_id: String },
}
