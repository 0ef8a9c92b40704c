//! Chat history formatting
//!
//! Front-end turns use `user` / `assistant`; Gemini wants `user` / `model`.

use crate::gemini::Content;
use crate::models::ChatTurn;

/// Convert front-end history into model contents.
///
/// Turns with empty content are skipped. Roles must be exactly `user` or
/// `assistant`; anything else is dropped.
pub fn format_chat_history(history: &[ChatTurn]) -> Vec<Content> {
    history
        .iter()
        .filter(|turn| !turn.content.is_empty())
        .filter_map(|turn| match turn.role.as_str() {
            "user" => Some(Content::user(turn.content.clone())),
            "assistant" => Some(Content::model(turn.content.clone())),
            _ => None,
        })
        .collect()
}
