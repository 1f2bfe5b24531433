//! Message Reducer
//!
//! Pure transformations over a session's message list. Every function takes
//! the current list by reference and returns the new list; nothing here
//! touches the store or the network.
//!
//! All operations are total: an out-of-range index (or an unknown ID) returns
//! an unchanged copy of the input.

use crate::messages::MessageId;
use crate::session::ChatMessage;

/// Append a user message followed by a loading placeholder
pub fn append_user_and_placeholder(messages: &[ChatMessage], text: &str) -> Vec<ChatMessage> {
    let mut next = messages.to_vec();
    next.push(ChatMessage::user(text));
    next.push(ChatMessage::placeholder());
    next
}

/// Append only a loading placeholder (edit-resend keeps the edited message)
pub fn append_placeholder(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let mut next = messages.to_vec();
    next.push(ChatMessage::placeholder());
    next
}

/// Replace the final message
pub fn replace_last(messages: &[ChatMessage], new_message: ChatMessage) -> Vec<ChatMessage> {
    let mut next = messages.to_vec();
    if let Some(last) = next.last_mut() {
        *last = new_message;
    }
    next
}

/// Replace the message with the given ID, keeping its ID and position
pub fn replace_by_id(
    messages: &[ChatMessage],
    id: &MessageId,
    new_message: ChatMessage,
) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| {
            if &m.id == id {
                ChatMessage {
                    id: m.id.clone(),
                    ..new_message.clone()
                }
            } else {
                m.clone()
            }
        })
        .collect()
}

/// Keep `messages[0..=index]`, dropping everything after it
pub fn truncate_after(messages: &[ChatMessage], index: usize) -> Vec<ChatMessage> {
    if index >= messages.len() {
        return messages.to_vec();
    }
    messages[..=index].to_vec()
}

/// Replace the content at `index`, preserving role and ID
pub fn edit_in_place(messages: &[ChatMessage], index: usize, new_content: &str) -> Vec<ChatMessage> {
    let mut next = messages.to_vec();
    if let Some(msg) = next.get_mut(index) {
        msg.content = new_content.to_string();
        msg.is_loading = false;
    }
    next
}

/// Remove the message at `index`
///
/// A user message immediately followed by an assistant message is removed
/// together with that reply.
pub fn delete_at(messages: &[ChatMessage], index: usize) -> Vec<ChatMessage> {
    let Some(target) = messages.get(index) else {
        return messages.to_vec();
    };

    let paired = target.is_user()
        && messages
            .get(index + 1)
            .is_some_and(ChatMessage::is_assistant);
    let end = if paired { index + 2 } else { index + 1 };

    let mut next = Vec::with_capacity(messages.len().saturating_sub(end - index));
    next.extend_from_slice(&messages[..index]);
    next.extend_from_slice(&messages[end..]);
    next
}

/// Position of the message with the given ID
pub fn index_of(messages: &[ChatMessage], id: &MessageId) -> Option<usize> {
    messages.iter().position(|m| &m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageRole;
    use pretty_assertions::assert_eq;

    fn contents(messages: &[ChatMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::assistant("greeting"),
            ChatMessage::user("q1"),
            ChatMessage::assistant("a1"),
            ChatMessage::user("q2"),
            ChatMessage::assistant("a2"),
        ]
    }

    #[test]
    fn test_append_user_and_placeholder() {
        let msgs = conversation();
        let next = append_user_and_placeholder(&msgs, "q3");
        assert_eq!(next.len(), msgs.len() + 2);

        let user = &next[5];
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "q3");
        assert!(!user.is_loading);

        let placeholder = &next[6];
        assert_eq!(placeholder.role, MessageRole::Assistant);
        assert!(placeholder.content.is_empty());
        assert!(placeholder.is_loading);

        // input untouched
        assert_eq!(msgs.len(), 5);
    }

    #[test]
    fn test_replace_last_swaps_placeholder() {
        let msgs = append_user_and_placeholder(&conversation(), "q3");
        let next = replace_last(&msgs, ChatMessage::assistant("a3"));
        assert_eq!(next.len(), msgs.len());
        assert_eq!(next.last().unwrap().content, "a3");
        assert!(!next.last().unwrap().is_loading);
    }

    #[test]
    fn test_replace_last_on_empty_list() {
        let next = replace_last(&[], ChatMessage::assistant("x"));
        assert!(next.is_empty());
    }

    #[test]
    fn test_replace_by_id_keeps_identity() {
        let msgs = append_user_and_placeholder(&conversation(), "q3");
        let placeholder_id = msgs.last().unwrap().id.clone();
        let next = replace_by_id(&msgs, &placeholder_id, ChatMessage::assistant("a3"));
        assert_eq!(next.last().unwrap().id, placeholder_id);
        assert_eq!(next.last().unwrap().content, "a3");

        let unchanged = replace_by_id(&msgs, &MessageId::new(), ChatMessage::assistant("x"));
        assert_eq!(unchanged, msgs);
    }

    #[test]
    fn test_truncate_after() {
        let msgs = conversation();
        assert_eq!(contents(&truncate_after(&msgs, 1)), vec!["greeting", "q1"]);
        assert_eq!(truncate_after(&msgs, 4), msgs);
        assert_eq!(truncate_after(&msgs, 99), msgs);
    }

    #[test]
    fn test_truncate_then_append_matches_edit_resend_view() {
        let msgs = conversation();
        let next = append_user_and_placeholder(&truncate_after(&msgs, 2), "q2 edited");
        assert_eq!(
            contents(&next),
            vec!["greeting", "q1", "a1", "q2 edited", ""]
        );
        assert!(next[4].is_loading);
    }

    #[test]
    fn test_edit_in_place_preserves_role() {
        let msgs = conversation();
        let next = edit_in_place(&msgs, 1, "q1 edited");
        assert_eq!(next[1].content, "q1 edited");
        assert_eq!(next[1].role, MessageRole::User);
        assert_eq!(next[1].id, msgs[1].id);
        assert_eq!(edit_in_place(&msgs, 10, "nope"), msgs);
    }

    #[test]
    fn test_delete_user_with_reply_removes_pair() {
        let msgs = conversation();
        let next = delete_at(&msgs, 1);
        assert_eq!(contents(&next), vec!["greeting", "q2", "a2"]);
    }

    #[test]
    fn test_delete_user_without_reply_removes_one() {
        let mut msgs = conversation();
        msgs.push(ChatMessage::user("q3"));
        let next = delete_at(&msgs, 5);
        assert_eq!(next.len(), 5);

        // successor is another user message
        let msgs = vec![
            ChatMessage::user("a"),
            ChatMessage::user("b"),
            ChatMessage::assistant("c"),
        ];
        assert_eq!(contents(&delete_at(&msgs, 0)), vec!["b", "c"]);
    }

    #[test]
    fn test_delete_assistant_removes_only_itself() {
        let msgs = conversation();
        let next = delete_at(&msgs, 2);
        assert_eq!(contents(&next), vec!["greeting", "q1", "q2", "a2"]);
    }

    #[test]
    fn test_delete_out_of_range_is_noop() {
        let msgs = conversation();
        assert_eq!(delete_at(&msgs, 5), msgs);
        assert_eq!(delete_at(&[], 0), Vec::<ChatMessage>::new());
    }

    #[test]
    fn test_index_of() {
        let msgs = conversation();
        assert_eq!(index_of(&msgs, &msgs[3].id), Some(3));
        assert_eq!(index_of(&msgs, &MessageId::new()), None);
    }
}
