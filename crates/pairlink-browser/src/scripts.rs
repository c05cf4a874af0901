//! Scripts evaluated inside the WhatsApp Web page.
//!
//! Each script is a single expression; async work is wrapped in an async
//! IIFE so the evaluation awaits it. Arguments are embedded as JSON string
//! literals, which are valid JavaScript string literals.

use pairlink_core::ChatId;

/// Reports `{state: "ready"}`, `{state: "qr", code}` or `{state: "loading"}`
pub const PAGE_STATUS: &str = r#"(() => {
    if (document.querySelector('#pane-side')) {
        return { state: 'ready' };
    }
    const qr = document.querySelector('div[data-ref]');
    const code = qr && qr.getAttribute('data-ref');
    if (code) {
        return { state: 'qr', code };
    }
    return { state: 'loading' };
})()"#;

/// Lists chats as `{id, name, isGroup}` objects
pub const LIST_CHATS: &str = r#"(() => {
    const { Chat } = window.require('WAWebCollections');
    return Chat.getModelsArray().map((chat) => ({
        id: chat.id._serialized,
        name: chat.formattedTitle || chat.name || '',
        isGroup: chat.id.server === 'g.us',
    }));
})()"#;

/// Serialized id of the logged-in account, or null
pub const OWN_ID: &str = r#"(() => {
    try {
        const me = window.require('WAWebUserPrefsMeUser').getMaybeMeUser();
        return me ? me._serialized : null;
    } catch (e) {
        return null;
    }
})()"#;

/// Sends `body` to `chat`; evaluates to false when the chat is unknown
pub fn send_message(chat: &ChatId, body: &str) -> String {
    format!(
        r#"(async () => {{
    const {{ Chat }} = window.require('WAWebCollections');
    const chat = Chat.get({chat});
    if (!chat) {{
        return false;
    }}
    await window.require('WAWebSendTextMsgChatAction').sendTextMsgToChat(chat, {body});
    return true;
}})()"#,
        chat = js_string(chat.as_str()),
        body = js_string(body),
    )
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
