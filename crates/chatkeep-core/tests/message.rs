use chatkeep_core::models::{ConversationId, Message, MessageHistory, Role};

#[test]
fn history_serializes_as_role_content_array() {
    let history = MessageHistory::from(vec![
        Message::human("hello"),
        Message::assistant("hi there"),
    ]);

    let value: serde_json::Value = serde_json::from_slice(&history.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"role": "human", "content": "hello"},
            {"role": "ai", "content": "hi there"},
        ])
    );
}

#[test]
fn non_ascii_content_is_stored_as_raw_utf8() {
    let history = MessageHistory::from(vec![Message::human("こんにちは")]);
    let body = String::from_utf8(history.to_json().unwrap()).unwrap();
    assert!(body.contains("こんにちは"));
    assert!(!body.contains("\\u"));
}

#[test]
fn decoding_preserves_order() {
    let body = br#"[
        {"role": "human", "content": "one"},
        {"role": "ai", "content": "two"},
        {"role": "human", "content": "three"}
    ]"#;

    let history = MessageHistory::from_json(body).unwrap();
    let contents: Vec<&str> = history.iter().map(Message::content).collect();
    assert_eq!(contents, ["one", "two", "three"]);
    assert_eq!(history.last().map(Message::role), Some(Role::Human));
}

#[test]
fn decodes_langchain_message_dicts() {
    let body = br#"[
        {"content": "hello", "additional_kwargs": {}, "type": "human", "example": false},
        {"content": "hi there", "additional_kwargs": {}, "type": "ai", "example": false}
    ]"#;

    let history = MessageHistory::from_json(body).unwrap();
    assert_eq!(
        history,
        MessageHistory::from(vec![Message::human("hello"), Message::assistant("hi there")])
    );
}

#[test]
fn accepts_user_and_assistant_role_tokens() {
    let body = br#"[{"role": "user", "content": "a"}, {"role": "assistant", "content": "b"}]"#;
    let history = MessageHistory::from_json(body).unwrap();
    let roles: Vec<Role> = history.iter().map(Message::role).collect();
    assert_eq!(roles, [Role::Human, Role::Assistant]);
}

#[test]
fn unknown_role_is_rejected() {
    let body = br#"[{"role": "system", "content": "x"}]"#;
    assert!(MessageHistory::from_json(body).is_err());
}

#[test]
fn object_document_is_rejected() {
    assert!(MessageHistory::from_json(br#"{"messages": []}"#).is_err());
}

#[test]
fn empty_conversation_id_is_rejected() {
    assert!(ConversationId::new("").is_err());
    assert!("".parse::<ConversationId>().is_err());
    assert_eq!(ConversationId::new("s1").unwrap().as_str(), "s1");
}
