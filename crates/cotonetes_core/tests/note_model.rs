use cotonetes_core::{FileNotes, Note, NoteValidationError};

#[test]
fn new_note_requires_title() {
    let err = Note::new(" ", "u", "c", "d", Vec::new()).unwrap_err();
    assert_eq!(err, NoteValidationError::EmptyTitle);
}

#[test]
fn stored_body_is_split_on_newlines() {
    let note = Note::from_stored("t", "u", "c", "d", "a\n\nb").unwrap();
    assert_eq!(note.body, vec!["a", "", "b"]);
    assert_eq!(note.body_text(), "a\n\nb");

    let empty = Note::from_stored("t", "u", "c", "d", "").unwrap();
    assert_eq!(empty.body, vec![""]);
}

#[test]
fn serialization_uses_storage_field_names() {
    let note = Note::new(
        "Note_1",
        "http://example.com",
        "2020-01-01",
        "2020-01-02",
        vec!["body".to_string()],
    )
    .unwrap();
    let grouped = FileNotes {
        source: "notes/inbox/inbox.tex".to_string(),
        notes: vec![note.clone()],
    };

    let json = serde_json::to_value(&grouped).unwrap();
    assert_eq!(json["source"], "notes/inbox/inbox.tex");
    assert_eq!(json["notes"][0]["title"], "Note_1");
    assert_eq!(json["notes"][0]["last_updated"], "2020-01-02");
    assert_eq!(json["notes"][0]["body"][0], "body");

    let decoded: FileNotes = serde_json::from_value(json).unwrap();
    assert_eq!(decoded.notes, vec![note]);
}
