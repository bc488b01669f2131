use crate::wld::WldDocument;
use crate::wld::model::{Room, string_to_latin1};

pub(crate) fn document_to_bytes(doc: &WldDocument) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&doc.preamble);
    for room in &doc.rooms {
        if room.dirty {
            out.extend_from_slice(&serialize_room(room));
        } else {
            out.extend_from_slice(&room.raw);
        }
    }
    // The tail is emitted exactly as parsed. A missing `$~\n` is an
    // audit finding, never a silent repair.
    out.extend_from_slice(&doc.tail);
    out
}

/// Canonical layout for an edited room. Unedited rooms never pass
/// through here; their original bytes are reused.
pub fn serialize_room(room: &Room) -> Vec<u8> {
    let mut text = String::new();
    text.push_str(&format!("#{}\n", room.vnum));
    text.push_str(&room.name);
    text.push_str("~\n");
    if !room.description.is_empty() {
        text.push_str(&room.description);
        text.push('\n');
    }
    text.push_str("~\n");
    text.push_str(&format!(
        "{} {} {} {} {}\n",
        room.zone_tag, room.flags, room.sector, room.mov_cost_a, room.mov_cost_b
    ));
    for exit in &room.exits {
        text.push_str(&format!("D{}\n", exit.direction.code()));
        push_tilde_line(&mut text, &exit.keyword);
        push_tilde_line(&mut text, &exit.description);
        text.push_str(&format!(
            "{} {} {}\n",
            exit.door_flags, exit.key_vnum, exit.destination
        ));
    }
    for extra in &room.extras {
        text.push_str(&extra.raw);
        if !extra.raw.ends_with('\n') {
            text.push('\n');
        }
    }
    text.push_str("S\n");
    string_to_latin1(&text)
}

fn push_tilde_line(text: &mut String, body: &str) {
    if body.is_empty() {
        text.push_str("~\n");
    } else if body.contains('\n') {
        text.push_str(body);
        text.push_str("\n~\n");
    } else {
        text.push_str(body);
        text.push_str("~\n");
    }
}

#[cfg(test)]
mod tests {
    use crate::wld::WldDocument;

    #[test]
    fn edited_room_reparses_to_same_model() {
        let src = b"#100\nOld Name~\nText.\n~\n1 a 2 10 10\nD2\n~\n~\n0 -1 200\nS\n$~\n";
        let mut doc = WldDocument::parse(src).unwrap();
        {
            let room = doc.room_mut(100).unwrap();
            room.name = "New Name".to_string();
            room.sector = 11;
        }
        let emitted = doc.to_bytes();
        let reparsed = WldDocument::parse(&emitted).unwrap();
        let room = reparsed.room(100).unwrap();
        assert_eq!(room.name, "New Name");
        assert_eq!(room.sector, 11);
        assert_eq!(room.exits.len(), 1);
        assert!(emitted.ends_with(b"$~\n"));
    }

    #[test]
    fn missing_terminator_survives_a_round_trip() {
        // A bad tail is an audit finding; emit must not repair it.
        let src = b"#100\nA~\n~\n1 a 2 10 10\nS\n";
        let doc = WldDocument::parse(src).unwrap();
        assert!(!doc.has_clean_tail());
        assert_eq!(doc.to_bytes(), src);
    }
}
