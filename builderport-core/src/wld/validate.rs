use crate::report::Issue;
use crate::wld::WldDocument;

/// Placeholder names that indicate a corrupt or half-built room.
const PLACEHOLDER_NAMES: &[&str] = &["undefined", "The Open World"];

/// Boot-breaking sanity audit over a raw `.wld` file image. Findings
/// are report rows, never mutations. `label` names the file (or zone)
/// in the report's zone column for file-scope findings.
pub fn audit_bytes(label: &str, bytes: &[u8]) -> Vec<Issue> {
    let mut issues = Vec::new();

    // Lexical: no control byte outside {\t, \n, \r} anywhere.
    for (offset, &b) in bytes.iter().enumerate() {
        if b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r') {
            issues.push(Issue::new(
                label,
                "control-byte",
                format!("0x{b:02x} at offset {offset}"),
            ));
        }
    }

    // File tail: exactly `$~` followed by a newline.
    if !bytes.ends_with(b"$~\n") {
        issues.push(Issue::new(
            label,
            "missing-terminator",
            "file does not end with $~ and a newline",
        ));
    }

    match WldDocument::parse(bytes) {
        Err(e) => {
            issues.push(Issue::new(label, "parse-error", e.to_string()));
        }
        Ok(doc) => {
            for room in doc.rooms() {
                let zone = room.zone().to_string();
                if PLACEHOLDER_NAMES.contains(&room.name.as_str()) {
                    issues.push(Issue::new(
                        &zone,
                        "placeholder-name",
                        format!("VNUM {}: {}", room.vnum, room.name),
                    ));
                }
                if room.zone_tag != room.zone() {
                    issues.push(Issue::new(
                        &zone,
                        "zone-mismatch",
                        format!(
                            "VNUM {}: metadata zone {} but vnum implies {}",
                            room.vnum,
                            room.zone_tag,
                            room.zone()
                        ),
                    ));
                }
            }
        }
    }

    issues
}
