use crate::wld::model::{Direction, Room};
use std::collections::BTreeMap;
use std::fmt;

/// One reciprocity finding for an exit `(from, direction) -> to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitIssue {
    /// The destination room exists but does not point back.
    OneWay {
        from: u32,
        direction: Direction,
        to: i64,
        /// Where the destination's opposite exit actually goes, if it
        /// has one at all.
        back: Option<i64>,
    },
    /// The destination room is not in the parsed set.
    DestNotFound {
        from: u32,
        direction: Direction,
        to: i64,
    },
}

impl fmt::Display for ExitIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitIssue::OneWay { from, direction, to, back } => {
                let opp = direction.opposite();
                match back {
                    Some(dest) => write!(
                        f,
                        "VNUM {from} {direction} -> {to} (ONE-WAY! {to} {opp} -> {dest})"
                    ),
                    None => write!(
                        f,
                        "VNUM {from} {direction} -> {to} (ONE-WAY! {to} has no {opp} exit)"
                    ),
                }
            }
            ExitIssue::DestNotFound { from, direction, to } => {
                write!(f, "VNUM {from} {direction} -> {to} (DEST NOT FOUND)")
            }
        }
    }
}

impl ExitIssue {
    pub fn from_vnum(&self) -> u32 {
        match self {
            ExitIssue::OneWay { from, .. } | ExitIssue::DestNotFound { from, .. } => *from,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExitIssue::OneWay { .. } => "one-way",
            ExitIssue::DestNotFound { .. } => "dest-not-found",
        }
    }
}

/// Check exit reciprocity across a set of rooms (usually every zone the
/// vnums of interest can reach). For each exit `(A, d) -> B`,
/// reciprocity holds iff `B` has an exit in `opposite(d)` whose
/// destination is `A`. Vertical exits (U, D) are excluded. Exits with
/// negative destinations are unlinked and skipped.
pub fn check<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Vec<ExitIssue> {
    let by_vnum: BTreeMap<u32, &Room> = rooms.into_iter().map(|r| (r.vnum, r)).collect();
    let mut issues = Vec::new();

    for room in by_vnum.values() {
        for exit in &room.exits {
            if exit.direction.is_vertical() || exit.destination < 0 {
                continue;
            }
            let Ok(dest_vnum) = u32::try_from(exit.destination) else {
                continue;
            };
            let Some(dest) = by_vnum.get(&dest_vnum) else {
                issues.push(ExitIssue::DestNotFound {
                    from: room.vnum,
                    direction: exit.direction,
                    to: exit.destination,
                });
                continue;
            };
            let back = dest.exit(exit.direction.opposite());
            let reciprocal = back.map(|b| b.destination) == Some(i64::from(room.vnum));
            if !reciprocal {
                issues.push(ExitIssue::OneWay {
                    from: room.vnum,
                    direction: exit.direction,
                    to: exit.destination,
                    back: back.map(|b| b.destination),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wld::WldDocument;

    fn rooms(src: &[u8]) -> WldDocument {
        WldDocument::parse(src).unwrap()
    }

    #[test]
    fn reciprocal_pair_passes() {
        let doc = rooms(
            b"#46929\nA~\n~\n469 a 2 10 10\nD0\n~\n~\n0 -1 46919\nS\n\
              #46919\nB~\n~\n469 a 2 10 10\nD2\n~\n~\n0 -1 46929\nS\n$~\n",
        );
        assert!(check(doc.rooms()).is_empty());
    }

    #[test]
    fn one_way_exit_is_reported_with_actual_back_link() {
        let doc = rooms(
            b"#46929\nA~\n~\n469 a 2 10 10\nD0\n~\n~\n0 -1 46919\nS\n\
              #46919\nB~\n~\n469 a 2 10 10\nD2\n~\n~\n0 -1 46928\nS\n\
              #46928\nC~\n~\n469 a 2 10 10\nD0\n~\n~\n0 -1 46919\nS\n$~\n",
        );
        let issues = check(doc.rooms());
        let msgs: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        assert!(
            msgs.contains(&"VNUM 46929 N -> 46919 (ONE-WAY! 46919 S -> 46928)".to_string()),
            "got: {msgs:?}"
        );
    }

    #[test]
    fn missing_destination_is_reported() {
        let doc = rooms(b"#100\nA~\n~\n1 a 2 10 10\nD1\n~\n~\n0 -1 999\nS\n$~\n");
        let issues = check(doc.rooms());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].to_string(), "VNUM 100 E -> 999 (DEST NOT FOUND)");
    }

    #[test]
    fn vertical_exits_are_skipped() {
        let doc = rooms(
            b"#100\nA~\n~\n1 a 2 10 10\nD4\n~\n~\n0 -1 200\nS\n\
              #200\nB~\n~\n2 a 2 10 10\nS\n$~\n",
        );
        assert!(check(doc.rooms()).is_empty());
    }
}
