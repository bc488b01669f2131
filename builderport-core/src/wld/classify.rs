use crate::wld::WldDocument;
use crate::wld::model::Room;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Sector codes the heuristics care about.
pub const SECT_GRASSLAND: u32 = 2;
pub const SECT_RIVER: u32 = 6;
pub const SECT_ROAD: u32 = 11;

/// Colour escapes embedded in names and descriptions: a backtick or
/// caret followed by any byte, or `&N` with an optional semicolon.
static COLOR_ESCAPES: Lazy<Regex> = Lazy::new(|| Regex::new(r"`.|\^.|&\d+;?").unwrap());

/// Vocabulary a room standing ON a road is expected to use.
const ROAD_WORDS: &[&str] = &["road", "way", "path", "highway", "paving", "stones", "traveler"];

/// Phrases that describe the road from a distance; a road room's own
/// description must not read like an observer looking at it.
const DISTANT_ROAD_PHRASES: &[&str] = &[
    "road can be seen",
    "see the road",
    "distant road",
    "smudge of road",
];

pub fn strip_color_escapes(text: &str) -> String {
    COLOR_ESCAPES.replace_all(text, "").into_owned()
}

fn normalize(description: &str) -> String {
    strip_color_escapes(description).to_lowercase()
}

/// Heuristic for sector-11 rooms. Returns the reason the description
/// looks hallucinated, or `None` when it passes.
pub fn road_description_issue(description: &str) -> Option<&'static str> {
    let text = normalize(description);
    for phrase in DISTANT_ROAD_PHRASES {
        if text.contains(phrase) {
            return Some("describes the road from a distance");
        }
    }
    if !ROAD_WORDS.iter().any(|w| text.contains(w)) {
        return Some("no road vocabulary in a road room");
    }
    None
}

/// Heuristic for sector-6 rooms: river descriptions must not talk
/// about roads or wagons.
pub fn river_description_issue(description: &str) -> Option<&'static str> {
    let text = normalize(description);
    if text.contains("road") || text.contains("wagon") {
        return Some("river room mentions road or wagon");
    }
    None
}

/// One description finding: `(vnum, zone, reason)`. Findings are
/// reported, never auto-fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionIssue {
    pub vnum: u32,
    pub zone: u32,
    pub reason: &'static str,
}

pub fn audit_descriptions<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Vec<DescriptionIssue> {
    let mut issues = Vec::new();
    for room in rooms {
        let reason = match room.sector {
            SECT_ROAD => road_description_issue(&room.description),
            SECT_RIVER => river_description_issue(&room.description),
            _ => None,
        };
        if let Some(reason) = reason {
            issues.push(DescriptionIssue {
                vnum: room.vnum,
                zone: room.zone(),
                reason,
            });
        }
    }
    issues
}

/// The zone most of a file's rooms belong to. Zone files routinely
/// carry a few out-of-range vnums, so the first room is not a safe
/// witness for the file's own zone.
pub fn dominant_zone(doc: &WldDocument) -> Option<u32> {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for room in doc.rooms() {
        *counts.entry(room.zone()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by_key(|&(zone, count)| (count, Reverse(zone)))
        .map(|(zone, _)| zone)
}

/// A zone file looks like an overland grid when it is near-full
/// (>= 95 room headers), almost all vnums sit in the zone's own range,
/// and at least 80 rooms carry the stock grassland metadata line
/// `<zone> a 2 10 10`.
pub fn is_overland_grid(doc: &WldDocument, zone: u32) -> bool {
    let rooms = doc.rooms();
    if rooms.len() < 95 {
        return false;
    }
    let lo = zone * 100;
    let hi = lo + 99;
    let in_range = rooms.iter().filter(|r| r.vnum >= lo && r.vnum <= hi).count();
    if in_range < 90 {
        return false;
    }
    let grassland = rooms
        .iter()
        .filter(|r| {
            r.zone_tag == zone
                && r.flags == "a"
                && r.sector == SECT_GRASSLAND
                && r.mov_cost_a == 10
                && r.mov_cost_b == 10
        })
        .count();
    grassland >= 80
}
