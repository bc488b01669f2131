use crate::error::{WldError, WldResult};
use crate::wld::WldDocument;
use crate::wld::model::{Direction, Exit, ExtraBlock, Room, latin1_to_string};
use std::collections::HashSet;

/// Line-oriented cursor over the raw bytes. Byte offsets are tracked
/// so each room keeps its exact original span.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    line_no: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, line_no: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The upcoming line without its `\r\n`/`\n` ending, as Latin-1 text.
    fn peek(&self) -> Option<String> {
        if self.at_end() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        let mut line = &rest[..end];
        if line.ends_with(b"\r") {
            line = &line[..line.len() - 1];
        }
        Some(latin1_to_string(line))
    }

    fn advance(&mut self) -> Option<String> {
        let line = self.peek()?;
        let rest = &self.data[self.pos..];
        let step = rest
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(rest.len());
        self.pos += step;
        self.line_no += 1;
        Some(line)
    }

    fn err(&self, message: impl Into<String>) -> WldError {
        WldError::parse(self.line_no + 1, message)
    }
}

fn is_room_header(line: &str) -> Option<u32> {
    let rest = line.trim_end().strip_prefix('#')?;
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

fn is_exit_header(line: &str) -> Option<Direction> {
    let rest = line.trim_end().strip_prefix('D')?;
    if rest.len() != 1 {
        return None;
    }
    Direction::from_code(rest.as_bytes()[0].wrapping_sub(b'0'))
}

/// A tag line opens an `E`/`R`/`G`-style block: a single uppercase
/// letter, alone or followed by numeric tokens (the `G` weight vector
/// carries its zeros on the tag line itself).
fn is_extra_tag(line: &str) -> Option<char> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    if first.len() != 1 {
        return None;
    }
    let tag = first.chars().next()?;
    if !tag.is_ascii_uppercase() || tag == 'D' || tag == 'S' {
        return None;
    }
    if tokens.all(|t| t.bytes().all(|b| b.is_ascii_digit() || b == b'-')) {
        Some(tag)
    } else {
        None
    }
}

pub(crate) fn parse_document(bytes: &[u8]) -> WldResult<WldDocument> {
    let mut cur = Cursor::new(bytes);
    let mut rooms = Vec::new();
    let mut seen = HashSet::new();

    // Anything before the first header is kept verbatim.
    let mut preamble_end = cur.pos;
    while let Some(line) = cur.peek() {
        if is_room_header(&line).is_some() {
            break;
        }
        if line.trim_end() == "$~" {
            break;
        }
        cur.advance();
        preamble_end = cur.pos;
    }
    let preamble = bytes[..preamble_end].to_vec();

    while let Some(line) = cur.peek() {
        let Some(vnum) = is_room_header(&line) else {
            break; // file tail
        };
        if !seen.insert(vnum) {
            return Err(WldError::DuplicateVnum(vnum));
        }
        let start = cur.pos;
        let mut room = parse_room(&mut cur, vnum)?;
        // The span runs up to the next header (or the file tail), so
        // stray blank lines between rooms survive a round trip.
        room.raw = bytes[start..cur.pos].to_vec();
        rooms.push(room);
    }

    let tail = bytes[cur.pos..].to_vec();
    tracing::debug!(rooms = rooms.len(), tail_bytes = tail.len(), "parsed wld document");

    Ok(WldDocument { preamble, rooms, tail })
}

fn parse_room(cur: &mut Cursor<'_>, vnum: u32) -> WldResult<Room> {
    cur.advance(); // header

    let name = read_tilde_text(cur)
        .ok_or_else(|| cur.err(format!("room #{vnum}: unterminated name")))?;
    let description = read_tilde_text(cur)
        .ok_or_else(|| cur.err(format!("room #{vnum}: unterminated description")))?;

    let meta = cur
        .advance()
        .ok_or_else(|| cur.err(format!("room #{vnum}: missing metadata line")))?;
    let tokens: Vec<&str> = meta.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(cur.err(format!(
            "room #{vnum}: metadata line has {} tokens, expected at least 5",
            tokens.len()
        )));
    }
    let zone_tag = tokens[0]
        .parse()
        .map_err(|_| cur.err(format!("room #{vnum}: bad zone id '{}'", tokens[0])))?;
    let flags = tokens[1].to_string();
    let sector = tokens[2]
        .parse()
        .map_err(|_| cur.err(format!("room #{vnum}: bad sector '{}'", tokens[2])))?;
    let mov_cost_a = tokens[3]
        .parse()
        .map_err(|_| cur.err(format!("room #{vnum}: bad movement cost '{}'", tokens[3])))?;
    let mov_cost_b = tokens[4]
        .parse()
        .map_err(|_| cur.err(format!("room #{vnum}: bad movement cost '{}'", tokens[4])))?;

    let mut exits = Vec::new();
    let mut extras = Vec::new();
    let mut terminated = false;

    while let Some(line) = cur.peek() {
        let trimmed = line.trim_end();
        if trimmed == "S" {
            cur.advance();
            terminated = true;
            break;
        }
        if let Some(direction) = is_exit_header(&line) {
            exits.push(parse_exit(cur, vnum, direction)?);
            continue;
        }
        if let Some(tag) = is_extra_tag(&line) {
            extras.push(read_extra_block(cur, tag));
            continue;
        }
        if is_room_header(&line).is_some() || trimmed == "$~" {
            // forgiving: an unterminated room ends at the next header
            break;
        }
        // stray content between blocks; fold it into the raw span only
        cur.advance();
    }

    if !terminated {
        tracing::debug!(vnum, "room block without S sentinel");
    }

    // Trailing blank lines before the next header belong to this span.
    while let Some(line) = cur.peek() {
        if !line.trim().is_empty() {
            break;
        }
        cur.advance();
    }

    Ok(Room {
        vnum,
        name,
        description,
        zone_tag,
        flags,
        sector,
        mov_cost_a,
        mov_cost_b,
        exits,
        extras,
        raw: Vec::new(),
        dirty: false,
    })
}

/// Read text terminated by `~`: either an inline `~` at end of a line
/// or a line whose first non-blank character is `~`.
fn read_tilde_text(cur: &mut Cursor<'_>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    loop {
        let line = cur.advance()?;
        let trimmed = line.trim_end();
        if trimmed.trim_start().starts_with('~') {
            break;
        }
        if let Some(body) = trimmed.strip_suffix('~') {
            parts.push(body.to_string());
            break;
        }
        parts.push(trimmed.to_string());
    }
    Some(parts.join("\n"))
}

fn parse_exit(cur: &mut Cursor<'_>, vnum: u32, direction: Direction) -> WldResult<Exit> {
    cur.advance(); // D<digit>

    let keyword = read_tilde_text(cur)
        .ok_or_else(|| cur.err(format!("room #{vnum}: unterminated exit keyword")))?;
    let description = read_tilde_text(cur)
        .ok_or_else(|| cur.err(format!("room #{vnum}: unterminated exit description")))?;

    let line = cur
        .advance()
        .ok_or_else(|| cur.err(format!("room #{vnum}: exit {direction} missing value line")))?;
    let nums: Vec<&str> = line.split_whitespace().collect();
    if nums.len() < 3 {
        return Err(cur.err(format!(
            "room #{vnum}: exit {direction} has {} values, expected 3",
            nums.len()
        )));
    }
    let parse_int = |tok: &str| -> WldResult<i64> {
        tok.parse()
            .map_err(|_| cur.err(format!("room #{vnum}: exit {direction} bad value '{tok}'")))
    };

    Ok(Exit {
        direction,
        keyword,
        description,
        door_flags: parse_int(nums[0])?,
        key_vnum: parse_int(nums[1])?,
        destination: parse_int(nums[2])?,
    })
}

/// Capture an `E`/`R`/`G`/unknown tag block verbatim. The block runs
/// until the next `S` sentinel, exit header, or single-letter tag line;
/// `E` blocks contain two tilde-terminated sections, so the tilde alone
/// cannot delimit the block.
fn read_extra_block(cur: &mut Cursor<'_>, tag: char) -> ExtraBlock {
    let mut raw = String::new();
    if let Some(line) = cur.advance() {
        raw.push_str(&line);
        raw.push('\n');
    }
    while let Some(line) = cur.peek() {
        let trimmed = line.trim_end();
        if trimmed == "S"
            || trimmed == "$~"
            || is_exit_header(&line).is_some()
            || is_room_header(&line).is_some()
            || is_extra_tag(&line).is_some()
        {
            break;
        }
        cur.advance();
        raw.push_str(&line);
        raw.push('\n');
    }
    ExtraBlock { tag, raw }
}
