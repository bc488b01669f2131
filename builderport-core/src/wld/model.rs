use std::fmt;

/// Exit direction codes as they appear in `D<digit>` blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Up,
    Down,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            3 => Direction::West,
            4 => Direction::Up,
            5 => Direction::Down,
            6 => Direction::Northeast,
            7 => Direction::Northwest,
            8 => Direction::Southeast,
            9 => Direction::Southwest,
            _ => return None,
        })
    }

    pub fn code(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
            Direction::Up => 4,
            Direction::Down => 5,
            Direction::Northeast => 6,
            Direction::Northwest => 7,
            Direction::Southeast => 8,
            Direction::Southwest => 9,
        }
    }

    /// Opposite pairs: N/S, E/W, U/D, NE/SW, NW/SE.
    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Northeast => Direction::Southwest,
            Direction::Northwest => Direction::Southeast,
            Direction::Southeast => Direction::Northwest,
            Direction::Southwest => Direction::Northeast,
        }
    }

    /// True for the vertical pair, which reciprocity checks skip.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::East => "E",
            Direction::South => "S",
            Direction::West => "W",
            Direction::Up => "U",
            Direction::Down => "D",
            Direction::Northeast => "NE",
            Direction::Northwest => "NW",
            Direction::Southeast => "SE",
            Direction::Southwest => "SW",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `D<digit>` exit block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    pub direction: Direction,
    /// Keyword text (often empty; the block then carries a bare `~`)
    pub keyword: String,
    /// Exit description text (often empty)
    pub description: String,
    pub door_flags: i64,
    pub key_vnum: i64,
    /// Destination vnum; authoritative for reciprocity checks
    pub destination: i64,
}

/// An `E`/`R`/`G` (or unknown single-letter) block, preserved verbatim.
/// The `G` weight vector in particular is treated as opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraBlock {
    pub tag: char,
    /// Full block text including the tag line and terminators
    pub raw: String,
}

/// One room record between a `#<vnum>` header and its `S` sentinel.
#[derive(Debug, Clone)]
pub struct Room {
    pub vnum: u32,
    /// Single line, `~`-terminated in the file; may carry colour
    /// escapes of the forms `` `X ``, `^X`, `&N;`
    pub name: String,
    /// Multi-line description block
    pub description: String,
    /// Zone id as redundantly written on the metadata line
    pub zone_tag: u32,
    /// Room flags word, letter-coded; preserved verbatim
    pub flags: String,
    /// Terrain sector (2 = grassland, 6 = river, 11 = road, ...)
    pub sector: u32,
    pub mov_cost_a: i32,
    pub mov_cost_b: i32,
    pub exits: Vec<Exit>,
    pub extras: Vec<ExtraBlock>,
    /// Original byte span of the block, reused on emit while clean
    pub(crate) raw: Vec<u8>,
    pub(crate) dirty: bool,
}

impl Room {
    /// Administrative zone: `vnum / 100`.
    pub fn zone(&self) -> u32 {
        self.vnum / 100
    }

    pub fn exit(&self, direction: Direction) -> Option<&Exit> {
        self.exits.iter().find(|e| e.direction == direction)
    }
}

/// Lossless byte → text view. Every byte maps to the Unicode code
/// point of the same value, so the inverse is exact.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Inverse of [`latin1_to_string`]. Code points above U+00FF cannot
/// appear in text that came from a `.wld` file; they are mapped to `?`
/// rather than silently truncated.
pub fn string_to_latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| {
            let cp = u32::from(c);
            if cp <= 0xFF { cp as u8 } else { b'?' }
        })
        .collect()
}
