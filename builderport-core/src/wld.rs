use crate::error::WldResult;
use crate::wld::model::Room;
use std::path::Path;

pub mod classify;
pub mod model;
pub mod parser;
pub mod reciprocity;
pub mod sector;
pub mod validate;
pub mod writer;

/// The standard file terminator: a literal `$~` followed by a newline.
pub const FILE_TERMINATOR: &[u8] = b"$~\n";

/// A parsed `.wld` file: an ordered sequence of room records plus any
/// bytes before the first `#<vnum>` header and after the last room.
///
/// Rooms keep their original byte span, so emitting an unedited
/// document reproduces the input byte for byte. Only rooms fetched
/// through [`WldDocument::room_mut`] are re-serialized.
#[derive(Debug, Clone)]
pub struct WldDocument {
    pub(crate) preamble: Vec<u8>,
    pub(crate) rooms: Vec<Room>,
    pub(crate) tail: Vec<u8>,
}

impl WldDocument {
    /// Parse a `.wld` file. Input is treated as Latin-1 bytes; the
    /// colour escape bytes used by world builders are outside ASCII
    /// and must round-trip losslessly.
    pub fn parse(bytes: &[u8]) -> WldResult<Self> {
        parser::parse_document(bytes)
    }

    pub fn load(path: impl AsRef<Path>) -> WldResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, vnum: u32) -> Option<&Room> {
        self.rooms.iter().find(|r| r.vnum == vnum)
    }

    /// Fetch a room for editing. The room is marked dirty and will be
    /// re-serialized in canonical layout on the next emit; every other
    /// room keeps its original bytes.
    pub fn room_mut(&mut self, vnum: u32) -> Option<&mut Room> {
        let room = self.rooms.iter_mut().find(|r| r.vnum == vnum)?;
        room.dirty = true;
        Some(room)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        writer::document_to_bytes(self)
    }

    /// Whole-file replace. Edits never happen in place on the open
    /// handle; the full byte image is rebuilt and written back.
    pub fn save(&self, path: impl AsRef<Path>) -> WldResult<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// True when the file ends with exactly `$~\n`. Absence of the
    /// final newline is a known boot-breaking failure mode.
    pub fn has_clean_tail(&self) -> bool {
        self.tail.ends_with(FILE_TERMINATOR)
    }
}
