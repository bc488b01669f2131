use crate::error::{ClientError, ClientResult, ServerFailure};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

/// One reply line, after `\r\n` stripping. Blank lines are a protocol
/// no-op (keep-alive or benign artifact) and must be skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK [payload]`
    Ok(Option<String>),
    /// `ERROR <code> <b64-message>`
    Err(ServerFailure),
    /// `DATA <fields...>`: one row of a streamed result
    Data(String),
    /// `END`: end of a streamed result
    End,
    Blank,
}

pub fn parse_reply(line: &str) -> ClientResult<Reply> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Reply::Blank);
    }
    let mut parts = line.splitn(2, ' ');
    let head = parts.next().unwrap_or("");
    let rest = parts.next();
    match head {
        "OK" => Ok(Reply::Ok(rest.map(str::to_string))),
        "END" => Ok(Reply::End),
        "DATA" => Ok(Reply::Data(rest.unwrap_or("").to_string())),
        "ERROR" => {
            let body = rest.unwrap_or("");
            let mut fields = body.splitn(2, ' ');
            let code = fields
                .next()
                .unwrap_or("")
                .parse()
                .map_err(|_| ClientError::protocol(format!("bad error code in '{line}'")))?;
            Ok(Reply::Err(ServerFailure::new(code, fields.next().unwrap_or(""))))
        }
        _ => Err(ClientError::protocol(format!("unrecognized reply line: {line}"))),
    }
}

/// One `DATA ZONE <vnum> <name-b64>` row from `wld_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    pub vnum: u32,
    pub name: String,
}

pub fn parse_zone_entry(payload: &str) -> ClientResult<ZoneEntry> {
    let mut fields = payload.split_whitespace();
    match (fields.next(), fields.next(), fields.next()) {
        (Some("ZONE"), Some(vnum), Some(name)) => Ok(ZoneEntry {
            vnum: vnum
                .parse()
                .map_err(|_| ClientError::protocol(format!("bad zone vnum '{vnum}'")))?,
            name: decode_text(name)?,
        }),
        _ => Err(ClientError::protocol(format!("bad zone row: {payload}"))),
    }
}

/// Human text in `DATA`/`ERROR` bodies is base64 so it survives the
/// line protocol.
pub fn decode_text(b64: &str) -> ClientResult<String> {
    let bytes = B64
        .decode(b64)
        .map_err(|e| ClientError::protocol(format!("bad base64 payload: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn encode_text(text: &str) -> String {
    B64.encode(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_reply_shape() {
        assert_eq!(parse_reply("OK\r\n").unwrap(), Reply::Ok(None));
        assert_eq!(
            parse_reply("OK ready").unwrap(),
            Reply::Ok(Some("ready".into()))
        );
        assert_eq!(parse_reply("END").unwrap(), Reply::End);
        assert_eq!(
            parse_reply("DATA ZONE 468 abc").unwrap(),
            Reply::Data("ZONE 468 abc".into())
        );
        assert_eq!(parse_reply("  \r\n").unwrap(), Reply::Blank);
        match parse_reply("ERROR 7 bm8gc3VjaCB6b25l").unwrap() {
            Reply::Err(f) => {
                assert_eq!(f.code, 7);
                assert_eq!(f.message(), "no such zone");
            }
            other => panic!("expected error reply, got {other:?}"),
        }
    }

    #[test]
    fn banner_lines_are_not_replies() {
        assert!(parse_reply("BuilderPort world editor").is_err());
        assert!(parse_reply("ERROR x y").is_err());
    }

    #[test]
    fn zone_entry_decodes_name() {
        let entry = parse_zone_entry(&format!("ZONE 468 {}", encode_text("The Open Road"))).unwrap();
        assert_eq!(entry.vnum, 468);
        assert_eq!(entry.name, "The Open Road");
    }

    #[test]
    fn text_codec_round_trips() {
        let s = "mind the \u{e9}tape";
        assert_eq!(decode_text(&encode_text(s)).unwrap(), s);
    }
}
