use serde::Deserialize;
use wavescribe_core::{ProtocolError, Word};

/// End-of-stream marker, sent as a text frame once the audio source is
/// exhausted. The server flushes and finalizes remaining recognition on
/// receipt. The payload is the exact literal the server expects.
pub const EOF_MARKER: &str = r#"{"eof" : 1}"#;

/// One JSON reply from the recognition server.
///
/// `result` is present when the server has finalized recognition for audio
/// buffered since the last result; each element is an opaque word object.
/// `partial` and `text` are in-progress hypotheses the session does not
/// interpret; anything else is ignored.
#[derive(Debug, Deserialize)]
pub struct ServerReply {
    #[serde(default)]
    pub result: Option<Vec<Word>>,

    #[serde(default)]
    pub partial: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

pub fn parse_reply(raw: &str) -> Result<ServerReply, ProtocolError> {
    let reply = serde_json::from_str(raw)?;
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eof_marker_literal() {
        assert_eq!(EOF_MARKER, "{\"eof\" : 1}");
    }

    #[test]
    fn test_parse_reply_with_result() {
        let reply = parse_reply(r#"{"result":[{"word":"hello"},{"word":"world"}],"text":"hello world"}"#)
            .unwrap();
        let words = reply.result.unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text(), Some("hello"));
        assert_eq!(reply.text.as_deref(), Some("hello world"));
    }

    #[test]
    fn test_parse_reply_partial_only() {
        let reply = parse_reply(r#"{"partial":"hel"}"#).unwrap();
        assert!(reply.result.is_none());
        assert_eq!(reply.partial.as_deref(), Some("hel"));
    }

    #[test]
    fn test_parse_reply_empty_object() {
        let reply = parse_reply("{}").unwrap();
        assert!(reply.result.is_none());
    }

    #[test]
    fn test_parse_reply_ignores_unknown_fields() {
        let reply = parse_reply(r#"{"result":[],"spk":[0.1,0.2]}"#).unwrap();
        assert_eq!(reply.result.unwrap().len(), 0);
    }

    #[test]
    fn test_parse_reply_malformed_is_error() {
        match parse_reply("not json at all") {
            Err(ProtocolError::MalformedReply(_)) => {}
            other => panic!("expected MalformedReply, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_reply_words_carry_timing_fields() {
        let reply =
            parse_reply(r#"{"result":[{"word":"a","start":1.0,"end":1.5,"conf":0.9}]}"#).unwrap();
        let words = reply.result.unwrap();
        let json = serde_json::to_string(&words[0]).unwrap();
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["start"], 1.0);
        assert_eq!(back["end"], 1.5);
    }
}
