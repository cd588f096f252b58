use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use newswatch_logging::watch_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("document is not readable as {encoding}")]
    Malformed { encoding: String },
}

/// Decodes a fetched document to UTF-8.
///
/// Order of authority: byte order mark, then the `Content-Type` charset, then
/// a `chardetng` guess. Undecodable sequences become U+FFFD so one bad byte
/// cannot hide the rest of the page; only a document that is mostly
/// undecodable is rejected.
pub fn decode_document(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<DecodedDocument, DecodeError> {
    let (encoding, origin) = if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        (encoding, "byte order mark")
    } else if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        (encoding, "declared charset")
    } else {
        let mut detector = EncodingDetector::new();
        detector.feed(bytes, true);
        (detector.guess(None, true), "detected charset")
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        let replaced = text
            .chars()
            .filter(|&c| c == char::REPLACEMENT_CHARACTER)
            .count();
        if replaced * 2 > text.chars().count() {
            return Err(DecodeError::Malformed {
                encoding: encoding.name().to_string(),
            });
        }
        watch_warn!(
            "Replaced {} undecodable sequences reading document as {} ({})",
            replaced,
            encoding.name(),
            origin
        );
    }
    Ok(DecodedDocument {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
    })
}

fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_param_is_case_insensitive_and_unquoted() {
        assert_eq!(
            charset_param("text/html; Charset=\"ISO-8859-1\"").as_deref(),
            Some("ISO-8859-1")
        );
        assert_eq!(charset_param("text/html"), None);
    }

    #[test]
    fn stray_invalid_bytes_are_replaced() {
        let decoded = decode_document(b"caf\xe9 au lait", Some("text/html; charset=utf-8")).unwrap();
        assert_eq!(decoded.text, "caf\u{FFFD} au lait");
        assert_eq!(decoded.encoding_label, "UTF-8");
    }

    #[test]
    fn mostly_undecodable_document_is_rejected() {
        let err = decode_document(&[0xff; 64], Some("text/html; charset=utf-8")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Malformed {
                encoding: "UTF-8".to_string()
            }
        );
    }
}
