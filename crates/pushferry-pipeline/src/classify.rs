//! Message classification.

use pushferry_types::{ClassifiedReference, MessageKind, RawMessage};

const MAGNET_SCHEME: &str = "magnet:";
const TORRENT_SUFFIX: &str = ".torrent";

/// Classify a raw message as a torrent reference.
///
/// Rules are evaluated in order and the first match wins:
/// a link whose URL carries the `magnet:` scheme, a link whose URL ends in
/// `.torrent`, a note whose body starts with `magnet:`, and everything else
/// is irrelevant. The function is pure and total: an unset URL behaves as an
/// empty string, and unhandled message shapes fall through to
/// [`ClassifiedReference::Irrelevant`] rather than failing.
pub fn classify(msg: &RawMessage) -> ClassifiedReference {
    let url = msg.url.as_deref().unwrap_or_default();
    match msg.kind {
        MessageKind::Link if url.starts_with(MAGNET_SCHEME) => {
            ClassifiedReference::Magnet(url.to_owned())
        }
        MessageKind::Link if url.ends_with(TORRENT_SUFFIX) => {
            ClassifiedReference::TorrentUrl(url.to_owned())
        }
        MessageKind::Note if msg.body.starts_with(MAGNET_SCHEME) => {
            ClassifiedReference::Magnet(msg.body.clone())
        }
        // File attachments have no handling path; new message shapes fail
        // closed into the irrelevant arm.
        MessageKind::File | MessageKind::Link | MessageKind::Note => {
            ClassifiedReference::Irrelevant
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_message;

    #[test]
    fn link_with_magnet_url_classifies_as_magnet() {
        let msg = make_message(
            "p1",
            MessageKind::Link,
            "",
            Some("magnet:?xt=urn:btih:abc"),
            Some("dev-1"),
        );
        assert_eq!(
            classify(&msg),
            ClassifiedReference::Magnet("magnet:?xt=urn:btih:abc".to_string())
        );
    }

    #[test]
    fn link_with_torrent_url_classifies_as_torrent_url() {
        let msg = make_message(
            "p2",
            MessageKind::Link,
            "",
            Some("http://example.com/release.torrent"),
            Some("dev-1"),
        );
        assert_eq!(
            classify(&msg),
            ClassifiedReference::TorrentUrl("http://example.com/release.torrent".to_string())
        );
    }

    #[test]
    fn magnet_rule_wins_over_torrent_suffix() {
        // A magnet URI that happens to end in ".torrent" is still a magnet.
        let msg = make_message(
            "p3",
            MessageKind::Link,
            "",
            Some("magnet:?dn=file.torrent"),
            Some("dev-1"),
        );
        assert_eq!(
            classify(&msg),
            ClassifiedReference::Magnet("magnet:?dn=file.torrent".to_string())
        );
    }

    #[test]
    fn note_with_magnet_body_classifies_as_magnet() {
        let msg = make_message(
            "p4",
            MessageKind::Note,
            "magnet:?xt=urn:btih:def",
            None,
            Some("dev-1"),
        );
        assert_eq!(
            classify(&msg),
            ClassifiedReference::Magnet("magnet:?xt=urn:btih:def".to_string())
        );
    }

    #[test]
    fn note_without_magnet_body_is_irrelevant() {
        let msg = make_message("p5", MessageKind::Note, "check this out", None, Some("dev-1"));
        assert_eq!(classify(&msg), ClassifiedReference::Irrelevant);
    }

    #[test]
    fn link_with_plain_url_is_irrelevant() {
        let msg = make_message(
            "p6",
            MessageKind::Link,
            "",
            Some("http://example.com/page.html"),
            Some("dev-1"),
        );
        assert_eq!(classify(&msg), ClassifiedReference::Irrelevant);
    }

    #[test]
    fn link_without_url_is_irrelevant() {
        let msg = make_message("p7", MessageKind::Link, "magnet:?xt=abc", None, Some("dev-1"));
        assert_eq!(classify(&msg), ClassifiedReference::Irrelevant);
    }

    #[test]
    fn file_attachment_is_irrelevant() {
        let msg = make_message(
            "p8",
            MessageKind::File,
            "",
            Some("http://example.com/file.torrent"),
            Some("dev-1"),
        );
        assert_eq!(classify(&msg), ClassifiedReference::Irrelevant);
    }
}
