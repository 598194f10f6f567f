//! Turns accepted suggestions into an annotated copy of the document.

use crate::suggest::Suggestion;

/// A stretch of the document: either untouched prose or an already
/// inserted link. Anchors are only searched in prose stretches.
struct Segment {
    text: String,
    linked: bool,
}

/// Insert an HTML link for each accepted suggestion, replacing the first
/// occurrence of its anchor text in the document.
///
/// Anchors that no longer appear (the document changed, or the anchor came
/// from catalog metadata rather than the text) are left out and logged.
/// Previously inserted markup is never searched, so an anchor cannot land
/// inside another suggestion's `href` attribute.
pub fn apply_links(document: &str, accepted: &[Suggestion]) -> String {
    let mut segments = vec![Segment {
        text: document.to_string(),
        linked: false,
    }];

    for suggestion in accepted {
        let anchor = suggestion.anchor_text.as_str();

        let position = if anchor.is_empty() {
            None
        } else {
            segments.iter().enumerate().find_map(|(idx, segment)| {
                if segment.linked {
                    return None;
                }
                segment.text.find(anchor).map(|at| (idx, at))
            })
        };

        let Some((idx, at)) = position else {
            log::warn!(
                "Anchor {anchor:?} not found in document, skipping link to {}",
                suggestion.target_url
            );
            continue;
        };

        let segment = segments.remove(idx);
        let before = segment.text[..at].to_string();
        let after = segment.text[at + anchor.len()..].to_string();
        let link = format!(r#"<a href="{}">{}</a>"#, suggestion.target_url, anchor);

        segments.insert(
            idx,
            Segment {
                text: before,
                linked: false,
            },
        );
        segments.insert(
            idx + 1,
            Segment {
                text: link,
                linked: true,
            },
        );
        segments.insert(
            idx + 2,
            Segment {
                text: after,
                linked: false,
            },
        );
    }

    segments.into_iter().map(|s| s.text).collect()
}
