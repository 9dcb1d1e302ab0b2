/// Heading anchor for `text`, in the style tutorial readers link to.
///
/// Lowercases and trims the text, drops ASCII punctuation and the general
/// punctuation blocks, then turns each remaining whitespace character into `-`.
/// Anchors are computed per heading with no de-duplication.
///
/// # Examples
///
/// ```
/// use chiron_core::slug::heading_slug;
///
/// assert_eq!(heading_slug("Deployments 2"), "deployments-2");
/// assert_eq!(heading_slug("What's a Pod?"), "whats-a-pod");
/// ```
pub fn heading_slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|ch| {
            if is_dropped(ch) {
                None
            } else if ch.is_whitespace() {
                Some('-')
            } else {
                Some(ch)
            }
        })
        .collect()
}

fn is_dropped(ch: char) -> bool {
    // General Punctuation and Supplemental Punctuation blocks
    matches!(ch, '\u{2000}'..='\u{206F}' | '\u{2E00}'..='\u{2E7F}')
        || "\\'!\"#$%&()*+,./:;<=>?@[]^`{|}~".contains(ch)
}
