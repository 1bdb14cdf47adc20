use std::collections::{BTreeMap, BTreeSet};

use sentinela_core::{HighlightDirective, HighlightKind, PageSnapshot};

/// Marker class applied to whole-element highlights.
pub const ELEMENT_MARK_CLASS: &str = "sentinela-target";

/// Marker class of the inline text-range wrapper span.
pub const TEXT_MARK_CLASS: &str = "sentinela-target-text";

/// Inline override styles carried by a whole-element highlight. Reversal
/// removes exactly these properties.
pub const ELEMENT_MARK_STYLE: &str = "background-color: rgba(255, 0, 0, 0.2); box-shadow: inset 0 0 0 2px red; border-radius: 4px; padding: 0; margin: 0;";

const TEXT_MARK_OPEN: &str = r#"<span class="sentinela-target-text" style="background-color: rgba(255, 0, 0, 0.2); border-radius: 4px;">"#;
const TEXT_MARK_CLOSE: &str = "</span>";

/// Wraps the first case-insensitive occurrence of `phrase` in `html` in the
/// marker span. Only text outside tags is considered; a phrase interrupted
/// by markup does not match. Returns `None` when the phrase is absent.
pub fn wrap_first_occurrence(html: &str, phrase: &str) -> Option<String> {
    if phrase.is_empty() {
        return None;
    }
    let chars: Vec<(usize, char)> = html.char_indices().collect();
    let needle: Vec<char> = phrase.chars().collect();

    let mut in_tag = false;
    for i in 0..chars.len() {
        let (pos, ch) = chars[i];
        if ch == '<' {
            in_tag = true;
            continue;
        }
        if ch == '>' {
            in_tag = false;
            continue;
        }
        if in_tag || !matches_at(&chars, i, &needle) {
            continue;
        }

        let end = chars
            .get(i + needle.len())
            .map_or(html.len(), |(byte, _)| *byte);
        let mut out =
            String::with_capacity(html.len() + TEXT_MARK_OPEN.len() + TEXT_MARK_CLOSE.len());
        out.push_str(&html[..pos]);
        out.push_str(TEXT_MARK_OPEN);
        out.push_str(&html[pos..end]);
        out.push_str(TEXT_MARK_CLOSE);
        out.push_str(&html[end..]);
        return Some(out);
    }
    None
}

fn matches_at(chars: &[(usize, char)], at: usize, needle: &[char]) -> bool {
    if at + needle.len() > chars.len() {
        return false;
    }
    needle.iter().enumerate().all(|(offset, expected)| {
        let actual = chars[at + offset].1;
        actual != '<' && actual != '>' && actual.eq_ignore_ascii_case(expected)
    })
}

/// Removes every marker span, splicing its children back in place. The
/// output of `wrap_first_occurrence` round-trips to the original input.
pub fn strip_text_markers(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some((open_start, open_end)) = find_marker_open(rest) {
        out.push_str(&rest[..open_start]);
        let after_open = &rest[open_end..];
        match after_open.find(TEXT_MARK_CLOSE) {
            Some(close) => {
                out.push_str(&after_open[..close]);
                rest = &after_open[close + TEXT_MARK_CLOSE.len()..];
            }
            None => {
                // Unterminated marker: keep the content, drop the open tag.
                out.push_str(after_open);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Finds the next `<span ...>` open tag carrying the text marker class.
/// Returns (start of `<span`, end index just past `>`).
fn find_marker_open(html: &str) -> Option<(usize, usize)> {
    let mut search_from = 0;
    while let Some(found) = html[search_from..].find("<span") {
        let start = search_from + found;
        let tag_end = html[start..].find('>')? + start + 1;
        if html[start..tag_end].contains(TEXT_MARK_CLASS) {
            return Some((start, tag_end));
        }
        search_from = tag_end;
    }
    None
}

/// Highlight state for one tab's current document. Every scan fully reverses
/// the previous pass before reapplying, so wrapper spans never compound.
#[derive(Debug, Default)]
pub struct HighlightLayer {
    marked: BTreeSet<u32>,
    wrapped: BTreeMap<u32, String>,
}

impl HighlightLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reverses everything from the previous scan.
    pub fn reset(&mut self) {
        self.marked.clear();
        self.wrapped.clear();
    }

    /// Applies one scan's directives against `page`.
    pub fn apply(&mut self, page: &PageSnapshot, directives: &[HighlightDirective]) {
        self.reset();
        for directive in directives {
            let Some(element) = page.element(directive.element_id) else {
                continue;
            };
            match &directive.kind {
                HighlightKind::WholeElement => {
                    self.marked.insert(element.id);
                }
                HighlightKind::TextRange { phrase } => {
                    // Never wrap inside an element that already carries a
                    // marker span.
                    if element.html.contains(TEXT_MARK_CLASS) || self.wrapped.contains_key(&element.id)
                    {
                        continue;
                    }
                    if let Some(annotated) = wrap_first_occurrence(&element.html, phrase) {
                        self.wrapped.insert(element.id, annotated);
                    }
                }
            }
        }
    }

    /// Element ids currently carrying the whole-element mark.
    pub fn marked_elements(&self) -> Vec<u32> {
        self.marked.iter().copied().collect()
    }

    /// Element ids currently carrying a text-range wrapper.
    pub fn wrapped_elements(&self) -> Vec<u32> {
        self.wrapped.keys().copied().collect()
    }

    /// Annotated markup for a wrapped element.
    pub fn annotated_html(&self, element_id: u32) -> Option<&str> {
        self.wrapped.get(&element_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty() && self.wrapped.is_empty()
    }
}

/// The single persistent on-page banner. Refreshed on every scan: non-empty
/// case lists replace the previous banner, an empty list removes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Banner {
    cases: Vec<String>,
}

impl Banner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh(&mut self, cases: Vec<String>) {
        self.cases = cases;
    }

    pub fn remove(&mut self) {
        self.cases.clear();
    }

    pub fn is_visible(&self) -> bool {
        !self.cases.is_empty()
    }

    pub fn cases(&self) -> &[String] {
        &self.cases
    }
}
