use pretty_assertions::assert_eq;
use sentinela_core::{HighlightDirective, HighlightKind, PageSnapshot, Region};
use sentinela_engine::{
    strip_text_markers, wrap_first_occurrence, HighlightLayer, TEXT_MARK_CLASS,
};

#[test]
fn wrap_then_strip_restores_the_original_markup() {
    let html = "Anel <b>lindo</b> com pedra azul";
    let wrapped = wrap_first_occurrence(html, "com pedra").expect("phrase present");
    assert!(wrapped.contains(TEXT_MARK_CLASS));
    assert_eq!(strip_text_markers(&wrapped), html);
}

#[test]
fn wrap_matches_case_insensitively_but_keeps_original_casing() {
    let html = "Anel Com Pedra azul";
    let wrapped = wrap_first_occurrence(html, "com pedra").expect("phrase present");
    assert!(wrapped.contains(">Com Pedra</span>"));
}

#[test]
fn wrap_targets_only_the_first_occurrence() {
    let html = "com pedra e mais com pedra";
    let wrapped = wrap_first_occurrence(html, "com pedra").expect("phrase present");
    assert_eq!(wrapped.matches(TEXT_MARK_CLASS).count(), 1);
    assert!(wrapped.ends_with("e mais com pedra"));
}

#[test]
fn wrap_ignores_text_inside_tags() {
    // The phrase only occurs inside an attribute value.
    let html = r#"<div title="com pedra">sem nada</div>"#;
    assert_eq!(wrap_first_occurrence(html, "com pedra"), None);
}

#[test]
fn wrap_does_not_match_across_markup() {
    let html = "com <b>pedra</b>";
    assert_eq!(wrap_first_occurrence(html, "com pedra"), None);
}

#[test]
fn wrap_missing_phrase_returns_none() {
    assert_eq!(wrap_first_occurrence("sem marcador", "com pedra"), None);
    assert_eq!(wrap_first_occurrence("qualquer", ""), None);
}

#[test]
fn strip_handles_multiple_markers() {
    let html = "a com pedra b";
    let once = wrap_first_occurrence(html, "com pedra").unwrap();
    // A second marker elsewhere in the same markup.
    let twice = format!(
        "{once} <span class=\"sentinela-target-text\" style=\"x\">c</span>"
    );
    assert_eq!(strip_text_markers(&twice), format!("{html} c"));
}

#[test]
fn strip_leaves_unrelated_spans_alone() {
    let html = r#"<span class="price">10</span> com pedra"#;
    assert_eq!(strip_text_markers(html), html);
    let wrapped = wrap_first_occurrence(html, "com pedra").unwrap();
    assert_eq!(strip_text_markers(&wrapped), html);
}

fn page_with_sublabel(html: &str) -> PageSnapshot {
    let mut page = PageSnapshot::new(1, "file://page", "");
    page.push_element(Region::Sublabel, strip_tags_for_text(html), html);
    page
}

fn strip_tags_for_text(html: &str) -> String {
    html.chars().filter(|c| *c != '<' && *c != '>').collect()
}

#[test]
fn layer_apply_reverses_the_previous_pass_first() {
    let mut layer = HighlightLayer::new();
    let page = page_with_sublabel("brinco com pedra");
    let directives = vec![HighlightDirective {
        element_id: 0,
        kind: HighlightKind::TextRange {
            phrase: "com pedra".to_string(),
        },
    }];

    layer.apply(&page, &directives);
    let first = layer.annotated_html(0).unwrap().to_string();

    // Re-applying against the same pristine page must not compound spans.
    layer.apply(&page, &directives);
    assert_eq!(layer.annotated_html(0), Some(first.as_str()));
    assert_eq!(first.matches(TEXT_MARK_CLASS).count(), 1);
}

#[test]
fn layer_never_wraps_an_already_marked_element() {
    let mut layer = HighlightLayer::new();
    let mut page = PageSnapshot::new(1, "file://page", "");
    let marked = wrap_first_occurrence("brinco com pedra", "com pedra").unwrap();
    page.push_element(Region::Sublabel, "brinco com pedra", marked);

    layer.apply(
        &page,
        &[HighlightDirective {
            element_id: 0,
            kind: HighlightKind::TextRange {
                phrase: "com pedra".to_string(),
            },
        }],
    );
    assert!(layer.wrapped_elements().is_empty());
}

#[test]
fn layer_reset_clears_all_marks() {
    let mut layer = HighlightLayer::new();
    let page = page_with_sublabel("brinco com pedra");
    layer.apply(
        &page,
        &[
            HighlightDirective {
                element_id: 0,
                kind: HighlightKind::WholeElement,
            },
            HighlightDirective {
                element_id: 0,
                kind: HighlightKind::TextRange {
                    phrase: "com pedra".to_string(),
                },
            },
        ],
    );
    assert_eq!(layer.marked_elements(), vec![0]);
    assert_eq!(layer.wrapped_elements(), vec![0]);

    layer.reset();
    assert!(layer.is_empty());
}
