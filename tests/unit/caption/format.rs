use super::*;

const BOLD_HI: &str = "\u{1D407}\u{1D422}";
const ITALIC_HI: &str = "\u{1D43B}\u{1D456}";
const BOLD_ITALIC_HI: &str = "\u{1D46F}\u{1D48A}";

#[test]
fn bold_maps_to_mathematical_bold() {
    assert_eq!(format_caption("<b>Hi</b>"), BOLD_HI);
    assert_eq!(format_caption("<strong>Hi</strong>"), BOLD_HI);
}

#[test]
fn italic_maps_to_mathematical_italic() {
    assert_eq!(format_caption("<i>Hi</i>"), ITALIC_HI);
    assert_eq!(format_caption("<em>Hi</em>"), ITALIC_HI);
}

#[test]
fn nested_bold_italic_uses_the_combined_alphabet() {
    assert_eq!(format_caption("<b><i>Hi</i></b>"), BOLD_ITALIC_HI);
    assert_eq!(format_caption("<em><strong>Hi</strong></em>"), BOLD_ITALIC_HI);
}

#[test]
fn styles_end_with_their_element() {
    assert_eq!(format_caption("<b>Hi</b> there"), format!("{BOLD_HI} there"));
}

#[test]
fn links_emit_the_url_not_the_label() {
    assert_eq!(
        format_caption(r#"<a href="https://x.test">click</a>"#),
        "https://x.test"
    );
    assert_eq!(
        format_caption(r#"<b>see <a href="https://x.test">here</a></b>"#),
        "\u{1D42C}\u{1D41E}\u{1D41E} https://x.test"
    );
}

#[test]
fn links_without_href_are_transparent() {
    assert_eq!(format_caption("<a>label</a>"), "label");
    assert_eq!(format_caption(r#"<a href=" ">label</a>"#), "label");
}

#[test]
fn line_breaks_and_blocks() {
    assert_eq!(format_caption("one<br>two"), "one\ntwo");
    assert_eq!(format_caption("<div>one</div><div>two</div>"), "one\ntwo");
    assert_eq!(format_caption("<p>one</p><p>two</p>"), "one\ntwo");
    assert_eq!(format_caption("one<div>two</div>three"), "one\ntwo\nthree");
    assert_eq!(format_caption("<div><div>nested</div></div>after"), "nested\nafter");
}

#[test]
fn unknown_tags_are_transparent() {
    assert_eq!(
        format_caption("<span>a<u>b</u></span><b><span>c</span></b>"),
        "ab\u{1D41C}"
    );
}

#[test]
fn entities_are_decoded_and_whitespace_trimmed() {
    assert_eq!(format_caption("  <div>Tom &amp; Jerry</div>  "), "Tom & Jerry");
    assert_eq!(format_caption(""), "");
    assert_eq!(format_caption("<!-- note -->x"), "x");
}

#[test]
fn formatting_is_deterministic() {
    let html = "<b>Hi</b><div><i>there</i></div>";
    let first = format_caption(html);
    let _ = format_caption("<b><i>unrelated</i></b>");
    assert_eq!(format_caption(html), first);
}

#[test]
fn whitespace_between_blocks_adds_no_blank_lines() {
    assert_eq!(format_caption("<div>a</div>\n<div>b</div>"), "a\nb");
    assert_eq!(format_caption("<p>a</p> <p>b</p>"), "a\nb");
    assert_eq!(
        format_caption("<div>\n  <p>one</p>\n  <p>two</p>\n</div>\n"),
        "one\ntwo"
    );
    assert_eq!(format_caption("a <div>b</div>"), "a\nb");
    assert_eq!(format_caption("a<br>\n  b"), "a\nb");
}

#[test]
fn inner_spaces_survive() {
    assert_eq!(
        format_caption("<b>Hi</b> <i>there</i>"),
        "\u{1D407}\u{1D422} \u{1D461}\u{210E}\u{1D452}\u{1D45F}\u{1D452}"
    );
}
