use pretty_assertions::assert_eq;
use rumdown_lib::{Markdown, Options, SafeMode, markdown_to_html};

fn convert(text: &str) -> String {
    markdown_to_html(text, SafeMode::Default).expect("conversion should succeed")
}

fn convert_with(options: Options, text: &str) -> String {
    Markdown::new(options)
        .expect("valid options")
        .convert(text)
        .expect("conversion should succeed")
}

#[test]
fn test_paragraphs_split_on_blank_lines() {
    assert_eq!(convert("one\ntwo\n\nthree"), "<p>one\ntwo</p>\n<p>three</p>");
}

#[test]
fn test_empty_document() {
    assert_eq!(convert(""), "");
    assert_eq!(convert("\n\n   \n"), "");
}

#[test]
fn test_setext_headers() {
    assert_eq!(convert("Title\n=====\n\nSub\n---"), "<h1>Title</h1>\n<h2>Sub</h2>");
}

#[test]
fn test_hash_header_strips_closing_hashes() {
    assert_eq!(convert("## Two ##"), "<h2>Two</h2>");
}

#[test]
fn test_hash_header_inside_paragraph_block() {
    assert_eq!(convert("para\n# Head\nmore"), "<p>para</p>\n<h1>Head</h1>\n<p>more</p>");
}

#[test]
fn test_horizontal_rule_between_paragraphs() {
    assert_eq!(convert("a\n\n---\n\nb"), "<p>a</p>\n<hr />\n<p>b</p>");
    assert_eq!(convert("* * *"), "<hr />");
}

#[test]
fn test_code_block_is_detabbed_and_escaped() {
    assert_eq!(
        convert("Para\n\n    code <b>\n    more\n\nAfter"),
        "<p>Para</p>\n<pre><code>code &lt;b&gt;\nmore\n</code></pre>\n<p>After</p>"
    );
}

#[test]
fn test_code_block_keeps_inner_blank_lines() {
    assert_eq!(convert("    a\n\n    b"), "<pre><code>a\n\nb\n</code></pre>");
}

#[test]
fn test_code_block_ignores_inline_markup() {
    assert_eq!(convert("    *not em*"), "<pre><code>*not em*\n</code></pre>");
}

#[test]
fn test_blockquote() {
    assert_eq!(
        convert("> quote\n> more\n\nafter"),
        "<blockquote>\n<p>quote\nmore</p>\n</blockquote>\n<p>after</p>"
    );
}

#[test]
fn test_nested_blockquote() {
    assert_eq!(
        convert("> a\n>\n> > b"),
        "<blockquote>\n<p>a</p>\n<blockquote>\n<p>b</p>\n</blockquote>\n</blockquote>"
    );
}

#[test]
fn test_tight_unordered_list() {
    assert_eq!(convert("* a\n* b\n- c"), "<ul>\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>");
}

#[test]
fn test_loose_list_wraps_items_in_paragraphs() {
    assert_eq!(
        convert("* a\n\n* b"),
        "<ul>\n<li>\n<p>a</p>\n</li>\n<li>\n<p>b</p>\n</li>\n</ul>"
    );
}

#[test]
fn test_list_of_other_kind_starts_new_list() {
    assert_eq!(convert("1. a\n\n* b"), "<ol>\n<li>a</li>\n</ol>\n<ul>\n<li>b</li>\n</ul>");
    assert_eq!(convert("* a\n\n1. b"), "<ul>\n<li>a</li>\n</ul>\n<ol>\n<li>b</li>\n</ol>");
}

#[test]
fn test_nested_list() {
    assert_eq!(
        convert("* a\n    * b"),
        "<ul>\n<li>a<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>"
    );
}

#[test]
fn test_indented_paragraph_continues_list_item() {
    assert_eq!(
        convert("* item\n\n    continued"),
        "<ul>\n<li>\n<p>item</p>\n<p>continued</p>\n</li>\n</ul>"
    );
}

#[test]
fn test_ordered_list_start_attribute() {
    assert_eq!(
        convert("3. three\n4. four"),
        "<ol start=\"3\">\n<li>three</li>\n<li>four</li>\n</ol>"
    );
    assert_eq!(convert("1. one\n2. two"), "<ol>\n<li>one</li>\n<li>two</li>\n</ol>");
}

#[test]
fn test_lazy_ol_ignores_start_number() {
    let options = Options {
        lazy_ol: true,
        ..Default::default()
    };
    assert_eq!(convert_with(options, "3. three\n4. four"), "<ol>\n<li>three</li>\n<li>four</li>\n</ol>");
}

#[test]
fn test_custom_tab_length() {
    let options = Options {
        tab_length: 2,
        ..Default::default()
    };
    assert_eq!(convert_with(options, "  code"), "<pre><code>code\n</code></pre>");
}

#[test]
fn test_tabs_expand_to_tab_length() {
    assert_eq!(convert("\tcode"), "<pre><code>code\n</code></pre>");
}

#[test]
fn test_raw_html_block_passes_through() {
    assert_eq!(
        convert("<div>\n*raw*\n</div>\n\npara"),
        "<div>\n*raw*\n</div>\n\n<p>para</p>"
    );
}

#[test]
fn test_reference_definitions_are_removed() {
    assert_eq!(
        convert("[Google][g]\n\n[g]: http://google.com/ \"Search\""),
        "<p><a href=\"http://google.com/\" title=\"Search\">Google</a></p>"
    );
}

#[test]
fn test_windows_line_endings() {
    assert_eq!(convert("a\r\nb\r\n\r\nc"), "<p>a\nb</p>\n<p>c</p>");
}

#[test]
fn test_tree_shape() {
    let markdown = Markdown::new(Options::default()).unwrap();
    let root = markdown.tree("# T\n\n* a").unwrap();
    let tags: Vec<&str> = root.children.iter().map(|c| c.tag.as_str()).collect();
    assert_eq!(tags, vec!["h1", "ul"]);
    assert_eq!(root.children[1].children[0].text, "a");
}
