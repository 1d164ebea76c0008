use pretty_assertions::assert_eq;
use rumdown_lib::extensions::TableExtension;
use rumdown_lib::{Markdown, Options};

fn tables() -> Markdown {
    Markdown::new(Options {
        extensions: vec!["tables".to_string()],
        ..Default::default()
    })
    .expect("tables extension is built in")
}

#[test]
fn test_bordered_table_with_alignment() {
    let html = tables().convert("| a | b |\n|---|--:|\n| 1 | 2 |").unwrap();
    let expected = "<table>
<thead>
<tr>
<th>a</th>
<th align=\"right\">b</th>
</tr>
</thead>
<tbody>
<tr>
<td>1</td>
<td align=\"right\">2</td>
</tr>
</tbody>
</table>";
    assert_eq!(html, expected);
}

#[test]
fn test_borderless_table_pads_missing_cells() {
    let html = tables().convert("a | b\n:-- | :-:\n1").unwrap();
    assert!(html.contains("<th align=\"left\">a</th>"), "{html}");
    assert!(html.contains("<th align=\"center\">b</th>"), "{html}");
    assert!(html.contains("<td align=\"left\">1</td>\n<td align=\"center\"></td>"), "{html}");
}

#[test]
fn test_extra_cells_are_dropped() {
    let html = tables().convert("a | b\n--- | ---\n1 | 2 | 3").unwrap();
    assert!(html.contains("<td>1</td>\n<td>2</td>\n</tr>"), "{html}");
    assert!(!html.contains('3'), "{html}");
}

#[test]
fn test_cells_get_inline_markup() {
    let html = tables().convert("| *a* | `b` |\n|---|---|\n| [l](/u) | c |").unwrap();
    assert!(html.contains("<th><em>a</em></th>"), "{html}");
    assert!(html.contains("<th><code>b</code></th>"), "{html}");
    assert!(html.contains("<td><a href=\"/u\">l</a></td>"), "{html}");
}

#[test]
fn test_tables_are_paragraphs_without_extension() {
    let html = Markdown::new(Options::default())
        .unwrap()
        .convert("a | b\n--- | ---\n1 | 2")
        .unwrap();
    assert!(!html.contains("<table>"), "{html}");
}

#[test]
fn test_extension_instance_registration_is_idempotent() {
    let markdown = Markdown::new(Options::default())
        .unwrap()
        .with_extension(TableExtension)
        .unwrap()
        .with_extension(TableExtension)
        .unwrap();
    assert_eq!(markdown.extensions(), ["tables".to_string()]);
    assert!(markdown.convert("a | b\n--- | ---\n1 | 2").unwrap().starts_with("<table>"));
}

#[test]
fn test_unknown_extension_is_rejected() {
    let result = Markdown::new(Options {
        extensions: vec!["footnotes".to_string()],
        ..Default::default()
    });
    assert!(result.is_err());
}
