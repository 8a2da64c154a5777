//! 区域提取集成测试
//!
//! 覆盖扁平字符串模式和 DOM 树模式的主要行为

use mathmark::parsers::html::get_text_content;
use mathmark::render::pipeline::{
    find_placeholders, mark_in_dom, mark_in_html_code, placeholder_expression, scan_regions,
    Segment,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::HtmlTestHelper;

#[test]
fn test_flat_mode_identity_without_delimiters() {
    let inputs = [
        "<p>No math here.</p>",
        "a \\ b \\\\ c",
        "<pre>code &amp; stuff</pre>",
        "",
    ];

    for input in inputs {
        let marked = mark_in_html_code(input).unwrap();
        assert_eq!(marked.code, input);
        assert!(marked.regions.is_empty());
    }
}

#[test]
fn test_flat_mode_single_region() {
    let marked = mark_in_html_code("Area: ⁅πr^2⁆.").unwrap();

    assert_eq!(marked.regions.len(), 1);
    assert_eq!(marked.regions[0].expression, "πr^2");
    assert_eq!(marked.regions[0].source, "⁅πr^2⁆");
    assert!(marked.code.starts_with("Area: <span class=\"unicodemathml-placeholder\""));
    assert!(marked.code.ends_with("⁅πr^2⁆</span>."));

    // 文本段加上原文可以还原输入
    let rebuilt: String = scan_regions("Area: ⁅πr^2⁆.")
        .iter()
        .map(|segment| match segment {
            Segment::Text(text) => text.clone(),
            Segment::Math(region) => region.source.clone(),
        })
        .collect();
    assert_eq!(rebuilt, "Area: ⁅πr^2⁆.");
}

#[test]
fn test_flat_mode_escaped_delimiters_are_literal() {
    let marked = mark_in_html_code(r"Use \⁅ and \⁆ to write delimiters, ⁅x⁆ for math.").unwrap();

    assert_eq!(marked.regions.len(), 1);
    assert_eq!(marked.regions[0].expression, "x");
    assert!(marked.code.starts_with("Use ⁅ and ⁆ to write delimiters, "));
}

#[test]
fn test_flat_mode_empty_region() {
    let marked = mark_in_html_code("⁅⁆").unwrap();

    assert_eq!(marked.regions.len(), 1);
    assert_eq!(marked.regions[0].expression, "");
    assert_eq!(
        marked.code,
        r#"<span class="unicodemathml-placeholder" data-unicodemath="">⁅⁆</span>"#
    );
}

#[test]
fn test_flat_mode_placeholders_parse_back() {
    let marked = mark_in_html_code("<p>⁅a&lt;b⁆ and ⁅1/2⁆</p>").unwrap();
    let dom = HtmlTestHelper::create_test_dom(&marked.code);
    let body = HtmlTestHelper::body(&dom);

    let expressions: Vec<String> = find_placeholders(&body)
        .iter()
        .map(|p| placeholder_expression(p).unwrap())
        .collect();
    // 扁平模式作用于源码，实体不会被解码
    assert_eq!(expressions, vec!["a&lt;b", "1/2"]);
}

#[test]
fn test_tree_mode_skips_excluded_elements() {
    let dom = HtmlTestHelper::create_test_dom(
        "<html><head><title>⁅t⁆</title></head><body>\
         <p>⁅a⁆</p><textarea>⁅b⁆</textarea><style>/* ⁅c⁆ */</style><div><code>⁅d⁆</code> ⁅e⁆</div>\
         </body></html>",
    );

    let stats = mark_in_dom(&dom.document);
    let expressions: Vec<String> = find_placeholders(&dom.document)
        .iter()
        .map(|p| placeholder_expression(p).unwrap())
        .collect();

    assert_eq!(expressions, vec!["a", "e"]);
    assert_eq!(stats.placeholders_created, 2);
    assert_eq!(stats.subtrees_skipped, 4);
}

#[test]
fn test_tree_mode_keeps_fallback_text() {
    let dom = HtmlTestHelper::create_test_dom("<p>x ⁅α+β⁆ y</p>");
    let body = HtmlTestHelper::body(&dom);

    mark_in_dom(&body);

    assert_eq!(get_text_content(&body), "x ⁅α+β⁆ y");
    assert_eq!(find_placeholders(&body).len(), 1);
}

#[test]
fn test_tree_mode_does_not_handle_escapes() {
    let dom = HtmlTestHelper::create_test_dom(r"<p>\⁅x⁆</p>");
    let body = HtmlTestHelper::body(&dom);

    mark_in_dom(&body);

    let placeholders = find_placeholders(&body);
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholder_expression(&placeholders[0]).unwrap(), "x");
    assert!(HtmlTestHelper::inner_html(&body).starts_with(r"<p>\<span"));
}
