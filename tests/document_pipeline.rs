//! 文档处理流程集成测试

use tokio::sync::mpsc;

use mathmark::core::{
    mark_document_from_data, render_document, render_document_from_data,
    render_html_code_from_data, DocumentOptions, MarkingMode,
};
use mathmark::render::{translate_input, ProgressEvent, RenderConfig};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{math_markup, MockTranslator};

fn silent() -> DocumentOptions {
    DocumentOptions {
        silent: true,
        ..Default::default()
    }
}

#[test]
fn test_render_document_tree_mode() {
    let html = "<html><body><p>⁅E=mc^2⁆</p><pre>⁅raw⁆</pre></body></html>";
    let translator = MockTranslator::new();

    let rendered =
        render_document_from_data(translator.clone(), RenderConfig::default(), html.as_bytes(), &silent())
            .unwrap();
    let output = String::from_utf8(rendered.data).unwrap();

    assert!(output.contains(&math_markup("E=mc^2", true)));
    assert!(output.contains("<pre>⁅raw⁆</pre>"));
    assert_eq!(translator.call_count(), 1);
    assert!(rendered.report.is_clean());
}

#[test]
fn test_render_document_markdeep_mode() {
    let html = r"<p>Escaped \⁅not math\⁆ and ⁅m⁆</p><pre>⁅also math⁆</pre>";
    let options = DocumentOptions {
        mode: MarkingMode::Markdeep,
        silent: true,
        ..Default::default()
    };

    let rendered =
        render_document_from_data(MockTranslator::new(), RenderConfig::default(), html.as_bytes(), &options)
            .unwrap();
    let output = String::from_utf8(rendered.data).unwrap();

    // 扁平模式不区分元素，pre 中的区域也会被渲染
    assert_eq!(rendered.report.total, 2);
    assert!(output.contains("Escaped ⁅not math⁆ and "));
    assert!(output.contains(&math_markup("also math", false)));
}

#[test]
fn test_render_html_code_fragment() {
    let (code, report) = render_html_code_from_data(
        MockTranslator::failing_on("?"),
        RenderConfig::default(),
        "<p>⁅a⁆</p><p>then ⁅b?⁆</p>",
    )
    .unwrap();

    assert_eq!(report.errors, 1);
    assert_eq!(
        code,
        format!(
            "<p>{}</p><p>then <span class=\"error\">b?</span></p>",
            math_markup("a", true)
        )
    );
}

#[test]
fn test_mark_document_keeps_source_text() {
    let (data, regions) = mark_document_from_data("<p>⁅x⁆</p>".as_bytes(), &silent()).unwrap();
    let output = String::from_utf8(data).unwrap();

    assert_eq!(regions, 1);
    assert!(output.contains(
        r#"<p><span class="unicodemathml-placeholder" data-unicodemath="x">⁅x⁆</span></p>"#
    ));
}

#[tokio::test]
async fn test_render_document_reports_progress() {
    let config = RenderConfig {
        progress_interval_ms: 0,
        ..Default::default()
    };
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let rendered = render_document(
        MockTranslator::new(),
        config,
        "<div>⁅a⁆ ⁅b⁆</div>".as_bytes(),
        &silent(),
        Some(sender),
    )
    .await
    .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }

    assert_eq!(rendered.report.processed, 2);
    assert_eq!(events.first(), Some(&ProgressEvent::Started { total: 2 }));
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Finished {
            processed: 2,
            errors: 0
        })
    );
}

#[test]
fn test_invalid_config_is_rejected_before_rendering() {
    let config = RenderConfig {
        progress_interval_ms: 600_000,
        ..Default::default()
    };
    let translator = MockTranslator::new();

    let result = render_document_from_data(translator.clone(), config, b"<p>x</p>", &silent());

    assert!(result.is_err());
    assert_eq!(translator.call_count(), 0);
}

#[test]
fn test_translate_input_lines() {
    let config = RenderConfig {
        split_input: true,
        ..Default::default()
    };
    let result = translate_input(&MockTranslator::new(), "a\n\nb", &config).unwrap();

    assert_eq!(result.items.len(), 2);
    assert_eq!(
        result.to_html(),
        format!("{}{}", math_markup("a", false), math_markup("b", false))
    );
}
