use std::error::Error;
use std::fmt;

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::mpsc::UnboundedSender;

use crate::env::{core::NoColor, EnvVar};
use crate::parsers::html::{
    append_child, create_element, find_nodes, get_charset, html_to_dom, parse_html_fragment,
    serialize_document, serialize_inner_html,
};
use crate::render::pipeline::{mark_in_dom, mark_in_html_code};
use crate::render::{ProgressEvent, RenderConfig, RenderEngine, RenderReport, Translator};

/// Represents errors that can occur while processing a document
#[derive(Debug)]
pub struct MathmarkError {
    details: String,
}

impl MathmarkError {
    /// Creates a new MathmarkError with the given message
    pub fn new(msg: &str) -> MathmarkError {
        MathmarkError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for MathmarkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for MathmarkError {
    fn description(&self) -> &str {
        &self.details
    }
}

/// How math regions are located in the input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MarkingMode {
    /// Walk the parsed document tree (skips `pre`, `code`, ...)
    #[default]
    Tree,
    /// Scan the raw source text, honouring `\⁅` escapes (Markdeep)
    Markdeep,
}

/// Document processing options
#[derive(Default, Clone, Debug)]
pub struct DocumentOptions {
    pub encoding: Option<String>,
    pub mode: MarkingMode,
    pub silent: bool,
}

/// Result of rendering a whole document
#[derive(Debug)]
pub struct RenderedDocument {
    pub data: Vec<u8>,
    pub report: RenderReport,
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 编码处理器
pub struct EncodingProcessor;

impl EncodingProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_encoding(&self, encoding: &Option<String>) -> Result<(), MathmarkError> {
        if let Some(custom_encoding) = encoding {
            if Encoding::for_label_no_replacement(custom_encoding.as_bytes()).is_none() {
                return Err(MathmarkError::new(&format!(
                    "unknown encoding \"{}\"",
                    custom_encoding
                )));
            }
        }
        Ok(())
    }

    /// 解析文档，优先使用文档内 `<meta charset>` 声明的编码
    pub fn process_encoding(
        &self,
        input_data: &[u8],
        input_encoding: Option<String>,
    ) -> Result<(RcDom, String), MathmarkError> {
        let mut document_encoding = input_encoding.unwrap_or_else(|| "utf-8".to_string());

        let mut dom = html_to_dom(input_data, document_encoding.clone());

        if let Some(html_charset) = get_charset(&dom.document) {
            if !html_charset.is_empty() {
                if let Some(document_charset) =
                    Encoding::for_label_no_replacement(html_charset.as_bytes())
                {
                    document_encoding = html_charset;
                    dom = html_to_dom(input_data, document_charset.name().to_string());
                }
            }
        }

        Ok((dom, document_encoding))
    }

    /// 按指定编码把原始字节解码为文本
    pub fn decode_text(&self, input_data: &[u8], input_encoding: &Option<String>) -> String {
        let label = input_encoding.as_deref().unwrap_or("utf-8");
        match Encoding::for_label(label.as_bytes()) {
            Some(encoding) => encoding.decode(input_data).0.into_owned(),
            None => String::from_utf8_lossy(input_data).into_owned(),
        }
    }
}

impl Default for EncodingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// 解析输入并标记数学区域，返回文档和所用的编码
fn parse_and_mark(
    input_data: &[u8],
    options: &DocumentOptions,
) -> Result<(RcDom, String, usize), MathmarkError> {
    let encoding_processor = EncodingProcessor::new();
    encoding_processor.validate_encoding(&options.encoding)?;

    match options.mode {
        MarkingMode::Tree => {
            let (dom, document_encoding) =
                encoding_processor.process_encoding(input_data, options.encoding.clone())?;
            let stats = mark_in_dom(&dom.document);
            Ok((dom, document_encoding, stats.placeholders_created))
        }
        MarkingMode::Markdeep => {
            let text = encoding_processor.decode_text(input_data, &options.encoding);
            let marked = mark_in_html_code(&text)?;
            let dom = html_to_dom(marked.code.as_bytes(), "utf-8".to_string());
            let document_encoding = options.encoding.clone().unwrap_or_else(|| "utf-8".to_string());
            Ok((dom, document_encoding, marked.regions.len()))
        }
    }
}

/// Marks math regions in a document without translating them
pub fn mark_document_from_data(
    input_data: &[u8],
    options: &DocumentOptions,
) -> Result<(Vec<u8>, usize), MathmarkError> {
    let (dom, document_encoding, regions) = parse_and_mark(input_data, options)?;
    let data = serialize_document(dom, document_encoding)?;
    Ok((data, regions))
}

/// Marks and renders every math region in a document
///
/// The returned future is not `Send`; drive it on a current-thread runtime.
pub async fn render_document<T: Translator>(
    translator: T,
    config: RenderConfig,
    input_data: &[u8],
    options: &DocumentOptions,
    progress: Option<UnboundedSender<ProgressEvent>>,
) -> Result<RenderedDocument, MathmarkError> {
    config.validate()?;

    let (dom, document_encoding, regions) = parse_and_mark(input_data, options)?;
    tracing::debug!("文档中找到 {} 个数学区域", regions);

    let mut engine = RenderEngine::new(translator, config);
    let report = engine.render_marked(&dom.document, progress).await?;

    if !options.silent {
        print_render_summary(&report);
    }

    let data = serialize_document(dom, document_encoding)?;
    Ok(RenderedDocument { data, report })
}

/// Synchronous variant of [`render_document`] without progress reporting
pub fn render_document_from_data<T: Translator>(
    translator: T,
    config: RenderConfig,
    input_data: &[u8],
    options: &DocumentOptions,
) -> Result<RenderedDocument, MathmarkError> {
    let runtime = build_runtime()?;
    runtime.block_on(render_document(translator, config, input_data, options, None))
}

/// Renders math regions inside an HTML code fragment (Markdeep flow)
///
/// Regions are located with the escape-aware string scanner, the marked
/// code is parsed as a fragment, rendered and serialized back.
pub fn render_html_code_from_data<T: Translator>(
    translator: T,
    config: RenderConfig,
    code: &str,
) -> Result<(String, RenderReport), MathmarkError> {
    config.validate()?;

    let marked = mark_in_html_code(code)?;
    let container = fragment_container(&marked.code);

    let runtime = build_runtime()?;
    let mut engine = RenderEngine::new(translator, config);
    let report = runtime.block_on(engine.render_marked(&container, None))?;

    Ok((serialize_inner_html(&container)?, report))
}

fn fragment_container(code: &str) -> Handle {
    let container = create_element("div", vec![]);
    for node in parse_html_fragment(code) {
        append_child(&container, node);
    }
    container
}

fn build_runtime() -> Result<tokio::runtime::Runtime, MathmarkError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| MathmarkError::new(&format!("Unable to start runtime: {e}")))
}

/// Returns the `<body>` of a parsed document
pub fn document_body(dom: &RcDom) -> Option<Handle> {
    find_nodes(&dom.document, vec!["html", "body"]).into_iter().next()
}

fn print_render_summary(report: &RenderReport) {
    if report.errors > 0 {
        print_error_message(&format!(
            "{} of {} expressions failed to translate",
            report.errors, report.total
        ));
    }
}

/// Prints an error message to stderr, in red when stderr is a terminal
pub fn print_error_message(msg: &str) {
    let no_color = NoColor::get().unwrap_or(false);
    if !no_color && atty::is(atty::Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderResult, Translation, TranslationRequest};

    struct Upper;

    impl Translator for Upper {
        fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation> {
            Ok(Translation::ok(format!(
                "<math display=\"{}\"><mi>{}</mi></math>",
                if request.display_mode { "block" } else { "inline" },
                request.expression.to_uppercase()
            )))
        }
    }

    #[test]
    fn test_mathmark_error_new() {
        let error = MathmarkError::new("test error");
        assert_eq!(error.details, "test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_unknown_encoding_is_rejected() {
        let options = DocumentOptions {
            encoding: Some("not-a-charset".to_string()),
            ..Default::default()
        };
        assert!(mark_document_from_data(b"<p>x</p>", &options).is_err());
    }

    #[test]
    fn test_process_encoding_prefers_meta_charset() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xe9</body></html>";
        let (dom, encoding) = EncodingProcessor::new()
            .process_encoding(html, None)
            .unwrap();

        assert_eq!(encoding, "windows-1252");
        let body = document_body(&dom).unwrap();
        assert_eq!(crate::parsers::html::get_text_content(&body), "café");
    }

    #[test]
    fn test_mark_document_tree_mode() {
        let (data, regions) =
            mark_document_from_data("<p>⁅a⁆</p><pre>⁅b⁆</pre>".as_bytes(), &DocumentOptions::default())
                .unwrap();
        let html = String::from_utf8(data).unwrap();

        assert_eq!(regions, 1);
        assert!(html.contains(r#"data-unicodemath="a""#));
        assert!(html.contains("<pre>⁅b⁆</pre>"));
    }

    #[test]
    fn test_render_document_from_data() {
        let result = render_document_from_data(
            Upper,
            RenderConfig::default(),
            "<p>⁅x⁆</p><p>see ⁅y⁆</p>".as_bytes(),
            &DocumentOptions {
                silent: true,
                ..Default::default()
            },
        )
        .unwrap();
        let html = String::from_utf8(result.data).unwrap();

        assert_eq!(result.report.processed, 2);
        assert!(html.contains(r#"<math display="block"><mi>X</mi></math>"#));
        assert!(html.contains(r#"see <math display="inline"><mi>Y</mi></math>"#));
        assert!(!html.contains("unicodemathml-placeholder"));
    }

    #[test]
    fn test_render_html_code_from_data_honours_escapes() {
        let (code, report) = render_html_code_from_data(
            Upper,
            RenderConfig::default(),
            r"<p>⁅a⁆ and \⁅b\⁆</p>",
        )
        .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(code, r#"<p><math display="inline"><mi>A</mi></math> and ⁅b⁆</p>"#);
    }
}
