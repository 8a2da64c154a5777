// 集成测试公共模块
//
// 提供模拟翻译器和 DOM 辅助工具

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use mathmark::parsers::html::{find_nodes, html_to_dom, serialize_inner_html};
use mathmark::render::{RenderError, RenderResult, Translation, TranslationRequest, Translator, Typesetter};

/// 把表达式包进 `<math>` 的翻译器，记录每次调用
#[derive(Default, Clone)]
pub struct MockTranslator {
    pub calls: Rc<RefCell<Vec<(String, bool)>>>,
    /// 包含该子串的表达式翻译失败
    pub fail_on: Option<String>,
    /// 包含该子串的表达式让翻译器调用本身失败
    pub raise_on: Option<String>,
    pub available: Option<bool>,
}

impl MockTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    pub fn raising_on(pattern: &str) -> Self {
        Self {
            raise_on: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: Some(false),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.borrow().clone()
    }
}

impl Translator for MockTranslator {
    fn translate(&self, request: &TranslationRequest<'_>) -> RenderResult<Translation> {
        self.calls
            .borrow_mut()
            .push((request.expression.to_string(), request.display_mode));

        if let Some(pattern) = &self.raise_on {
            if request.expression.contains(pattern.as_str()) {
                return Err(RenderError::TranslatorError("translator crashed".to_string()));
            }
        }

        if let Some(pattern) = &self.fail_on {
            if request.expression.contains(pattern.as_str()) {
                return Ok(Translation::failed(
                    format!("<span class=\"error\">{}</span>", request.expression),
                    "unexpected token",
                ));
            }
        }

        Ok(Translation::ok(math_markup(request.expression, request.display_mode)))
    }

    fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

/// 模拟翻译器产生的标记
pub fn math_markup(expression: &str, display_mode: bool) -> String {
    let display = if display_mode { " display=\"block\"" } else { "" };
    format!("<math{}><mi>{}</mi></math>", display, expression)
}

/// 记录被通知次数的排版器
#[derive(Default, Clone)]
pub struct CountingTypesetter {
    pub count: Rc<Cell<usize>>,
}

impl Typesetter for CountingTypesetter {
    fn typeset(&self, _root: &Handle) {
        self.count.set(self.count.get() + 1);
    }
}

/// HTML 测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn create_test_dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    pub fn body(dom: &RcDom) -> Handle {
        find_nodes(&dom.document, vec!["html", "body"])
            .into_iter()
            .next()
            .expect("document should have a body")
    }

    pub fn inner_html(node: &Handle) -> String {
        serialize_inner_html(node).expect("serializable node")
    }
}
