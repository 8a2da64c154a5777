//! 渲染引擎核心实现
//!
//! 遍历上下文节点下的所有占位符，逐个调用翻译器并把结果就地替换进文档。
//!
//! ## 工作流程
//! 1. 运行 `before` 回调
//! 2. 按文档顺序收集占位符（收集完成后才开始修改文档）
//! 3. 对每个占位符：解码表达式、推断 displaystyle、查缓存或调用翻译器、替换节点
//! 4. 按节流间隔发送进度并让出执行权
//! 5. 发送完成事件、通知排版器、运行 `after` 回调
//!
//! 引擎持有 `Rc` 文档句柄，返回的 future 不是 `Send`，需要在单线程运行时上驱动。
//! 丢弃 future 即取消渲染，已经完成的替换不会回滚。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};
use tokio::sync::mpsc::UnboundedSender;

use super::progress::{ProgressEvent, ProgressTracker};
use super::translator::{TranslationRequest, Translator, Typesetter};
use crate::parsers::html::{
    get_node_name, get_parent_node, is_blank, is_paragraph_element, parse_html_fragment,
    replace_node,
};
use crate::render::config::RenderConfig;
use crate::render::error::helpers::log_error;
use crate::render::error::RenderResult;
use crate::render::pipeline::placeholder::{find_placeholders, placeholder_expression};
use crate::render::storage::RenderCache;

/// 渲染前后的回调
///
/// 回调不可序列化，所以和 `RenderConfig` 分开传入。
#[derive(Default)]
pub struct RenderHooks {
    pub before: Option<Box<dyn FnMut()>>,
    pub after: Option<Box<dyn FnMut()>>,
}

impl RenderHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, hook: impl FnMut() + 'static) -> Self {
        self.before = Some(Box::new(hook));
        self
    }

    pub fn after(mut self, hook: impl FnMut() + 'static) -> Self {
        self.after = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for RenderHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// 一次渲染的结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// 找到的占位符数量
    pub total: usize,
    /// 已处理的占位符数量
    pub processed: usize,
    /// 翻译出错的占位符数量
    pub errors: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl RenderReport {
    /// 是否所有占位符都成功翻译
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.processed == self.total
    }
}

/// 渲染引擎
pub struct RenderEngine<T: Translator> {
    translator: T,
    config: RenderConfig,
    typesetter: Option<Box<dyn Typesetter>>,
    hooks: RenderHooks,
}

impl<T: Translator> RenderEngine<T> {
    /// 创建渲染引擎
    ///
    /// 翻译器不可用时只记录警告，引擎仍然可用。
    pub fn new(translator: T, config: RenderConfig) -> Self {
        if !translator.is_available() {
            tracing::warn!("翻译器不可用，渲染时的翻译调用可能失败");
        }

        Self {
            translator,
            config,
            typesetter: None,
            hooks: RenderHooks::default(),
        }
    }

    /// 设置排版器
    pub fn with_typesetter(mut self, typesetter: impl Typesetter + 'static) -> Self {
        self.typesetter = Some(Box::new(typesetter));
        self
    }

    /// 设置前后回调
    pub fn with_hooks(mut self, hooks: RenderHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// 获取配置
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// 获取翻译器
    pub fn translator(&self) -> &T {
        &self.translator
    }

    /// 翻译根节点下所有已标记的占位符
    ///
    /// `show_progress` 关闭时忽略 `progress`。翻译器调用本身失败会中止渲染，
    /// 此时文档处于部分翻译的状态。
    pub async fn render_marked(
        &mut self,
        root: &Handle,
        progress: Option<UnboundedSender<ProgressEvent>>,
    ) -> RenderResult<RenderReport> {
        if let Some(before) = self.hooks.before.as_mut() {
            before();
        }

        let placeholders = find_placeholders(root);
        let sender = if self.config.show_progress { progress } else { None };
        let mut tracker = ProgressTracker::new(sender, self.config.progress_interval());
        let mut cache = RenderCache::new();

        tracing::debug!("开始渲染 {} 个占位符", placeholders.len());
        tracker.start(placeholders.len());

        for placeholder in &placeholders {
            let failed = self.render_placeholder(placeholder, &mut cache)?;

            if tracker.step(failed) {
                tokio::task::yield_now().await;
            }
        }

        tracker.finish();

        if let Some(typesetter) = &self.typesetter {
            typesetter.typeset(root);
        }

        if let Some(after) = self.hooks.after.as_mut() {
            after();
        }

        let cache_stats = cache.get_stats();
        let report = RenderReport {
            total: tracker.total(),
            processed: tracker.processed(),
            errors: tracker.errors(),
            cache_hits: cache_stats.cache_hits,
            cache_misses: cache_stats.cache_misses,
        };

        tracing::debug!(
            "渲染完成: {}/{} 个占位符，{} 个错误，缓存命中 {} 次",
            report.processed,
            report.total,
            report.errors,
            report.cache_hits
        );

        Ok(report)
    }

    /// 翻译并替换单个占位符，返回该表达式是否翻译出错
    fn render_placeholder(&self, placeholder: &Handle, cache: &mut RenderCache) -> RenderResult<bool> {
        let expression = match placeholder_expression(placeholder) {
            Ok(expression) => expression,
            Err(e) => {
                // 保留回退文本，计为一次错误
                tracing::warn!("跳过无法读取的占位符: {}", e);
                return Ok(true);
            }
        };

        let display_mode = infer_display_mode(placeholder);

        let (markup, failed) = match cache.get(&expression, display_mode) {
            Some(markup) => (markup, false),
            None => {
                let request = TranslationRequest {
                    expression: &expression,
                    display_mode,
                    resolve_control_words: self.config.resolve_control_words,
                    custom_control_words: self.config.custom_control_words.as_ref(),
                };
                let translation = match self.translator.translate(&request) {
                    Ok(translation) => translation,
                    Err(e) => return log_error(e.with_context(&expression)),
                };

                match translation.details.error {
                    Some(error) => {
                        tracing::debug!("表达式 {:?} 翻译出错: {}", expression, error);
                        (translation.markup, true)
                    }
                    None => {
                        cache.insert(&expression, display_mode, translation.markup.clone());
                        (translation.markup, false)
                    }
                }
            }
        };

        if !replace_node(placeholder, parse_html_fragment(&markup)) {
            tracing::debug!("占位符已不在文档中，跳过替换: {:?}", expression);
        }

        Ok(failed)
    }
}

/// 推断 displaystyle
///
/// 父元素是 `<p>`，并且去掉只含空白的文本节点后占位符是唯一的子节点。
pub fn infer_display_mode(placeholder: &Handle) -> bool {
    let Some(parent) = get_parent_node(placeholder) else {
        return false;
    };

    if !get_node_name(&parent).map(is_paragraph_element).unwrap_or(false) {
        return false;
    }

    let children = parent.children.borrow();
    let mut significant = children.iter().filter(|child| match &child.data {
        NodeData::Text { contents } => !is_blank(&contents.borrow()),
        _ => true,
    });

    let is_sole_child = match (significant.next(), significant.next()) {
        (Some(only), None) => Rc::ptr_eq(only, placeholder),
        _ => false,
    };
    is_sole_child
}
