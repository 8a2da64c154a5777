//! 输入翻译
//!
//! 把原始输入（不需要定界符）整体或逐行交给翻译器，汇总输出标记和各阶段耗时。

use std::collections::BTreeMap;

use super::config::RenderConfig;
use super::core::translator::{Translation, TranslationRequest, Translator};
use super::error::RenderResult;
use super::pipeline::delimiters::contains_delimiter;
use crate::parsers::html::is_blank;

/// 输入中含有定界符时附加的提示 class
pub const NOTICE_CLASS: &str = "notice";

/// 一行（或整个输入）的翻译结果
#[derive(Debug, Clone)]
pub struct TranslatedItem {
    pub input: String,
    /// 输入中使用了不必要的定界符时的提示
    pub notice: Option<String>,
    pub translation: Translation,
}

/// 各阶段耗时汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTally {
    stages: BTreeMap<String, Vec<f64>>,
}

impl MeasurementTally {
    /// 记录一次翻译的各阶段耗时
    pub fn record(&mut self, measurements: &BTreeMap<String, f64>) {
        for (stage, value) in measurements {
            self.stages.entry(stage.clone()).or_default().push(*value);
        }
    }

    /// 某阶段的总耗时
    pub fn sum(&self, stage: &str) -> f64 {
        self.stages.get(stage).map(|values| values.iter().sum()).unwrap_or(0.0)
    }

    /// 某阶段每一项的耗时
    pub fn items(&self, stage: &str) -> &[f64] {
        self.stages.get(stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 出现过的阶段名
    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// 输入翻译的结果
#[derive(Debug, Clone, Default)]
pub struct InputTranslation {
    pub items: Vec<TranslatedItem>,
    pub measurements: MeasurementTally,
}

impl InputTranslation {
    /// 翻译出错的项数
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|item| item.translation.is_error()).count()
    }

    /// 拼接所有提示和标记
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for item in &self.items {
            if let Some(notice) = &item.notice {
                html.push_str(&format!("<div class=\"{}\">{}</div>", NOTICE_CLASS, notice));
            }
            html.push_str(&item.translation.markup);
        }
        html
    }
}

/// 翻译原始输入
///
/// `split_input` 开启时每行是一个独立的表达式；只含空白的行被跳过。
/// displaystyle 取自配置而不是推断。
pub fn translate_input<T: Translator>(
    translator: &T,
    input: &str,
    config: &RenderConfig,
) -> RenderResult<InputTranslation> {
    let lines: Vec<&str> = if config.split_input {
        input.split('\n').collect()
    } else {
        vec![input]
    };

    let mut result = InputTranslation::default();

    for line in lines {
        if is_blank(line) {
            continue;
        }

        let notice = contains_delimiter(line).then(|| delimiter_notice(config.split_input));

        let request = TranslationRequest {
            expression: line,
            display_mode: config.display_style,
            resolve_control_words: config.resolve_control_words,
            custom_control_words: config.custom_control_words.as_ref(),
        };
        let translation = translator.translate(&request)?;

        result.measurements.record(&translation.details.measurements);
        result.items.push(TranslatedItem {
            input: line.to_string(),
            notice,
            translation,
        });
    }

    tracing::debug!(
        "输入翻译完成: {} 项，{} 个错误",
        result.items.len(),
        result.error_count()
    );

    Ok(result)
}

fn delimiter_notice(split_input: bool) -> String {
    format!(
        "Note that the ⁅UnicodeMath delimiters⁆ you've used in the expression ↓below↓ aren't required – {} input is automatically treated as a UnicodeMath expression.",
        if split_input { "each line of the" } else { "the entire" }
    )
}
