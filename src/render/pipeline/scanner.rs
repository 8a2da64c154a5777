//! DOM 树模式的区域提取
//!
//! 深度优先遍历文档树，把文本节点中的 `⁅…⁆` 区域替换为占位符节点。
//! 这种模式不处理转义，定界符数量为奇数时会按位置错误拆分。

use markup5ever_rcdom::{Handle, NodeData};

use super::delimiters::{contains_delimiter, delimit, CLOSE, OPEN};
use super::placeholder::create_placeholder;
use crate::parsers::html::{create_text_node, is_excluded_element, replace_node};

/// 扫描统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub nodes_visited: usize,
    pub text_nodes_visited: usize,
    pub text_nodes_split: usize,
    pub placeholders_created: usize,
    pub subtrees_skipped: usize,
}

impl ScanStats {
    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// DOM 区域扫描器
#[derive(Debug, Default)]
pub struct RegionScanner {
    stats: ScanStats,
}

impl RegionScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记根节点下的所有区域，返回本次扫描的统计
    pub fn mark(&mut self, root: &Handle) -> ScanStats {
        self.stats.reset();
        self.scan_recursive(root);

        tracing::debug!(
            "树模式扫描完成: 访问 {} 个文本节点，创建 {} 个占位符，跳过 {} 个子树",
            self.stats.text_nodes_visited,
            self.stats.placeholders_created,
            self.stats.subtrees_skipped
        );

        self.stats.clone()
    }

    /// 获取统计
    pub fn get_stats(&self) -> &ScanStats {
        &self.stats
    }

    fn scan_recursive(&mut self, node: &Handle) {
        self.stats.nodes_visited += 1;

        match node.data {
            NodeData::Text { ref contents } => {
                self.stats.text_nodes_visited += 1;

                let text = contents.borrow().to_string();
                if contains_delimiter(&text) {
                    self.split_text_node(node, &text);
                }
            }
            NodeData::Element { ref name, .. } => {
                if is_excluded_element(name.local.as_ref()) {
                    self.stats.subtrees_skipped += 1;
                    return;
                }
                self.scan_children(node);
            }
            _ => self.scan_children(node),
        }
    }

    fn scan_children(&mut self, node: &Handle) {
        // 先复制子节点列表，替换文本节点时不能持有借用
        let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
        for child in &children {
            self.scan_recursive(child);
        }
    }

    fn split_text_node(&mut self, node: &Handle, text: &str) {
        let mut replacements = Vec::new();
        let mut placeholders = 0;

        for (index, part) in split_on_delimiters(text).into_iter().enumerate() {
            if index % 2 == 0 {
                if !part.is_empty() {
                    replacements.push(create_text_node(part));
                }
            } else {
                replacements.push(create_placeholder(part, &delimit(part)));
                placeholders += 1;
            }
        }

        if replace_node(node, replacements) {
            self.stats.text_nodes_split += 1;
            self.stats.placeholders_created += placeholders;
        }
    }
}

/// 先按起始定界符拆分，再把每一段按结束定界符拆分，最后展平
///
/// 偶数下标是普通文本，奇数下标是表达式。
pub fn split_on_delimiters(text: &str) -> Vec<&str> {
    text.split(OPEN).flat_map(|fragment| fragment.split(CLOSE)).collect()
}

/// 标记根节点下的所有区域
pub fn mark_in_dom(root: &Handle) -> ScanStats {
    RegionScanner::new().mark(root)
}
