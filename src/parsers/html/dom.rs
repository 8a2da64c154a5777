use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// 将一段 HTML 标记解析为游离的节点列表
///
/// 以 `<body>` 作为上下文元素解析，因此 `<math>` 等外来元素会得到正确的命名空间。
/// 返回的节点没有父节点，可以直接插入到其他文档中。
pub fn parse_html_fragment(markup: &str) -> Vec<Handle> {
    let dom = parse_fragment(
        RcDom::default(),
        Default::default(),
        QualName::new(None, ns!(html), LocalName::from("body")),
        vec![],
    )
    .one(markup);

    let root = dom.document.children.borrow().first().cloned();
    match root {
        Some(root) => {
            let children = std::mem::take(&mut *root.children.borrow_mut());
            for child in &children {
                child.parent.set(None);
            }
            children
        }
        None => Vec::new(),
    }
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    let Some(&node_name) = node_names.first() else {
        return found_nodes;
    };

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按文档顺序查找带有指定 class 的元素（相当于 `querySelectorAll("tag.class")`）
///
/// 根节点本身不参与匹配，只查找其后代。
pub fn find_elements_with_class(root: &Handle, tag_name: &str, class_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    for child in root.children.borrow().iter() {
        collect_elements_with_class(child, tag_name, class_name, &mut found);
    }
    found
}

fn collect_elements_with_class(
    node: &Handle,
    tag_name: &str,
    class_name: &str,
    found: &mut Vec<Handle>,
) {
    if get_node_name(node) == Some(tag_name) && has_class(node, class_name) {
        found.push(node.clone());
    }

    for child in node.children.borrow().iter() {
        collect_elements_with_class(child, tag_name, class_name, found);
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 检查元素的 class 列表是否包含指定 class
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 获取父节点
///
/// 不会破坏子节点上保存的父节点引用。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 创建文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 创建 HTML 命名空间下的元素节点
pub fn create_element(tag_name: &str, attrs: Vec<(&str, String)>) -> Handle {
    let attrs = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: StrTendril::from(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag_name)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 将子节点追加到父节点末尾
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 用一组节点替换原节点，原节点随后脱离文档
///
/// 原节点没有父节点（或已不在父节点的子节点列表中）时返回 `false`，文档保持不变。
pub fn replace_node(old: &Handle, replacements: Vec<Handle>) -> bool {
    let Some(parent) = get_parent_node(old) else {
        return false;
    };

    let mut children = parent.children.borrow_mut();
    let Some(index) = children.iter().position(|child| Rc::ptr_eq(child, old)) else {
        return false;
    };

    for node in &replacements {
        node.parent.set(Some(Rc::downgrade(&parent)));
    }
    children.splice(index..=index, replacements);
    old.parent.set(None);

    true
}

/// 获取节点及其后代中所有文本的拼接结果
pub fn get_text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text_content(node, &mut text);
    text
}

fn push_text_content(node: &Handle, text: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        text.push_str(&contents.borrow());
    }

    for child in node.children.borrow().iter() {
        push_text_content(child, text);
    }
}
