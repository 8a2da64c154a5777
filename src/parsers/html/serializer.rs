use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use crate::core::MathmarkError;

/// 序列化文档
///
/// `document_encoding` 非空且可识别时，输出按该编码重新编码。
pub fn serialize_document(dom: RcDom, document_encoding: String) -> Result<Vec<u8>, MathmarkError> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| MathmarkError::new(&format!("Unable to serialize DOM into buffer: {e}")))?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

/// 序列化单个节点（包括节点本身），相当于 `outerHTML`
pub fn serialize_outer_html(node: &Handle) -> Result<String, MathmarkError> {
    serialize_node(node, TraversalScope::IncludeNode)
}

/// 序列化节点的全部子节点，相当于 `innerHTML`
pub fn serialize_inner_html(node: &Handle) -> Result<String, MathmarkError> {
    serialize_node(node, TraversalScope::ChildrenOnly(None))
}

fn serialize_node(node: &Handle, traversal_scope: TraversalScope) -> Result<String, MathmarkError> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope,
            ..Default::default()
        },
    )
    .map_err(|e| MathmarkError::new(&format!("Unable to serialize node: {e}")))?;

    String::from_utf8(buf).map_err(|e| MathmarkError::new(&format!("Serialized node is not UTF-8: {e}")))
}
