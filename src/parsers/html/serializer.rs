use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::overlay::error::{OverlayError, OverlayResult};

use super::dom::is_element;

/// 序列化节点
///
/// 元素连同自身一起输出，文档与片段只输出子节点
pub fn serialize_node(node: &Handle) -> OverlayResult<String> {
    let traversal_scope = if is_element(node) {
        TraversalScope::IncludeNode
    } else {
        TraversalScope::ChildrenOnly(None)
    };
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(&mut buf, &serializable, opts)
        .map_err(|e| OverlayError::IoError(format!("无法序列化DOM: {}", e)))?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}
