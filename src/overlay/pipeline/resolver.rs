//! 单元分派
//!
//! 读取标注遍历留下的标记，把子树切分成翻译单元交给回调处理。
//! 混合内容的段落会按块级子元素切成若干“行内片段”。

use std::mem;

use markup5ever_rcdom::Handle;

use crate::overlay::core::token::PassToken;
use crate::parsers::html::dom::{
    child_nodes, element_children, is_blank, is_element, text_content, TransNode,
};
use crate::parsers::html::shadow::shadow_root;

use super::walker::{is_block, is_inline_trans_node, is_paragraph};

/// 翻译单元
#[derive(Debug, Clone)]
pub enum Unit {
    /// 纯段落元素，译文作为它的最后一个子节点
    Element(Handle),
    /// 单个文本节点，译文插在它后面
    Text(Handle),
    /// 相邻的行内节点序列，译文插在最后一个之后
    Run(Vec<Handle>),
}

impl Unit {
    /// 用于在途登记的锚点
    pub fn anchors(&self) -> Vec<Handle> {
        match self {
            Unit::Element(node) | Unit::Text(node) => vec![node.clone()],
            Unit::Run(nodes) => nodes.clone(),
        }
    }
}

/// 从 `element` 开始分派本次遍历标注过的单元
///
/// 没有当前令牌的元素（以及它的整棵子树）会被跳过。
pub fn resolve<F>(element: &Handle, token: &PassToken, dispatch: &mut F)
where
    F: FnMut(Unit),
{
    if !is_element(element) || !token.is_stamped_on(element) {
        return;
    }

    if !is_paragraph(element) {
        for child in element_children(element) {
            resolve(&child, token, dispatch);
        }
        if let Some(root) = shadow_root(element) {
            for child in element_children(&root) {
                resolve(&child, token, dispatch);
            }
        }
        return;
    }

    let children = child_nodes(element);
    let has_block_child = children
        .iter()
        .any(|child| is_element(child) && is_block(child));
    if !has_block_child {
        dispatch(Unit::Element(element.clone()));
        return;
    }

    let mut run: Vec<Handle> = Vec::new();
    for child in children {
        let Some(node) = TransNode::from_handle(&child) else {
            continue;
        };
        if is_blank(&text_content(&child)) {
            continue;
        }

        let joins_run = match &node {
            TransNode::Text(_) => true,
            TransNode::Element(el) => token.is_stamped_on(el) && is_inline_trans_node(&node),
        };
        if joins_run {
            run.push(child);
            continue;
        }

        if !run.is_empty() {
            dispatch(Unit::Run(mem::take(&mut run)));
        }
        if let TransNode::Element(el) = node {
            resolve(&el, token, dispatch);
        }
    }

    if !run.is_empty() {
        dispatch(Unit::Run(run));
    }
}
