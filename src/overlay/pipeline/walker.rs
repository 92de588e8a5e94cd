//! 标注遍历
//!
//! 自底向上给元素打上角色标记：
//!
//! - 段落：至少有一个非空文本子节点或行内子元素
//! - 块级：有块级子元素，或自身是浅层块级标签
//! - 行内：不是块级，且自身是浅层行内标签
//!
//! 每个经过的元素都会写入当前令牌，并清掉上一轮遍历留下的角色标记。

use markup5ever_rcdom::Handle;

use crate::overlay::config::constants::{BLOCK_ATTRIBUTE, INLINE_ATTRIBUTE, PARAGRAPH_ATTRIBUTE};
use crate::overlay::config::TranslateRange;
use crate::overlay::core::token::PassToken;
use crate::parsers::html::dom::{
    child_nodes, element_children, has_node_attr, is_blank, is_element, remove_node_attr,
    set_node_attr, text_content, TransNode,
};
use crate::parsers::html::shadow::shadow_root;

use super::policy::ClassificationPolicy;

/// 元素在父元素眼中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Block,
    Inline,
    None,
}

fn clear_role_markers(element: &Handle) {
    remove_node_attr(element, PARAGRAPH_ATTRIBUTE);
    remove_node_attr(element, BLOCK_ATTRIBUTE);
    remove_node_attr(element, INLINE_ATTRIBUTE);
}

/// 标注以 `element` 为根的子树并返回它的角色
pub fn label(element: &Handle, token: &PassToken, policy: &ClassificationPolicy) -> Role {
    if !is_element(element) {
        return Role::None;
    }

    token.stamp(element);
    clear_role_markers(element);

    if policy.is_dont_walk_into(element) || policy.is_ignored(element) {
        return Role::None;
    }

    if let Some(root) = shadow_root(element) {
        match policy.range() {
            // shadow 内容自成一体，不影响宿主自身的角色
            TranslateRange::All => {
                for child in element_children(&root) {
                    label(&child, token, policy);
                }
            }
            TranslateRange::Main => return Role::None,
        }
    }

    let mut has_inline_child = false;
    let mut has_block_child = false;

    for child in child_nodes(element) {
        match TransNode::from_handle(&child) {
            Some(TransNode::Text(text)) => {
                if !is_blank(&text_content(&text)) {
                    has_inline_child = true;
                }
            }
            Some(TransNode::Element(child)) => match label(&child, token, policy) {
                Role::Block => has_block_child = true,
                Role::Inline => has_inline_child = true,
                Role::None => {}
            },
            None => {}
        }
    }

    if has_inline_child {
        set_node_attr(element, PARAGRAPH_ATTRIBUTE, Some(""));
    }

    if has_block_child || policy.is_shallow_block(element) {
        set_node_attr(element, BLOCK_ATTRIBUTE, Some(""));
        Role::Block
    } else if policy.is_shallow_inline(element) {
        set_node_attr(element, INLINE_ATTRIBUTE, Some(""));
        Role::Inline
    } else {
        Role::None
    }
}

pub fn is_paragraph(element: &Handle) -> bool {
    has_node_attr(element, PARAGRAPH_ATTRIBUTE)
}

pub fn is_block(element: &Handle) -> bool {
    has_node_attr(element, BLOCK_ATTRIBUTE)
}

pub fn is_inline(element: &Handle) -> bool {
    has_node_attr(element, INLINE_ATTRIBUTE)
}

/// 文本节点总是行内的；元素看行内标记
pub fn is_inline_trans_node(node: &TransNode) -> bool {
    match node {
        TransNode::Text(_) => true,
        TransNode::Element(element) => is_inline(element),
    }
}
