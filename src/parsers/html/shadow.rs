//! Shadow root 模型
//!
//! rcdom 没有 shadow root 的概念，这里沿用声明式 shadow DOM 的写法：
//! 宿主元素下带 `shadowrootmode` 属性的 `<template>` 子元素，
//! 其 `template_contents` 片段就是宿主的 shadow root。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, Node, NodeData};

use super::dom::{create_element, get_node_attr, get_node_name};

pub const SHADOW_ROOT_MODE_ATTR: &str = "shadowrootmode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

impl ShadowRootMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowRootMode::Open => "open",
            ShadowRootMode::Closed => "closed",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "open" => Some(ShadowRootMode::Open),
            "closed" => Some(ShadowRootMode::Closed),
            _ => None,
        }
    }
}

/// 判断节点是否为声明 shadow root 的模板
pub fn is_shadow_template(node: &Handle) -> bool {
    get_node_name(node) == Some("template")
        && get_node_attr(node, SHADOW_ROOT_MODE_ATTR)
            .or_else(|| get_node_attr(node, "shadowroot"))
            .and_then(|mode| ShadowRootMode::parse(&mode))
            .is_some()
}

fn shadow_template(host: &Handle) -> Option<Handle> {
    host.children
        .borrow()
        .iter()
        .find(|child| is_shadow_template(child))
        .cloned()
}

/// 获取宿主元素的 shadow root
pub fn shadow_root(host: &Handle) -> Option<Handle> {
    let template = shadow_template(host)?;
    let NodeData::Element {
        template_contents, ..
    } = &template.data
    else {
        return None;
    };
    let contents = template_contents.borrow();
    contents.clone()
}

/// 为宿主元素挂载 shadow root；已存在时直接返回现有的
pub fn attach_shadow(host: &Handle, mode: ShadowRootMode) -> Handle {
    if let Some(existing) = shadow_root(host) {
        return existing;
    }

    let template = create_element("template", &[(SHADOW_ROOT_MODE_ATTR, mode.as_str())]);
    let fragment = Node::new(NodeData::Document);
    if let NodeData::Element {
        template_contents, ..
    } = &template.data
    {
        *template_contents.borrow_mut() = Some(fragment.clone());
    }

    host.children.borrow_mut().insert(0, template.clone());
    template.parent.set(Some(Rc::downgrade(host)));

    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{append_child, child_nodes, create_text, text_content};

    #[test]
    fn test_attach_shadow_is_idempotent() {
        let host = create_element("div", &[]);
        let root = attach_shadow(&host, ShadowRootMode::Open);
        let again = attach_shadow(&host, ShadowRootMode::Closed);

        assert!(Rc::ptr_eq(&root, &again));
        assert_eq!(child_nodes(&host).len(), 1);
        assert!(is_shadow_template(&child_nodes(&host)[0]));
    }

    #[test]
    fn test_shadow_content_is_not_light_text() {
        let host = create_element("div", &[]);
        append_child(&host, &create_text("light"));
        let root = attach_shadow(&host, ShadowRootMode::Open);
        let inner = create_element("p", &[]);
        append_child(&inner, &create_text("shadow"));
        append_child(&root, &inner);

        assert_eq!(text_content(&host), "light");
        assert_eq!(text_content(&shadow_root(&host).unwrap()), "shadow");
    }

    #[test]
    fn test_plain_template_is_not_a_shadow_root() {
        let host = create_element("div", &[]);
        append_child(&host, &create_element("template", &[]));
        assert!(shadow_root(&host).is_none());
    }
}
