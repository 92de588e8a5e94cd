//! 译文容器的插入与渲染
//!
//! 容器结构：
//!
//! ```text
//! <span class="notranslate overlay-translated-content-wrapper" data-overlay-source="…">
//!   <span class="overlay-spinner"></span>          等待期间
//!   "  " <span class="notranslate overlay-translated-inline-content">…</span>   行内
//!   <br> <span class="notranslate overlay-translated-block-content">…</span>    块级
//! </span>
//! ```

use markup5ever_rcdom::{Handle, NodeData};

use crate::overlay::config::constants::{
    BLOCK_CONTENT_CLASS, CONTENT_WRAPPER_CLASS, ERROR_CLASS, ERROR_GLYPH, INLINE_CONTENT_CLASS,
    INLINE_SEPARATOR, NOTRANSLATE_CLASS, SOURCE_HASH_ATTRIBUTE, SPINNER_CLASS,
};
use crate::overlay::error::OverlayError;
use crate::overlay::pipeline::policy::ClassificationPolicy;
use crate::overlay::pipeline::walker::{is_block, is_inline_trans_node};
use crate::overlay::style::defeat_truncation;
use crate::parsers::html::dom::{
    append_child, child_nodes, create_element, create_text, detach, element_children,
    get_node_attr, get_node_name, has_class, insert_after, is_element, next_sibling, TransNode,
};
use crate::parsers::html::shadow::shadow_root;

/// 译文容器的放置位置
#[derive(Debug, Clone)]
pub enum Placement {
    /// 作为元素的最后一个子节点
    Inside(Handle),
    /// 紧跟在节点之后
    After(Handle),
}

impl Placement {
    /// 已存在的译文容器
    pub fn existing_wrapper(&self) -> Option<Handle> {
        match self {
            Placement::Inside(element) => element_children(element)
                .into_iter()
                .find(is_overlay_wrapper),
            Placement::After(node) => next_sibling(node).filter(is_overlay_wrapper),
        }
    }

    /// 放置容器；锚点已脱离文档时返回 false
    pub fn place(&self, wrapper: &Handle) -> bool {
        match self {
            Placement::Inside(element) => {
                append_child(element, wrapper);
                true
            }
            Placement::After(node) => insert_after(node, wrapper),
        }
    }
}

pub fn is_overlay_wrapper(node: &Handle) -> bool {
    is_element(node) && has_class(node, CONTENT_WRAPPER_CLASS) && has_class(node, NOTRANSLATE_CLASS)
}

/// 沿“唯一子元素”链向下找到真正承载文本的元素
///
/// 经过的每一层都会先去掉截断样式
pub fn collapse_only_child(element: &Handle) -> Handle {
    let mut current = element.clone();
    loop {
        defeat_truncation(&current);
        let children = child_nodes(&current);
        match children.as_slice() {
            [only] if is_element(only) && !is_overlay_wrapper(only) => current = only.clone(),
            _ => return current,
        }
    }
}

/// 提取节点文本，跳过禁止深入的子树（包括已注入的译文容器）
pub fn extract_text(node: &Handle, policy: &ClassificationPolicy) -> String {
    let mut text = String::new();
    collect_text(node, policy, &mut text);
    text
}

fn collect_text(node: &Handle, policy: &ClassificationPolicy, text: &mut String) {
    match &node.data {
        NodeData::Text { contents } => text.push_str(&contents.borrow()),
        NodeData::Element { .. } => {
            if policy.is_dont_walk_into(node) {
                return;
            }
            for child in node.children.borrow().iter() {
                collect_text(child, policy, text);
            }
        }
        _ => {}
    }
}

/// 原文摘要，写在容器上用于判断原文是否变化
pub fn source_digest(text: &str) -> String {
    let hash = blake3::hash(text.as_bytes()).to_hex();
    hash[..16].to_string()
}

pub fn wrapper_digest(wrapper: &Handle) -> Option<String> {
    get_node_attr(wrapper, SOURCE_HASH_ATTRIBUTE)
}

/// 容器里是否已经有译文（而不是加载中或错误提示）
pub fn has_rendered_translation(wrapper: &Handle) -> bool {
    element_children(wrapper).iter().any(|child| {
        has_class(child, INLINE_CONTENT_CLASS) || has_class(child, BLOCK_CONTENT_CLASS)
    })
}

/// 创建带加载指示的容器，返回 (容器, 加载指示)
pub fn create_placeholder(text: &str) -> (Handle, Handle) {
    let class = format!("{} {}", NOTRANSLATE_CLASS, CONTENT_WRAPPER_CLASS);
    let digest = source_digest(text);
    let wrapper = create_element(
        "span",
        &[("class", class.as_str()), (SOURCE_HASH_ATTRIBUTE, digest.as_str())],
    );
    let spinner = create_element("span", &[("class", SPINNER_CLASS)]);
    append_child(&wrapper, &spinner);
    (wrapper, spinner)
}

/// 把译文渲染进容器
///
/// 强制行内标签和行内目标用两个空格分隔；块级目标先换行。
/// 既非行内也非块级的元素不渲染译文，容器保持为空。
pub fn render_translation(
    wrapper: &Handle,
    target: &TransNode,
    translated: &str,
    policy: &ClassificationPolicy,
) {
    let force_inline = match target {
        TransNode::Element(element) => policy.is_force_inline(element),
        TransNode::Text(_) => false,
    };

    let content_class = match target {
        _ if force_inline || is_inline_trans_node(target) => {
            append_child(wrapper, &create_text(INLINE_SEPARATOR));
            INLINE_CONTENT_CLASS
        }
        TransNode::Element(element) if is_block(element) => {
            append_child(wrapper, &create_element("br", &[]));
            BLOCK_CONTENT_CLASS
        }
        TransNode::Element(element) => {
            tracing::debug!(
                "目标元素 <{}> 既非行内也非块级，不渲染译文",
                get_node_name(element).unwrap_or_default()
            );
            return;
        }
        TransNode::Text(_) => return,
    };

    let class = format!("{} {}", NOTRANSLATE_CLASS, content_class);
    let content = match target {
        TransNode::Element(element) if get_node_name(element) == Some("a") => create_element(
            "span",
            &[("class", class.as_str()), ("style", "text-decoration: underline")],
        ),
        _ => create_element("span", &[("class", class.as_str())]),
    };
    append_child(&content, &create_text(translated));
    append_child(wrapper, &content);
}

/// 把错误渲染成可见的提示，悬停可看到错误信息
pub fn render_error(wrapper: &Handle, error: &OverlayError) {
    let class = format!("{} {}", NOTRANSLATE_CLASS, ERROR_CLASS);
    let message = error.to_string();
    let affordance = create_element(
        "span",
        &[("class", class.as_str()), ("role", "alert"), ("title", message.as_str())],
    );
    append_child(&affordance, &create_text(ERROR_GLYPH));
    append_child(wrapper, &affordance);
}

/// 递归移除子树内（含 shadow root）满足条件的元素，返回移除数量
fn remove_matching(node: &Handle, matches: &dyn Fn(&Handle) -> bool) -> usize {
    let mut removed = 0;
    for child in child_nodes(node) {
        if matches(&child) {
            detach(&child);
            removed += 1;
        } else {
            removed += remove_matching(&child, matches);
        }
    }
    if let Some(root) = shadow_root(node) {
        removed += remove_matching(&root, matches);
    }
    removed
}

/// 移除子树内所有译文容器
pub fn remove_wrappers_in(root: &Handle) -> usize {
    remove_matching(root, &is_overlay_wrapper)
}

/// 只移除错误提示；容器本身变空时一起移除
pub fn remove_error_affordances_in(root: &Handle) -> usize {
    let is_error = |node: &Handle| is_element(node) && has_class(node, ERROR_CLASS);
    let removed = remove_matching(root, &is_error);
    remove_empty_wrappers(root);
    removed
}

fn remove_empty_wrappers(root: &Handle) {
    remove_matching(root, &|node: &Handle| {
        is_overlay_wrapper(node) && node.children.borrow().is_empty()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::config::constants::{BLOCK_ATTRIBUTE, INLINE_ATTRIBUTE};
    use crate::overlay::error::helpers::translation_error;
    use crate::parsers::html::dom::{find_nodes, html_to_dom, set_node_attr, text_content};
    use crate::parsers::html::serializer::serialize_node;
    use crate::parsers::html::shadow::{attach_shadow, ShadowRootMode};

    #[test]
    fn test_collapse_only_child_chain() {
        let dom = html_to_dom(
            b"<div style=\"max-height: 20px\"><section><p><b>deep</b> text</p></section></div>",
            "utf-8",
        );
        let div = find_nodes(&dom.document, &["div"]).remove(0);

        let target = collapse_only_child(&div);
        assert_eq!(get_node_name(&target), Some("p"));
        assert_eq!(get_node_attr(&div, "style").as_deref(), Some("max-height: unset;"));
    }

    #[test]
    fn test_extract_text_skips_wrappers_and_scripts() {
        let dom = html_to_dom(
            b"<p>Hello <script>x()</script><b>world</b><span class=\"notranslate overlay-translated-content-wrapper\">old</span></p>",
            "utf-8",
        );
        let p = find_nodes(&dom.document, &["p"]).remove(0);
        assert_eq!(extract_text(&p, &ClassificationPolicy::default()), "Hello world");
    }

    #[test]
    fn test_placement_finds_existing_wrapper() {
        let p = create_element("p", &[]);
        let text = create_text("Hello");
        append_child(&p, &text);

        let (wrapper, _) = create_placeholder("Hello");
        let after = Placement::After(text.clone());
        assert!(after.existing_wrapper().is_none());
        assert!(after.place(&wrapper));
        assert!(after.existing_wrapper().is_some());

        // 只带 notranslate 的普通元素不算容器
        let inside = Placement::Inside(create_element("div", &[]));
        if let Placement::Inside(div) = &inside {
            append_child(div, &create_element("span", &[("class", NOTRANSLATE_CLASS)]));
        }
        assert!(inside.existing_wrapper().is_none());
    }

    #[test]
    fn test_detached_anchor_cannot_be_placed() {
        let (wrapper, _) = create_placeholder("x");
        assert!(!Placement::After(create_text("orphan")).place(&wrapper));
    }

    #[test]
    fn test_render_inline_and_block() {
        let policy = ClassificationPolicy::default();

        let (wrapper, spinner) = create_placeholder("Hi");
        detach(&spinner);
        render_translation(&wrapper, &TransNode::Text(create_text("Hi")), "你好", &policy);
        let html = serialize_node(&wrapper).unwrap();
        assert!(html.contains("  <span class=\"notranslate overlay-translated-inline-content\">你好</span>"));

        let p = create_element("p", &[]);
        set_node_attr(&p, BLOCK_ATTRIBUTE, Some(""));
        let (wrapper, spinner) = create_placeholder("Hi");
        detach(&spinner);
        render_translation(&wrapper, &TransNode::Element(p), "你好", &policy);
        let html = serialize_node(&wrapper).unwrap();
        assert!(html.contains("<br><span class=\"notranslate overlay-translated-block-content\">你好</span>"));
    }

    #[test]
    fn test_render_link_is_underlined_and_inline() {
        let policy = ClassificationPolicy::default();
        let link = create_element("a", &[("href", "/x")]);
        let (wrapper, spinner) = create_placeholder("Docs");
        detach(&spinner);

        render_translation(&wrapper, &TransNode::Element(link), "文档", &policy);

        let content = find_nodes(&wrapper, &["span"]).remove(1);
        assert!(has_class(&content, INLINE_CONTENT_CLASS));
        assert_eq!(
            get_node_attr(&content, "style").as_deref(),
            Some("text-decoration: underline")
        );
    }

    #[test]
    fn test_inline_marker_selects_inline_rendering() {
        let policy = ClassificationPolicy::default();
        let custom = create_element("my-tag", &[]);
        set_node_attr(&custom, INLINE_ATTRIBUTE, Some(""));
        let (wrapper, _) = create_placeholder("x");

        render_translation(&wrapper, &TransNode::Element(custom), "y", &policy);
        assert!(text_content(&wrapper).starts_with(INLINE_SEPARATOR));
    }

    #[test]
    fn test_unclassified_element_renders_nothing() {
        let policy = ClassificationPolicy::default();
        let custom = create_element("my-text", &[]);
        let (wrapper, spinner) = create_placeholder("Hello");
        detach(&spinner);

        render_translation(&wrapper, &TransNode::Element(custom), "你好", &policy);
        assert!(child_nodes(&wrapper).is_empty());
        assert!(!has_rendered_translation(&wrapper));
    }

    #[test]
    fn test_error_affordance_and_cleanup() {
        let p = create_element("p", &[]);
        append_child(&p, &create_text("Hello"));
        let (wrapper, spinner) = create_placeholder("Hello");
        append_child(&p, &wrapper);
        detach(&spinner);

        render_error(&wrapper, &translation_error("timeout"));
        let affordance = find_nodes(&p, &["span"]).remove(1);
        assert!(has_class(&affordance, ERROR_CLASS));
        assert_eq!(get_node_attr(&affordance, "role").as_deref(), Some("alert"));
        assert!(get_node_attr(&affordance, "title").unwrap().contains("timeout"));

        assert_eq!(remove_error_affordances_in(&p), 1);
        assert_eq!(text_content(&p), "Hello");
    }

    #[test]
    fn test_remove_wrappers_reaches_shadow_roots() {
        let host = create_element("div", &[]);
        let root = attach_shadow(&host, ShadowRootMode::Open);
        let inner = create_element("p", &[]);
        append_child(&root, &inner);
        append_child(&inner, &create_placeholder("a").0);
        append_child(&host, &create_placeholder("b").0);

        assert_eq!(remove_wrappers_in(&host), 2);
        assert_eq!(remove_wrappers_in(&host), 0);
    }

    #[test]
    fn test_source_digest_is_stable() {
        assert_eq!(source_digest("Hello"), source_digest("Hello"));
        assert_ne!(source_digest("Hello"), source_digest("Hello!"));
        assert_eq!(source_digest("Hello").len(), 16);
    }
}
