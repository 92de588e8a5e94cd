//! 注入样式与截断样式处理
//!
//! 译文通常比原文长。容器上的行数限制、高度限制、溢出隐藏等内联样式
//! 会把译文截掉，插入译文前需要先把这些声明改写成不截断的值。

use cssparser::{Delimiter, ParseError, Parser, ParserInput};
use markup5ever_rcdom::Handle;

use crate::overlay::config::constants::{NO_TRUNCATE_CLASS, STYLE_MARKER_ATTRIBUTE};
use crate::parsers::html::dom::{
    add_class, append_child, create_element, create_text, find_nodes, get_node_attr,
    has_node_attr, set_node_attr,
};

/// 注入到每个文档中的样式表
pub const OVERLAY_STYLESHEET: &str = r#"
.overlay-translated-content-wrapper {
  word-break: break-word;
  user-select: text;
}

.overlay-translated-block-content {
  display: inline-block;
  margin: 8px 0 !important;
}

.overlay-translated-inline-content {
  display: inline;
}

.overlay-spinner {
  display: inline-block;
  width: 12px;
  height: 12px;
  margin: 0 4px;
  vertical-align: middle;
  border: 2px solid rgba(128, 128, 128, 0.3);
  border-top-color: rgba(128, 128, 128, 0.9);
  border-radius: 50%;
  animation: overlay-spin 0.8s linear infinite;
}

@keyframes overlay-spin {
  to { transform: rotate(360deg); }
}

.overlay-translation-error {
  display: inline-block;
  margin: 0 4px;
  color: #d93025;
  cursor: help;
}

.overlay-no-truncate {
  max-height: unset !important;
  overflow: visible !important;
  -webkit-line-clamp: unset !important;
  line-clamp: unset !important;
  text-overflow: clip !important;
  white-space: normal !important;
}
"#;

/// 内联样式声明：属性名（小写）与原始值文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

/// 解析 `style` 属性，无法识别的声明直接丢弃
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();

    while !parser.is_exhausted() {
        let result: Result<Declaration, ParseError<'_, ()>> =
            parser.parse_until_after(Delimiter::Semicolon, |p| {
                let name = p.expect_ident()?.to_ascii_lowercase();
                p.expect_colon()?;
                let start = p.position();
                while p.next_including_whitespace().is_ok() {}
                let value = p.slice_from(start).trim().to_string();
                Ok(Declaration { name, value })
            });

        if let Ok(declaration) = result {
            if !declaration.value.is_empty() {
                declarations.push(declaration);
            }
        }
    }

    declarations
}

pub fn serialize_declarations(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|declaration| format!("{}: {};", declaration.name, declaration.value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn untruncated_value(property: &str) -> Option<&'static str> {
    match property {
        "-webkit-line-clamp" | "line-clamp" | "max-height" => Some("unset"),
        "overflow" | "overflow-x" | "overflow-y" => Some("visible"),
        "text-overflow" => Some("clip"),
        "white-space" => Some("normal"),
        "position" => Some("static"),
        "float" => Some("none"),
        _ => None,
    }
}

/// 改写元素上会截断内容的内联样式
///
/// 原值里出现 `hidden` 或 `ellipsis` 时另外加上不截断的类名，
/// 让注入样式表兜住来自外部样式表的同类规则。
pub fn defeat_truncation(element: &Handle) {
    let Some(style) = get_node_attr(element, "style") else {
        return;
    };

    let mut declarations = parse_declarations(&style);
    let mut changed = false;
    let mut needs_class = false;

    for declaration in declarations.iter_mut() {
        let lower = declaration.value.to_ascii_lowercase();
        if lower.contains("hidden") || lower.contains("ellipsis") {
            needs_class = true;
        }

        if let Some(replacement) = untruncated_value(&declaration.name) {
            if lower != replacement {
                declaration.value = replacement.to_string();
                changed = true;
            }
        }
    }

    if changed {
        set_node_attr(element, "style", Some(&serialize_declarations(&declarations)));
    }
    if needs_class {
        add_class(element, NO_TRUNCATE_CLASS);
    }
}

/// 向文档注入样式表，已存在时返回 false
///
/// 优先放进 `<head>`，没有时放进文档根元素
pub fn inject_stylesheet(document: &Handle) -> bool {
    let already_present = find_nodes(document, &["style"])
        .iter()
        .any(|style| has_node_attr(style, STYLE_MARKER_ATTRIBUTE));
    if already_present {
        return false;
    }

    let container = find_nodes(document, &["html", "head"])
        .into_iter()
        .next()
        .or_else(|| find_nodes(document, &["html"]).into_iter().next())
        .unwrap_or_else(|| document.clone());

    let style = create_element("style", &[(STYLE_MARKER_ATTRIBUTE, "")]);
    append_child(&style, &create_text(OVERLAY_STYLESHEET));
    append_child(&container, &style);
    true
}
