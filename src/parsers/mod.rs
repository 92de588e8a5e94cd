//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、shadow root 与框架模型

pub mod html;

pub use html::{html_to_dom, serialize_node, Page};
