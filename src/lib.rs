//! # Overlay Translate Library
//!
//! 页内双语翻译引擎：遍历 HTML 文档，把可翻译的段落切分成单元，
//! 请求翻译后把译文插在原文旁边。
//!
//! ## 模块组织
//!
//! - `overlay` - 引擎、分派管道、样式与命中测试
//! - `parsers` - HTML文档解析、DOM操作、shadow root 与框架模型
//! - `env` - 环境变量覆盖

pub mod env;
pub mod overlay;
pub mod parsers;

// Re-export commonly used items for convenience
pub use overlay::{OverlayConfig, OverlayEngine, OverlayError, OverlayResult, Translator};
pub use parsers::Page;
