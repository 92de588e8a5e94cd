//! # 页内双语翻译覆盖层
//!
//! 在页面原文旁边插入译文，不替换原文。
//!
//! ## 模块组织
//!
//! - `config` - 标签分类与翻译范围配置
//! - `pipeline` - 标注遍历与单元分派
//! - `core` - 引擎、译文容器、在途登记
//! - `style` - 注入样式与截断样式处理
//! - `hit_test` - 坐标到段落的定位
//! - `translator` - 翻译器接口
//! - `error` - 错误类型
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use overlay_translate::overlay::{FnTranslator, OverlayConfig, OverlayEngine};
//! use overlay_translate::parsers::Page;
//!
//! # async fn demo() -> overlay_translate::overlay::OverlayResult<()> {
//! let page = Page::from_html("<p>Hello</p>", Some("https://example.com"))?;
//! let engine = OverlayEngine::new(
//!     &OverlayConfig::default(),
//!     FnTranslator::new(|text: &str| Ok(format!("[zh] {}", text))),
//! );
//!
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async {
//!         engine.translate_whole_document(&page);
//!         engine.settled().await;
//!     })
//!     .await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod style;
pub mod translator;

pub use config::{load_overlay_config, ConfigManager, OverlayConfig, TranslateRange};
pub use self::core::{OverlayEngine, PassToken};
pub use error::{OverlayError, OverlayResult};
pub use hit_test::{LayoutProvider, LayoutSnapshot, Point, Rect};
pub use pipeline::{ClassificationPolicy, Unit};
pub use translator::{FnTranslator, Translator};
