//! 覆盖层核心模块
//!
//! - **引擎** (`engine.rs`): 触发入口、同步分派与异步渲染
//! - **插入** (`inserter.rs`): 译文容器的定位、占位、渲染与清除
//! - **登记** (`registry.rs`): 在途锚点与已注入样式的文档
//! - **令牌** (`token.rs`): 遍历令牌，区分新旧遍历的标记
//!
//! ```text
//! OverlayEngine (engine.rs)
//!     ├── label / resolve (pipeline/)
//!     ├── InFlightGuard, StyleRegistry (registry.rs)
//!     └── Placement, render_translation (inserter.rs)
//! ```

pub mod engine;
pub mod inserter;
pub mod registry;
pub mod token;

pub use engine::OverlayEngine;
pub use inserter::{is_overlay_wrapper, Placement};
pub use registry::{EngineState, InFlightGuard, InFlightRegistry, StyleRegistry};
pub use token::{PassToken, PassTokenSource};
