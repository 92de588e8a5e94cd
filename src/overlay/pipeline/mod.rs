//! 翻译管道模块
//!
//! 标签分类、标注遍历与单元分派

pub mod policy;
pub mod resolver;
pub mod walker;

pub use policy::ClassificationPolicy;
pub use resolver::{resolve, Unit};
pub use walker::{label, Role};
