//! HTML文档模型模块
//!
//! - `utils`: 基础常量
//! - `dom`: 基础DOM操作与节点分类
//! - `shadow`: 声明式 shadow root
//! - `page`: 主文档与同源框架
//! - `serializer`: 序列化功能

pub mod dom;
pub mod page;
pub mod serializer;
pub mod shadow;
pub mod utils;

pub use dom::{
    append_child, child_nodes, create_element, create_text, detach, element_children, find_nodes,
    get_node_attr, get_node_name, get_parent_node, html_to_dom, insert_after, next_sibling,
    set_node_attr, text_content, TransNode,
};
pub use page::{body_of, Frame, Page};
pub use serializer::serialize_node;
pub use shadow::{attach_shadow, shadow_root, ShadowRootMode};
pub use utils::WHITESPACES;
