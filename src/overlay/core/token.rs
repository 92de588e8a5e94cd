//! 遍历令牌
//!
//! 每次标注遍历都生成一个新的令牌写到经过的元素上。分派阶段只处理
//! 带有当前令牌的元素，旧遍历留下的标记因此自动失效。

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use markup5ever_rcdom::Handle;

use crate::overlay::config::constants::WALKED_ATTRIBUTE;
use crate::parsers::html::dom::{get_node_attr, set_node_attr};

static SOURCE_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PassToken(String);

impl PassToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 把令牌写到元素上
    pub fn stamp(&self, element: &Handle) {
        set_node_attr(element, WALKED_ATTRIBUTE, Some(&self.0));
    }

    /// 元素是否由本次遍历标注
    pub fn is_stamped_on(&self, element: &Handle) -> bool {
        get_node_attr(element, WALKED_ATTRIBUTE).is_some_and(|value| value == self.0)
    }
}

impl fmt::Display for PassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 令牌生成器
///
/// 种子由创建时间和进程内序号哈希得到，同一生成器内再加递增序号，
/// 同一页面上多个引擎实例的令牌互不相同。
#[derive(Debug)]
pub struct PassTokenSource {
    seed: String,
    sequence: Cell<u64>,
}

impl PassTokenSource {
    pub fn new() -> Self {
        let created_at = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        let index = SOURCE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let material = format!("{}:{}:{}", created_at, std::process::id(), index);
        let hash = blake3::hash(material.as_bytes()).to_hex();

        Self {
            seed: hash[..12].to_string(),
            sequence: Cell::new(0),
        }
    }

    pub fn next_token(&self) -> PassToken {
        let sequence = self.sequence.get() + 1;
        self.sequence.set(sequence);
        PassToken(format!("{}-{}", self.seed, sequence))
    }
}

impl Default for PassTokenSource {
    fn default() -> Self {
        Self::new()
    }
}
