//! 标签分类策略
//!
//! 纯数据：把元素按自身标签分为浅层块级、浅层行内、强制行内、忽略、禁止深入几类。

use std::collections::HashSet;

use markup5ever_rcdom::Handle;

use crate::overlay::config::constants::NOTRANSLATE_CLASS;
use crate::overlay::config::{OverlayConfig, TranslateRange};
use crate::parsers::html::dom::{get_node_attr, get_node_name, has_class};

#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    range: TranslateRange,
    refresh_unchanged: bool,
    shallow_block: HashSet<String>,
    shallow_inline: HashSet<String>,
    force_inline: HashSet<String>,
    ignore: HashSet<String>,
    dont_walk_into: HashSet<String>,
    main_content_ignore: HashSet<String>,
}

fn tag_set(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|tag| tag.trim().to_ascii_lowercase()).collect()
}

fn tag_in(set: &HashSet<String>, node: &Handle) -> bool {
    get_node_name(node).is_some_and(|name| set.contains(name))
}

impl ClassificationPolicy {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            range: config.range,
            refresh_unchanged: config.refresh_unchanged,
            shallow_block: tag_set(&config.shallow_block_tags),
            shallow_inline: tag_set(&config.shallow_inline_tags),
            force_inline: tag_set(&config.force_inline_tags),
            ignore: tag_set(&config.ignore_tags),
            dont_walk_into: tag_set(&config.dont_walk_into_tags),
            main_content_ignore: tag_set(&config.main_content_ignore_tags),
        }
    }

    pub fn range(&self) -> TranslateRange {
        self.range
    }

    pub fn refresh_unchanged(&self) -> bool {
        self.refresh_unchanged
    }

    pub fn is_shallow_block(&self, node: &Handle) -> bool {
        tag_in(&self.shallow_block, node)
    }

    pub fn is_shallow_inline(&self, node: &Handle) -> bool {
        tag_in(&self.shallow_inline, node)
    }

    pub fn is_force_inline(&self, node: &Handle) -> bool {
        tag_in(&self.force_inline, node)
    }

    /// 导航、页眉页脚等非正文元素，只在 `main` 范围下忽略
    pub fn is_main_content_ignored(&self, node: &Handle) -> bool {
        tag_in(&self.main_content_ignore, node)
    }

    /// 忽略列表中的元素；`main` 范围下还包括非正文元素
    pub fn is_ignored(&self, node: &Handle) -> bool {
        tag_in(&self.ignore, node)
            || (self.range == TranslateRange::Main && self.is_main_content_ignored(node))
    }

    /// 不进入的元素：脚本样式类标签、`notranslate` 元素（含已注入的译文容器）
    /// 以及 `translate="no"` 的元素
    pub fn is_dont_walk_into(&self, node: &Handle) -> bool {
        tag_in(&self.dont_walk_into, node)
            || has_class(node, NOTRANSLATE_CLASS)
            || get_node_attr(node, "translate").is_some_and(|value| value.eq_ignore_ascii_case("no"))
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::new(&OverlayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::create_element;

    #[test]
    fn test_default_partition() {
        let policy = ClassificationPolicy::default();

        assert!(policy.is_shallow_block(&create_element("div", &[])));
        assert!(policy.is_shallow_inline(&create_element("span", &[])));
        assert!(policy.is_force_inline(&create_element("a", &[])));
        assert!(policy.is_ignored(&create_element("img", &[])));
        assert!(policy.is_dont_walk_into(&create_element("script", &[])));
        assert!(!policy.is_shallow_block(&create_element("my-widget", &[])));
    }

    #[test]
    fn test_main_content_ignore_depends_on_range() {
        let nav = create_element("nav", &[]);

        let main = ClassificationPolicy::new(&OverlayConfig::with_range(TranslateRange::Main));
        let all = ClassificationPolicy::new(&OverlayConfig::with_range(TranslateRange::All));

        assert!(main.is_ignored(&nav));
        assert!(!all.is_ignored(&nav));
        assert!(all.is_main_content_ignored(&nav));
    }

    #[test]
    fn test_notranslate_markers_stop_descent() {
        let policy = ClassificationPolicy::default();

        assert!(policy.is_dont_walk_into(&create_element("span", &[("class", "x notranslate")])));
        assert!(policy.is_dont_walk_into(&create_element("div", &[("translate", "NO")])));
        assert!(!policy.is_dont_walk_into(&create_element("div", &[("translate", "yes")])));
    }

    #[test]
    fn test_config_tags_are_normalized() {
        let mut config = OverlayConfig::default();
        config.force_inline_tags = vec![" LI ".to_string()];
        let policy = ClassificationPolicy::new(&config);

        assert!(policy.is_force_inline(&create_element("li", &[])));
        assert!(!policy.is_force_inline(&create_element("a", &[])));
    }
}
