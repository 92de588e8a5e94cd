// 集成测试公共模块
//
// 提供页面构造、模拟翻译器和查询辅助

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use markup5ever_rcdom::Handle;
use tokio::sync::Semaphore;

use overlay_translate::overlay::config::constants::{
    BLOCK_CONTENT_CLASS, ERROR_CLASS, INLINE_CONTENT_CLASS, SPINNER_CLASS,
};
use overlay_translate::overlay::core::is_overlay_wrapper;
use overlay_translate::overlay::error::helpers::translation_error;
use overlay_translate::overlay::{OverlayResult, Translator};
use overlay_translate::parsers::html::dom::{child_nodes, find_nodes, has_class, text_content};
use overlay_translate::parsers::html::shadow::shadow_root;
use overlay_translate::parsers::Page;

/// 初始化日志（重复调用无副作用）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// 在 LocalSet 中运行测试主体
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// 记录请求的前缀翻译器
#[derive(Default)]
pub struct PrefixTranslator {
    requests: RefCell<Vec<String>>,
}

impl PrefixTranslator {
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Translator for PrefixTranslator {
    async fn translate(&self, text: &str) -> OverlayResult<String> {
        self.requests.borrow_mut().push(text.to_string());
        tokio::task::yield_now().await;
        Ok(format!("[zh] {}", text))
    }
}

/// 总是失败的翻译器
pub struct FailingTranslator {
    pub message: &'static str,
}

impl Translator for FailingTranslator {
    async fn translate(&self, _text: &str) -> OverlayResult<String> {
        Err(translation_error(self.message))
    }
}

/// 返回固定结果的翻译器，用于模拟“无需翻译”
pub struct FixedTranslator {
    pub output: Option<String>,
}

impl Translator for FixedTranslator {
    async fn translate(&self, text: &str) -> OverlayResult<String> {
        Ok(self.output.clone().unwrap_or_else(|| text.to_string()))
    }
}

/// 放行之前一直挂起的翻译器
pub struct GatedTranslator {
    gate: Rc<Semaphore>,
    calls: Cell<usize>,
}

impl GatedTranslator {
    pub fn new() -> Self {
        Self {
            gate: Rc::new(Semaphore::new(0)),
            calls: Cell::new(0),
        }
    }

    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Translator for GatedTranslator {
    async fn translate(&self, text: &str) -> OverlayResult<String> {
        self.calls.set(self.calls.get() + 1);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| translation_error(e.to_string()))?;
        permit.forget();
        Ok(format!("[zh] {}", text))
    }
}

/// HTML测试辅助
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn page(html: &str) -> Page {
        Page::from_html(html, Some("https://example.com/article"))
            .expect("test page should parse")
    }

    pub fn first(root: &Handle, tag: &str) -> Handle {
        find_nodes(root, &[tag])
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("<{}> not found", tag))
    }

    pub fn nth(root: &Handle, tag: &str, index: usize) -> Handle {
        find_nodes(root, &[tag])
            .into_iter()
            .nth(index)
            .unwrap_or_else(|| panic!("<{}> #{} not found", tag, index))
    }

    /// 子树内（含 shadow root）所有译文容器
    pub fn wrappers(root: &Handle) -> Vec<Handle> {
        let mut found = Vec::new();
        Self::collect_wrappers(root, &mut found);
        found
    }

    fn collect_wrappers(node: &Handle, found: &mut Vec<Handle>) {
        for child in child_nodes(node) {
            if is_overlay_wrapper(&child) {
                found.push(child.clone());
            }
            Self::collect_wrappers(&child, found);
        }
        if let Some(root) = shadow_root(node) {
            Self::collect_wrappers(&root, found);
        }
    }

    /// 容器内渲染出的译文
    pub fn rendered_text(wrapper: &Handle) -> Option<String> {
        child_nodes(wrapper)
            .into_iter()
            .find(|child| {
                has_class(child, INLINE_CONTENT_CLASS) || has_class(child, BLOCK_CONTENT_CLASS)
            })
            .map(|content| text_content(&content))
    }

    pub fn translations(root: &Handle) -> Vec<String> {
        Self::wrappers(root)
            .iter()
            .filter_map(Self::rendered_text)
            .collect()
    }

    pub fn has_spinner(wrapper: &Handle) -> bool {
        child_nodes(wrapper)
            .iter()
            .any(|child| has_class(child, SPINNER_CLASS))
    }

    pub fn error_affordance(wrapper: &Handle) -> Option<Handle> {
        child_nodes(wrapper)
            .into_iter()
            .find(|child| has_class(child, ERROR_CLASS))
    }
}
