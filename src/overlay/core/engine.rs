//! 覆盖层翻译引擎
//!
//! 触发入口（整页翻译、坐标切换、清除）都在调用线程上同步完成标注、
//! 分派和占位插入；只有翻译请求和译文渲染放进 `spawn_local` 任务。
//! 因此调用方必须运行在 `tokio::task::LocalSet` 中。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::overlay::config::OverlayConfig;
use crate::overlay::error::OverlayResult;
use crate::overlay::hit_test::{nearest_block_at, LayoutProvider, Point};
use crate::overlay::pipeline::policy::ClassificationPolicy;
use crate::overlay::pipeline::resolver::{resolve, Unit};
use crate::overlay::pipeline::walker::label;
use crate::overlay::style::inject_stylesheet;
use crate::overlay::translator::Translator;
use crate::parsers::html::dom::{detach, find_nodes, TransNode};
use crate::parsers::html::page::{body_of, Page};

use super::inserter::{
    collapse_only_child, create_placeholder, extract_text, has_rendered_translation,
    remove_error_affordances_in, remove_wrappers_in, render_error, render_translation,
    source_digest, wrapper_digest, Placement,
};
use super::registry::{EngineState, InFlightGuard};
use super::token::{PassToken, PassTokenSource};

/// 已插入加载指示、等待译文的单元
struct PendingUnit {
    wrapper: Handle,
    spinner: Handle,
    target: TransNode,
    text: String,
}

struct EngineInner<T> {
    policy: ClassificationPolicy,
    translator: T,
    tokens: PassTokenSource,
    state: Rc<EngineState>,
}

/// 页内双语翻译引擎
///
/// 克隆得到的句柄共享同一组在途登记与样式登记
pub struct OverlayEngine<T> {
    inner: Rc<EngineInner<T>>,
}

impl<T> Clone for OverlayEngine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Translator + 'static> OverlayEngine<T> {
    pub fn new(config: &OverlayConfig, translator: T) -> Self {
        Self::with_policy(ClassificationPolicy::new(config), translator)
    }

    pub fn with_policy(policy: ClassificationPolicy, translator: T) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                policy,
                translator,
                tokens: PassTokenSource::new(),
                state: Rc::new(EngineState::default()),
            }),
        }
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.inner.policy
    }

    pub fn translator(&self) -> &T {
        &self.inner.translator
    }

    /// 翻译整页：主文档和所有同源框架，返回分派的单元数
    ///
    /// 已有译文会被刷新；正在翻译的单元不会重复请求，
    /// 因此页面仍在加载时可以反复调用。
    pub fn translate_whole_document(&self, page: &Page) -> usize {
        let token = self.inner.tokens.next_token();
        let mut dispatched = 0;

        for document in page.documents() {
            let Some(root) = body_of(&document)
                .or_else(|| find_nodes(&document, &["html"]).into_iter().next())
            else {
                tracing::debug!("文档没有可翻译的根元素，跳过");
                continue;
            };
            dispatched += self.walk_and_dispatch(&root, &document, &token, false);
        }

        tracing::info!("整页翻译分派了 {} 个单元", dispatched);
        dispatched
    }

    /// 切换坐标处段落的译文：没有时翻译，有时隐藏
    pub fn toggle_unit_at_point(
        &self,
        page: &Page,
        layout: &dyn LayoutProvider,
        point: Point,
    ) -> usize {
        let document = page.document();
        let Some(block) = nearest_block_at(document, point, layout, &self.inner.policy) else {
            tracing::debug!("坐标 ({}, {}) 处没有可翻译的内容", point.x, point.y);
            return 0;
        };

        let token = self.inner.tokens.next_token();
        self.walk_and_dispatch(&block, document, &token, true)
    }

    /// 对任意子树执行一次标注与分派
    ///
    /// `document` 是子树所在的文档，样式表注入到这里
    pub fn translate_subtree(&self, root: &Handle, document: &Handle, toggle: bool) -> usize {
        let token = self.inner.tokens.next_token();
        self.walk_and_dispatch(root, document, &token, toggle)
    }

    /// 处理单个翻译单元
    pub fn apply(&self, unit: Unit, document: &Handle, toggle: bool) {
        apply_unit(&self.inner, unit, document, toggle);
    }

    /// 移除页面（含框架与 shadow root）内所有译文容器，返回移除数量
    pub fn remove_all_overlay_wrappers(&self, page: &Page) -> usize {
        let removed: usize = page
            .documents()
            .iter()
            .map(remove_wrappers_in)
            .sum();
        tracing::info!("移除了 {} 个译文容器", removed);
        removed
    }

    pub fn remove_overlay_wrappers_in(&self, root: &Handle) -> usize {
        remove_wrappers_in(root)
    }

    /// 移除页面内所有错误提示，返回移除数量
    pub fn remove_error_affordances(&self, page: &Page) -> usize {
        page.documents()
            .iter()
            .map(remove_error_affordances_in)
            .sum()
    }

    /// 正在翻译的锚点数
    pub fn in_flight_count(&self) -> usize {
        self.inner.state.in_flight_count()
    }

    /// 等待所有在途翻译完成
    pub async fn settled(&self) {
        self.inner.state.settled().await;
    }

    fn walk_and_dispatch(
        &self,
        root: &Handle,
        document: &Handle,
        token: &PassToken,
        toggle: bool,
    ) -> usize {
        label(root, token, &self.inner.policy);

        let mut dispatched = 0;
        resolve(root, token, &mut |unit| {
            dispatched += 1;
            apply_unit(&self.inner, unit, document, toggle);
        });
        dispatched
    }
}

fn apply_unit<T: Translator + 'static>(
    inner: &Rc<EngineInner<T>>,
    unit: Unit,
    document: &Handle,
    toggle: bool,
) {
    let anchors = unit.anchors();
    let Some(guard) = InFlightGuard::acquire(&inner.state, &anchors) else {
        return;
    };

    let Some(pending) = inner.prepare(unit, document, toggle) else {
        return;
    };

    let inner = Rc::clone(inner);
    tokio::task::spawn_local(async move {
        let _guard = guard;
        let result = inner.translator.translate(&pending.text).await;
        inner.finish(pending, result);
    });
}

impl<T> EngineInner<T> {
    /// 同步阶段：定位目标、处理已有容器、提取文本、插入占位
    fn prepare(&self, unit: Unit, document: &Handle, toggle: bool) -> Option<PendingUnit> {
        let (target, placement, sources) = match unit {
            Unit::Element(element) => {
                let target = collapse_only_child(&element);
                (
                    TransNode::Element(target.clone()),
                    Placement::Inside(target.clone()),
                    vec![target],
                )
            }
            Unit::Text(node) => (
                TransNode::Text(node.clone()),
                Placement::After(node.clone()),
                vec![node],
            ),
            Unit::Run(nodes) => {
                let last = nodes.last()?.clone();
                (
                    TransNode::from_handle(&last)?,
                    Placement::After(last),
                    nodes,
                )
            }
        };

        let existing = placement.existing_wrapper();
        if toggle {
            if let Some(wrapper) = &existing {
                detach(wrapper);
                tracing::debug!("隐藏已有译文");
                return None;
            }
        }

        let text = self.unit_text(&sources);

        if let Some(wrapper) = existing {
            let unchanged = wrapper_digest(&wrapper).as_deref() == Some(source_digest(&text).as_str());
            if !self.policy.refresh_unchanged() && unchanged && has_rendered_translation(&wrapper) {
                tracing::debug!("原文未变化，保留已有译文");
                return None;
            }
            detach(&wrapper);
        }

        if text.is_empty() {
            tracing::debug!("单元没有可翻译的文本，跳过");
            return None;
        }

        if self.state.styled.borrow_mut().mark(document) {
            inject_stylesheet(document);
        }

        let (wrapper, spinner) = create_placeholder(&text);
        if !placement.place(&wrapper) {
            tracing::debug!("锚点已脱离文档，跳过");
            return None;
        }

        Some(PendingUnit {
            wrapper,
            spinner,
            target,
            text,
        })
    }

    fn unit_text(&self, sources: &[Handle]) -> String {
        sources
            .iter()
            .map(|node| extract_text(node, &self.policy))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 异步阶段结束：去掉加载指示，渲染译文或错误
    fn finish(&self, pending: PendingUnit, result: OverlayResult<String>) {
        detach(&pending.spinner);

        match result {
            Ok(translated) => {
                let translated = translated.trim();
                if translated.is_empty() || translated == pending.text {
                    tracing::debug!("译文为空或与原文相同，移除容器");
                    detach(&pending.wrapper);
                    return;
                }
                render_translation(&pending.wrapper, &pending.target, translated, &self.policy);
            }
            Err(error) => {
                tracing::error!("翻译失败: {}", error);
                render_error(&pending.wrapper, &error);
            }
        }
    }
}
