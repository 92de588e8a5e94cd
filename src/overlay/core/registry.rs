//! 引擎级登记表
//!
//! - `InFlightRegistry`: 正在翻译的锚点节点，防止同一单元重复请求
//! - `StyleRegistry`: 已注入样式表的文档

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use markup5ever_rcdom::{Handle, Node};
use tokio::sync::Notify;

use crate::parsers::html::dom::node_key;

/// 在途锚点登记表
///
/// 持有节点句柄，翻译期间节点即使被页面移除也不会被回收
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    nodes: HashMap<usize, Handle>,
}

impl InFlightRegistry {
    pub fn contains(&self, node: &Handle) -> bool {
        self.nodes.contains_key(&node_key(node))
    }

    pub fn contains_all(&self, nodes: &[Handle]) -> bool {
        !nodes.is_empty() && nodes.iter().all(|node| self.contains(node))
    }

    /// 登记节点；已在表中时返回 false
    pub fn insert(&mut self, node: &Handle) -> bool {
        self.nodes.insert(node_key(node), node.clone()).is_none()
    }

    pub fn remove(&mut self, node: &Handle) {
        self.nodes.remove(&node_key(node));
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 已注入样式的文档
///
/// 只保存弱引用，文档释放后地址被复用也不会误判
#[derive(Debug, Default)]
pub struct StyleRegistry {
    documents: HashMap<usize, Weak<Node>>,
}

impl StyleRegistry {
    pub fn is_marked(&self, document: &Handle) -> bool {
        self.documents
            .get(&node_key(document))
            .and_then(Weak::upgrade)
            .is_some_and(|existing| Rc::ptr_eq(&existing, document))
    }

    /// 标记文档；此前未标记时返回 true
    pub fn mark(&mut self, document: &Handle) -> bool {
        if self.is_marked(document) {
            return false;
        }
        self.documents
            .insert(node_key(document), Rc::downgrade(document));
        true
    }
}

/// 引擎共享的可变状态
#[derive(Debug, Default)]
pub struct EngineState {
    pub in_flight: RefCell<InFlightRegistry>,
    pub styled: RefCell<StyleRegistry>,
    idle: Notify,
}

impl EngineState {
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.borrow().len()
    }

    /// 等待在途表清空
    pub async fn settled(&self) {
        loop {
            let notified = self.idle.notified();
            if self.in_flight.borrow().is_empty() {
                return;
            }
            notified.await;
        }
    }
}

/// 在途登记守卫
///
/// 只释放自己登记的锚点；无论翻译成功、失败还是任务被取消，
/// 析构时都会清理。表空时唤醒所有等待者。
pub struct InFlightGuard {
    state: Rc<EngineState>,
    anchors: Vec<Handle>,
}

impl InFlightGuard {
    /// 登记全部锚点，返回守卫；锚点已全部在途时返回 `None`
    pub fn acquire(state: &Rc<EngineState>, anchors: &[Handle]) -> Option<Self> {
        let mut in_flight = state.in_flight.borrow_mut();
        if in_flight.contains_all(anchors) {
            return None;
        }

        let registered = anchors
            .iter()
            .filter(|anchor| in_flight.insert(anchor))
            .cloned()
            .collect();

        Some(Self {
            state: Rc::clone(state),
            anchors: registered,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let is_empty = {
            let mut in_flight = self.state.in_flight.borrow_mut();
            for anchor in &self.anchors {
                in_flight.remove(anchor);
            }
            in_flight.is_empty()
        };

        if is_empty {
            self.state.idle.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::create_element;

    #[test]
    fn test_guard_rejects_fully_registered_unit() {
        let state = Rc::new(EngineState::default());
        let p = create_element("p", &[]);

        let guard = InFlightGuard::acquire(&state, &[p.clone()]);
        assert!(guard.is_some());
        assert_eq!(state.in_flight_count(), 1);
        assert!(InFlightGuard::acquire(&state, &[p.clone()]).is_none());

        drop(guard);
        assert_eq!(state.in_flight_count(), 0);
        assert!(InFlightGuard::acquire(&state, &[p]).is_some());
    }

    #[test]
    fn test_overlapping_run_only_releases_its_own_anchors() {
        let state = Rc::new(EngineState::default());
        let a = create_element("span", &[]);
        let b = create_element("span", &[]);

        let first = InFlightGuard::acquire(&state, &[a.clone()]).unwrap();
        let second = InFlightGuard::acquire(&state, &[a.clone(), b.clone()]).unwrap();
        assert_eq!(state.in_flight_count(), 2);

        drop(second);
        assert!(state.in_flight.borrow().contains(&a));
        assert!(!state.in_flight.borrow().contains(&b));

        drop(first);
        assert_eq!(state.in_flight_count(), 0);
    }

    #[test]
    fn test_empty_anchor_list_is_never_in_flight() {
        let state = Rc::new(EngineState::default());
        assert!(!state.in_flight.borrow().contains_all(&[]));
    }

    #[test]
    fn test_style_registry_marks_once() {
        let mut registry = StyleRegistry::default();
        let document = create_element("html", &[]);

        assert!(registry.mark(&document));
        assert!(!registry.mark(&document));
        assert!(registry.is_marked(&document));
        assert!(!registry.is_marked(&create_element("html", &[])));
    }

    #[tokio::test]
    async fn test_settled_returns_when_idle() {
        let state = Rc::new(EngineState::default());
        state.settled().await;

        let guard = InFlightGuard::acquire(&state, &[create_element("p", &[])]).unwrap();
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                tokio::task::spawn_local(async move {
                    tokio::task::yield_now().await;
                    drop(guard);
                });
                state.settled().await;
            })
            .await;

        assert_eq!(state.in_flight_count(), 0);
    }
}
