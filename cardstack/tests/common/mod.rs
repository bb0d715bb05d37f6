//! Scripted host shared by the integration tests.
//!
//! The fake keeps a tiny render tree (root → panel → title → text) and a
//! log of every observe/unobserve call. The log is shared through `Rc` so
//! tests can still inspect it after the stack has been dropped.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Instant;

use cardstack::config::CardStackConfig;
use cardstack::host::{
    MountedPanel, NodeId, ObserveRequest, ObserveTarget, ObserverHost, ObserverKind, RenderSurface,
    RenderedSet, SubscriptionId,
};
use cardstack::panel::PanelId;
use cardstack::stack::CardStack;

pub const ROOT: NodeId = NodeId(1);

/// One observe or unobserve call, in the order the host received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Observe(SubscriptionId),
    Unobserve(SubscriptionId),
}

/// Everything the host was asked to do.
#[derive(Debug, Default)]
pub struct HostLog {
    pub live: BTreeMap<SubscriptionId, ObserveRequest>,
    pub observed: Vec<SubscriptionId>,
    pub unobserved: Vec<SubscriptionId>,
    pub calls: Vec<HostCall>,
    pub wakeups: Vec<Instant>,
}

impl HostLog {
    pub fn live_of(&self, kind: ObserverKind) -> Vec<(SubscriptionId, ObserveRequest)> {
        self.live.iter().filter(|(_, r)| r.kind == kind).map(|(id, r)| (*id, *r)).collect()
    }
}

#[derive(Debug, Default)]
pub struct FakeHost {
    pub log: Rc<RefCell<HostLog>>,
    identities: HashMap<NodeId, String>,
    parents: HashMap<NodeId, NodeId>,
    titles: HashMap<NodeId, String>,
    generation: u64,
}

impl FakeHost {
    /// Replace the rendered tree with fresh nodes for `panels`.
    pub fn render(&mut self, panels: &[(PanelId, String)]) -> RenderedSet {
        self.generation += 1;
        self.identities.clear();
        self.parents.clear();
        self.titles.clear();

        let mounted = panels
            .iter()
            .map(|(id, title)| {
                let node = panel_node(self.generation, *id);
                self.identities.insert(node, id.0.to_string());
                self.parents.insert(node, ROOT);
                self.parents.insert(title_node(node), node);
                self.parents.insert(text_node(node), title_node(node));
                self.titles.insert(node, title.clone());
                MountedPanel { id: *id, node }
            })
            .collect();

        RenderedSet { root: Some(ROOT), panels: mounted }
    }

    /// Change the live text of a mounted panel's title region.
    pub fn type_into(&mut self, node: NodeId, text: &str) {
        self.titles.insert(node, text.to_owned());
    }

    /// Attach a node with an arbitrary identity attribute under the root.
    pub fn tag(&mut self, node: NodeId, identity: &str) {
        self.identities.insert(node, identity.to_owned());
        self.parents.insert(node, ROOT);
    }
}

impl ObserverHost for FakeHost {
    fn observe(&mut self, id: SubscriptionId, request: &ObserveRequest) {
        let mut log = self.log.borrow_mut();
        log.observed.push(id);
        log.calls.push(HostCall::Observe(id));
        log.live.insert(id, *request);
    }

    fn unobserve(&mut self, id: SubscriptionId) {
        let mut log = self.log.borrow_mut();
        log.unobserved.push(id);
        log.calls.push(HostCall::Unobserve(id));
        log.live.remove(&id);
    }

    fn schedule_wakeup(&mut self, at: Instant) {
        self.log.borrow_mut().wakeups.push(at);
    }
}

impl RenderSurface for FakeHost {
    fn identity(&self, node: NodeId) -> Option<String> {
        self.identities.get(&node).cloned()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    fn title_text(&self, node: NodeId) -> Option<String> {
        self.titles.get(&node).cloned()
    }
}

pub fn panel_node(generation: u64, id: PanelId) -> NodeId {
    NodeId(generation * 1_000_000 + 100 + u64::from(id.0) * 10)
}

pub fn title_node(panel: NodeId) -> NodeId {
    NodeId(panel.0 + 1)
}

pub fn text_node(panel: NodeId) -> NodeId {
    NodeId(panel.0 + 2)
}

pub fn stack() -> CardStack<FakeHost> {
    stack_with(CardStackConfig::default())
}

pub fn stack_with(config: CardStackConfig) -> CardStack<FakeHost> {
    CardStack::new(config, FakeHost::default()).unwrap()
}

/// Draw the current snapshot and report the new rendered set to the stack.
pub fn remount(stack: &mut CardStack<FakeHost>) -> RenderedSet {
    let panels: Vec<(PanelId, String)> =
        stack.snapshot().iter().map(|p| (p.id, p.title.clone())).collect();
    let rendered = stack.host_mut().render(&panels);
    stack.sync_rendered(rendered.clone());
    rendered
}

/// Node currently drawing `id`.
pub fn node_of(stack: &CardStack<FakeHost>, id: PanelId) -> NodeId {
    stack.rendered().panels.iter().find(|m| m.id == id).map(|m| m.node).unwrap()
}

/// Live subscription of `kind` observing `node`.
pub fn sub_for(stack: &CardStack<FakeHost>, kind: ObserverKind, node: NodeId) -> SubscriptionId {
    stack
        .host()
        .log
        .borrow()
        .live_of(kind)
        .into_iter()
        .find(|(_, r)| match r.target {
            ObserveTarget::Node(n) | ObserveTarget::Subtree(n) => n == node,
            ObserveTarget::Document => false,
        })
        .map(|(id, _)| id)
        .unwrap()
}

/// The single live subscription of `kind`.
pub fn only_sub(stack: &CardStack<FakeHost>, kind: ObserverKind) -> SubscriptionId {
    let live = stack.host().log.borrow().live_of(kind);
    assert_eq!(live.len(), 1, "expected one {kind:?} subscription");
    live[0].0
}
