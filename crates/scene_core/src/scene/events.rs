//! Per-node hierarchy notifications
//!
//! Listeners are plain callbacks keyed by event kind. Dispatch works on a
//! snapshot of the listener list, so a callback may register or remove
//! listeners (through captured shared state) without disturbing the
//! delivery in progress.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::NodeId;

/// Kind of hierarchy change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    /// The node was given a parent
    Added,
    /// The node was detached from its parent
    Removed,
}

/// Notification delivered to a node's listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEvent {
    /// What happened
    pub kind: NodeEventKind,
    /// Node the event concerns
    pub target: NodeId,
    /// Parent gained (`Added`) or lost (`Removed`)
    pub parent: NodeId,
}

/// Event callback
pub type Listener = Rc<dyn Fn(&NodeEvent)>;

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry owned by each node
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<NodeEventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self.listeners.iter().map(|(kind, list)| (*kind, list.len())).collect();
        f.debug_struct("EventDispatcher").field("listeners", &counts).finish()
    }
}

impl EventDispatcher {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`
    pub fn add_listener(&mut self, kind: NodeEventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// Whether `id` is registered for `kind`
    #[must_use]
    pub fn has_listener(&self, kind: NodeEventKind, id: ListenerId) -> bool {
        self.listeners
            .get(&kind)
            .is_some_and(|list| list.iter().any(|(other, _)| *other == id))
    }

    /// Whether anything listens for `kind`
    #[must_use]
    pub fn has_listeners(&self, kind: NodeEventKind) -> bool {
        self.listeners.get(&kind).is_some_and(|list| !list.is_empty())
    }

    /// Unregister; returns whether the listener was present
    pub fn remove_listener(&mut self, kind: NodeEventKind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(other, _)| *other != id);
        before != list.len()
    }

    /// Deliver `event` to every listener registered for its kind
    pub fn dispatch(&self, event: &NodeEvent) {
        let Some(list) = self.listeners.get(&event.kind) else {
            return;
        };
        let snapshot: Vec<Listener> = list.iter().map(|(_, listener)| Rc::clone(listener)).collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::cell::RefCell;

    fn ids() -> (NodeId, NodeId) {
        let mut map: SlotMap<NodeId, ()> = SlotMap::with_key();
        (map.insert(()), map.insert(()))
    }

    #[test]
    fn test_dispatch_reaches_matching_kind_only() {
        let (child, parent) = ids();
        let received = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = EventDispatcher::new();
        let sink = Rc::clone(&received);
        dispatcher.add_listener(NodeEventKind::Added, Rc::new(move |e: &NodeEvent| sink.borrow_mut().push(e.kind)));

        dispatcher.dispatch(&NodeEvent { kind: NodeEventKind::Removed, target: child, parent });
        dispatcher.dispatch(&NodeEvent { kind: NodeEventKind::Added, target: child, parent });

        assert_eq!(*received.borrow(), vec![NodeEventKind::Added]);
    }

    #[test]
    fn test_remove_listener() {
        let mut dispatcher = EventDispatcher::new();
        let id = dispatcher.add_listener(NodeEventKind::Removed, Rc::new(|_: &NodeEvent| {}));
        assert!(dispatcher.has_listener(NodeEventKind::Removed, id));
        assert!(!dispatcher.has_listener(NodeEventKind::Added, id));

        assert!(dispatcher.remove_listener(NodeEventKind::Removed, id));
        assert!(!dispatcher.remove_listener(NodeEventKind::Removed, id));
        assert!(!dispatcher.has_listeners(NodeEventKind::Removed));
    }
}
