//! Per-viewer message bus and component lifecycle

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, warn};

use super::message::{Message, Subscription};
use super::registry::{ComponentRef, Registry, Utilities};
use crate::config::ViewerConfig;
use crate::fetch::FetchPool;

/// A participant on the bus.
///
/// The subscription is read once, when the component is added to a scope.
pub trait Component {
    fn name(&self) -> &'static str;

    fn messages(&self) -> Subscription {
        Subscription::None
    }

    fn on_message(&mut self, _message: &Message, _cx: &mut Context<'_>) {}

    /// Release requests and other resources; called once when removed
    fn destroy(&mut self, _cx: &mut Context<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

struct Entry {
    id: ComponentId,
    name: &'static str,
    subscription: Subscription,
    component: ComponentRef,
}

/// Routes messages between the components of one viewer.
///
/// Messages broadcast before `ready()` are held back and replayed in order.
/// Messages broadcast while another message is being delivered are appended
/// to an outbox and delivered once the current one has reached every
/// subscriber, so handlers always run to completion.
pub struct Scope {
    config: Rc<ViewerConfig>,
    registry: Rc<Registry>,
    fetch: FetchPool,
    entries: Vec<Entry>,
    next_id: u64,
    ready: bool,
    pending: VecDeque<Message>,
    outbox: VecDeque<Message>,
    dispatching: bool,
    doomed: Vec<ComponentRef>,
}

impl Scope {
    pub fn new(config: Rc<ViewerConfig>, registry: Rc<Registry>, fetch: FetchPool) -> Self {
        Self {
            config,
            registry,
            fetch,
            entries: Vec::new(),
            next_id: 1,
            ready: false,
            pending: VecDeque::new(),
            outbox: VecDeque::new(),
            dispatching: false,
            doomed: Vec::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn utilities(&self) -> &Utilities {
        self.registry.utilities()
    }

    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    pub fn fetch_mut(&mut self) -> &mut FetchPool {
        &mut self.fetch
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn component_count(&self) -> usize {
        self.entries.len()
    }

    /// Register an already-built component
    pub fn add_component(&mut self, component: ComponentRef) -> ComponentId {
        let (name, subscription) = {
            let component = component.borrow();
            (component.name(), component.messages())
        };
        let id = ComponentId(self.next_id);
        self.next_id += 1;
        debug!("Component {name} registered as {id:?}");
        self.entries.push(Entry {
            id,
            name,
            subscription,
            component,
        });
        id
    }

    /// Create a component through the registry; `None` for unknown names
    pub fn create_component(&mut self, name: &str) -> Option<(ComponentId, ComponentRef)> {
        let Some(component) = self.registry.create(name, &self.config) else {
            warn!("Unknown component {name:?}");
            return None;
        };
        let id = self.add_component(Rc::clone(&component));
        Some((id, component))
    }

    /// Remove a component and run its destroy hook.
    ///
    /// Safe to call from inside a handler: remaining subscribers of the
    /// current message are unaffected, and a component destroying itself is
    /// torn down once its handler returns.
    pub fn destroy_component(&mut self, id: ComponentId) -> bool {
        let Some(position) = self.entries.iter().position(|entry| entry.id == id) else {
            return false;
        };
        let entry = self.entries.remove(position);
        debug!("Destroying component {} ({id:?})", entry.name);

        match entry.component.try_borrow_mut() {
            Ok(mut component) => {
                let mut cx = Context { scope: self };
                component.destroy(&mut cx);
            }
            Err(_) => self.doomed.push(Rc::clone(&entry.component)),
        }
        true
    }

    pub fn broadcast(&mut self, message: Message) {
        if !self.ready {
            self.pending.push_back(message);
            return;
        }
        self.outbox.push_back(message);
        if !self.dispatching {
            self.flush();
        }
    }

    /// Switch to immediate delivery, replaying everything queued so far
    pub fn ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        debug!("Scope ready, replaying {} queued messages", self.pending.len());
        let queued: Vec<Message> = self.pending.drain(..).collect();
        self.outbox.extend(queued);
        if !self.dispatching {
            self.flush();
        }
    }

    /// Run `f` with a component context; broadcasts it makes are delivered
    /// after it returns.
    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut Context<'_>) -> R) -> R {
        let nested = self.dispatching;
        self.dispatching = true;
        let result = {
            let mut cx = Context { scope: self };
            f(&mut cx)
        };
        self.reap_doomed();
        if !nested {
            self.flush();
        }
        result
    }

    /// Destroy every component, in registration order
    pub fn destroy(&mut self) {
        let entries: Vec<Entry> = self.entries.drain(..).collect();
        for entry in entries {
            if let Ok(mut component) = entry.component.try_borrow_mut() {
                let mut cx = Context { scope: self };
                component.destroy(&mut cx);
            }
        }
        self.pending.clear();
        self.outbox.clear();
        self.doomed.clear();
        self.fetch.shutdown();
    }

    fn flush(&mut self) {
        self.dispatching = true;
        while let Some(message) = self.outbox.pop_front() {
            self.dispatch(&message);
        }
        self.dispatching = false;
    }

    fn dispatch(&mut self, message: &Message) {
        let kind = message.kind();
        let targets: Vec<(ComponentId, ComponentRef)> = self
            .entries
            .iter()
            .filter(|entry| entry.subscription.accepts(kind))
            .map(|entry| (entry.id, Rc::clone(&entry.component)))
            .collect();

        for (id, component) in targets {
            // destroyed by an earlier handler of this same message
            if !self.contains(id) {
                continue;
            }
            match component.try_borrow_mut() {
                Ok(mut target) => {
                    let mut cx = Context { scope: self };
                    target.on_message(message, &mut cx);
                }
                Err(_) => warn!("Component {id:?} is busy, dropping {kind}"),
            }
            self.reap_doomed();
        }
    }

    fn reap_doomed(&mut self) {
        while let Some(component) = self.doomed.pop() {
            match component.try_borrow_mut() {
                Ok(mut component) => {
                    let mut cx = Context { scope: self };
                    component.destroy(&mut cx);
                }
                Err(_) => {
                    // still on the stack; try again after the outer handler
                    self.doomed.push(Rc::clone(&component));
                    break;
                }
            }
        }
    }
}

/// What a component can reach while handling a message
pub struct Context<'a> {
    scope: &'a mut Scope,
}

impl Context<'_> {
    pub fn broadcast(&mut self, message: Message) {
        self.scope.broadcast(message);
    }

    pub fn config(&self) -> &ViewerConfig {
        self.scope.config()
    }

    pub fn utilities(&self) -> &Utilities {
        self.scope.utilities()
    }

    pub fn now(&self) -> Instant {
        self.scope.utilities().clock.now()
    }

    pub fn fetch(&mut self) -> &mut FetchPool {
        &mut self.scope.fetch
    }

    pub fn is_ready(&self) -> bool {
        self.scope.ready
    }

    pub fn create_component(&mut self, name: &str) -> Option<(ComponentId, ComponentRef)> {
        self.scope.create_component(name)
    }

    pub fn destroy_component(&mut self, id: ComponentId) -> bool {
        self.scope.destroy_component(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::Arc;

    use super::*;
    use crate::fetch::FetchPool;
    use crate::scope::message::MessageKind;
    use crate::test_utils::MemoryFetcher;

    const LISTEN: &[MessageKind] = &[MessageKind::PageLoad, MessageKind::PageUnload];

    type Log = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        label: &'static str,
        log: Log,
        destroy_on_load: Rc<Cell<Option<ComponentId>>>,
        echo: bool,
    }

    impl Recorder {
        fn new(label: &'static str, log: &Log) -> Self {
            Self {
                label,
                log: Rc::clone(log),
                destroy_on_load: Rc::new(Cell::new(None)),
                echo: false,
            }
        }
    }

    impl Component for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn messages(&self) -> Subscription {
            Subscription::Only(LISTEN)
        }

        fn on_message(&mut self, message: &Message, cx: &mut Context<'_>) {
            self.log
                .borrow_mut()
                .push(format!("{}:{}", self.label, message.kind()));
            if let Message::PageLoad { page } = message {
                if let Some(victim) = self.destroy_on_load.get() {
                    cx.destroy_component(victim);
                }
                if self.echo {
                    cx.broadcast(Message::PageUnload { page: *page });
                }
            }
        }

        fn destroy(&mut self, _cx: &mut Context<'_>) {
            self.log.borrow_mut().push(format!("{}:destroyed", self.label));
        }
    }

    fn scope() -> Scope {
        let registry = Registry::new(Arc::new(MemoryFetcher::new()));
        Scope::new(
            Rc::new(ViewerConfig::new("mem://doc/")),
            Rc::new(registry),
            FetchPool::inline(Arc::new(MemoryFetcher::new()), 4, 0),
        )
    }

    #[test]
    fn messages_before_ready_are_queued_in_order() {
        let log: Log = Rc::default();
        let mut scope = scope();
        scope.add_component(Rc::new(RefCell::new(Recorder::new("a", &log))));

        scope.broadcast(Message::PageLoad { page: 1 });
        scope.broadcast(Message::PageUnload { page: 1 });
        assert!(log.borrow().is_empty());

        scope.ready();

        assert_eq!(*log.borrow(), vec!["a:pageload", "a:pageunload"]);
    }

    #[test]
    fn delivery_follows_registration_order_and_subscriptions() {
        let log: Log = Rc::default();
        let mut scope = scope();
        scope.add_component(Rc::new(RefCell::new(Recorder::new("a", &log))));
        scope.add_component(Rc::new(RefCell::new(Recorder::new("b", &log))));
        scope.ready();

        scope.broadcast(Message::Destroy);
        scope.broadcast(Message::PageLoad { page: 2 });

        assert_eq!(*log.borrow(), vec!["a:pageload", "b:pageload"]);
    }

    #[test]
    fn destroying_a_later_component_mid_broadcast_skips_it_once() {
        let log: Log = Rc::default();
        let mut scope = scope();
        let first = Recorder::new("a", &log);
        let victim_slot = Rc::clone(&first.destroy_on_load);
        scope.add_component(Rc::new(RefCell::new(first)));
        let victim = scope.add_component(Rc::new(RefCell::new(Recorder::new("b", &log))));
        scope.add_component(Rc::new(RefCell::new(Recorder::new("c", &log))));
        victim_slot.set(Some(victim));
        scope.ready();

        scope.broadcast(Message::PageLoad { page: 1 });

        assert_eq!(
            *log.borrow(),
            vec!["a:pageload", "b:destroyed", "c:pageload"]
        );
        assert_eq!(scope.component_count(), 2);
    }

    #[test]
    fn self_destroy_runs_after_handler() {
        let log: Log = Rc::default();
        let mut scope = scope();
        let component = Recorder::new("a", &log);
        let slot = Rc::clone(&component.destroy_on_load);
        let id = scope.add_component(Rc::new(RefCell::new(component)));
        scope.add_component(Rc::new(RefCell::new(Recorder::new("b", &log))));
        slot.set(Some(id));
        scope.ready();

        scope.broadcast(Message::PageLoad { page: 1 });

        assert_eq!(
            *log.borrow(),
            vec!["a:pageload", "a:destroyed", "b:pageload"]
        );
        assert!(!scope.contains(id));
    }

    #[test]
    fn nested_broadcasts_wait_for_current_delivery() {
        let log: Log = Rc::default();
        let mut scope = scope();
        let mut echo = Recorder::new("a", &log);
        echo.echo = true;
        scope.add_component(Rc::new(RefCell::new(echo)));
        scope.add_component(Rc::new(RefCell::new(Recorder::new("b", &log))));
        scope.ready();

        scope.broadcast(Message::PageLoad { page: 1 });

        assert_eq!(
            *log.borrow(),
            vec!["a:pageload", "b:pageload", "a:pageunload", "b:pageunload"]
        );
    }

    #[test]
    fn unknown_component_name_yields_none() {
        let mut scope = scope();
        assert!(scope.create_component("plugin-missing").is_none());
        assert_eq!(scope.component_count(), 0);
    }
}
