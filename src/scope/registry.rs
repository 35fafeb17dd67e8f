//! Component and utility registry
//!
//! Built once per process and shared by reference with every viewer it
//! creates. Holds named component factories (plugins, extra components) and
//! the typed utilities components reach through their scope.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use log::warn;

use super::bus::Component;
use crate::clock::{Clock, SystemClock};
use crate::config::ViewerConfig;
use crate::fetch::Fetcher;
use crate::page::{Renderer, RetainedRenderer};
use crate::support::Support;

pub type ComponentRef = Rc<RefCell<dyn Component>>;

type ComponentFactory = Box<dyn Fn(&ViewerConfig) -> ComponentRef>;

/// Shared collaborators handed to components
#[derive(Clone)]
pub struct Utilities {
    pub clock: Rc<dyn Clock>,
    pub fetcher: Arc<dyn Fetcher>,
    pub support: Support,
    pub renderer: Rc<dyn Renderer>,
}

impl std::fmt::Debug for Utilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Utilities")
            .field("support", &self.support)
            .finish_non_exhaustive()
    }
}

pub struct Registry {
    factories: HashMap<String, ComponentFactory>,
    utilities: Utilities,
}

impl Registry {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            factories: HashMap::new(),
            utilities: Utilities {
                clock: Rc::new(SystemClock),
                fetcher,
                support: Support::default(),
                renderer: Rc::new(RetainedRenderer),
            },
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.utilities.clock = clock;
        self
    }

    #[must_use]
    pub fn with_support(mut self, support: Support) -> Self {
        self.utilities.support = support;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Rc<dyn Renderer>) -> Self {
        self.utilities.renderer = renderer;
        self
    }

    /// Register a named component factory, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ViewerConfig) -> ComponentRef + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Box::new(factory)).is_some() {
            warn!("Component factory {name:?} replaced");
        }
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate a component by name; `None` for unknown names
    pub fn create(&self, name: &str, config: &ViewerConfig) -> Option<ComponentRef> {
        self.factories.get(name).map(|factory| factory(config))
    }

    pub fn utilities(&self) -> &Utilities {
        &self.utilities
    }
}
