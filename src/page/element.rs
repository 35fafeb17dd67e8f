//! Retained page element: the visual state classes of one page

use std::collections::BTreeSet;

pub const CLASS_LOADING: &str = "page-loading";
pub const CLASS_ERROR: &str = "page-error";
pub const CLASS_CONVERTING: &str = "page-converting";
pub const CLASS_TEXT_DISABLED: &str = "text-disabled";
pub const CLASS_LINKS_DISABLED: &str = "links-disabled";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageElement {
    classes: BTreeSet<&'static str>,
}

impl PageElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: &'static str) {
        self.classes.insert(class);
    }

    pub fn remove_class(&mut self, class: &'static str) {
        self.classes.remove(class);
    }

    pub fn toggle_class(&mut self, class: &'static str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.classes.iter().copied()
    }
}
