//! Top navigation bar
//!
//! Turns solid once the page has scrolled past a threshold, and jumps to a
//! section when one of its links is chosen.

use crate::config::NavigationSection;
use rustc_hash::FxHashMap;
use serde::Serialize;
use spatial_core::{Host, Subscription};
use std::cell::Cell;
use std::rc::Rc;

/// Link targets, in menu order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Home,
    About,
    Services,
    Technologies,
    Contact,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Home,
        Section::About,
        Section::Services,
        Section::Technologies,
        Section::Contact,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::About => "About",
            Section::Services => "Services",
            Section::Technologies => "Technologies",
            Section::Contact => "Contact",
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::About => "about",
            Section::Services => "services",
            Section::Technologies => "technologies",
            Section::Contact => "contact",
        }
    }
}

#[derive(Default)]
struct NavState {
    scrolled: Cell<bool>,
    menu_open: Cell<bool>,
}

pub struct Navigation {
    host: Host,
    state: Rc<NavState>,
    anchors: FxHashMap<Section, f64>,
    _scroll: Subscription,
}

impl Navigation {
    /// `anchors` gives the document offset of each section that exists on
    /// the page
    pub fn mount<I>(host: &Host, settings: &NavigationSection, anchors: I) -> Self
    where
        I: IntoIterator<Item = (Section, f64)>,
    {
        let threshold = settings.scroll_threshold;
        let state = Rc::new(NavState::default());
        state.scrolled.set(host.scroll().offset > threshold);

        let weak = Rc::downgrade(&state);
        let scroll = host.viewport.on_scroll(move |scroll| {
            if let Some(state) = weak.upgrade() {
                state.scrolled.set(scroll.offset > threshold);
            }
        });

        Self {
            host: host.clone(),
            state,
            anchors: anchors.into_iter().collect(),
            _scroll: scroll,
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.state.scrolled.get()
    }

    pub fn is_menu_open(&self) -> bool {
        self.state.menu_open.get()
    }

    pub fn toggle_menu(&self) {
        self.state.menu_open.set(!self.state.menu_open.get());
    }

    /// Scroll to a section and close the menu
    ///
    /// A section with no anchor leaves the scroll position alone. Returns
    /// whether the page moved.
    pub fn select(&self, section: Section) -> bool {
        self.state.menu_open.set(false);
        match self.anchors.get(&section) {
            Some(&top) => {
                tracing::debug!(section = section.id(), top, "navigating");
                self.host.viewport.scroll_to(top);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for Navigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigation")
            .field("scrolled", &self.is_scrolled())
            .field("menu_open", &self.is_menu_open())
            .finish()
    }
}
