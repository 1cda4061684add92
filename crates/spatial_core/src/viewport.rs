//! Viewport state and element visibility
//!
//! The viewport tracks the page scroll offset and window size, and republishes
//! changes through [`EventSource`]s. Elements are described by their
//! [`ElementBounds`] in document coordinates, from which visibility and
//! per-element scroll progress are derived.

use crate::error::{CoreError, Result};
use crate::events::EventSource;
use crate::subscription::{DisposeBag, Subscription};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Scroll offset and window size, in CSS pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollState {
    /// Vertical scroll offset of the document
    pub offset: f64,
    /// Window width
    pub width: f64,
    /// Window height
    pub height: f64,
}

impl ScrollState {
    pub fn new(offset: f64, width: f64, height: f64) -> Self {
        Self {
            offset,
            width,
            height,
        }
    }

    /// Width / height, or 1 for a degenerate window
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(0.0, 1440.0, 900.0)
    }
}

/// Pointer activity on the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to client coordinates
    Move { x: f64, y: f64 },
    /// Pointer entered an element
    Over { interactive: bool },
    /// Pointer left an element
    Out,
    /// Pointer left the document
    Leave,
}

/// Vertical extent of an element in document coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBounds {
    pub top: f64,
    pub height: f64,
}

impl ElementBounds {
    pub fn new(top: f64, height: f64) -> Result<Self> {
        if top.is_finite() && height.is_finite() && height >= 0.0 {
            Ok(Self { top, height })
        } else {
            Err(CoreError::InvalidBounds { top, height })
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether any part of the element intersects the viewport
    ///
    /// `margin` grows the viewport on every side; a negative margin shrinks it,
    /// so the element must be that far inside before it counts as visible.
    pub fn is_in_view(&self, scroll: &ScrollState, margin: f64) -> bool {
        let view_top = scroll.offset - margin;
        let view_bottom = scroll.offset + scroll.height + margin;
        if view_bottom <= view_top {
            return false;
        }
        self.top < view_bottom && self.bottom() > view_top
    }

    /// Progress of the element through the viewport, in [0, 1]
    ///
    /// 0 when the element's top touches the bottom edge of the viewport, 1 when
    /// its bottom leaves through the top edge.
    pub fn scroll_progress(&self, scroll: &ScrollState) -> f64 {
        let start = self.top - scroll.height;
        let end = self.bottom();
        let span = end - start;
        if span <= 0.0 {
            return if scroll.offset >= end { 1.0 } else { 0.0 };
        }
        ((scroll.offset - start) / span).clamp(0.0, 1.0)
    }
}

/// Tracks whether an element has entered the viewport
#[derive(Clone, Debug)]
pub struct VisibilityGate {
    once: bool,
    margin: f64,
    entered: bool,
    visible: bool,
}

impl VisibilityGate {
    /// `once`: stay visible after the first entry
    pub fn new(once: bool, margin: f64) -> Self {
        Self {
            once,
            margin,
            entered: false,
            visible: false,
        }
    }

    /// Re-evaluate against the current scroll state
    ///
    /// Returns `true` only on the transition from hidden to visible.
    pub fn observe(&mut self, bounds: &ElementBounds, scroll: &ScrollState) -> bool {
        if self.once && self.entered {
            return false;
        }
        let now_visible = bounds.is_in_view(scroll, self.margin);
        let became_visible = now_visible && !self.visible;
        self.visible = now_visible;
        if became_visible {
            self.entered = true;
        }
        became_visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible || (self.once && self.entered)
    }

    pub fn has_entered(&self) -> bool {
        self.entered
    }
}

/// The browser window as seen by the page
pub struct Viewport {
    state: Cell<ScrollState>,
    scroll: EventSource<ScrollState>,
    resize: EventSource<ScrollState>,
    pointer: EventSource<PointerEvent>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Cell::new(ScrollState::new(0.0, width, height)),
            scroll: EventSource::new(),
            resize: EventSource::new(),
            pointer: EventSource::new(),
        }
    }

    pub fn state(&self) -> ScrollState {
        self.state.get()
    }

    pub fn scroll_offset(&self) -> f64 {
        self.state.get().offset
    }

    /// Scroll the document and notify scroll listeners
    pub fn scroll_to(&self, offset: f64) {
        if !offset.is_finite() {
            return;
        }
        let mut state = self.state.get();
        state.offset = offset;
        self.state.set(state);
        self.scroll.emit(&state);
    }

    /// Resize the window and notify resize listeners
    pub fn resize(&self, width: f64, height: f64) {
        let mut state = self.state.get();
        state.width = width.max(0.0);
        state.height = height.max(0.0);
        self.state.set(state);
        self.resize.emit(&state);
    }

    /// Deliver a pointer event to pointer listeners
    pub fn pointer(&self, event: PointerEvent) {
        self.pointer.emit(&event);
    }

    pub fn on_scroll<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ScrollState) + 'static,
    {
        self.scroll.subscribe(listener)
    }

    pub fn on_resize<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ScrollState) + 'static,
    {
        self.resize.subscribe(listener)
    }

    pub fn on_pointer<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&PointerEvent) + 'static,
    {
        self.pointer.subscribe(listener)
    }

    /// Listen to both scroll and resize, the two changes that move elements
    /// in and out of view
    pub fn on_layout<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ScrollState) + 'static,
    {
        let listener = Rc::new(RefCell::new(listener));
        let on_scroll = Rc::clone(&listener);
        let on_resize = listener;

        let bag = DisposeBag::new()
            .with(self.on_scroll(move |state| {
                let mut listener = on_scroll.borrow_mut();
                (*listener)(state)
            }))
            .with(self.on_resize(move |state| {
                let mut listener = on_resize.borrow_mut();
                (*listener)(state)
            }));
        Subscription::new(move || drop(bag))
    }

    /// Total listeners across all event kinds
    pub fn listener_count(&self) -> usize {
        self.scroll.listener_count() + self.resize.listener_count() + self.pointer.listener_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        let state = ScrollState::default();
        Self::new(state.width, state.height)
    }
}
