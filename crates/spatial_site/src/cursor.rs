//! HUD cursor
//!
//! A crosshair that follows the pointer on wide screens, growing over
//! anything clickable and showing the pointer coordinates beside it.

use serde::Serialize;
use spatial_core::{DisposeBag, Host, PointerEvent};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    pub hovering: bool,
}

impl CursorState {
    /// Fold one pointer event into the state
    pub fn apply(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { x, y } => {
                self.x = x;
                self.y = y;
                self.visible = true;
            }
            PointerEvent::Over { interactive: true } => self.hovering = true,
            PointerEvent::Over { interactive: false } => {}
            PointerEvent::Out => self.hovering = false,
            PointerEvent::Leave => self.visible = false,
        }
    }

    pub fn labels(&self) -> (String, String) {
        (coordinate_label('X', self.x), coordinate_label('Y', self.y))
    }
}

/// `"X: 0042"`
pub fn coordinate_label(axis: char, value: f64) -> String {
    format!("{axis}: {:04}", value.max(0.0).round() as u64)
}

pub struct HudCursor {
    state: Rc<Cell<CursorState>>,
    min_width: f64,
    host: Host,
    _listeners: DisposeBag,
}

impl HudCursor {
    pub fn mount(host: &Host, min_width: f64) -> Self {
        let state = Rc::new(Cell::new(CursorState::default()));
        let weak = Rc::downgrade(&state);
        let listeners = DisposeBag::new().with(host.viewport.on_pointer(move |event| {
            if let Some(state) = weak.upgrade() {
                let mut next = state.get();
                next.apply(*event);
                state.set(next);
            }
        }));

        Self {
            state,
            min_width,
            host: host.clone(),
            _listeners: listeners,
        }
    }

    /// Narrow windows get the native cursor
    pub fn is_enabled(&self) -> bool {
        self.host.scroll().width >= self.min_width
    }

    /// What to draw, or `None` when nothing is shown
    pub fn visible_state(&self) -> Option<CursorState> {
        let state = self.state.get();
        (self.is_enabled() && state.visible).then_some(state)
    }

    pub fn state(&self) -> CursorState {
        self.state.get()
    }
}

impl std::fmt::Debug for HudCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudCursor")
            .field("state", &self.state.get())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
