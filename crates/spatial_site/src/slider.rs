//! Before/after comparison slider

use serde::Serialize;

const START_POSITION: f64 = 50.0;

/// Horizontal extent of the slider container in client coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerRect {
    pub left: f64,
    pub width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SliderInput {
    MouseDown,
    MouseUp,
    MouseMove { x: f64 },
    TouchMove { x: f64 },
}

/// Divider position as a percentage of the container width
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BeforeAfterSlider {
    position: f64,
    dragging: bool,
    #[serde(skip)]
    rect: Option<ContainerRect>,
}

impl Default for BeforeAfterSlider {
    fn default() -> Self {
        Self {
            position: START_POSITION,
            dragging: false,
            rect: None,
        }
    }
}

impl BeforeAfterSlider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where the container was laid out
    pub fn set_rect(&mut self, rect: ContainerRect) {
        self.rect = Some(rect);
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Returns whether the divider moved
    pub fn handle(&mut self, input: SliderInput) -> bool {
        match input {
            SliderInput::MouseDown => {
                self.dragging = true;
                false
            }
            SliderInput::MouseUp => {
                self.dragging = false;
                false
            }
            SliderInput::MouseMove { x } if self.dragging => self.move_to(x),
            SliderInput::MouseMove { .. } => false,
            SliderInput::TouchMove { x } => self.move_to(x),
        }
    }

    fn move_to(&mut self, client_x: f64) -> bool {
        // Not laid out yet
        let Some(rect) = self.rect.filter(|r| r.width > 0.0) else {
            return false;
        };
        let position = ((client_x - rect.left) / rect.width * 100.0).clamp(0.0, 100.0);
        let moved = position != self.position;
        self.position = position;
        moved
    }
}
