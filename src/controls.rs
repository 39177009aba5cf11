use crate::animation::Animator;
use crate::body::{Registry, MAX_SPEED, MIN_SPEED};

/// Slider notches per unit of speed, i.e. a step of 0.1
const NOTCHES_PER_UNIT: f64 = 10.0;
/// Widest viewport, in columns, that still gets the compact layout
pub const COMPACT_WIDTH: u16 = 60;

/// Speed slider bound to one body
#[derive(Clone, Debug, PartialEq)]
pub struct Slider {
    body: String,
    value: f64,
}

impl Slider {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label(&self) -> String {
        format!("{:.1}x", self.value)
    }

    /// Fraction of the slider's range that is filled
    pub fn fill(&self) -> f64 {
        (self.value - MIN_SPEED) / (MAX_SPEED - MIN_SPEED)
    }

    /// Value `steps` notches away, snapped to the step and kept within range
    fn nudged(&self, steps: i32) -> f64 {
        let notches = (self.value * NOTCHES_PER_UNIT).round() + steps as f64;
        (notches / NOTCHES_PER_UNIT).clamp(MIN_SPEED, MAX_SPEED)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Panel always shown, no toggle
    Desktop,
    /// Panel hidden behind a show/hide toggle
    Compact,
}

impl Layout {
    pub fn for_width(width: u16) -> Self {
        if width <= COMPACT_WIDTH {
            Layout::Compact
        } else {
            Layout::Desktop
        }
    }
}

/// Speed sliders, pause button and layout toggle
#[derive(Clone, Debug)]
pub struct ControlPanel {
    sliders: Vec<Slider>,
    selected: usize,
    layout: Layout,
    visible: bool,
}

impl ControlPanel {
    /// Creates one slider per body, in registry order
    pub fn bind(registry: &Registry, width: u16) -> Self {
        let sliders = registry
            .iter()
            .map(|body| Slider {
                body: body.name().to_string(),
                value: body.speed(),
            })
            .collect();
        let mut panel = ControlPanel {
            sliders,
            selected: 0,
            layout: Layout::Desktop,
            visible: true,
        };
        panel.apply_viewport(width);
        panel
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if !self.sliders.is_empty() {
            self.selected = (self.selected + 1) % self.sliders.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.sliders.is_empty() {
            self.selected = (self.selected + self.sliders.len() - 1) % self.sliders.len();
        }
    }

    /// Moves the selected slider by `steps` notches and pushes the value to its body.
    /// Returns the new value, or `None` if the slider's body is not in the registry.
    pub fn adjust(&mut self, registry: &mut Registry, steps: i32) -> Option<f64> {
        let slider = self.sliders.get_mut(self.selected)?;
        let value = slider.nudged(steps);
        match registry.set_speed(&slider.body, value) {
            Ok(()) => {
                slider.value = value;
                log::debug!("{} speed set to {}", slider.body, slider.label());
                Some(value)
            }
            Err(err) => {
                log::warn!("slider for {} ignored: {}", slider.body, err);
                None
            }
        }
    }

    /// Re-reads every slider value from the registry
    pub fn refresh(&mut self, registry: &Registry) {
        for slider in self.sliders.iter_mut() {
            if let Some(body) = registry.lookup(&slider.body) {
                slider.value = body.speed();
            }
        }
    }

    /// Pause button label for the animator's current state
    pub fn pause_label(&self, animator: &Animator) -> &'static str {
        if animator.is_paused() {
            "Resume Animation"
        } else {
            "Pause Animation"
        }
    }

    /// Picks the layout for a viewport width.
    /// Entering or staying in the compact layout hides the panel.
    pub fn apply_viewport(&mut self, width: u16) {
        self.layout = Layout::for_width(width);
        self.visible = self.layout == Layout::Desktop;
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the panel; only the compact layout has the toggle
    pub fn toggle_visibility(&mut self) -> bool {
        if self.layout == Layout::Compact {
            self.visible = !self.visible;
        }
        self.visible
    }

    /// Label of the show/hide toggle, if it is on screen
    pub fn toggle_label(&self) -> Option<&'static str> {
        match (self.layout, self.visible) {
            (Layout::Desktop, _) => None,
            (Layout::Compact, true) => Some("Hide Controls"),
            (Layout::Compact, false) => Some("Show Controls"),
        }
    }
}
