use egui::{Context, Key, Modifiers, MouseWheelUnit, PointerButton, Pos2};

mod router;
pub use router::{Consumer, route_event};

/// Scroll distance (in points) treated as one wheel notch for smooth scrolling devices.
const POINTS_PER_NOTCH: f32 = 50.0;

/// Input events in the order the canvas dispatch pipeline sees them.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown { pos: Pos2, button: PointerButton },
    /// Mouse button was released
    PointerUp { pos: Pos2, button: PointerButton },
    /// Mouse moved (with or without buttons pressed)
    PointerMove { pos: Pos2 },
    /// Wheel turned by `delta` notches; positive scrolls up
    Wheel { pos: Pos2, delta: f32 },
    KeyDown { key: Key, modifiers: Modifiers },
    KeyUp { key: Key, modifiers: Modifiers },
    /// The window's close button was pressed
    CloseRequested,
    /// Deferred "open a project" request (e.g. `--open` on the command line)
    OpenFileRequested,
}

impl InputEvent {
    /// Pointer position carried by the event, if any.
    pub fn pos(&self) -> Option<Pos2> {
        match self {
            InputEvent::PointerDown { pos, .. }
            | InputEvent::PointerUp { pos, .. }
            | InputEvent::PointerMove { pos }
            | InputEvent::Wheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }

    /// Position of a primary-button press.
    pub fn primary_down(&self) -> Option<Pos2> {
        match self {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
            } => Some(*pos),
            _ => None,
        }
    }

    pub fn is_primary_up(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            }
        )
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        matches!(self, InputEvent::KeyDown { key: k, .. } if *k == key)
    }

    pub fn is_key_up(&self, key: Key) -> bool {
        matches!(self, InputEvent::KeyUp { key: k, .. } if *k == key)
    }
}

/// Handles converting raw egui input into our InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    /// Fractional notches from pixel-precise scrolling, carried between frames.
    wheel_remainder: f32,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_pointer_pos(&self) -> Option<Pos2> {
        self.last_pointer_pos
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|input| {
            let mut events = Vec::new();
            for event in &input.events {
                self.convert(event, &mut events);
            }
            if input.viewport().close_requested() {
                events.push(InputEvent::CloseRequested);
            }
            events
        })
    }

    fn convert(&mut self, event: &egui::Event, out: &mut Vec<InputEvent>) {
        match event {
            egui::Event::PointerMoved(pos) => {
                if Some(*pos) != self.last_pointer_pos {
                    out.push(InputEvent::PointerMove { pos: *pos });
                }
                self.last_pointer_pos = Some(*pos);
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                self.last_pointer_pos = Some(*pos);
                out.push(if *pressed {
                    InputEvent::PointerDown {
                        pos: *pos,
                        button: *button,
                    }
                } else {
                    InputEvent::PointerUp {
                        pos: *pos,
                        button: *button,
                    }
                });
            }
            egui::Event::MouseWheel { unit, delta, .. } => {
                let Some(pos) = self.last_pointer_pos else {
                    return;
                };
                let notches = match unit {
                    MouseWheelUnit::Line | MouseWheelUnit::Page => {
                        if delta.y > 0.0 {
                            1.0
                        } else if delta.y < 0.0 {
                            -1.0
                        } else {
                            0.0
                        }
                    }
                    MouseWheelUnit::Point => {
                        self.wheel_remainder += delta.y / POINTS_PER_NOTCH;
                        let whole = self.wheel_remainder.trunc();
                        self.wheel_remainder -= whole;
                        whole
                    }
                };
                if notches != 0.0 {
                    out.push(InputEvent::Wheel { pos, delta: notches });
                }
            }
            egui::Event::Key {
                key,
                pressed,
                repeat,
                modifiers,
                ..
            } => {
                // Held space must not re-trigger the hand tool swap.
                if *repeat && *key == Key::Space {
                    return;
                }
                out.push(if *pressed {
                    InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    }
                } else {
                    InputEvent::KeyUp {
                        key: *key,
                        modifiers: *modifiers,
                    }
                });
            }
            egui::Event::PointerGone => {
                self.last_pointer_pos = None;
            }
            _ => {}
        }
    }
}
