use std::collections::HashMap;

use glam::Vec2;
use sdl2::controller::{Button, GameController};
use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::{EventPump, GameControllerSubsystem};

/// Edge events surfaced to the signal mapper. Button presses and releases
/// toggle discrete signals; held state and stick axes are queried as levels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    KeyPressed(Scancode),
    KeyReleased(Scancode),
    PadButtonPressed { slot: u32, button: Button },
    PadButtonReleased { slot: u32, button: Button },
}

/// Raw input snapshot: this frame's edge events plus connected gamepads,
/// keyed by the stable slot the scene hands to each fighter. Hot-plugged
/// pads take the lowest free slot.
pub struct InputState {
    pub events: Vec<InputEvent>,
    pub quit: bool,
    pads: Vec<Option<GameController>>,
    slot_by_instance: HashMap<u32, usize>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            quit: false,
            pads: Vec::new(),
            slot_by_instance: HashMap::new(),
        }
    }

    pub fn update(&mut self, event_pump: &mut EventPump, pads: &GameControllerSubsystem) {
        self.events.clear();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => self.events.push(InputEvent::KeyPressed(sc)),
                Event::KeyUp {
                    scancode: Some(sc), ..
                } => self.events.push(InputEvent::KeyReleased(sc)),
                Event::ControllerDeviceAdded { which, .. } => self.open_pad(pads, which),
                Event::ControllerDeviceRemoved { which, .. } => self.close_pad(which),
                Event::ControllerButtonDown { which, button, .. } => {
                    if let Some(&slot) = self.slot_by_instance.get(&which) {
                        self.events.push(InputEvent::PadButtonPressed {
                            slot: slot as u32,
                            button,
                        });
                    }
                }
                Event::ControllerButtonUp { which, button, .. } => {
                    if let Some(&slot) = self.slot_by_instance.get(&which) {
                        self.events.push(InputEvent::PadButtonReleased {
                            slot: slot as u32,
                            button,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn open_pad(&mut self, pads: &GameControllerSubsystem, device_index: u32) {
        let pad = match pads.open(device_index) {
            Ok(pad) => pad,
            Err(err) => {
                log::warn!("failed to open game controller {}: {}", device_index, err);
                return;
            }
        };

        let slot = self
            .pads
            .iter()
            .position(Option::is_none)
            .unwrap_or_else(|| {
                self.pads.push(None);
                self.pads.len() - 1
            });
        log::info!("gamepad '{}' connected as slot {}", pad.name(), slot);
        self.slot_by_instance.insert(pad.instance_id(), slot);
        self.pads[slot] = Some(pad);
    }

    fn close_pad(&mut self, instance_id: u32) {
        if let Some(slot) = self.slot_by_instance.remove(&instance_id) {
            log::info!("gamepad slot {} disconnected", slot);
            self.pads[slot] = None;
        }
    }

    /// Left analog stick of the pad in `slot`, each axis in [-1, 1].
    /// +y is down, matching screen space.
    pub fn stick(&self, slot: u32) -> Option<Vec2> {
        let pad = self.pads.get(slot as usize)?.as_ref()?;
        let axis = |a| f32::from(pad.axis(a)) / f32::from(i16::MAX);
        Some(Vec2::new(
            axis(sdl2::controller::Axis::LeftX),
            axis(sdl2::controller::Axis::LeftY),
        ))
    }
}
