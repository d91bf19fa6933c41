//! egui input → view events.

use eframe::egui::{self, Event, PointerButton, Pos2, Rect, Response};
use matview_core::{Button, InputEvent, Key};

use crate::util::f32_to_i32;


fn local(rect: Rect, pos: Pos2) -> (i32, i32) {
    let offset = pos - rect.min;
    (f32_to_i32(offset.x), f32_to_i32(offset.y))
}

const BUTTONS: [(PointerButton, Button); 3] = [
    (PointerButton::Primary, Button::Primary),
    (PointerButton::Secondary, Button::Secondary),
    (PointerButton::Middle, Button::Middle),
];

fn map_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::ArrowLeft => Some(Key::Left),
        egui::Key::ArrowRight => Some(Key::Right),
        egui::Key::ArrowUp => Some(Key::Up),
        egui::Key::ArrowDown => Some(Key::Down),
        _ => None,
    }
}

/// Collect the view events of this frame for the view occupying `rect`.
pub(crate) fn collect(
    ctx: &egui::Context,
    rect: Rect,
    response: &Response,
    pointer_inside: &mut bool,
) -> Vec<InputEvent> {
    let mut events = Vec::new();

    ctx.input(|i| {
        let hover = i.pointer.hover_pos().filter(|p| rect.contains(*p));
        match (hover.is_some(), *pointer_inside) {
            (true, false) => events.push(InputEvent::Enter),
            (false, true) if !response.dragged() => events.push(InputEvent::Leave),
            _ => {}
        }
        *pointer_inside = hover.is_some() || (*pointer_inside && response.dragged());

        if let Some(pos) = i.pointer.latest_pos() {
            let (x, y) = local(rect, pos);
            for (pointer_button, button) in BUTTONS {
                if i.pointer.button_pressed(pointer_button) && hover.is_some() {
                    events.push(InputEvent::ButtonPress { x, y, button });
                }
            }
            if i.pointer.is_moving() && (hover.is_some() || response.dragged()) {
                events.push(InputEvent::Motion { x, y });
            }
            for (pointer_button, button) in BUTTONS {
                if i.pointer.button_released(pointer_button) {
                    events.push(InputEvent::ButtonRelease { x, y, button });
                }
            }
            let scroll = i.raw_scroll_delta.y;
            if hover.is_some() && scroll != 0.0 {
                let steps = if scroll > 0.0 { 1 } else { -1 };
                events.push(InputEvent::Scroll { x, y, steps });
            }
        }

        if hover.is_none() {
            return;
        }
        for event in &i.events {
            match event {
                Event::Text(text) => {
                    events.extend(text.chars().map(|c| InputEvent::Key(Key::Char(c))));
                }
                Event::Key {
                    key, pressed: true, ..
                } => {
                    if let Some(key) = map_key(*key) {
                        events.push(InputEvent::Key(key));
                    }
                }
                _ => {}
            }
        }
    });

    events
}
