//! Keyboard shortcuts for both session stages
//!
//! Keys arrive in a host-neutral form; the host maps its toolkit's key
//! events onto [`Key`] and [`Modifiers`] before calling [`handle_key_event`].

use crate::annotations::handlers::STROKE_WIDTH_STEP;
use crate::domain::Tool;
use crate::session::messages::Msg;

/// Non-character keys the session reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Named {
    Escape,
    Enter,
    Backspace,
    Space,
    Tab,
}

/// A pressed key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Named(Named),
    /// Text produced by the key, already case-adjusted for shift
    Character(String),
}

impl Key {
    pub fn character(c: impl Into<String>) -> Self {
        Key::Character(c.into())
    }
}

/// Modifier keys held during a key press
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        control: false,
        shift: false,
        alt: false,
        logo: false,
    };
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub fn control(self) -> bool {
        self.control
    }

    pub fn shift(self) -> bool {
        self.shift
    }

    /// Whether a command modifier (ctrl, alt or logo) is held
    pub fn command(self) -> bool {
        self.control || self.alt || self.logo
    }
}

/// What the key is being interpreted for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutContext {
    /// The region selection surface is up
    Selecting,
    /// The annotation window is up
    Annotating {
        /// A text annotation is being typed
        editing_text: bool,
    },
}

pub fn handle_key_event(context: ShortcutContext, key: &Key, modifiers: Modifiers) -> Option<Msg> {
    match context {
        ShortcutContext::Selecting => match key {
            Key::Named(Named::Escape) => Some(Msg::cancel_selection()),
            _ => None,
        },
        ShortcutContext::Annotating { editing_text: true } => text_editing_key(key, modifiers),
        ShortcutContext::Annotating {
            editing_text: false,
        } => annotation_key(key, modifiers),
    }
}

fn text_editing_key(key: &Key, modifiers: Modifiers) -> Option<Msg> {
    match key {
        Key::Named(Named::Escape) => Some(Msg::cancel_text()),
        // Shift+Enter starts a new line, Enter finishes
        Key::Named(Named::Enter) if modifiers.shift() => Some(Msg::insert_text("\n")),
        Key::Named(Named::Enter) => Some(Msg::commit_text()),
        Key::Named(Named::Backspace) => Some(Msg::delete_backward()),
        Key::Named(Named::Space) if !modifiers.command() => Some(Msg::insert_text(" ")),
        Key::Character(c) if !modifiers.command() => Some(Msg::insert_text(c.as_str())),
        // Command shortcuts still work while typing
        _ => annotation_key(key, modifiers),
    }
}

fn annotation_key(key: &Key, modifiers: Modifiers) -> Option<Msg> {
    match key {
        Key::Named(Named::Escape) => Some(Msg::close()),
        Key::Named(Named::Enter) => Some(Msg::copy_to_clipboard()),
        // Undo/save shortcuts
        Key::Character(c) if c.as_str() == "z" && modifiers.control() => Some(Msg::undo()),
        Key::Character(c) if c.as_str() == "s" && modifiers.control() => Some(Msg::save()),
        Key::Character(_) if modifiers.command() => None,
        // Stroke width
        Key::Character(c) if c.as_str() == "[" => {
            Some(Msg::adjust_stroke_width(-STROKE_WIDTH_STEP))
        }
        Key::Character(c) if c.as_str() == "]" => Some(Msg::adjust_stroke_width(STROKE_WIDTH_STEP)),
        Key::Character(c) if c.as_str() == "c" => Some(Msg::cycle_color()),
        // Tool selection
        Key::Character(c) => tool_for_key(c).map(Msg::set_tool),
        _ => None,
    }
}

fn tool_for_key(c: &str) -> Option<Tool> {
    match c {
        "a" => Some(Tool::Arrow),
        "r" => Some(Tool::Rectangle),
        "e" => Some(Tool::Ellipse),
        "l" => Some(Tool::Line),
        "p" => Some(Tool::Pencil),
        "m" => Some(Tool::Marker),
        "t" => Some(Tool::Text),
        _ => None,
    }
}
