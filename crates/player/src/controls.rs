//! Auto-hiding player controls.
//!
//! Any activity shows the controls and arms a hide deadline. The deadline is
//! disarmed while a menu is open or the pointer rests on the controls. The
//! host calls [`ControlsState::tick`] when the deadline from
//! [`ControlsState::next_deadline`] passes.

use std::time::{Duration, Instant};

use crate::shortcuts::PlayerCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Quality,
    Subtitles,
}

#[derive(Debug, Clone)]
pub struct ControlsState {
    delay: Duration,
    visible: bool,
    hide_at: Option<Instant>,
    open_menu: Option<Menu>,
    pointer_over: bool,
}

impl ControlsState {
    pub fn new(delay: Duration, now: Instant) -> Self {
        Self {
            delay,
            visible: true,
            hide_at: Some(now + delay),
            open_menu: None,
            pointer_over: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open_menu(&self) -> Option<Menu> {
        self.open_menu
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    /// Pointer movement, clicks, key presses.
    pub fn activity(&mut self, now: Instant) {
        self.visible = true;
        self.rearm(now);
    }

    pub fn set_pointer_over(&mut self, over: bool, now: Instant) {
        self.pointer_over = over;
        self.activity(now);
    }

    pub fn toggle_menu(&mut self, menu: Menu, now: Instant) {
        self.open_menu = match self.open_menu {
            Some(open) if open == menu => None,
            _ => Some(menu),
        };
        self.activity(now);
    }

    /// Closes the open menu, returning which one was open.
    pub fn close_menu(&mut self, now: Instant) -> Option<Menu> {
        let closed = self.open_menu.take();
        self.activity(now);
        closed
    }

    /// Hides the controls once the deadline has passed. Returns visibility.
    pub fn tick(&mut self, now: Instant) -> bool {
        if let Some(hide_at) = self.hide_at
            && now >= hide_at
        {
            self.visible = false;
            self.hide_at = None;
        }
        self.visible
    }

    /// Applies the menu commands; other commands only count as activity.
    pub fn apply(&mut self, command: PlayerCommand, now: Instant) -> bool {
        match command {
            PlayerCommand::ToggleQualityMenu => self.toggle_menu(Menu::Quality, now),
            PlayerCommand::ToggleSubtitleMenu => self.toggle_menu(Menu::Subtitles, now),
            PlayerCommand::CloseMenu => {
                self.close_menu(now);
            }
            _ => {
                self.activity(now);
                return false;
            }
        }
        true
    }

    fn rearm(&mut self, now: Instant) {
        self.hide_at = if self.open_menu.is_some() || self.pointer_over {
            None
        } else {
            Some(now + self.delay)
        };
    }
}
