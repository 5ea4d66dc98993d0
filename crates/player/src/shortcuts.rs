//! Keyboard shortcuts.

use crate::config::PlayerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    SeekBy(f64),
    VolumeBy(f64),
    ToggleMute,
    ToggleFullscreen,
    ToggleQualityMenu,
    ToggleSubtitleMenu,
    CloseMenu,
    ClosePlayer,
}

/// What the key handler needs to know about the UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortcutContext {
    pub menu_open: bool,
    pub has_quality_levels: bool,
}

pub fn map_key(key: Key, context: ShortcutContext, config: &PlayerConfig) -> Option<PlayerCommand> {
    let command = match key {
        Key::Space | Key::Char(' ') => PlayerCommand::TogglePlay,
        Key::ArrowRight => PlayerCommand::SeekBy(config.seek_step_secs),
        Key::ArrowLeft => PlayerCommand::SeekBy(-config.seek_step_secs),
        Key::ArrowUp => PlayerCommand::VolumeBy(config.volume_step),
        Key::ArrowDown => PlayerCommand::VolumeBy(-config.volume_step),
        Key::Escape if context.menu_open => PlayerCommand::CloseMenu,
        Key::Escape => PlayerCommand::ClosePlayer,
        Key::Char(c) => match c.to_ascii_lowercase() {
            'f' => PlayerCommand::ToggleFullscreen,
            'm' => PlayerCommand::ToggleMute,
            'q' if context.has_quality_levels => PlayerCommand::ToggleQualityMenu,
            'c' => PlayerCommand::ToggleSubtitleMenu,
            _ => return None,
        },
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(key: Key, menu_open: bool) -> Option<PlayerCommand> {
        map_key(
            key,
            ShortcutContext {
                menu_open,
                has_quality_levels: true,
            },
            &PlayerConfig::default(),
        )
    }

    #[test]
    fn arrows_seek_and_adjust_volume() {
        assert_eq!(map(Key::ArrowRight, false), Some(PlayerCommand::SeekBy(10.0)));
        assert_eq!(map(Key::ArrowLeft, false), Some(PlayerCommand::SeekBy(-10.0)));
        assert_eq!(map(Key::ArrowUp, false), Some(PlayerCommand::VolumeBy(0.05)));
        assert_eq!(map(Key::ArrowDown, false), Some(PlayerCommand::VolumeBy(-0.05)));
    }

    #[test]
    fn escape_closes_menu_before_player() {
        assert_eq!(map(Key::Escape, true), Some(PlayerCommand::CloseMenu));
        assert_eq!(map(Key::Escape, false), Some(PlayerCommand::ClosePlayer));
    }

    #[test]
    fn letters_are_case_insensitive() {
        assert_eq!(map(Key::Char('M'), false), Some(PlayerCommand::ToggleMute));
        assert_eq!(map(Key::Char('c'), false), Some(PlayerCommand::ToggleSubtitleMenu));
        assert_eq!(map(Key::Char('x'), false), None);
    }

    #[test]
    fn quality_menu_needs_levels() {
        let context = ShortcutContext::default();
        assert_eq!(map_key(Key::Char('q'), context, &PlayerConfig::default()), None);
    }
}
