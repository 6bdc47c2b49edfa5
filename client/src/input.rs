use common::games::snake::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// `player` indexes the local snakes: arrows drive the first, WASD the second.
    Steer { player: usize, direction: Direction },
    Quit,
}

pub fn decode_key(key: KeyEvent) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('x') => Some(InputAction::Quit),
            _ => None,
        };
    }

    let (player, direction) = match key.code {
        KeyCode::Up => (0, Direction::Up),
        KeyCode::Down => (0, Direction::Down),
        KeyCode::Left => (0, Direction::Left),
        KeyCode::Right => (0, Direction::Right),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => (1, Direction::Up),
            's' => (1, Direction::Down),
            'a' => (1, Direction::Left),
            'd' => (1, Direction::Right),
            _ => return None,
        },
        _ => return None,
    };
    Some(InputAction::Steer { player, direction })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_arrows_steer_first_player() {
        assert_eq!(
            decode_key(press(KeyCode::Left, KeyModifiers::NONE)),
            Some(InputAction::Steer { player: 0, direction: Direction::Left })
        );
    }

    #[test]
    fn test_wasd_steers_second_player_regardless_of_case() {
        assert_eq!(
            decode_key(press(KeyCode::Char('w'), KeyModifiers::NONE)),
            Some(InputAction::Steer { player: 1, direction: Direction::Up })
        );
        assert_eq!(
            decode_key(press(KeyCode::Char('D'), KeyModifiers::SHIFT)),
            Some(InputAction::Steer { player: 1, direction: Direction::Right })
        );
    }

    #[test]
    fn test_ctrl_c_and_ctrl_x_quit() {
        assert_eq!(decode_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(InputAction::Quit));
        assert_eq!(decode_key(press(KeyCode::Char('x'), KeyModifiers::CONTROL)), Some(InputAction::Quit));
        assert_eq!(decode_key(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_releases_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(decode_key(release), None);
    }
}
