//! Casino floor for the exploration mode: booths laid out on a 2D plane and a
//! player walked around with the keyboard.

use serde::{Deserialize, Serialize};

pub const PLAYER_SIZE: f64 = 40.0;
pub const PLAYER_SPEED: f64 = 5.0;
pub const WALK_FRAMES: u8 = 4;
pub const FLOOR_WIDTH: f64 = 960.0;
pub const FLOOR_HEIGHT: f64 = 720.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Left => "←",
            Direction::Right => "→",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Move(Direction),
    Interact,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ArrowUp" | "w" | "W" => Key::Move(Direction::Up),
            "ArrowDown" | "s" | "S" => Key::Move(Direction::Down),
            "ArrowLeft" | "a" | "A" => Key::Move(Direction::Left),
            "ArrowRight" | "d" | "D" => Key::Move(Direction::Right),
            " " | "Enter" => Key::Interact,
            _ => return None,
        })
    }
}

/// Movement keys currently held down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booth {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub available: bool,
}

impl Booth {
    fn new(id: &str, name: &str, x: f64, y: f64, available: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            x,
            y,
            width: 100.0,
            height: 100.0,
            available,
        }
    }

    /// Hit box grown by `margin` on every side.
    pub fn reaches(&self, px: f64, py: f64, margin: f64) -> bool {
        px >= self.x - margin
            && px <= self.x + self.width + margin
            && py >= self.y - margin
            && py <= self.y + self.height + margin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub direction: Direction,
    pub moving: bool,
    pub frame: u8,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: 300.0,
            y: 300.0,
            direction: Direction::Down,
            moving: false,
            frame: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
    pub booths: Vec<Booth>,
    pub player: Player,
}

impl World {
    pub fn casino_floor() -> Self {
        Self::with_size(FLOOR_WIDTH, FLOOR_HEIGHT)
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            booths: vec![
                Booth::new("slots", "Meme Slot Machine", 200.0, 200.0, true),
                Booth::new("poker", "Crypto Poker", 450.0, 150.0, false),
                Booth::new("roulette", "Blockchain Roulette", 700.0, 300.0, false),
                Booth::new("blackjack", "NFT Blackjack", 300.0, 500.0, false),
                Booth::new("baccarat", "DeFi Baccarat", 600.0, 550.0, false),
            ],
            player: Player::default(),
        }
    }

    /// One movement step. Later keys win the facing direction, matching the
    /// up, down, left, right evaluation order.
    pub fn tick(&mut self, keys: &HeldKeys) {
        let player = &mut self.player;
        player.moving = keys.any();
        if !player.moving {
            player.frame = 0;
            return;
        }
        player.frame = (player.frame + 1) % WALK_FRAMES;

        let (mut x, mut y) = (player.x, player.y);
        if keys.up {
            y -= PLAYER_SPEED;
            player.direction = Direction::Up;
        }
        if keys.down {
            y += PLAYER_SPEED;
            player.direction = Direction::Down;
        }
        if keys.left {
            x -= PLAYER_SPEED;
            player.direction = Direction::Left;
        }
        if keys.right {
            x += PLAYER_SPEED;
            player.direction = Direction::Right;
        }

        let half = PLAYER_SIZE / 2.0;
        player.x = x.clamp(half, (self.width - half).max(half));
        player.y = y.clamp(half, (self.height - half).max(half));
    }

    /// First booth within one player size of the player.
    pub fn interact(&self) -> Option<&Booth> {
        self.booths
            .iter()
            .find(|b| b.reaches(self.player.x, self.player.y, PLAYER_SIZE))
    }

    pub fn booth(&self, id: &str) -> Option<&Booth> {
        self.booths.iter().find(|b| b.id == id)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::casino_floor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(direction: Direction) -> HeldKeys {
        let mut keys = HeldKeys::default();
        keys.set(direction, true);
        keys
    }

    #[test]
    fn walking_moves_and_animates() {
        let mut world = World::casino_floor();
        world.tick(&held(Direction::Right));
        assert_eq!(world.player.x, 305.0);
        assert_eq!(world.player.direction, Direction::Right);
        assert_eq!(world.player.frame, 1);
        assert!(world.player.moving);

        world.tick(&HeldKeys::default());
        assert!(!world.player.moving);
        assert_eq!(world.player.frame, 0);
        assert_eq!(world.player.x, 305.0);
    }

    #[test]
    fn diagonal_faces_last_key() {
        let mut world = World::casino_floor();
        let mut keys = held(Direction::Up);
        keys.set(Direction::Left, true);
        world.tick(&keys);
        assert_eq!((world.player.x, world.player.y), (295.0, 295.0));
        assert_eq!(world.player.direction, Direction::Left);
    }

    #[test]
    fn player_stays_on_floor() {
        let mut world = World::with_size(100.0, 100.0);
        world.player.x = 22.0;
        world.player.y = 78.0;
        world.tick(&held(Direction::Left));
        world.tick(&held(Direction::Down));
        assert_eq!(world.player.x, 20.0);
        assert_eq!(world.player.y, 80.0);
    }

    #[test]
    fn interact_finds_nearby_booth() {
        let mut world = World::casino_floor();
        world.player.x = 180.0;
        world.player.y = 250.0;
        assert_eq!(world.interact().map(|b| b.id.as_str()), Some("slots"));

        world.player.x = 900.0;
        world.player.y = 40.0;
        assert!(world.interact().is_none());
    }

    #[test]
    fn key_codes() {
        assert_eq!(Key::from_code("w"), Some(Key::Move(Direction::Up)));
        assert_eq!(Key::from_code("ArrowRight"), Some(Key::Move(Direction::Right)));
        assert_eq!(Key::from_code("Enter"), Some(Key::Interact));
        assert_eq!(Key::from_code("q"), None);
    }

    #[test]
    fn only_slots_is_open() {
        let world = World::default();
        let open: Vec<_> = world.booths.iter().filter(|b| b.available).collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "slots");
        assert!(world.booth("poker").is_some_and(|b| !b.available));
    }
}
