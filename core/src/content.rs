//! Game content tables injected into the board and controller.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BuildError, CellCoord, RoomId, MIN_PLAYERS};

/// Layout glyphs that cannot be claimed by a room.
const RESERVED_GLYPHS: [char; 4] = ['-', 'D', 'P', '#'];

/// A named room and the layout glyph that marks its squares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    /// Card and display name of the room.
    pub name: String,
    /// Single character used for the room in layout descriptions.
    pub glyph: char,
}

/// A character card together with its piece's starting square.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSpec {
    /// Card and piece name of the character.
    pub name: String,
    /// Square the character's piece occupies when a game starts.
    pub start: CellCoord,
}

/// Card names, room glyphs and starting squares for one edition of the game.
///
/// Deserialises from configuration files; call [`GameContent::validate`]
/// before trusting values that did not come from [`GameContent::classic`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameContent {
    #[serde(default = "default_corridor")]
    corridor: String,
    rooms: Vec<RoomSpec>,
    characters: Vec<CharacterSpec>,
    weapons: Vec<String>,
}

impl GameContent {
    /// Creates and validates a content table.
    pub fn new(
        corridor: impl Into<String>,
        rooms: Vec<RoomSpec>,
        characters: Vec<CharacterSpec>,
        weapons: Vec<String>,
    ) -> Result<Self, BuildError> {
        let content = Self {
            corridor: corridor.into(),
            rooms,
            characters,
            weapons,
        };
        content.validate()?;
        Ok(content)
    }

    /// The six suspects, six weapons and nine rooms of the classic board.
    #[must_use]
    pub fn classic() -> Self {
        let room = |name: &str, glyph: char| RoomSpec {
            name: name.to_owned(),
            glyph,
        };
        let character = |name: &str, column: u32, row: u32| CharacterSpec {
            name: name.to_owned(),
            start: CellCoord::new(column, row),
        };

        Self {
            corridor: default_corridor(),
            rooms: vec![
                room("Kitchen", 'K'),
                room("Ball Room", 'A'),
                room("Conservatory", 'C'),
                room("Dining Room", 'N'),
                room("Billiard Room", 'B'),
                room("Library", 'I'),
                room("Lounge", 'L'),
                room("Hall", 'H'),
                room("Study", 'S'),
            ],
            characters: vec![
                character("Colonel Mustard", 0, 17),
                character("Professor Plum", 16, 24),
                character("Mrs. White", 9, 0),
                character("The Reverend Green", 14, 0),
                character("Miss Scarlett", 23, 6),
                character("Mrs. Peacock", 7, 24),
            ],
            weapons: [
                "Lead Pipe",
                "Rope",
                "Wrench",
                "Revolver",
                "Dagger",
                "Candlestick",
            ]
            .into_iter()
            .map(str::to_owned)
            .collect(),
        }
    }

    /// Checks the tables for duplicates, reserved glyphs and missing categories.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.rooms.is_empty() {
            return Err(BuildError::EmptyCategory("rooms"));
        }
        if self.weapons.is_empty() {
            return Err(BuildError::EmptyCategory("weapons"));
        }
        if self.characters.len() < MIN_PLAYERS {
            return Err(BuildError::NotEnoughCharacters(self.characters.len()));
        }
        if self.rooms.len() >= usize::from(u8::MAX) {
            return Err(BuildError::TooManyRooms(self.rooms.len()));
        }
        let items = self.characters.len() + self.weapons.len();
        if items > usize::from(u8::MAX) + 1 {
            return Err(BuildError::TooManyItems(items));
        }
        if self.weapons.len() > self.rooms.len() {
            return Err(BuildError::NotEnoughRooms {
                rooms: self.rooms.len(),
                weapons: self.weapons.len(),
            });
        }

        let mut glyphs = HashSet::new();
        for room in &self.rooms {
            if RESERVED_GLYPHS.contains(&room.glyph) {
                return Err(BuildError::ReservedGlyph(room.glyph));
            }
            if !glyphs.insert(room.glyph) {
                return Err(BuildError::DuplicateGlyph(room.glyph));
            }
        }

        let mut names = HashSet::new();
        let _ = names.insert(self.corridor.as_str());
        for name in self.deck_iter() {
            if !names.insert(name) {
                return Err(BuildError::DuplicateName(name.to_owned()));
            }
        }

        Ok(())
    }

    /// Name of the reserved hallway room.
    #[must_use]
    pub fn corridor(&self) -> &str {
        &self.corridor
    }

    /// Named rooms in table order.
    #[must_use]
    pub fn rooms(&self) -> &[RoomSpec] {
        &self.rooms
    }

    /// Characters in table order.
    #[must_use]
    pub fn characters(&self) -> &[CharacterSpec] {
        &self.characters
    }

    /// Weapons in table order.
    #[must_use]
    pub fn weapons(&self) -> &[String] {
        &self.weapons
    }

    /// Identifier of the room marked by a layout glyph.
    ///
    /// Rooms are numbered from one in table order; zero is the corridor.
    #[must_use]
    pub fn room_for_glyph(&self, glyph: char) -> Option<RoomId> {
        self.rooms
            .iter()
            .position(|room| room.glyph == glyph)
            .and_then(|offset| u8::try_from(offset + 1).ok())
            .map(RoomId::new)
    }

    /// Looks up a character by name.
    #[must_use]
    pub fn character(&self, name: &str) -> Option<&CharacterSpec> {
        self.characters.iter().find(|character| character.name == name)
    }

    /// Reports whether the name is a character card.
    #[must_use]
    pub fn is_character(&self, name: &str) -> bool {
        self.character(name).is_some()
    }

    /// Reports whether the name is a weapon card.
    #[must_use]
    pub fn is_weapon(&self, name: &str) -> bool {
        self.weapons.iter().any(|weapon| weapon == name)
    }

    /// Reports whether the name is a room card.
    #[must_use]
    pub fn is_room(&self, name: &str) -> bool {
        self.rooms.iter().any(|room| room.name == name)
    }

    /// Every card in the game: characters, then weapons, then rooms.
    #[must_use]
    pub fn deck(&self) -> Vec<String> {
        self.deck_iter().map(str::to_owned).collect()
    }

    fn deck_iter(&self) -> impl Iterator<Item = &str> {
        self.characters
            .iter()
            .map(|character| character.name.as_str())
            .chain(self.weapons.iter().map(String::as_str))
            .chain(self.rooms.iter().map(|room| room.name.as_str()))
    }
}

impl Default for GameContent {
    fn default() -> Self {
        Self::classic()
    }
}

fn default_corridor() -> String {
    "Corridor".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_content_is_valid() {
        let content = GameContent::classic();
        content.validate().expect("classic content validates");
        assert_eq!(content.deck().len(), 21);
        assert_eq!(content.corridor(), "Corridor");
    }

    #[test]
    fn deck_lists_characters_then_weapons_then_rooms() {
        let deck = GameContent::classic().deck();
        assert_eq!(deck.first().map(String::as_str), Some("Colonel Mustard"));
        assert_eq!(deck[6], "Lead Pipe");
        assert_eq!(deck.last().map(String::as_str), Some("Study"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut content = GameContent::classic();
        content.weapons.push("Hall".to_owned());
        content.rooms.push(RoomSpec {
            name: "Cellar".to_owned(),
            glyph: 'X',
        });
        assert_eq!(
            content.validate(),
            Err(BuildError::DuplicateName("Hall".to_owned()))
        );
    }

    #[test]
    fn reserved_glyphs_are_rejected() {
        let mut content = GameContent::classic();
        content.rooms[0].glyph = 'D';
        assert_eq!(content.validate(), Err(BuildError::ReservedGlyph('D')));
    }

    #[test]
    fn weapons_need_distinct_rooms() {
        let result = GameContent::new(
            "Corridor",
            vec![RoomSpec {
                name: "Hall".to_owned(),
                glyph: 'H',
            }],
            GameContent::classic().characters().to_vec(),
            vec!["Rope".to_owned(), "Dagger".to_owned()],
        );
        assert_eq!(
            result,
            Err(BuildError::NotEnoughRooms {
                rooms: 1,
                weapons: 2
            })
        );
    }

    #[test]
    fn item_count_is_capped_by_identifier_range() {
        let characters = (0..300)
            .map(|index| CharacterSpec {
                name: format!("Suspect {index}"),
                start: CellCoord::new(index % 40, index / 40),
            })
            .collect();
        let result = GameContent::new(
            "Corridor",
            GameContent::classic().rooms().to_vec(),
            characters,
            vec!["Rope".to_owned()],
        );
        assert_eq!(result, Err(BuildError::TooManyItems(301)));
    }

    #[test]
    fn content_loads_from_toml() {
        let source = r#"
            weapons = ["Rope", "Dagger"]

            [[rooms]]
            name = "Hall"
            glyph = "H"

            [[rooms]]
            name = "Study"
            glyph = "S"

            [[characters]]
            name = "Miss Scarlett"
            start = { column = 1, row = 0 }

            [[characters]]
            name = "Colonel Mustard"
            start = { column = 2, row = 0 }

            [[characters]]
            name = "Mrs. White"
            start = { column = 3, row = 0 }
        "#;

        let content: GameContent = toml::from_str(source).expect("content parses");
        content.validate().expect("content validates");
        assert_eq!(content.corridor(), "Corridor");
        assert_eq!(content.room_for_glyph('H'), Some(RoomId::new(1)));
        assert_eq!(content.room_for_glyph('S'), Some(RoomId::new(2)));
        assert_eq!(content.room_for_glyph('-'), None);
        assert_eq!(
            content.character("Mrs. White").map(|character| character.start),
            Some(CellCoord::new(3, 0))
        );
    }
}
