//! Word bank: categories of secret words and the clues handed to impostors.
//!
//! The bank is plain data. A built-in bank ships with the server; a JSON file
//! of the same shape can replace it (see `ServerConfig::word_bank_path`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum WordBankError {
    #[error("failed to read word bank: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse word bank: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("word bank category {0} has no words")]
    EmptyCategory(String),

    #[error("word bank has no categories")]
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordBank {
    categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    clues: HashMap<String, Vec<String>>,
}

impl WordBank {
    pub fn new(
        categories: BTreeMap<String, Vec<String>>,
        clues: HashMap<String, Vec<String>>,
    ) -> Result<Self, WordBankError> {
        if categories.is_empty() {
            return Err(WordBankError::Empty);
        }
        if let Some((name, _)) = categories.iter().find(|(_, words)| words.is_empty()) {
            return Err(WordBankError::EmptyCategory(name.clone()));
        }
        Ok(Self { categories, clues })
    }

    pub fn from_json_str(json: &str) -> Result<Self, WordBankError> {
        let raw: WordBank = serde_json::from_str(json)?;
        Self::new(raw.categories, raw.clues)
    }

    /// Load a JSON word bank from disk
    pub fn load(path: &Path) -> Result<Self, WordBankError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Words of a category (empty for unknown categories)
    pub fn words_for(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Clues for a word, possibly empty
    pub fn clues_for(&self, word: &str) -> &[String] {
        self.clues.get(word).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The bank that ships with the server
    pub fn builtin() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }

        let categories: BTreeMap<String, Vec<String>> = BUILTIN_CATEGORIES
            .iter()
            .map(|(name, words)| (name.to_string(), owned(words)))
            .collect();
        let clues: HashMap<String, Vec<String>> = BUILTIN_CLUES
            .iter()
            .map(|(word, clues)| (word.to_string(), owned(clues)))
            .collect();

        Self { categories, clues }
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Celebrities",
        &["Taylor Swift", "Cristiano Ronaldo", "Messi", "Elon Musk", "Beyonce"],
    ),
    ("Sports", &["Football", "Basketball", "Tennis", "Swimming", "Volleyball"]),
    ("Movies", &["Avatar", "Titanic", "Inception", "Matrix", "Jurassic Park"]),
    ("Food", &["Tacos", "Pizza", "Sushi", "Hamburger", "Pasta"]),
    ("Animals", &["Cat", "Dog", "Lion", "Elephant", "Eagle"]),
    ("Countries", &["Mexico", "Spain", "Japan", "Brazil", "France"]),
    (
        "Musicians",
        &["Bad Bunny", "The Weeknd", "Shakira", "J Balvin", "Harry Styles"],
    ),
    (
        "Video Games",
        &["The Legend of Zelda", "Minecraft", "Elden Ring", "Super Mario", "Fortnite"],
    ),
];

const BUILTIN_CLUES: &[(&str, &[&str])] = &[
    ("Taylor Swift", &["Music", "Singer", "Popstar", "Eras"]),
    ("Cristiano Ronaldo", &["Football", "Portugal", "Goals", "CR7"]),
    ("Messi", &["Argentina", "Barcelona", "Football", "GOAT"]),
    ("Elon Musk", &["Tesla", "SpaceX", "Billionaire", "Twitter"]),
    ("Beyonce", &["Music", "Queen", "Diva", "Artist"]),
    ("Football", &["Ball", "Goal", "Team", "Pitch"]),
    ("Basketball", &["Hoop", "NBA", "Court", "Ball"]),
    ("Tennis", &["Racket", "Net", "Wimbledon", "Ball"]),
    ("Swimming", &["Water", "Pool", "Strokes", "Olympic"]),
    ("Volleyball", &["Net", "Ball", "Jump", "Team"]),
    ("Avatar", &["Blue", "Pandora", "2009", "3D"]),
    ("Titanic", &["Ship", "Iceberg", "1997", "Rose"]),
    ("Inception", &["Dreams", "Leonardo", "Mind", "Layers"]),
    ("Matrix", &["Code", "Reality", "Neo", "Pill"]),
    ("Jurassic Park", &["Dinosaurs", "Park", "Island", "T-Rex"]),
    ("Tacos", &["Tortilla", "Meat", "Mexico", "Salsa"]),
    ("Pizza", &["Cheese", "Tomato", "Italy", "Oven"]),
    ("Sushi", &["Rice", "Fish", "Japan", "Seaweed"]),
    ("Hamburger", &["Bun", "Meat", "American", "Cheese"]),
    ("Pasta", &["Noodles", "Italy", "Sauce", "Spaghetti"]),
    ("Cat", &["Feline", "Whiskers", "Pet", "Meow"]),
    ("Dog", &["Bark", "Pet", "Loyal", "Canine"]),
    ("Lion", &["Feline", "Mane", "King", "Africa"]),
    ("Elephant", &["Trunk", "Huge", "Africa", "Memory"]),
    ("Eagle", &["Flight", "Raptor", "Wings", "Sight"]),
    ("Mexico", &["America", "Tacos", "CDMX", "Spanish"]),
    ("Spain", &["Europe", "Paella", "Madrid", "Flamenco"]),
    ("Japan", &["Asia", "Sushi", "Tokyo", "Anime"]),
    ("Brazil", &["America", "Carnival", "Samba", "Football"]),
    ("France", &["Europe", "Tower", "Paris", "Wine"]),
    ("Bad Bunny", &["Reggaeton", "Puerto Rico", "Bunny", "Trap"]),
    ("The Weeknd", &["Canada", "R&B", "XO", "Abel"]),
    ("Shakira", &["Colombia", "Hips", "Latina", "Singer"]),
    ("J Balvin", &["Reggaeton", "Colombia", "Green", "Latino"]),
    ("Harry Styles", &["One Direction", "English", "Pop", "Solo"]),
    ("The Legend of Zelda", &["Link", "Nintendo", "Sword", "Triforce"]),
    ("Minecraft", &["Blocks", "Building", "Square", "Crafting"]),
    ("Elden Ring", &["Hard", "Boss", "FromSoftware", "Ring"]),
    ("Super Mario", &["Pipes", "Mushroom", "Nintendo", "Jumping"]),
    ("Fortnite", &["Battle Royale", "Building", "Island", "Multiplayer"]),
];
