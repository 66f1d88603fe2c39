use bevy_ecs::prelude::Component;

/// Linear conversation attached to an NPC.
///
/// `current` indexes `lines` while `active` is true. The dialogue system
/// starts, advances and ends it in response to the interact action.
#[derive(Component, Clone, Debug, PartialEq)]
pub struct Dialogue {
    pub speaker: String,
    pub lines: Vec<String>,
    pub current: usize,
    pub active: bool,
    /// Maximum distance (world units) between player and speaker.
    pub range: f32,
}

impl Dialogue {
    pub fn new(speaker: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            speaker: speaker.into(),
            lines,
            current: 0,
            active: false,
            range: 48.0,
        }
    }

    pub fn with_range(mut self, range: f32) -> Self {
        self.range = range;
        self
    }

    pub fn current_line(&self) -> Option<&str> {
        if !self.active {
            return None;
        }
        self.lines.get(self.current).map(String::as_str)
    }

    /// Start from the first line. Returns false for an empty dialogue.
    pub fn start(&mut self) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        self.current = 0;
        self.active = true;
        true
    }

    /// Move to the next line. Returns false (and deactivates) past the end.
    pub fn advance(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.current += 1;
        if self.current >= self.lines.len() {
            self.end();
            return false;
        }
        true
    }

    pub fn end(&mut self) {
        self.active = false;
        self.current = 0;
    }
}
