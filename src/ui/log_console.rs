// SPDX-License-Identifier: GPL-3.0-only

//! Scrollable log console with bounded scrollback

use std::collections::VecDeque;

/// Log console element
///
/// Each appended message becomes a `"\n" + msg` segment of the displayed
/// text. Once `capacity` entries are held the oldest one is dropped.
#[derive(Debug, Clone)]
pub struct LogConsole {
    entries: VecDeque<String>,
    capacity: usize,
    scroll_top: usize,
}

impl LogConsole {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            scroll_top: 0,
        }
    }

    /// Append a message and scroll to the bottom
    pub fn append(&mut self, msg: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(msg.to_string());
        self.scroll_top = self.scroll_height();
    }

    /// Displayed text, one newline-prefixed segment per entry
    pub fn value(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push('\n');
            text.push_str(entry);
        }
        text
    }

    /// Rendered lines, oldest first (entries may span several lines)
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|entry| entry.lines())
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total scrollable height in lines
    pub fn scroll_height(&self) -> usize {
        self.lines().count()
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }
}
