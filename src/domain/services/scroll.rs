#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

/// Scroll position of the chat history. While following, new lines keep the
/// view pinned to the bottom; scrolling up stops following until the bottom
/// is reached again.
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    following: bool,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Default for Scroll {
    fn default() -> Scroll {
        return Scroll {
            list_length: 0,
            viewport_length: 0,
            following: true,
            position: 0,
            scrollbar_state: ScrollbarState::default(),
        };
    }
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    fn page_size(&self) -> u16 {
        return self.viewport_length.saturating_sub(2).max(1);
    }

    fn move_to(&mut self, position: u16) {
        self.position = position.min(self.max_position());
        self.following = self.position == self.max_position();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn up(&mut self) {
        self.move_to(self.position.saturating_sub(1));
    }

    pub fn up_page(&mut self) {
        self.move_to(self.position.saturating_sub(self.page_size()));
    }

    pub fn down(&mut self) {
        self.move_to(self.position.saturating_add(1));
    }

    pub fn down_page(&mut self) {
        self.move_to(self.position.saturating_add(self.page_size()));
    }

    pub fn last(&mut self) {
        self.move_to(self.max_position());
    }

    pub fn is_following(&self) -> bool {
        return self.following;
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(self.max_position())
            .viewport_content_length(viewport_length);

        if self.following {
            self.last();
        } else {
            self.move_to(self.position);
        }
    }
}
