// Fixed-size pages over an in-memory list of rows.

use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Next,
    Previous,
    Quit,
}

impl PageAction {
    /// Parse a navigation key: `n`, `p` or `q`, any case.
    pub fn from_key(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "n" => Some(PageAction::Next),
            "p" => Some(PageAction::Previous),
            "q" => Some(PageAction::Quit),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            PageAction::Next => 'n',
            PageAction::Previous => 'p',
            PageAction::Quit => 'q',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageAction::Next => "next page",
            PageAction::Previous => "previous page",
            PageAction::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    len: usize,
    page_size: usize,
    page: usize,
}

impl Pager {
    /// `page_size` of zero is treated as one.
    pub fn new(len: usize, page_size: usize) -> Self {
        Pager {
            len,
            page_size: page_size.max(1),
            page: 0,
        }
    }

    pub fn total_pages(&self) -> usize {
        (self.len + self.page_size - 1) / self.page_size
    }

    /// Zero-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.page + 1 >= self.total_pages()
    }

    /// Index range of the current page within the list.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.len);
        let end = (start + self.page_size).min(self.len);
        start..end
    }

    /// Actions that make sense on the current page.
    pub fn actions(&self) -> Vec<PageAction> {
        let mut actions = Vec::with_capacity(3);
        if !self.is_last() {
            actions.push(PageAction::Next);
        }
        if !self.is_first() {
            actions.push(PageAction::Previous);
        }
        actions.push(PageAction::Quit);
        actions
    }

    /// Move according to `action`. Returns false once the user quits.
    /// Moving past either end leaves the page unchanged.
    pub fn apply(&mut self, action: PageAction) -> bool {
        match action {
            PageAction::Next if !self.is_last() => self.page += 1,
            PageAction::Previous if !self.is_first() => self.page -= 1,
            PageAction::Quit => return false,
            _ => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_round_up() {
        assert_eq!(Pager::new(0, 6).total_pages(), 0);
        assert_eq!(Pager::new(6, 6).total_pages(), 1);
        assert_eq!(Pager::new(7, 6).total_pages(), 2);
        assert_eq!(Pager::new(13, 6).total_pages(), 3);
        assert_eq!(Pager::new(3, 0).total_pages(), 3);
    }

    #[test]
    fn walk_forward_and_back() {
        let mut pager = Pager::new(13, 6);
        assert_eq!(pager.range(), 0..6);
        assert_eq!(pager.actions(), vec![PageAction::Next, PageAction::Quit]);

        assert!(pager.apply(PageAction::Next));
        assert_eq!(pager.range(), 6..12);
        assert_eq!(
            pager.actions(),
            vec![PageAction::Next, PageAction::Previous, PageAction::Quit]
        );

        pager.apply(PageAction::Next);
        assert_eq!(pager.range(), 12..13);
        assert_eq!(pager.actions(), vec![PageAction::Previous, PageAction::Quit]);

        pager.apply(PageAction::Next);
        assert_eq!(pager.page(), 2);

        pager.apply(PageAction::Previous);
        assert_eq!(pager.range(), 6..12);
        assert!(!pager.apply(PageAction::Quit));
    }

    #[test]
    fn previous_on_first_page_stays() {
        let mut pager = Pager::new(4, 6);
        assert!(pager.apply(PageAction::Previous));
        assert_eq!(pager.page(), 0);
        assert_eq!(pager.actions(), vec![PageAction::Quit]);
    }

    #[test]
    fn empty_list_has_empty_range() {
        let pager = Pager::new(0, 6);
        assert_eq!(pager.range(), 0..0);
        assert_eq!(pager.actions(), vec![PageAction::Quit]);
    }

    #[test]
    fn keys() {
        assert_eq!(PageAction::from_key("n"), Some(PageAction::Next));
        assert_eq!(PageAction::from_key(" P "), Some(PageAction::Previous));
        assert_eq!(PageAction::from_key("Q"), Some(PageAction::Quit));
        assert_eq!(PageAction::from_key("x"), None);
        assert_eq!(PageAction::from_key(""), None);
    }
}
