use crate::models::{Book, User};

/// Which slice of the catalog a book screen shows.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum BookView {
    /// Only books that can be issued right now.
    Available,
    /// Every book with its status.
    Catalog,
}

impl BookView {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            BookView::Available => "Available Books",
            BookView::Catalog => "Catalog",
        }
    }
}

/// Cursor bookkeeping shared by the list screens.
#[derive(Default, Debug)]
pub(crate) struct Selection {
    pub(crate) index: usize,
}

impl Selection {
    pub(crate) fn move_by(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.index = 0;
            return;
        }
        let max = len as isize - 1;
        self.index = (self.index as isize + offset).clamp(0, max) as usize;
    }

    pub(crate) fn first(&mut self) {
        self.index = 0;
    }

    pub(crate) fn last(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

pub(crate) struct BookScreen {
    pub(crate) view: BookView,
    pub(crate) books: Vec<Book>,
    pub(crate) selection: Selection,
}

impl BookScreen {
    pub(crate) fn new(view: BookView, books: Vec<Book>) -> Self {
        Self {
            view,
            books,
            selection: Selection::default(),
        }
    }

    /// Swap in a fresh list, keeping the cursor on `focus` if it is still
    /// listed.
    pub(crate) fn set_books(&mut self, books: Vec<Book>, focus: Option<&Book>) {
        self.books = books;
        if let Some(focus) = focus {
            if let Some(idx) = self.books.iter().position(|book| book.id == focus.id) {
                self.selection.index = idx;
                return;
            }
        }
        self.selection.clamp(self.books.len());
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selection.index)
    }

    pub(crate) fn len(&self) -> usize {
        self.books.len()
    }
}

pub(crate) struct UserScreen {
    pub(crate) users: Vec<User>,
    pub(crate) selection: Selection,
}

impl UserScreen {
    pub(crate) fn new(users: Vec<User>) -> Self {
        Self {
            users,
            selection: Selection::default(),
        }
    }

    pub(crate) fn current_user(&self) -> Option<&User> {
        self.users.get(self.selection.index)
    }

    pub(crate) fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookId;

    fn book(id: i64) -> Book {
        Book {
            id: BookId(id),
            title: format!("Book {id}"),
            author: "Anon".to_string(),
            issued: false,
        }
    }

    #[test]
    fn selection_stays_in_bounds() {
        let mut selection = Selection::default();
        selection.move_by(-3, 4);
        assert_eq!(selection.index, 0);
        selection.move_by(10, 4);
        assert_eq!(selection.index, 3);
        selection.clamp(2);
        assert_eq!(selection.index, 1);
        selection.move_by(1, 0);
        assert_eq!(selection.index, 0);
    }

    #[test]
    fn refresh_keeps_focus_on_same_book() {
        let mut screen = BookScreen::new(BookView::Catalog, vec![book(1), book(2), book(3)]);
        screen.selection.index = 1;
        let focus = screen.current_book().cloned();

        screen.set_books(vec![book(0), book(1), book(2), book(3)], focus.as_ref());

        assert_eq!(screen.current_book().map(|b| b.id), Some(BookId(2)));
    }

    #[test]
    fn refresh_clamps_when_focus_disappears() {
        let mut screen = BookScreen::new(BookView::Available, vec![book(1), book(2)]);
        screen.selection.index = 1;
        let focus = screen.current_book().cloned();

        screen.set_books(vec![book(1)], focus.as_ref());

        assert_eq!(screen.selection.index, 0);
    }
}
