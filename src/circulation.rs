//! Issue/return rules binding the catalog to the user directory.
//!
//! A book is either available or issued. `issue` moves it (or keeps it) in the
//! issued state and `return_issued` moves it back. The two are deliberately
//! asymmetric: issuing never checks the current state, so a second issue of the
//! same book succeeds, while returning a book that is not out is declined with
//! `NotIssued`.
//!
//! The string entry points (`issue_book`, `return_book`) are what the TUI
//! calls with whatever the operator typed. Identifiers that do not parse are
//! reported exactly like identifiers that parse but match nothing.
//!
//! Resolution and mutation are separate statements on one connection. With a
//! single operator that is fine; a multi-operator setup would need a
//! transaction around each check-then-set.

use rusqlite::Connection;

use crate::db::{CatalogStore, UserDirectory};
use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, BookId, User, UserId};

/// Parse operator input into a book id. Blank, non-numeric, out-of-range and
/// non-positive input all become `BookNotFound` carrying the raw text.
pub fn parse_book_id(raw: &str) -> LibraryResult<BookId> {
    parse_positive(raw)
        .map(BookId)
        .ok_or_else(|| LibraryError::BookNotFound(raw.trim().to_string()))
}

/// User-id counterpart of `parse_book_id`.
pub fn parse_user_id(raw: &str) -> LibraryResult<UserId> {
    parse_positive(raw)
        .map(UserId)
        .ok_or_else(|| LibraryError::UserNotFound(raw.trim().to_string()))
}

fn parse_positive(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Orchestrates catalog and directory lookups for the circulation workflows.
/// Construct one per operation from the connection the caller owns.
pub struct Circulation<'c> {
    catalog: CatalogStore<'c>,
    users: UserDirectory<'c>,
}

impl<'c> Circulation<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            catalog: CatalogStore::new(conn),
            users: UserDirectory::new(conn),
        }
    }

    /// Books with `issued == false`, in catalog order.
    pub fn list_available(&self) -> LibraryResult<Vec<Book>> {
        let books = self.catalog.list_books()?;
        let available: Vec<Book> = books.into_iter().filter(|book| !book.issued).collect();
        tracing::debug!(count = available.len(), "listed available books");
        Ok(available)
    }

    /// The whole catalog, issued books included.
    pub fn list_catalog(&self) -> LibraryResult<Vec<Book>> {
        Ok(self.catalog.list_books()?)
    }

    pub fn list_users(&self) -> LibraryResult<Vec<User>> {
        let users = self.users.list_users()?;
        tracing::debug!(count = users.len(), "listed users");
        Ok(users)
    }

    pub fn add_book(&self, title: &str, author: &str) -> LibraryResult<Book> {
        let book = self.catalog.add_book(title, author)?;
        if book.has_blank_fields() {
            tracing::warn!(book_id = %book.id, "added book with a blank title or author");
        }
        tracing::info!(book_id = %book.id, title = %book.title, "added book");
        Ok(book)
    }

    /// Mark `book_id` as issued to `user_id`. The book is resolved first, so a
    /// missing book wins over a missing user. An already issued book is issued
    /// again without complaint.
    pub fn issue(&self, book_id: BookId, user_id: UserId) -> LibraryResult<()> {
        let book = self.resolve_book(book_id)?;
        let user = self
            .users
            .find_user(user_id)?
            .ok_or_else(|| LibraryError::UserNotFound(user_id.to_string()))?;

        if book.issued {
            tracing::debug!(book_id = %book.id, "issuing a book that is already issued");
        }

        self.catalog.mark_issued(book.id)?;
        tracing::info!(book_id = %book.id, user_id = %user.id, username = %user.username, "issued book");
        Ok(())
    }

    /// Mark an issued book as available again. Books that are not out are
    /// declined with `NotIssued`.
    pub fn return_issued(&self, book_id: BookId) -> LibraryResult<()> {
        let book = self.resolve_book(book_id)?;
        if !book.issued {
            return Err(LibraryError::NotIssued(book.id));
        }

        self.catalog.mark_returned(book.id)?;
        tracing::info!(book_id = %book.id, "returned book");
        Ok(())
    }

    pub fn list_available_books(&self) -> LibraryResult<Vec<Book>> {
        self.list_available()
    }

    /// `issue` driven by raw operator input.
    pub fn issue_book(&self, raw_book_id: &str, raw_user_id: &str) -> LibraryResult<()> {
        let outcome = self.issue_parsed(raw_book_id, raw_user_id);
        log_declined("issue", &outcome);
        outcome
    }

    fn issue_parsed(&self, raw_book_id: &str, raw_user_id: &str) -> LibraryResult<()> {
        let book_id = parse_book_id(raw_book_id)?;
        // A bad user id must not mask a missing book.
        self.resolve_book(book_id)?;
        let user_id = parse_user_id(raw_user_id)?;
        self.issue(book_id, user_id)
    }

    /// `return_issued` driven by raw operator input.
    pub fn return_book(&self, raw_book_id: &str) -> LibraryResult<()> {
        let outcome = parse_book_id(raw_book_id).and_then(|book_id| self.return_issued(book_id));
        log_declined("return", &outcome);
        outcome
    }

    /// Exact id match over the full catalog.
    fn resolve_book(&self, id: BookId) -> LibraryResult<Book> {
        self.catalog
            .list_books()?
            .into_iter()
            .find(|book| book.id == id)
            .ok_or_else(|| LibraryError::BookNotFound(id.to_string()))
    }
}

fn log_declined(operation: &str, outcome: &LibraryResult<()>) {
    match outcome {
        Err(err) if err.is_declined() => tracing::warn!(operation, "declined: {err}"),
        Err(err) => tracing::error!(operation, "failed: {err:#}"),
        Ok(()) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    /// Store seeded with Book{1, "Dune", "Herbert"} and User{7, "Ada", "ada"}.
    fn seeded() -> Connection {
        let conn = open_in_memory().unwrap();
        conn.execute(
            "INSERT INTO books (id, title, author, issued) VALUES (1, 'Dune', 'Herbert', 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO users (id, name, username) VALUES (7, 'Ada', 'ada')",
            [],
        )
        .unwrap();
        conn
    }

    fn available_ids(circulation: &Circulation<'_>) -> Vec<BookId> {
        circulation
            .list_available_books()
            .unwrap()
            .into_iter()
            .map(|book| book.id)
            .collect()
    }

    #[test]
    fn issue_then_return_round_trip() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        circulation.issue_book("1", "7").unwrap();
        assert!(circulation.list_available_books().unwrap().is_empty());

        circulation.return_book("1").unwrap();
        let available = circulation.list_available_books().unwrap();
        assert_eq!(
            available,
            vec![Book {
                id: BookId(1),
                title: "Dune".to_string(),
                author: "Herbert".to_string(),
                issued: false,
            }]
        );
    }

    #[test]
    fn unknown_book_wins_over_user_validity() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        assert!(matches!(
            circulation.issue_book("99", "7"),
            Err(LibraryError::BookNotFound(id)) if id == "99"
        ));
        assert!(matches!(
            circulation.issue_book("99", "nope"),
            Err(LibraryError::BookNotFound(_))
        ));
    }

    #[test]
    fn unknown_user_is_reported() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        assert!(matches!(
            circulation.issue_book("1", "8"),
            Err(LibraryError::UserNotFound(id)) if id == "8"
        ));
        assert!(matches!(
            circulation.issue_book("1", "ada"),
            Err(LibraryError::UserNotFound(_))
        ));
        assert_eq!(available_ids(&circulation), vec![BookId(1)]);
    }

    #[test]
    fn returning_a_never_issued_book_is_declined() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        assert!(matches!(
            circulation.return_book("1"),
            Err(LibraryError::NotIssued(BookId(1)))
        ));
    }

    #[test]
    fn returning_twice_is_declined_the_second_time() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        circulation.issue(BookId(1), UserId(7)).unwrap();
        circulation.return_issued(BookId(1)).unwrap();

        assert!(matches!(
            circulation.return_issued(BookId(1)),
            Err(LibraryError::NotIssued(_))
        ));
    }

    #[test]
    fn double_issue_is_permitted() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        circulation.issue_book("1", "7").unwrap();
        circulation.issue_book("1", "7").unwrap();

        assert!(circulation.list_available_books().unwrap().is_empty());
        assert!(circulation.list_catalog().unwrap()[0].issued);
    }

    #[test]
    fn malformed_ids_map_to_not_found() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        for raw in ["", "   ", "abc", "1.0", "-1", "0", "99999999999999999999"] {
            assert!(
                matches!(circulation.return_book(raw), Err(LibraryError::BookNotFound(_))),
                "{raw:?} should not resolve"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);

        circulation.issue_book(" 1 ", "7\n").unwrap();
        assert!(available_ids(&circulation).is_empty());
    }

    #[test]
    fn added_books_are_available_with_increasing_ids() {
        let conn = open_in_memory().unwrap();
        let circulation = Circulation::new(&conn);

        let ids: Vec<BookId> = ["A", "B", "C"]
            .iter()
            .map(|title| circulation.add_book(title, "Anon").unwrap().id)
            .collect();

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(available_ids(&circulation), ids);
    }

    #[test]
    fn available_list_preserves_catalog_order() {
        let conn = seeded();
        let circulation = Circulation::new(&conn);
        let second = circulation.add_book("Emma", "Austen").unwrap();
        let third = circulation.add_book("Ulysses", "Joyce").unwrap();

        circulation.issue(second.id, UserId(7)).unwrap();

        assert_eq!(available_ids(&circulation), vec![BookId(1), third.id]);
    }

    #[test]
    fn storage_failures_are_not_declines() {
        let conn = Connection::open_in_memory().unwrap();
        let circulation = Circulation::new(&conn);

        let err = circulation.issue_book("1", "7").unwrap_err();
        assert!(!err.is_declined());
        assert!(matches!(
            circulation.list_users(),
            Err(LibraryError::Storage(_))
        ));
    }

    #[test]
    fn parse_helpers_keep_raw_text() {
        assert_eq!(parse_book_id("12").unwrap(), BookId(12));
        assert_eq!(parse_user_id(" 3").unwrap(), UserId(3));
        assert!(matches!(
            parse_user_id(" x "),
            Err(LibraryError::UserNotFound(raw)) if raw == "x"
        ));
    }
}
