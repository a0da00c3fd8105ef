use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::error::{LibraryError, LibraryResult};
use crate::models::{Book, BookId};

/// The durable set of books and their issued flags.
pub struct CatalogStore<'c> {
    conn: &'c Connection,
}

impl<'c> CatalogStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Every book ordered by id, which is also insertion order.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, author, issued FROM books ORDER BY id")
            .context("failed to prepare book query")?;

        let books = stmt
            .query_map([], |row| {
                Ok(Book {
                    id: BookId(row.get(0)?),
                    title: row.get(1)?,
                    author: row.get(2)?,
                    issued: row.get(3)?,
                })
            })
            .context("failed to load books")?
            .collect::<Result<Vec<_>, _>>()
            .context("failed to collect books")?;

        Ok(books)
    }

    /// Insert a new, available book and echo the hydrated record. Title and
    /// author are stored as given, blanks and duplicates included.
    pub fn add_book(&self, title: &str, author: &str) -> Result<Book> {
        self.conn
            .execute(
                "INSERT INTO books (title, author, issued) VALUES (?1, ?2, 0)",
                params![title, author],
            )
            .context("failed to insert book")?;

        let id = BookId(self.conn.last_insert_rowid());
        Ok(Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            issued: false,
        })
    }

    /// Flag a book as issued. The current state is not checked, so repeating
    /// the call is harmless.
    pub fn mark_issued(&self, id: BookId) -> LibraryResult<()> {
        self.set_issued(id, true)
    }

    /// Flag a book as available again. Same not-found rule as `mark_issued`.
    pub fn mark_returned(&self, id: BookId) -> LibraryResult<()> {
        self.set_issued(id, false)
    }

    fn set_issued(&self, id: BookId, issued: bool) -> LibraryResult<()> {
        let updated = self
            .conn
            .execute(
                "UPDATE books SET issued = ?1 WHERE id = ?2",
                params![issued, id.0],
            )
            .context("failed to update book status")?;

        if updated == 0 {
            Err(LibraryError::BookNotFound(id.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn added_books_get_increasing_ids_and_start_available() {
        let conn = open_in_memory().unwrap();
        let store = CatalogStore::new(&conn);

        let first = store.add_book("Dune", "Herbert").unwrap();
        let second = store.add_book("Dune", "Herbert").unwrap();
        let third = store.add_book("", "").unwrap();

        assert!(first.id < second.id && second.id < third.id);
        assert!(!first.issued);

        let books = store.list_books().unwrap();
        assert_eq!(books, vec![first, second, third]);
    }

    #[test]
    fn mark_issued_is_idempotent() {
        let conn = open_in_memory().unwrap();
        let store = CatalogStore::new(&conn);
        let book = store.add_book("Emma", "Austen").unwrap();

        store.mark_issued(book.id).unwrap();
        store.mark_issued(book.id).unwrap();

        assert!(store.list_books().unwrap()[0].issued);
    }

    #[test]
    fn mark_returned_clears_flag() {
        let conn = open_in_memory().unwrap();
        let store = CatalogStore::new(&conn);
        let book = store.add_book("Emma", "Austen").unwrap();

        store.mark_issued(book.id).unwrap();
        store.mark_returned(book.id).unwrap();

        assert!(!store.list_books().unwrap()[0].issued);
    }

    #[test]
    fn unknown_ids_are_reported_as_missing() {
        let conn = open_in_memory().unwrap();
        let store = CatalogStore::new(&conn);

        assert!(matches!(
            store.mark_issued(BookId(42)),
            Err(LibraryError::BookNotFound(id)) if id == "42"
        ));
        assert!(matches!(
            store.mark_returned(BookId(42)),
            Err(LibraryError::BookNotFound(_))
        ));
    }

    #[test]
    fn missing_table_surfaces_as_storage_error() {
        let conn = Connection::open_in_memory().unwrap();
        let store = CatalogStore::new(&conn);

        assert!(store.list_books().is_err());
        assert!(matches!(
            store.mark_issued(BookId(1)),
            Err(LibraryError::Storage(_))
        ));
    }

    #[test]
    fn ids_are_not_reused_after_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.sqlite");

        let first = {
            let conn = crate::db::open_database(&path).unwrap();
            let book = CatalogStore::new(&conn).add_book("Dune", "Herbert").unwrap();
            conn.execute("DELETE FROM books", []).unwrap();
            book
        };

        let conn = crate::db::open_database(&path).unwrap();
        let second = CatalogStore::new(&conn).add_book("Emma", "Austen").unwrap();
        assert!(second.id > first.id);
    }
}
