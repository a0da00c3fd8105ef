//! Domain models that mirror the SQLite schema and get passed between the
//! circulation logic and the TUI. They stay plain data holders; the rules about
//! when a book may change state live in `circulation`.

use std::fmt;

/// Store-assigned identifier of a book. Wrapping the raw integer keeps book and
/// user ids from being swapped at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookId(pub i64);

/// Store-assigned identifier of a library user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two lifecycle states of a book. Derived from the `issued` flag, never
/// stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Issued,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Available => f.write_str("available"),
            Availability::Issued => f.write_str("issued"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalog entry. `issued` is the only record of availability: the schema
/// has no column for who currently holds the book.
pub struct Book {
    /// Primary key from the `books` table.
    pub id: BookId,
    pub title: String,
    pub author: String,
    /// `true` while the book is out on loan.
    pub issued: bool,
}

impl Book {
    pub fn availability(&self) -> Availability {
        if self.issued {
            Availability::Issued
        } else {
            Availability::Available
        }
    }

    /// `ID: 1, Title: Dune, Author: Herbert`, the line format used by the list
    /// views.
    pub fn summary(&self) -> String {
        format!(
            "ID: {}, Title: {}, Author: {}",
            self.id, self.title, self.author
        )
    }

    /// True when either display field is blank. Such books are still stored,
    /// the UI only warns about them.
    pub fn has_blank_fields(&self) -> bool {
        self.title.trim().is_empty() || self.author.trim().is_empty()
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.author)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A borrower. Users only enter the store through seeding.
pub struct User {
    pub id: UserId,
    /// Display name.
    pub name: String,
    pub username: String,
}

impl User {
    pub fn summary(&self) -> String {
        format!(
            "ID: {}, Name: {}, Username: {}",
            self.id, self.name, self.username
        )
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(issued: bool) -> Book {
        Book {
            id: BookId(1),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            issued,
        }
    }

    #[test]
    fn availability_follows_issued_flag() {
        assert_eq!(book(false).availability(), Availability::Available);
        assert_eq!(book(true).availability(), Availability::Issued);
    }

    #[test]
    fn summary_lists_id_title_and_author() {
        assert_eq!(book(false).summary(), "ID: 1, Title: Dune, Author: Herbert");
    }

    #[test]
    fn blank_fields_are_detected() {
        let mut blank = book(false);
        blank.author = "   ".to_string();
        assert!(blank.has_blank_fields());
        assert!(!book(false).has_blank_fields());
    }

    #[test]
    fn user_summary_matches_list_format() {
        let user = User {
            id: UserId(7),
            name: "Ada".to_string(),
            username: "ada".to_string(),
        };
        assert_eq!(user.summary(), "ID: 7, Name: Ada, Username: ada");
        assert_eq!(user.to_string(), "Ada (ada)");
    }
}
