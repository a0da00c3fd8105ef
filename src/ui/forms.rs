use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

/// One labelled text input inside a modal form.
#[derive(Clone)]
pub(crate) struct Field {
    pub(crate) label: &'static str,
    pub(crate) value: String,
    /// Render as asterisks (password entry).
    pub(crate) masked: bool,
}

impl Field {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            masked: false,
        }
    }

    fn with_value(label: &'static str, value: String) -> Self {
        Self {
            value,
            ..Self::new(label)
        }
    }

    fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }
}

/// State behind every modal in the app: login, add book, issue, return. Values
/// stay raw strings; parsing belongs to the circulation layer.
#[derive(Clone)]
pub(crate) struct FieldForm {
    pub(crate) fields: Vec<Field>,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl FieldForm {
    fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn login() -> Self {
        Self::from_fields(vec![Field::new("Username"), Field::masked("Password")])
    }

    pub(crate) fn add_book() -> Self {
        Self::from_fields(vec![Field::new("Title"), Field::new("Author")])
    }

    /// Issue form, optionally prefilled from the current selection. Focus lands
    /// on the first empty field.
    pub(crate) fn issue(book_id: Option<String>, user_id: Option<String>) -> Self {
        let mut form = Self::from_fields(vec![
            Field::with_value("Book ID", book_id.unwrap_or_default()),
            Field::with_value("User ID", user_id.unwrap_or_default()),
        ]);
        form.active = form
            .fields
            .iter()
            .position(|field| field.value.is_empty())
            .unwrap_or(0);
        form
    }

    pub(crate) fn return_book(book_id: Option<String>) -> Self {
        Self::from_fields(vec![Field::with_value(
            "Book ID",
            book_id.unwrap_or_default(),
        )])
    }

    pub(crate) fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }

    pub(crate) fn is_last_field(&self) -> bool {
        self.active + 1 >= self.fields.len()
    }

    pub(crate) fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub(crate) fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Append a character to the active field. Control characters are ignored.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.fields.get_mut(self.active) {
            Some(field) => {
                field.value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
        }
    }

    pub(crate) fn clear(&mut self, index: usize) {
        if let Some(field) = self.fields.get_mut(index) {
            field.value.clear();
        }
    }

    /// Render a single `Label: value` line, highlighting the focused field.
    pub(crate) fn build_line(&self, index: usize) -> Line<'static> {
        let Some(field) = self.fields.get(index) else {
            return Line::from("");
        };
        let is_active = index == self.active;

        let display = if field.value.is_empty() {
            "<empty>".to_string()
        } else if field.masked {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label)),
            Span::styled(display, style),
        ])
    }

    /// Column of the cursor inside the active line.
    pub(crate) fn cursor_column(&self) -> u16 {
        self.fields
            .get(self.active)
            .map(|field| (field.label.len() + 2 + field.value.chars().count()) as u16)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn typing_goes_to_active_field() {
        let mut form = FieldForm::add_book();
        for ch in "Dune".chars() {
            form.push_char(ch);
        }
        form.next_field();
        form.push_char('H');
        form.backspace();
        form.push_char('X');

        assert_eq!(form.value(0), "Dune");
        assert_eq!(form.value(1), "X");
        assert!(!form.push_char('\n'));
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = FieldForm::login();
        form.previous_field();
        assert_eq!(form.active, 1);
        assert!(form.is_last_field());
        form.next_field();
        assert_eq!(form.active, 0);
    }

    #[test]
    fn issue_form_focuses_first_empty_field() {
        let form = FieldForm::issue(Some("3".to_string()), None);
        assert_eq!(form.value(0), "3");
        assert_eq!(form.active, 1);

        let form = FieldForm::issue(None, Some("7".to_string()));
        assert_eq!(form.active, 0);
    }

    #[test]
    fn password_is_masked() {
        let mut form = FieldForm::login();
        form.next_field();
        for ch in "secret".chars() {
            form.push_char(ch);
        }
        assert_eq!(line_text(&form.build_line(1)), "Password: ******");
        assert_eq!(line_text(&form.build_line(0)), "Username: <empty>");
        assert_eq!(form.cursor_column(), "Password: ".len() as u16 + 6);
    }
}
