//! Interactive prompts for commands that are run without arguments
use inquire::{
    Confirm, CustomType, Text,
    validator::{StringValidator, Validation},
};
use libbookstore::book::Book;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Aborted")]
    Aborted,
    #[error(transparent)]
    Prompt(#[from] inquire::InquireError),
}

#[derive(Clone)]
struct NotBlank;

impl StringValidator for NotBlank {
    fn validate(&self, input: &str) -> Result<Validation, inquire::CustomUserError> {
        match input.trim().is_empty() {
            true => Ok(Validation::Invalid("A value is required".into())),
            false => Ok(Validation::Valid),
        }
    }
}

fn required_text(message: &str) -> Result<String, Error> {
    Text::new(message)
        .with_validator(NotBlank)
        .prompt()
        .map(|s| s.trim().to_string())
        .map_err(Into::into)
}

/// Ask the user for every attribute of a new book
pub fn prompt_book() -> Result<Book, Error> {
    let title = required_text("Title:")?;
    let author = required_text("Author:")?;
    let genre = required_text("Genre:")?;
    let published_year = CustomType::<i32>::new("Year published:")
        .with_error_message("Please enter a year")
        .prompt()?;
    let price = CustomType::<f64>::new("Price:")
        .with_error_message("Please enter a number")
        .prompt()?;
    let in_stock = Confirm::new("In stock?").with_default(true).prompt()?;
    let pages = CustomType::<i32>::new("Number of pages:")
        .with_error_message("Please enter a whole number")
        .prompt()?;
    let publisher = required_text("Publisher:")?;

    let book = Book::new(
        title,
        author,
        genre,
        published_year,
        price,
        in_stock,
        pages,
        publisher,
    );
    match confirm("Save to database?")? {
        true => Ok(book),
        false => Err(Error::Aborted),
    }
}

/// Ask a yes/no question that defaults to "no"
pub fn confirm(message: &str) -> Result<bool, Error> {
    Confirm::new(message)
        .with_default(false)
        .prompt()
        .map_err(Into::into)
}
