mod books;

pub use books::{BOOK_NOT_FOUND, BookService, CreateBook};
