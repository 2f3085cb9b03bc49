//! Catalog management service
//!
//! Each operation runs in its own transaction. Returning early with an error
//! drops the transaction, which rolls it back.
//!
//! A write transaction opens with its write, so it holds the store's write
//! lock from the start. A concurrent writer then waits on the busy timeout
//! instead of failing when it tries to upgrade a read lock.

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorForm, NewAuthor},
        book::{Book, BookForm, BookListing, BookQuery, NewBook},
    },
    repository::{authors, books, Repository},
};

/// Result of a catalog listing
#[derive(Debug, Clone)]
pub struct BookSearch {
    pub books: Vec<BookListing>,
    /// Set when a search term was given
    pub message: Option<String>,
}

/// What a book deletion removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBook {
    pub book: Book,
    /// Name of the author pruned along with their last book
    pub removed_author: Option<String>,
}

impl DeletedBook {
    pub fn message(&self) -> String {
        match &self.removed_author {
            Some(name) => format!(
                "Book '{}' deleted. Author '{}' deleted as they have no remaining books.",
                self.book.title, name
            ),
            None => format!("Book '{}' deleted.", self.book.title),
        }
    }
}

fn missing_author(data: &NewBook) -> AppError {
    tracing::warn!("Book {:?} references missing author {}", data.isbn, data.author_id);
    AppError::Reference(format!("Author {} does not exist.", data.author_id))
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate and insert a new author
    pub async fn create_author(&self, form: &AuthorForm) -> AppResult<Author> {
        let data = NewAuthor::try_from(form).map_err(|e| {
            tracing::debug!("Rejected author form: {}", e);
            e
        })?;

        let mut tx = self.repository.begin().await?;
        let author = authors::create(&mut tx, &data).await?;
        tx.commit().await?;

        tracing::info!("Created author id={} name={:?}", author.id, author.name);
        Ok(author)
    }

    pub async fn get_author(&self, id: i64) -> AppResult<Author> {
        let mut conn = self.repository.pool.acquire().await?;
        authors::find(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
    }

    /// Authors offered as choices on the book form
    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let mut conn = self.repository.pool.acquire().await?;
        authors::list(&mut conn).await
    }

    /// Validate and insert a new book.
    ///
    /// The author must exist and the ISBN must be unused. The store's
    /// foreign key and unique index enforce both as part of the insert. A
    /// missing author is reported ahead of a duplicate ISBN.
    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        let data = NewBook::try_from(form).map_err(|e| {
            tracing::debug!("Rejected book form: {}", e);
            e
        })?;

        let mut tx = self.repository.begin().await?;
        let book = match books::create(&mut tx, &data).await {
            Ok(book) => book,
            Err(AppError::Conflict(msg)) => {
                if authors::find(&mut tx, data.author_id).await?.is_some() {
                    tracing::debug!("Duplicate ISBN {:?}", data.isbn);
                    return Err(AppError::Conflict(msg));
                }
                return Err(missing_author(&data));
            }
            Err(AppError::Reference(_)) => return Err(missing_author(&data)),
            Err(e) => return Err(e),
        };
        tx.commit().await?;

        tracing::info!("Created book id={} isbn={} title={:?}", book.id, book.isbn, book.title);
        Ok(book)
    }

    /// Books written by one author
    pub async fn books_by_author(&self, author_id: i64) -> AppResult<Vec<Book>> {
        let mut conn = self.repository.pool.acquire().await?;
        books::list_by_author(&mut conn, author_id).await
    }

    /// List books, optionally filtered and sorted.
    ///
    /// A search with no match yields an empty list, never the full catalog.
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookSearch> {
        let term = query.search_term();
        let mut conn = self.repository.pool.acquire().await?;
        let books = books::search(&mut conn, term, query.sort()).await?;

        let message = term.map(|term| match books.len() {
            0 => format!("No books found matching '{}'.", term),
            n => format!("Found {} book(s) matching '{}'.", n, term),
        });

        Ok(BookSearch { books, message })
    }

    /// Delete a book, and its author too when no other book references them.
    ///
    /// Of two concurrent deletions of the same book, the second to get the
    /// write lock finds nothing and reports `NotFound`.
    pub async fn delete_book(&self, id: i64) -> AppResult<DeletedBook> {
        let mut tx = self.repository.begin().await?;

        let book = books::delete(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

        let removed_author = if books::count_by_author(&mut tx, book.author_id).await? == 0 {
            let author = authors::find(&mut tx, book.author_id).await?;
            authors::delete(&mut tx, book.author_id).await?;
            author.map(|a| a.name)
        } else {
            None
        };

        tx.commit().await?;

        let deleted = DeletedBook { book, removed_author };
        tracing::info!("{}", deleted.message());
        Ok(deleted)
    }

    /// Check the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
