//! Book queries

use sqlx::SqliteConnection;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookListing, BookSort, NewBook},
};

/// Insert a book and return it with its assigned id.
///
/// The store's constraints do the checking: a duplicate ISBN is reported as
/// a conflict, a dangling author id as a reference error.
pub async fn create(conn: &mut SqliteConnection, data: &NewBook) -> AppResult<Book> {
    sqlx::query_as::<_, Book>(
        r#"
        INSERT INTO book (isbn, title, publication_year, author_id)
        VALUES (?, ?, ?, ?)
        RETURNING id, isbn, title, publication_year, author_id
        "#,
    )
    .bind(&data.isbn)
    .bind(&data.title)
    .bind(data.publication_year)
    .bind(data.author_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict(format!("A book with ISBN '{}' already exists.", data.isbn))
        }
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
            AppError::Reference(format!("Author {} does not exist.", data.author_id))
        }
        e => AppError::Database(e),
    })
}

/// Books written by one author
pub async fn list_by_author(conn: &mut SqliteConnection, author_id: i64) -> AppResult<Vec<Book>> {
    let rows = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, isbn, title, publication_year, author_id
        FROM book
        WHERE author_id = ?
        ORDER BY id
        "#,
    )
    .bind(author_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn count_by_author(conn: &mut SqliteConnection, author_id: i64) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn count(conn: &mut SqliteConnection) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Catalog listing with optional search and ordering.
///
/// The search term matches anywhere in the title or ISBN, ignoring case.
/// Case folding is SQLite's `LOWER()`, which only folds ASCII letters:
/// "zola" finds "ÉMILE ZOLA", but "émile" does not find "Émile".
/// Without a sort the rows come back in the store's natural order.
pub async fn search(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    sort: Option<BookSort>,
) -> AppResult<Vec<BookListing>> {
    let mut query = String::from(
        r#"
        SELECT b.id, b.isbn, b.title, b.publication_year, b.author_id, a.name AS author_name
        FROM book b
        JOIN author a ON a.id = b.author_id
        "#,
    );

    if search_term.is_some() {
        query.push_str(
            r#"
        WHERE LOWER(b.title) LIKE LOWER(?1) ESCAPE '\'
           OR LOWER(b.isbn) LIKE LOWER(?1) ESCAPE '\'
        "#,
        );
    }

    match sort {
        Some(BookSort::Title) => query.push_str(" ORDER BY b.title"),
        Some(BookSort::Author) => query.push_str(" ORDER BY a.name"),
        None => {}
    }

    let mut builder = sqlx::query_as::<_, BookListing>(&query);
    if let Some(term) = search_term {
        builder = builder.bind(like_pattern(term));
    }

    let rows = builder.fetch_all(&mut *conn).await?;
    Ok(rows)
}

/// `%term%` with LIKE wildcards in the term taken literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Delete a book and return what was removed, `None` if it was not there.
///
/// Being a write, this takes the store's write lock, so a concurrent
/// deletion of the same book waits and then finds nothing.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Book>> {
    let book = sqlx::query_as::<_, Book>(
        r#"
        DELETE FROM book WHERE id = ?
        RETURNING id, isbn, title, publication_year, author_id
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(book)
}
