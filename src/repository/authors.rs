//! Author queries

use sqlx::SqliteConnection;

use crate::{
    error::AppResult,
    models::author::{Author, NewAuthor},
};

/// Insert an author and return it with its assigned id
pub async fn create(conn: &mut SqliteConnection, data: &NewAuthor) -> AppResult<Author> {
    let author = sqlx::query_as::<_, Author>(
        r#"
        INSERT INTO author (name, birth_date, date_of_death)
        VALUES (?, ?, ?)
        RETURNING id, name, birth_date, date_of_death
        "#,
    )
    .bind(&data.name)
    .bind(data.birth_date)
    .bind(data.date_of_death)
    .fetch_one(&mut *conn)
    .await?;
    Ok(author)
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Author>> {
    let author = sqlx::query_as::<_, Author>(
        "SELECT id, name, birth_date, date_of_death FROM author WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(author)
}

/// All authors, alphabetically
pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<Author>> {
    let rows = sqlx::query_as::<_, Author>(
        "SELECT id, name, birth_date, date_of_death FROM author ORDER BY name, id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Delete an author; returns whether a row was removed.
/// Books still owned by the author go with it (`ON DELETE CASCADE`).
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM author WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(conn: &mut SqliteConnection) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM author")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
