//! API integration tests, driving the router in-process against an
//! in-memory store

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use bookshelf_server::{api, config::DatabaseConfig, repository, AppState};

struct TestApp {
    router: Router,
    pool: sqlx::SqlitePool,
}

impl TestApp {
    async fn new() -> Self {
        let pool = repository::connect(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to open database");
        repository::migrate(&pool).await.expect("Failed to run migrations");
        let router = api::create_router(AppState::new(pool.clone()));
        Self { router, pool }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// POST a form; returns status, `Location`, flash cookie and JSON body (if any)
    async fn post(&self, uri: &str, form: &str) -> Posted {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().unwrap().split(';').next().map(String::from));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);

        Posted {
            status,
            location,
            cookie,
            body,
        }
    }

    async fn counts(&self) -> (i64, i64) {
        let mut conn = self.pool.acquire().await.unwrap();
        repository::count_rows(&mut conn).await.unwrap()
    }

    async fn author_id(&self, name: &str) -> Option<i64> {
        let (_, view) = self.get("/add_book", None).await;
        view["authors"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["name"] == name)
            .and_then(|a| a["id"].as_i64())
    }

    async fn book_id(&self, title: &str) -> i64 {
        let (_, view) = self.get("/", None).await;
        view["books"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["title"] == title)
            .and_then(|b| b["id"].as_i64())
            .expect("No such book")
    }
}

struct Posted {
    status: StatusCode,
    location: Option<String>,
    cookie: Option<String>,
    body: Value,
}

fn titles(view: &Value) -> Vec<String> {
    view["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

fn messages(view: &Value) -> Vec<String> {
    view["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["message"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_add_author_redirects_with_flash() {
    let app = TestApp::new().await;

    let posted = app
        .post("/add_author", "name=Jane+Doe&birth_date=1950-04-01&date_of_death=")
        .await;
    assert_eq!(posted.status, StatusCode::SEE_OTHER);
    assert_eq!(posted.location.as_deref(), Some("/add_author"));

    let cookie = posted.cookie.expect("No flash cookie");
    let (status, view) = app.get("/add_author", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages(&view), vec!["Author 'Jane Doe' added successfully."]);
    assert_eq!(view["messages"][0]["category"], "success");
    assert_eq!(app.counts().await, (1, 0));
}

#[tokio::test]
async fn test_add_author_invalid_date_keeps_input() {
    let app = TestApp::new().await;

    let posted = app.post("/add_author", "name=Jane+Doe&birth_date=01%2F04%2F1950").await;
    assert_eq!(posted.status, StatusCode::BAD_REQUEST);
    assert_eq!(posted.body["form"]["name"], "Jane Doe");
    assert_eq!(posted.body["form"]["birth_date"], "01/04/1950");
    assert_eq!(posted.body["messages"][0]["category"], "error");
    assert_eq!(app.counts().await, (0, 0));
}

#[tokio::test]
async fn test_add_book_form_lists_authors() {
    let app = TestApp::new().await;

    let (status, view) = app.get("/add_book", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(view["authors"].as_array().unwrap().is_empty());

    app.post("/add_author", "name=Jane+Doe").await;
    assert!(app.author_id("Jane Doe").await.is_some());
}

#[tokio::test]
async fn test_add_book_rejections() {
    let app = TestApp::new().await;
    app.post("/add_author", "name=Jane+Doe").await;
    let jane = app.author_id("Jane Doe").await.unwrap();

    let posted = app
        .post("/add_book", &format!("isbn=111&title=Alpha&author_id={}", jane))
        .await;
    assert_eq!(posted.status, StatusCode::SEE_OTHER);
    assert_eq!(posted.location.as_deref(), Some("/add_book"));

    let duplicate = app
        .post("/add_book", &format!("isbn=111&title=Beta&author_id={}", jane))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["form"]["title"], "Beta");
    assert_eq!(duplicate.body["authors"].as_array().unwrap().len(), 1);

    let orphan = app.post("/add_book", "isbn=222&title=Gamma&author_id=999").await;
    assert_eq!(orphan.status, StatusCode::UNPROCESSABLE_ENTITY);

    let bad_year = app
        .post(
            "/add_book",
            &format!("isbn=333&title=Delta&publication_year=soon&author_id={}", jane),
        )
        .await;
    assert_eq!(bad_year.status, StatusCode::BAD_REQUEST);

    assert_eq!(app.counts().await, (1, 1));
}

#[tokio::test]
async fn test_search_reports_matches() {
    let app = TestApp::new().await;
    app.post("/add_author", "name=Jane+Doe").await;
    let jane = app.author_id("Jane Doe").await.unwrap();
    for (isbn, title) in [("111", "Alpha"), ("222", "Beta"), ("ALP9", "Gamma")] {
        app.post(
            "/add_book",
            &format!("isbn={}&title={}&author_id={}", isbn, title, jane),
        )
        .await;
    }

    let (_, view) = app.get("/?search_term=alp&sort=title", None).await;
    assert_eq!(titles(&view), vec!["Alpha", "Gamma"]);
    assert_eq!(messages(&view), vec!["Found 2 book(s) matching 'alp'."]);
    assert_eq!(view["search_term"], "alp");
    assert_eq!(view["sort"], "title");

    let (_, view) = app.get("/?search_term=zzz", None).await;
    assert!(titles(&view).is_empty());
    assert_eq!(messages(&view), vec!["No books found matching 'zzz'."]);

    let (_, view) = app.get("/", None).await;
    assert_eq!(titles(&view).len(), 3);
    assert!(messages(&view).is_empty());
}

#[tokio::test]
async fn test_sort_by_author() {
    let app = TestApp::new().await;
    app.post("/add_author", "name=Zora").await;
    app.post("/add_author", "name=Albert").await;
    let zora = app.author_id("Zora").await.unwrap();
    let albert = app.author_id("Albert").await.unwrap();
    app.post("/add_book", &format!("isbn=1&title=Aardvarks&author_id={}", zora)).await;
    app.post("/add_book", &format!("isbn=2&title=Zebras&author_id={}", albert)).await;

    let (_, view) = app.get("/?sort=author", None).await;
    assert_eq!(titles(&view), vec!["Zebras", "Aardvarks"]);
    assert_eq!(view["books"][0]["author_name"], "Albert");
}

#[tokio::test]
async fn test_delete_missing_book() {
    let app = TestApp::new().await;

    let posted = app.post("/book/42/delete", "").await;
    assert_eq!(posted.status, StatusCode::SEE_OTHER);
    assert_eq!(posted.location.as_deref(), Some("/"));

    let (_, view) = app.get("/", posted.cookie.as_deref()).await;
    assert_eq!(messages(&view), vec!["Book not found"]);
    assert_eq!(view["messages"][0]["category"], "error");
    assert_eq!(app.counts().await, (0, 0));
}

#[tokio::test]
async fn test_catalog_walkthrough() {
    let app = TestApp::new().await;

    app.post("/add_author", "name=Jane+Doe").await;
    let jane = app.author_id("Jane Doe").await.unwrap();
    app.post("/add_book", &format!("isbn=111&title=Alpha&author_id={}", jane)).await;
    app.post("/add_book", &format!("isbn=222&title=Beta&author_id={}", jane)).await;

    let (_, view) = app.get("/?sort=title", None).await;
    assert_eq!(titles(&view), vec!["Alpha", "Beta"]);

    let alpha = app.book_id("Alpha").await;
    let posted = app.post(&format!("/book/{}/delete", alpha), "").await;
    let (_, view) = app.get("/", posted.cookie.as_deref()).await;
    assert_eq!(messages(&view), vec!["Book 'Alpha' deleted."]);
    assert_eq!(app.author_id("Jane Doe").await, Some(jane));

    let beta = app.book_id("Beta").await;
    let posted = app.post(&format!("/book/{}/delete", beta), "").await;
    let (_, view) = app.get("/", posted.cookie.as_deref()).await;
    assert_eq!(
        messages(&view),
        vec!["Book 'Beta' deleted. Author 'Jane Doe' deleted as they have no remaining books."]
    );
    assert!(titles(&view).is_empty());
    assert_eq!(app.author_id("Jane Doe").await, None);
    assert_eq!(app.counts().await, (0, 0));
}
