//! Shared fixtures for integration tests
//!
//! Each test gets its own SQLite file in a temporary directory, migrated and
//! wired to the real services. bcrypt runs at its minimum cost.

#![allow(dead_code)]

use chrono::NaiveDate;
use tempfile::TempDir;

use libris::config::Config;
use libris::db::{AuthorRecord, BookRecord, Database, PatronRecord, UserRecord};
use libris::services::{NewBook, Services, SignupInput};

pub const TTL_SECS: i64 = 3600;
pub const FINE: i64 = 400;

pub struct TestApp {
    _dir: TempDir,
    pub config: Config,
    pub db: Database,
    pub services: Services,
}

pub fn test_config(database_url: String) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url,
        database_max_connections: 5,
        secret_key: "integration-test-secret".to_string(),
        secret_key_generated: false,
        session_token_ttl_secs: TTL_SECS,
        overdue_fine_amount: FINE,
        bcrypt_cost: 4,
        admin: None,
    }
}

pub async fn setup() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("libris.db").display());
    let config = test_config(url);

    let db = Database::connect(&config.database_url, config.database_max_connections)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    let services = Services::new(db.clone(), &config).unwrap();

    TestApp {
        _dir: dir,
        config,
        db,
        services,
    }
}

impl TestApp {
    pub async fn signup(&self, email: &str, username: &str, password: &str) -> UserRecord {
        self.services
            .auth
            .signup(SignupInput {
                email: email.to_string(),
                username: username.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password: password.to_string(),
                confirm_password: password.to_string(),
            })
            .await
            .unwrap()
    }

    /// Sign up and log in; returns the refreshed user (token set) and token
    pub async fn login_new(&self, email: &str, username: &str) -> (UserRecord, String) {
        self.signup(email, username, "secret-pw").await;
        let result = self.services.auth.login(email, "secret-pw").await.unwrap();
        (result.user, result.token)
    }

    /// Re-read the user so role flags are current
    pub async fn reload(&self, user: &UserRecord) -> UserRecord {
        self.db.users().get_by_id(&user.id).await.unwrap().unwrap()
    }

    pub async fn make_author(&self, user: &UserRecord) -> (UserRecord, AuthorRecord) {
        let author = self
            .services
            .auth
            .become_author(user, date(1970, 1, 1), "Kenyan")
            .await
            .unwrap();
        (self.reload(user).await, author)
    }

    pub async fn make_patron(&self, user: &UserRecord) -> (UserRecord, PatronRecord) {
        let patron = self
            .services
            .auth
            .become_patron(user, "1 Library Way", "555-0100")
            .await
            .unwrap();
        (self.reload(user).await, patron)
    }

    pub async fn create_book(&self, author: &UserRecord, title: &str, copies: i64) -> BookRecord {
        self.services
            .catalog
            .create_book(author, new_book(title, "", copies))
            .await
            .unwrap()
    }
}

pub fn new_book(title: &str, genre: &str, copies: i64) -> NewBook {
    NewBook {
        title: title.to_string(),
        isbn: format!("isbn-{}", title.to_lowercase().replace(' ', "-")),
        description: format!("About {}", title),
        genre: genre.to_string(),
        rating: None,
        publish_year: date(2001, 5, 17),
        available_copies: copies,
        book_pages: 320,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
