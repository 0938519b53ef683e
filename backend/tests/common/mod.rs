//! Shared harness for the integration tests: an in-memory database, upload
//! directories in a temp dir, and a schema wired the same way as `main`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_graphql::{Request, Response, Variables};
use serde_json::{Value, json};
use tempfile::TempDir;

use showcase::config::Config;
use showcase::db::Database;
use showcase::graphql::{ShowcaseSchema, build_schema};
use showcase::services::{
    AuthConfig, AuthService, CatalogService, Credentials, FavoritesService, UploadStorage,
};

pub const PAGE_SIZE: i64 = 10;

pub struct TestApp {
    pub schema: ShowcaseSchema,
    pub db: Database,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::connect_in_memory().await.unwrap();

        let storage = UploadStorage::new(dir.path().join("models"), dir.path().join("covers"));
        storage.ensure_dirs().await.unwrap();

        let auth = Arc::new(AuthService::new(
            db.clone(),
            AuthConfig {
                jwt_secret: "integration-secret".to_string(),
                access_token_lifetime: 900,
                bcrypt_cost: 4,
            },
        ));
        let catalog = Arc::new(CatalogService::new(db.clone(), storage, PAGE_SIZE));
        let favorites = Arc::new(FavoritesService::new(db.clone(), PAGE_SIZE));
        let schema = build_schema(db.clone(), auth, catalog, favorites);

        Self { schema, db, dir }
    }

    pub fn config(&self) -> Config {
        Config {
            port: 0,
            cors_origin: None,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "integration-secret".to_string(),
            access_token_lifetime: 900,
            bcrypt_cost: 4,
            model_file_dir: self.models_dir(),
            cover_file_dir: self.covers_dir(),
            works_per_page: PAGE_SIZE,
            demo_asset_url: "http://127.0.0.1:9".to_string(),
        }
    }

    pub fn models_dir(&self) -> PathBuf {
        self.dir.path().join("models")
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.dir.path().join("covers")
    }

    /// Put a file into the model and cover directories so works can reference it
    pub fn place_files(&self, name: &str) {
        std::fs::write(self.models_dir().join(name), b"model").unwrap();
        std::fs::write(self.covers_dir().join(name), b"cover").unwrap();
    }

    pub fn request(query: &str, variables: Value, token: Option<&str>) -> Request {
        let request = Request::new(query).variables(Variables::from_json(variables));
        match token {
            Some(token) => request.data(Credentials::Bearer(token.to_string())),
            None => request,
        }
    }

    pub async fn execute(&self, query: &str, variables: Value, token: Option<&str>) -> Response {
        self.schema
            .execute(Self::request(query, variables, token))
            .await
    }

    /// Run an operation that must succeed and return its data as JSON
    pub async fn ok(&self, query: &str, variables: Value, token: Option<&str>) -> Value {
        let response = self.execute(query, variables, token).await;
        assert!(
            response.errors.is_empty(),
            "unexpected errors: {:?}",
            response.errors
        );
        response.data.into_json().unwrap()
    }

    /// Run an operation that must fail and return (message, extensions.code)
    pub async fn err(&self, query: &str, variables: Value, token: Option<&str>) -> (String, String) {
        let response = self.execute(query, variables, token).await;
        error_of(&response)
    }

    pub async fn register(&self, username: &str, is_superuser: bool) -> String {
        let data = self
            .ok(
                r#"mutation ($u: String!, $p: String!, $s: Boolean) {
                    register(username: $u, password: $p, isSuperuser: $s) { accessToken }
                }"#,
                json!({ "u": username, "p": "password", "s": is_superuser }),
                None,
            )
            .await;
        data["register"]["accessToken"].as_str().unwrap().to_string()
    }

    pub async fn create_category(&self, token: &str, name: &str) -> i64 {
        let data = self
            .ok(
                r#"mutation ($name: String!) { createCategory(input: { name: $name }) { id } }"#,
                json!({ "name": name }),
                Some(token),
            )
            .await;
        data["createCategory"]["id"].as_i64().unwrap()
    }

    /// Create a work that references `files` in both directories
    pub async fn create_work(&self, token: &str, title: &str, category_id: i64, files: &str) -> i64 {
        let data = self
            .ok(
                CREATE_WORK,
                json!({
                    "input": {
                        "title": title,
                        "categoryId": category_id,
                        "modelFilename": files,
                        "coverFilename": files,
                    }
                }),
                Some(token),
            )
            .await;
        data["createWork"]["id"].as_i64().unwrap()
    }
}

pub const CREATE_WORK: &str = r#"
    mutation ($input: WorkInput) {
        createWork(input: $input) {
            id
            title
            modelFilename
            coverFilename
            category { id name }
        }
    }
"#;

pub fn error_of(response: &Response) -> (String, String) {
    let error = response
        .errors
        .first()
        .unwrap_or_else(|| panic!("expected an error, got {:?}", response.data));
    let code = error
        .extensions
        .as_ref()
        .and_then(|ext| ext.get("code"))
        .and_then(|code| match code {
            async_graphql::Value::String(code) => Some(code.clone()),
            _ => None,
        })
        .unwrap_or_default();
    (error.message.clone(), code)
}

/// Ids of the nodes in a connection
pub fn node_ids(connection: &Value) -> Vec<i64> {
    connection["edges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|edge| edge["node"]["id"].as_i64().unwrap())
        .collect()
}
