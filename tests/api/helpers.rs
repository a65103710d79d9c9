use once_cell::sync::Lazy;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::SocketAddr;
use subtrack::{
    configuration::{get_configuration, DatabaseSettings, Settings},
    authentication::WORKFLOW_SECRET_HEADER,
    email_client::EmailClient,
    startup::{get_connection_pool, Application},
    telemetry::{get_subscriber, init_subscriber},
};
use uuid::Uuid;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let name = "test";
    let default_env_filter = "info";
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name.into(), default_env_filter.into(), std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name.into(), default_env_filter.into(), std::io::sink);
        init_subscriber(subscriber);
    }
});

static FAILED_TO_EXECUTE_REQUEST: &str = "Failed to execute request";

pub struct TestApp {
    pub address: SocketAddr,
    pub db_pool: PgPool,
    pub email_server: MockServer,
    pub email_client: EmailClient,
    pub workflow_secret: String,
    client: Client,
}

/// A registered account together with its access token.
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Starts the API on a random port with a fresh database, after letting
    /// the caller adjust the configuration.
    pub async fn spawn_with(customize: impl FnOnce(&mut Settings)) -> Self {
        Lazy::force(&TRACING);

        let mut config = get_configuration().expect("Failed to read configuration");
        config.database.database_name = Uuid::new_v4().to_string();
        config.application.port = 0;

        let db_pool = configure_database(&config.database).await;
        let email_server = MockServer::start().await;
        config.email_client.base_url = email_server.uri();
        customize(&mut config);

        let email_client = config
            .email_client
            .client()
            .expect("Failed to build email client");
        let workflow_secret = config.application.workflow_secret.expose_secret().clone();
        let app = Application::build(config)
            .await
            .expect("Failed to build application");
        let address = app.local_addr().expect("Failed to get local address");

        tokio::spawn(app.run_until_stopped());

        Self {
            address,
            db_pool,
            email_server,
            email_client,
            workflow_secret,
            client: Client::new(),
        }
    }

    pub async fn get_health_check(&self) -> Response {
        self.send(self.client.get(self.url("/health_check"))).await
    }

    pub async fn get(&self, endpoint: &str, token: Option<&str>) -> Response {
        self.send(authorized(self.client.get(self.api_url(endpoint)), token))
            .await
    }

    pub async fn post(&self, endpoint: &str, body: &Value, token: Option<&str>) -> Response {
        self.send(authorized(self.client.post(self.api_url(endpoint)), token).json(body))
            .await
    }

    pub async fn put(&self, endpoint: &str, body: &Value, token: Option<&str>) -> Response {
        self.send(authorized(self.client.put(self.api_url(endpoint)), token).json(body))
            .await
    }

    pub async fn delete(&self, endpoint: &str, token: Option<&str>) -> Response {
        self.send(authorized(self.client.delete(self.api_url(endpoint)), token))
            .await
    }

    /// Posts to a workflow callback, presenting `secret` when given.
    pub async fn post_workflow(&self, endpoint: &str, body: &Value, secret: Option<&str>) -> Response {
        let mut request = self.client.post(self.api_url(endpoint)).json(body);
        if let Some(secret) = secret {
            request = request.header(WORKFLOW_SECRET_HEADER, secret);
        }

        self.send(request).await
    }

    pub async fn post_register(&self, body: &Value) -> Response {
        self.post("/auth/register", body, None).await
    }

    pub async fn post_login(&self, body: &Value) -> Response {
        self.post("/auth/login", body, None).await
    }

    /// Registers a random account and returns it with its token.
    pub async fn register_user(&self) -> TestUser {
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("User {}", &id[..8]);
        let email = format!("{id}@example.com");
        let password = Uuid::new_v4().to_string();

        let response = self
            .post_register(&json!({
                "name": name,
                "email": email,
                "password": password,
            }))
            .await;
        assert_eq!(response.status(), 201);

        let body = json_body(response).await;
        TestUser {
            id: body["data"]["user"]["id"]
                .as_str()
                .and_then(|id| Uuid::parse_str(id).ok())
                .expect("Registered user has no id"),
            name,
            email,
            password,
            token: body["data"]["token"]
                .as_str()
                .expect("Registration issued no token")
                .to_owned(),
        }
    }

    /// Creates a subscription for `user` and returns the stored record.
    pub async fn create_subscription(&self, user: &TestUser, body: &Value) -> Value {
        let response = self.post("/subscriptions", body, Some(&user.token)).await;
        assert_eq!(response.status(), 201);

        json_body(response).await["data"].take()
    }

    async fn send(&self, request: RequestBuilder) -> Response {
        request.send().await.expect(FAILED_TO_EXECUTE_REQUEST)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("http://{}{endpoint}", self.address)
    }

    fn api_url(&self, endpoint: &str) -> String {
        self.url(&format!("/api/v1{endpoint}"))
    }
}

pub async fn json_body(response: Response) -> Value {
    response
        .json()
        .await
        .expect("Response body is not valid JSON")
}

/// A valid creation body for a monthly subscription that started `days_ago`
/// days ago.
pub fn subscription_body(days_ago: i64) -> Value {
    let start_date = time::OffsetDateTime::now_utc() - time::Duration::days(days_ago);

    json!({
        "name": "Netflix Premium",
        "description": "Family streaming plan",
        "price": 15.49,
        "currency": "USD",
        "frequency": "monthly",
        "category": "Entertainment",
        "paymentMethod": "Credit Card",
        "startDate": start_date
            .format(&time::format_description::well_known::Rfc3339)
            .expect("Failed to format start date"),
    })
}

fn authorized(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn configure_database(configuration: &DatabaseSettings) -> PgPool {
    let mut conn = PgConnection::connect_with(&configuration.without_db())
        .await
        .expect("Failed to connect to Postgres");

    conn.execute(format!(r#"CREATE DATABASE "{}";"#, configuration.database_name).as_str())
        .await
        .expect("Failed to create database");

    let pool = get_connection_pool(configuration);

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}
