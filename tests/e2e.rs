//! Server and client against each other over a real socket

use breachcheck::client::{BreachClient, ClientError};
use breachcheck::core::{digest, password_digest_parts, DataType, NewMembership, NewPasswordPrefix};
use breachcheck::server::{ServerBuilder, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct Running {
    client: BreachClient,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl Running {
    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.unwrap().unwrap();
    }
}

async fn start(config: ServerConfig) -> Running {
    let server = ServerBuilder::new(ServerConfig {
        no_metrics: true,
        ..config
    })
    .build()
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(server.serve(listener, async move {
        let _ = stopped.await;
    }));

    Running {
        client: BreachClient::new(format!("http://{addr}")),
        stop: Some(stop),
        task,
    }
}

#[tokio::test]
async fn test_email_lookup_roundtrip() {
    let running = start(ServerConfig::default()).await;

    let result = running.client.search_email("test@example.com").await.unwrap();
    assert!(result.found);
    assert_eq!(result.count, 1);
    assert_eq!(result.breaches[0].name, "MyFitnessPal");

    // Normalization happens before hashing.
    let again = running.client.search_email("  Test@Example.COM ").await.unwrap();
    assert_eq!(again, result);

    let missing = running.client.search_email("nobody@example.com").await.unwrap();
    assert!(!missing.found);
    assert!(missing.breaches.is_empty());

    running.shutdown().await;
}

#[tokio::test]
async fn test_phone_lookup_roundtrip() {
    let running = start(ServerConfig::default()).await;

    let result = running.client.search_phone("+15555550123").await.unwrap();
    assert!(result.found);
    assert_eq!(result.breaches[0].name, "Target");
    assert!(result.breaches[0].is_sensitive);

    running.shutdown().await;
}

#[tokio::test]
async fn test_password_check_matches_locally() {
    let running = start(ServerConfig::default()).await;

    let hit = running.client.check_password("password").await.unwrap();
    assert!(hit.found);
    assert_eq!(hit.count, 3_730_471);

    let admin = running.client.check_password("admin").await.unwrap();
    assert_eq!(admin.count, 1_523_537);

    // Case matters for passwords: different digest, unseeded prefix.
    let miss = running.client.check_password("Password").await.unwrap();
    assert!(!miss.found);
    assert_eq!(miss.count, 0);

    running.shutdown().await;
}

#[tokio::test]
async fn test_prefix_range_is_returned_whole() {
    let running = start(ServerConfig::default()).await;

    let parts = password_digest_parts("password");
    let range = running.client.prefix_range(&parts.prefix).await.unwrap();
    assert_eq!(range.len(), 2);
    assert_eq!(range.suffixes.len(), range.counts.len());

    running.shutdown().await;
}

#[tokio::test]
async fn test_admin_writes_are_visible_to_lookups() {
    let running = start(ServerConfig::default()).await;
    let client = &running.client;

    let breaches = client.breaches().await.unwrap();
    let linkedin = breaches.iter().find(|b| b.name == "LinkedIn").unwrap().id;

    let record = client
        .add_membership(&NewMembership::new(
            DataType::Email,
            digest("carol@example.com"),
            vec![linkedin],
        ))
        .await
        .unwrap();
    assert_eq!(client.membership(record.id).await.unwrap(), record);

    let result = client.search_email("carol@example.com").await.unwrap();
    assert_eq!(result.breaches[0].id, linkedin);

    let parts = password_digest_parts("correct horse battery staple");
    client
        .add_password_prefix(&NewPasswordPrefix {
            prefix: parts.prefix.to_string(),
            suffixes: vec![parts.suffix.clone()],
            counts: vec![260],
        })
        .await
        .unwrap();
    let check = client.check_password("correct horse battery staple").await.unwrap();
    assert!(check.found);
    assert_eq!(check.count, 260);

    running.shutdown().await;
}

#[tokio::test]
async fn test_rejections_carry_error_codes() {
    let running = start(ServerConfig::default()).await;
    let client = &running.client;

    let err = client
        .add_password_prefix(&NewPasswordPrefix {
            prefix: "abcde".into(),
            suffixes: vec![],
            counts: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 400, .. }));
    assert_eq!(err.code(), Some("INVALID_PREFIX"));

    let err = client.breach(404).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, .. }));
    assert_eq!(err.code(), Some("NOT_FOUND"));

    running.shutdown().await;
}

#[tokio::test]
async fn test_seed_endpoint_on_empty_server() {
    let running = start(ServerConfig {
        no_seed: true,
        ..ServerConfig::default()
    })
    .await;
    let client = &running.client;

    assert_eq!(client.health().await.unwrap().stats.breaches, 0);
    assert!(!client.search_email("test@example.com").await.unwrap().found);

    let first = client.initialize_demo().await.unwrap();
    assert!(first.seeded);
    assert_eq!(first.breaches, 4);

    let second = client.initialize_demo().await.unwrap();
    assert!(!second.seeded);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.stats.breaches, 4);

    running.shutdown().await;
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        data_file: Some(dir.path().join("breaches.bin")),
        ..ServerConfig::default()
    };

    let running = start(config.clone()).await;
    let target = running
        .client
        .breaches()
        .await
        .unwrap()
        .into_iter()
        .find(|b| b.name == "Target")
        .unwrap()
        .id;
    running
        .client
        .add_membership(&NewMembership::new(
            DataType::Phone,
            digest("+442071234567"),
            vec![target],
        ))
        .await
        .unwrap();
    running.shutdown().await;

    let restarted = start(config).await;
    let result = restarted.client.search_phone("+442071234567").await.unwrap();
    assert!(result.found);
    assert_eq!(restarted.client.breaches().await.unwrap().len(), 4);
    restarted.shutdown().await;
}
