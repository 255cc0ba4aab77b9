use pgprobe::config::db::{PoolSettings, TlsFiles, TlsSettings, TlsVerify};
use pgprobe::{AppError, ConnectionManager};
use sea_orm::ConnectionTrait;
use test_support::certs::{certs_dir_with, complete_certs_dir, CA, CERT, KEY};
use test_support::mock_db::postgres;

// Nothing listens on the discard port; a connection attempt would fail loudly.
const UNREACHABLE: &str = "postgresql+sqlx://svc:pw@127.0.0.1:9/app";

fn pool() -> PoolSettings {
    PoolSettings::new(5, 5, false).unwrap()
}

#[tokio::test]
async fn missing_tls_file_fails_before_any_connection() {
    for present in [vec![], vec![CA], vec![CA, CERT], vec![CERT, KEY]] {
        let dir = certs_dir_with(&present);
        let tls = TlsSettings::required(TlsFiles::in_dir(dir.path()));

        let err = ConnectionManager::open(UNREACHABLE, &pool(), &tls).unwrap_err();
        match err {
            AppError::Config { detail } => {
                assert!(detail.contains("SSL certificate files not found"), "{detail}")
            }
            other => panic!("expected Config error for {present:?}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn complete_tls_files_build_a_usable_session_factory() {
    let dir = complete_certs_dir();
    for verify in [
        TlsVerify::Full,
        TlsVerify::CaOnly,
        TlsVerify::InsecureSkipVerify,
    ] {
        let tls = TlsSettings::required(TlsFiles::in_dir(dir.path())).with_verify(verify);
        let manager = ConnectionManager::open(UNREACHABLE, &pool(), &tls)
            .expect("construction must not need the network");

        assert!(!manager.is_closed());
        assert_eq!(
            manager.connection().get_database_backend(),
            sea_orm::DatabaseBackend::Postgres
        );
        manager.close().await.unwrap();
    }
}

#[tokio::test]
async fn files_are_checked_even_when_paths_are_given_individually() {
    let dir = complete_certs_dir();
    let files = TlsFiles {
        ca: dir.path().join(CA),
        cert: dir.path().join(CERT),
        key: dir.path().join("client.key"),
    };
    let err = ConnectionManager::open(UNREACHABLE, &pool(), &TlsSettings::required(files))
        .unwrap_err()
        .to_string();
    assert!(err.contains("client.key"));
    assert!(!err.contains(KEY));
}

#[tokio::test]
async fn unsupported_scheme_is_a_configuration_error() {
    let err = ConnectionManager::open(
        "mysql://svc:pw@127.0.0.1:3306/app",
        &pool(),
        &TlsSettings::disabled(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Config { .. }));
}

#[tokio::test]
async fn close_is_idempotent_and_blocks_new_sessions() {
    let manager = ConnectionManager::open(UNREACHABLE, &pool(), &TlsSettings::disabled()).unwrap();

    manager.close().await.unwrap();
    manager.close().await.unwrap();
    assert!(manager.is_closed());

    let err = manager.session().await.unwrap_err();
    assert!(matches!(err, AppError::Connection { .. }));
}

#[tokio::test]
async fn clones_share_the_closed_state() {
    let manager = ConnectionManager::from_connection(postgres().into_connection());
    let clone = manager.clone();

    clone.close().await.unwrap();
    assert!(manager.is_closed());
    assert!(manager.session().await.is_err());
}

#[tokio::test]
async fn close_engine_disposes_an_explicit_engine() {
    let manager = ConnectionManager::from_connection(postgres().into_connection());
    let other = postgres().into_connection();

    manager.close_engine(Some(other)).await.unwrap();
    // Our own pool is untouched.
    assert!(!manager.is_closed());
    let txn = manager.session().await.unwrap();
    txn.commit().await.unwrap();

    manager.close_engine(None).await.unwrap();
    assert!(manager.is_closed());
}
