//! Test harnesses for integration testing.
//!
//! `MemoryHarness` runs the services against the in-memory store and needs
//! nothing external. `TestHarness` runs them against PostgreSQL in a shared
//! testcontainer: the container and migrations are initialized once on first
//! use, then reused by every test.

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use gallery_core::kernel::{
    MemoryStore, PostgresStore, ServerDeps, TestDependencies, TestNotifier,
};
use gallery_core::{FollowGraphService, VerificationWorkflow};

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// =============================================================================
// In-memory harness
// =============================================================================

/// Services wired to a fresh `MemoryStore` and a recording notifier.
pub struct MemoryHarness {
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<TestNotifier>,
    pub deps: ServerDeps,
}

impl AsyncTestContext for MemoryHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {}
}

impl MemoryHarness {
    pub fn new() -> Self {
        Self::from_test_dependencies(TestDependencies::new())
    }

    /// Harness whose notifier fails every emit.
    pub fn with_failing_notifier() -> Self {
        Self::from_test_dependencies(TestDependencies::new().with_notifier(TestNotifier::failing()))
    }

    fn from_test_dependencies(test_deps: TestDependencies) -> Self {
        init_tracing();
        Self {
            deps: test_deps.server_deps(),
            store: test_deps.store,
            notifier: test_deps.notifier,
        }
    }

    pub fn follows(&self) -> FollowGraphService {
        FollowGraphService::new(self.deps.clone())
    }

    pub fn verification(&self) -> VerificationWorkflow {
        VerificationWorkflow::new(self.deps.clone())
    }
}

// =============================================================================
// PostgreSQL harness
// =============================================================================

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Services wired to the shared PostgreSQL database.
///
/// Tests share one database, so each test works on accounts it provisioned
/// itself and never asserts on global row counts.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let follows = ctx.follows();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Raw pool for fixtures that need to bypass the store.
    pub db_pool: PgPool,
    pub store: Arc<PostgresStore>,
    pub notifier: Arc<TestNotifier>,
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        self.db_pool.close().await;
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let store = Arc::new(PostgresStore::new(db_pool.clone()));
        let notifier = Arc::new(TestNotifier::new());
        let deps = ServerDeps::new(
            store.clone(),
            notifier.clone(),
            gallery_core::kernel::DEFAULT_STORAGE_TIMEOUT,
        );

        Ok(Self {
            db_pool,
            store,
            notifier,
            deps,
        })
    }

    pub fn follows(&self) -> FollowGraphService {
        FollowGraphService::new(self.deps.clone())
    }

    pub fn verification(&self) -> VerificationWorkflow {
        VerificationWorkflow::new(self.deps.clone())
    }
}
