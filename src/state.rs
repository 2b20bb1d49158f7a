use crate::{
    config::RuntimeConfiguration,
    data::student::Student,
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, RosterResult},
    flash::Flash,
    maud_conveniences::{render_flashes, render_nav},
};
use maud::{DOCTYPE, Markup, html};
use snafu::ResultExt;
use sqlx::{PgConnection, Pool, Postgres, pool::PoolConnection, postgres::PgPoolOptions};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Clone, Debug)]
pub struct RosterState {
    pool: Pool<Postgres>,
    config: RuntimeConfiguration,
    schema_ready: Arc<OnceCell<()>>,
}

impl RosterState {
    /// Connections are only opened on first use, so an unreachable store doesn't stop the server from starting.
    pub fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> Self {
        let db_config = config.db_config();
        let pool = options
            .acquire_timeout(db_config.acquire_timeout())
            .connect_lazy_with(db_config.connect_options());

        Self::with_pool(pool, config)
    }

    fn with_pool(pool: Pool<Postgres>, config: RuntimeConfiguration) -> Self {
        Self {
            pool,
            config,
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// Runs migrations, seeds the demo student if asked to, and reports how many students exist.
    async fn prepare_database(&self, conn: &mut PgConnection) -> RosterResult<()> {
        //`run_direct` is what `run` does for a bare connection, minus the `Acquire` bound that makes handler futures non-Send
        sqlx::migrate!().run_direct(&mut *conn).await.context(MigrateSnafu)?;

        if self.config.seed_demo_student() && Student::seed_demo(conn).await? {
            info!("Seeded demo student");
        }
        let count = Student::count(conn).await?;
        info!(count, "Students in roster");

        Ok(())
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, flashes: &[Flash], markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Student Roster" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav())
                    main class="w-full max-w-4xl p-8 flex flex-col space-y-4" {
                        (render_flashes(flashes))
                        (markup)
                    }
                }
            }
        }
    }

    /// The first connection that comes back also prepares the database. A failed preparation is retried on the next call.
    pub async fn get_connection(&self) -> RosterResult<PoolConnection<Postgres>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)?;

        let prepare_on: &mut PgConnection = &mut conn;
        self.schema_ready
            .get_or_try_init(move || async move { self.prepare_database(prepare_on).await })
            .await?;

        Ok(conn)
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}
