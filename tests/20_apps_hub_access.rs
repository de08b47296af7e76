//! Store-backed checks for the apps-hub enablement model and the CRUD
//! delete/clear contracts. These need a reachable Postgres: they run when
//! DATABASE_URL is set and skip silently otherwise. Each test works inside
//! its own throwaway schema so parallel runs never collide.

use std::str::FromStr;

use anyhow::Result;
use serde_json::json;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

use edvirons_api::entity::EntityKind;
use edvirons_api::services::apps_hub_service::{AccessPatch, AppFilters, GlobalAppInput};
use edvirons_api::services::{AppsHubService, CrudService};

struct TestDb {
    pool: PgPool,
    schema: String,
}

impl TestDb {
    /// None when DATABASE_URL is absent (the test skips).
    async fn connect() -> Result<Option<TestDb>> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set; skipping store-backed test");
                return Ok(None);
            }
        };

        let schema = format!("edvirons_it_{}", Uuid::new_v4().simple());

        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await?;
        sqlx::query(&format!("CREATE SCHEMA \"{}\"", schema))
            .execute(&admin)
            .await?;

        let opts = PgConnectOptions::from_str(&url)?
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect_with(opts)
            .await?;

        let db = TestDb { pool, schema };
        db.create_tables().await?;
        Ok(Some(db))
    }

    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE global_apps (
                id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                name text NOT NULL,
                description text,
                category text NOT NULL,
                icon text,
                rating float8 NOT NULL DEFAULT 0,
                tags text[] NOT NULL DEFAULT '{}',
                is_featured bool NOT NULL DEFAULT false,
                is_trending bool NOT NULL DEFAULT false,
                is_recommended bool NOT NULL DEFAULT false,
                is_essential bool NOT NULL DEFAULT false,
                is_premium bool NOT NULL DEFAULT false,
                status text NOT NULL DEFAULT 'active',
                min_tier text NOT NULL DEFAULT 'basic',
                is_globally_available bool NOT NULL DEFAULT true,
                created_at timestamptz NOT NULL DEFAULT now(),
                updated_at timestamptz NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE tenant_app_access (
                id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                tenant_id uuid NOT NULL,
                app_id uuid NOT NULL,
                is_enabled bool NOT NULL DEFAULT false,
                custom_name text,
                custom_description text,
                custom_icon text,
                changed_by uuid,
                created_at timestamptz NOT NULL DEFAULT now(),
                updated_at timestamptz NOT NULL DEFAULT now(),
                UNIQUE (tenant_id, app_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE devices (
                id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                institution_id uuid NOT NULL,
                serial_number text NOT NULL,
                model text,
                assigned_to uuid,
                status text,
                created_at timestamptz NOT NULL DEFAULT now(),
                updated_at timestamptz NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn teardown(self) -> Result<()> {
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn app_input(name: &str) -> GlobalAppInput {
    GlobalAppInput {
        name: name.to_string(),
        description: None,
        category: "learning".to_string(),
        icon: None,
        rating: 0.0,
        tags: vec![],
        is_featured: false,
        is_trending: false,
        is_recommended: false,
        is_essential: false,
        is_premium: false,
        status: "active".to_string(),
        min_tier: None,
        is_globally_available: true,
    }
}

fn enable() -> AccessPatch {
    AccessPatch {
        is_enabled: Some(true),
        ..Default::default()
    }
}

fn disable() -> AccessPatch {
    AccessPatch {
        is_enabled: Some(false),
        ..Default::default()
    }
}

#[tokio::test]
async fn marketplace_lists_only_active_available_enabled_apps() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    let service = AppsHubService::with_pool(db.pool.clone());
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    let visible = service.create_global_app(&app_input("Visible")).await?;
    let mut hidden = app_input("Hidden");
    hidden.is_globally_available = false;
    let hidden = service.create_global_app(&hidden).await?;
    let mut draft = app_input("Draft");
    draft.status = "draft".to_string();
    let draft = service.create_global_app(&draft).await?;

    // No access rows yet: nothing is listed even though apps are active
    let listed = service.list_for_tenant(tenant, &AppFilters::default()).await?;
    assert!(listed.is_empty());

    for app in [&visible, &hidden, &draft] {
        service
            .set_tenant_app_access(tenant, app.id, &enable(), operator)
            .await?;
    }

    // Enablement alone is not enough; the app must also be active and
    // globally available
    let listed = service.list_for_tenant(tenant, &AppFilters::default()).await?;
    let names: Vec<&str> = listed.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Visible"]);

    db.teardown().await
}

#[tokio::test]
async fn disable_is_idempotent_and_always_hides_the_app() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    let service = AppsHubService::with_pool(db.pool.clone());
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    let app = service.create_global_app(&app_input("Mathletics")).await?;

    // Disabling before any enable: upsert creates a disabled row
    service
        .set_tenant_app_access(tenant, app.id, &disable(), operator)
        .await?;
    assert!(service
        .list_for_tenant(tenant, &AppFilters::default())
        .await?
        .is_empty());

    service
        .set_tenant_app_access(tenant, app.id, &enable(), operator)
        .await?;
    assert_eq!(
        service
            .list_for_tenant(tenant, &AppFilters::default())
            .await?
            .len(),
        1
    );

    // Disable twice; the second call is a no-op merge, not an error
    for _ in 0..2 {
        let access = service
            .set_tenant_app_access(tenant, app.id, &disable(), operator)
            .await?;
        assert!(!access.is_enabled);
        assert!(service
            .list_for_tenant(tenant, &AppFilters::default())
            .await?
            .is_empty());
    }

    db.teardown().await
}

#[tokio::test]
async fn cosmetic_overrides_merge_without_clobbering_enablement() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    let service = AppsHubService::with_pool(db.pool.clone());
    let tenant = Uuid::new_v4();
    let operator = Uuid::new_v4();

    let app = service.create_global_app(&app_input("Mathletics")).await?;
    service
        .set_tenant_app_access(tenant, app.id, &enable(), operator)
        .await?;

    // Patch only the name: is_enabled keeps its current value on merge
    let patch = AccessPatch {
        custom_name: Some("Numeracy Lab".to_string()),
        ..Default::default()
    };
    let access = service
        .set_tenant_app_access(tenant, app.id, &patch, operator)
        .await?;
    assert!(access.is_enabled);

    let listed = service.list_for_tenant(tenant, &AppFilters::default()).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Numeracy Lab");
    assert_eq!(listed[0].global_name, "Mathletics");

    db.teardown().await
}

#[tokio::test]
async fn entity_delete_is_idempotent_and_null_clears_columns() -> Result<()> {
    let Some(db) = TestDb::connect().await? else {
        return Ok(());
    };
    let service = CrudService::with_pool(db.pool.clone());
    let institution = Uuid::new_v4();
    let holder = Uuid::new_v4();

    let row = service
        .create(
            EntityKind::Device,
            institution,
            &json!({ "serial_number": "SN-1001", "assigned_to": holder }),
        )
        .await?;
    let id: Uuid = row["id"].as_str().unwrap().parse()?;
    assert_eq!(row["assigned_to"], json!(holder));

    // Explicit null clears the optional uuid column
    let updated = service
        .update(
            EntityKind::Device,
            institution,
            id,
            &json!({ "assigned_to": null }),
        )
        .await?;
    assert_eq!(updated["assigned_to"], serde_json::Value::Null);

    // Deleting twice succeeds both times; a later get is the only 404
    service.delete(EntityKind::Device, institution, id).await?;
    service.delete(EntityKind::Device, institution, id).await?;
    let err = service
        .get(EntityKind::Device, institution, id)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);

    // Deleting an id that never existed is also a success
    service
        .delete(EntityKind::Device, institution, Uuid::new_v4())
        .await?;

    db.teardown().await
}
