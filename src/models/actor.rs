use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};

/// Operating roles. Admin and the owning promoter mutate festival resources;
/// cashiers (plus admin/promoter) operate wristbands at points of sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "actor_role", rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Promoter,
    Cashier,
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Promoter => write!(f, "promoter"),
            Self::Cashier => write!(f, "cashier"),
        }
    }
}

/// An authenticated user of the platform. Identity verification happens
/// upstream; the core only consumes `(actor_id, role)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Actor {
    pub actor_id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: ActorRole,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// New Actor for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActor {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: ActorRole,
}

impl Actor {
    pub async fn create(conn: &mut PgConnection, new_actor: NewActor) -> Result<Actor, sqlx::Error> {
        sqlx::query_as::<_, Actor>(
            r#"
            INSERT INTO actors (email, name, password_hash, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW())
            RETURNING actor_id, email, name, password_hash, role, active, created_at, updated_at
            "#,
        )
        .bind(new_actor.email.trim().to_lowercase())
        .bind(new_actor.name)
        .bind(new_actor.password_hash)
        .bind(new_actor.role)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        actor_id: i64,
    ) -> Result<Option<Actor>, sqlx::Error> {
        sqlx::query_as::<_, Actor>(
            r#"
            SELECT actor_id, email, name, password_hash, role, active, created_at, updated_at
            FROM actors
            WHERE actor_id = $1
            "#,
        )
        .bind(actor_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Actor>, sqlx::Error> {
        sqlx::query_as::<_, Actor>(
            r#"
            SELECT actor_id, email, name, password_hash, role, active, created_at, updated_at
            FROM actors
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&mut *conn)
        .await
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}
