//! Bootstrap command: root operators cannot be created through the API,
//! so the first one is seeded from the command line.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::operators::model::{MAX_LEVEL, Operator, OperatorRole, OperatorStatus};
use crate::modules::operators::service::OPERATOR_COLUMNS;
use crate::utils::password::hash_password;

pub async fn create_root_operator(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Operator> {
    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM operators WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        anyhow::bail!("An operator with email {} already exists", email);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let now = Utc::now();

    let sql = format!(
        "INSERT INTO operators
             (uuid, name, email, password, status, role, level, notes, last_login, created_at, last_modified)
         VALUES ($1, $2, $3, $4, $5, $6, $7, '', NULL, $8, $8)
         RETURNING {}",
        OPERATOR_COLUMNS
    );
    let operator = sqlx::query_as::<_, Operator>(&sql)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(OperatorStatus::Active)
        .bind(OperatorRole::Root)
        .bind(MAX_LEVEL)
        .bind(now)
        .fetch_one(pool)
        .await?;

    Ok(operator)
}
