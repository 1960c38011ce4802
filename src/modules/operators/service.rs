use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

use super::model::{
    CreateOperatorDto, FilterOperatorsRequest, FilterOperatorsResponse, MIN_LEVEL, Operator,
    OperatorRole, OperatorStatus, UpdateOperatorDto,
};

/// Column list shared by every operator query; the password hash is never
/// selected into an [`Operator`].
pub(crate) const OPERATOR_COLUMNS: &str =
    "id, uuid, name, email, status, role, level, notes, last_login, created_at, last_modified";

/// Shared WHERE clause for the filter endpoint: name/email substring
/// matches, status exact, each criterion skipped when its bind is null.
const FILTER_WHERE: &str = "($1::text IS NULL OR name ILIKE '%' || $1 || '%')
       AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%')
       AND ($3::operator_status IS NULL OR status = $3)";

fn sort_column(field: &str) -> Result<&'static str, AppError> {
    match field {
        "id" => Ok("id"),
        "name" => Ok("name"),
        "email" => Ok("email"),
        "status" => Ok("status"),
        "role" => Ok("role"),
        "level" => Ok("level"),
        "lastLogin" => Ok("last_login"),
        "createdAt" => Ok("created_at"),
        "lastModified" => Ok("last_modified"),
        other => Err(AppError::bad_request(format!(
            "Invalid sort field: {}",
            other
        ))),
    }
}

pub struct OperatorService;

impl OperatorService {
    pub async fn get_all(db: &PgPool) -> Result<Vec<Operator>, AppError> {
        let sql = format!("SELECT {} FROM operators ORDER BY id", OPERATOR_COLUMNS);
        let operators = sqlx::query_as::<_, Operator>(&sql).fetch_all(db).await?;

        Ok(operators)
    }

    pub async fn get(db: &PgPool, id: i32) -> Result<Operator, AppError> {
        let sql = format!("SELECT {} FROM operators WHERE id = $1", OPERATOR_COLUMNS);
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found("Operator not found"))?;

        Ok(operator)
    }

    #[instrument(skip(db, req))]
    pub async fn filter(
        db: &PgPool,
        req: FilterOperatorsRequest,
    ) -> Result<FilterOperatorsResponse, AppError> {
        let query = req.query.clone().unwrap_or_default();

        let (order_column, descending) = match &req.sort {
            Some(sort) => {
                let column = sort_column(&sort.field)?;
                let descending = match sort.direction.as_deref() {
                    Some(dir) if dir.eq_ignore_ascii_case("desc") => true,
                    Some(dir) if dir.eq_ignore_ascii_case("asc") => false,
                    None => false,
                    Some(other) => {
                        return Err(AppError::bad_request(format!(
                            "Invalid sort direction: {}",
                            other
                        )));
                    }
                };
                (column, descending)
            }
            None => ("id", false),
        };

        let count_sql = format!("SELECT COUNT(*) FROM operators WHERE {}", FILTER_WHERE);
        let total_items: i64 = sqlx::query_scalar(&count_sql)
            .bind(&query.name)
            .bind(&query.email)
            .bind(query.status)
            .fetch_one(db)
            .await?;

        let items_sql = format!(
            "SELECT {} FROM operators WHERE {} ORDER BY {} {} LIMIT $4 OFFSET $5",
            OPERATOR_COLUMNS,
            FILTER_WHERE,
            order_column,
            if descending { "DESC" } else { "ASC" },
        );
        let items = sqlx::query_as::<_, Operator>(&items_sql)
            .bind(&query.name)
            .bind(&query.email)
            .bind(query.status)
            .bind(req.page_size())
            .bind(req.offset())
            .fetch_all(db)
            .await?;

        let total_pages = (total_items + req.page_size() - 1) / req.page_size();

        Ok(FilterOperatorsResponse {
            items,
            total_items,
            total_pages,
            page_index: req.page_index(),
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create(db: &PgPool, dto: CreateOperatorDto) -> Result<Operator, AppError> {
        if let Some(email) = &dto.email
            && Self::email_in_use(db, email, None).await?
        {
            return Err(AppError::bad_request("Email already in use"));
        }

        let password_hash = match &dto.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO operators
                 (uuid, name, email, password, status, role, level, notes, last_login, created_at, last_modified)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL, $9, $9)
             RETURNING {}",
            OPERATOR_COLUMNS
        );
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(Uuid::new_v4())
            .bind(&dto.name)
            .bind(&dto.email)
            .bind(&password_hash)
            .bind(dto.status.unwrap_or(OperatorStatus::Active))
            .bind(dto.role.unwrap_or(OperatorRole::Operator))
            .bind(dto.level.unwrap_or(MIN_LEVEL))
            .bind(dto.notes.as_deref().unwrap_or(""))
            .bind(now)
            .fetch_one(db)
            .await?;

        info!(operator_id = operator.id, "Operator created");

        Ok(operator)
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        id: i32,
        dto: UpdateOperatorDto,
    ) -> Result<Operator, AppError> {
        // Existence check first so a bad id is a 404, not a silent no-op.
        let existing = Self::get(db, id).await?;

        if let Some(email) = &dto.email
            && existing.email.as_deref() != Some(email.as_str())
            && Self::email_in_use(db, email, Some(id)).await?
        {
            return Err(AppError::bad_request("Email already in use"));
        }

        let password_hash = match &dto.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let sql = format!(
            "UPDATE operators SET
                 name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 password = COALESCE($4, password),
                 status = COALESCE($5, status),
                 role = COALESCE($6, role),
                 level = COALESCE($7, level),
                 notes = COALESCE($8, notes),
                 last_modified = $9
             WHERE id = $1
             RETURNING {}",
            OPERATOR_COLUMNS
        );
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.email)
            .bind(&password_hash)
            .bind(dto.status)
            .bind(dto.role)
            .bind(dto.level)
            .bind(&dto.notes)
            .bind(Utc::now())
            .fetch_one(db)
            .await?;

        info!(operator_id = id, "Operator updated");

        Ok(operator)
    }

    /// Soft delete: flips the status to `deleted`. The row, its uuid, and
    /// its email stay behind.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: i32) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE operators SET status = 'deleted', last_modified = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Operator not found"));
        }

        info!(operator_id = id, "Operator soft-deleted");

        Ok(())
    }

    async fn email_in_use(
        db: &PgPool,
        email: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM operators WHERE email = $1 AND ($2::int IS NULL OR id <> $2)",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(db)
        .await?;

        Ok(existing.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!(sort_column("lastLogin").unwrap(), "last_login");
        assert_eq!(sort_column("id").unwrap(), "id");
        assert_eq!(sort_column("createdAt").unwrap(), "created_at");
        assert!(sort_column("password").is_err());
        assert!(sort_column("id; DROP TABLE operators").is_err());
    }
}
