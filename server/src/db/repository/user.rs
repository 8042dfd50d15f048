//! User Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{User, UserCreate, UserRole};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let record = self.base.parse_id(id, "user")?;
        let user: Option<User> = self.base.db().select(record).await?;
        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Duplicate checks give readable errors; unique indexes are the backstop
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already exists",
                data.email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let display_name = data.display_name.unwrap_or_else(|| data.username.clone());

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    username = $username,
                    email = $email,
                    display_name = $display_name,
                    hash_pass = $hash_pass,
                    role = $role,
                    is_active = true,
                    created_at = time::now()
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("email", data.email))
            .bind(("display_name", display_name))
            .bind(("hash_pass", hash_pass))
            .bind(("role", data.role))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Create an admin user, or rotate the password when the username exists
    ///
    /// Used only by the out-of-band bootstrap binary.
    pub async fn create_or_update_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> RepoResult<User> {
        if let Some(existing) = self.find_by_username(username).await? {
            if existing.role != UserRole::Admin {
                return Err(RepoError::Validation(format!(
                    "User '{}' exists but is not an admin",
                    username
                )));
            }
            let hash_pass = User::hash_password(password)
                .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
            let id = existing
                .id
                .clone()
                .ok_or_else(|| RepoError::Database("Admin user has no id".to_string()))?;
            let mut result = self
                .base
                .db()
                .query("UPDATE $user SET hash_pass = $hash_pass RETURN AFTER")
                .bind(("user", id))
                .bind(("hash_pass", hash_pass))
                .await?;
            return result
                .take::<Option<User>>(0)?
                .ok_or_else(|| RepoError::Database("Failed to update admin".to_string()));
        }

        self.create(UserCreate {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            display_name: None,
            role: UserRole::Admin,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::local::Mem;

    async fn test_repo() -> UserRepository {
        let db = Surreal::new::<Mem>(()).await.expect("mem db");
        db.use_ns("farmacia").use_db("farmacia").await.expect("ns");
        crate::db::schema::initialize(&db).await.expect("schema");
        UserRepository::new(db)
    }

    fn payload(username: &str, email: &str) -> UserCreate {
        UserCreate {
            username: username.to_string(),
            email: email.to_string(),
            password: "contrasena-segura".to_string(),
            display_name: None,
            role: UserRole::Customer,
        }
    }

    #[tokio::test]
    async fn test_create_and_verify_password() {
        let repo = test_repo().await;

        let user = repo
            .create(payload("maria", "maria@example.com"))
            .await
            .expect("create");

        assert_eq!(user.role, UserRole::Customer);
        assert!(user.is_active);
        // display_name falls back to the username
        assert_eq!(user.display_name, "maria");
        assert!(user.verify_password("contrasena-segura").expect("verify"));
        assert!(!user.verify_password("otra-cosa").expect("verify"));
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let repo = test_repo().await;
        repo.create(payload("maria", "maria@example.com"))
            .await
            .expect("first");

        let err = repo
            .create(payload("maria", "otra@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = repo
            .create(payload("otra", "maria@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_by_username_and_email() {
        let repo = test_repo().await;
        repo.create(payload("maria", "maria@example.com"))
            .await
            .expect("create");

        assert!(repo.find_by_username("maria").await.expect("find").is_some());
        assert!(repo.find_by_username("nadie").await.expect("find").is_none());
        assert!(
            repo.find_by_email("maria@example.com")
                .await
                .expect("find")
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_admin_bootstrap() {
        let repo = test_repo().await;

        let admin = repo
            .create_or_update_admin("jefe", "jefe@example.com", "clave-inicial")
            .await
            .expect("create admin");
        assert_eq!(admin.role, UserRole::Admin);

        // Re-running rotates the password in place
        let rotated = repo
            .create_or_update_admin("jefe", "jefe@example.com", "clave-nueva")
            .await
            .expect("rotate");
        assert_eq!(rotated.id_string(), admin.id_string());
        assert!(rotated.verify_password("clave-nueva").expect("verify"));
        assert!(!rotated.verify_password("clave-inicial").expect("verify"));

        // A non-admin holding the username is never promoted
        repo.create(payload("maria", "maria@example.com"))
            .await
            .expect("customer");
        let err = repo
            .create_or_update_admin("maria", "maria@example.com", "clave")
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
