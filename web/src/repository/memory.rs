//! In-process repository backed by ordered maps.

use super::{RepositoryError, Result, TodoRepository, UserRepository};
use crate::model::{NewTodo, NewUser, Todo, TodoChanges, User, UserChanges};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    todos: BTreeMap<i64, Todo>,
    last_user_id: i64,
    last_todo_id: i64,
}

/// Repository holding everything in memory, with auto-increment ids
/// starting at 1.
///
/// Clones share the same tables.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use todolist_web::model::NewUser;
/// use todolist_web::repository::{InMemoryRepository, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = InMemoryRepository::new();
/// let user = repo
///     .create_user(NewUser {
///         username: None,
///         email: "a@b.com".into(),
///         password_hash: "hash".into(),
///         created_at: Utc::now(),
///     })
///     .await?;
/// assert_eq!(user.id, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| RepositoryError::Internal("repository lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| RepositoryError::Internal("repository lock poisoned".to_string()))
    }
}

const fn todo_not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound { resource: "Todo", id }
}

const fn user_not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound { resource: "User", id }
}

impl UserRepository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::DuplicateEmail(user.email));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User> {
        let mut tables = self.write()?;
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(RepositoryError::DuplicateEmail(email.clone()));
            }
        }

        let user = tables.users.get_mut(&id).ok_or(user_not_found(id))?;
        changes.apply(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> Result<usize> {
        let mut tables = self.write()?;
        tables.users.remove(&id).ok_or(user_not_found(id))?;

        let before = tables.todos.len();
        tables.todos.retain(|_, todo| todo.user_id != id);
        Ok(before - tables.todos.len())
    }
}

impl TodoRepository for InMemoryRepository {
    async fn create_todo(&self, user_id: i64, todo: NewTodo) -> Result<Todo> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound {
                resource: "User",
                id: user_id,
            });
        }
        tables.last_todo_id += 1;
        let todo = Todo {
            id: tables.last_todo_id,
            title: todo.title,
            content: todo.content,
            completed: todo.completed,
            published: todo.published,
            user_id,
            created_at: todo.created_at,
            updated_at: todo.created_at,
        };
        tables.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>> {
        Ok(self
            .read()?
            .todos
            .values()
            .filter(|todo| todo.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, user_id: i64, id: i64) -> Result<Option<Todo>> {
        Ok(self
            .read()?
            .todos
            .get(&id)
            .filter(|todo| todo.user_id == user_id)
            .cloned())
    }

    async fn update_todo(&self, user_id: i64, id: i64, changes: TodoChanges) -> Result<Todo> {
        let mut tables = self.write()?;
        let todo = tables
            .todos
            .get_mut(&id)
            .filter(|todo| todo.user_id == user_id)
            .ok_or(todo_not_found(id))?;
        changes.apply(todo);
        Ok(todo.clone())
    }

    async fn delete_todo(&self, user_id: i64, id: i64) -> Result<()> {
        let mut tables = self.write()?;
        match tables.todos.get(&id) {
            Some(todo) if todo.user_id == user_id => {
                tables.todos.remove(&id);
                Ok(())
            },
            _ => Err(todo_not_found(id)),
        }
    }

    async fn delete_todos(&self, user_id: i64) -> Result<usize> {
        let mut tables = self.write()?;
        let before = tables.todos.len();
        tables.todos.retain(|_, todo| todo.user_id != user_id);
        Ok(before - tables.todos.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: None,
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: now(),
        }
    }

    fn new_todo(title: &str) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            content: None,
            completed: false,
            published: false,
            created_at: now(),
        }
    }

    #[tokio::test]
    async fn ids_increment_from_one() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.create_user(new_user("a@b.com")).await.unwrap().id, 1);
        assert_eq!(repo.create_user(new_user("c@d.com")).await.unwrap().id, 2);
        assert_eq!(repo.create_todo(1, new_todo("x")).await.unwrap().id, 1);
        assert_eq!(repo.create_todo(2, new_todo("y")).await.unwrap().id, 2);
    }

    #[tokio::test]
    async fn todo_needs_an_existing_owner() {
        let repo = InMemoryRepository::new();
        let user = repo.create_user(new_user("a@b.com")).await.unwrap();
        repo.delete_user(user.id).await.unwrap();

        assert_eq!(
            repo.create_todo(user.id, new_todo("orphan")).await,
            Err(RepositoryError::NotFound {
                resource: "User",
                id: user.id,
            })
        );
        assert!(repo.read().unwrap().todos.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_creates_nothing() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("a@b.com")).await.unwrap();

        let err = repo.create_user(new_user("a@b.com")).await.unwrap_err();
        assert_eq!(err, RepositoryError::DuplicateEmail("a@b.com".into()));
        assert_eq!(repo.read().unwrap().users.len(), 1);
    }

    #[tokio::test]
    async fn update_rejects_an_email_in_use() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("a@b.com")).await.unwrap();
        let second = repo.create_user(new_user("c@d.com")).await.unwrap();

        let taken = UserChanges {
            email: Some("a@b.com".into()),
            ..UserChanges::default()
        };
        assert!(matches!(
            repo.update_user(second.id, taken).await,
            Err(RepositoryError::DuplicateEmail(_))
        ));

        let own = UserChanges {
            email: Some("c@d.com".into()),
            username: Some("cd".into()),
            ..UserChanges::default()
        };
        let updated = repo.update_user(second.id, own).await.unwrap();
        assert_eq!(updated.username.as_deref(), Some("cd"));
    }

    #[tokio::test]
    async fn todos_of_other_users_are_invisible() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("a@b.com")).await.unwrap();
        let todo = repo.create_todo(1, new_todo("mine")).await.unwrap();

        assert!(repo.find_todo(2, todo.id).await.unwrap().is_none());
        assert!(repo.list_todos(2).await.unwrap().is_empty());
        assert_eq!(
            repo.delete_todo(2, todo.id).await,
            Err(todo_not_found(todo.id))
        );

        let changes = TodoChanges {
            title: Some("theirs".into()),
            content: None,
            completed: None,
            published: None,
            updated_at: now(),
        };
        assert_eq!(
            repo.update_todo(2, todo.id, changes).await,
            Err(todo_not_found(todo.id))
        );
        assert_eq!(repo.find_todo(1, todo.id).await.unwrap().unwrap().title, "mine");
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let repo = InMemoryRepository::new();
        let alice = repo.create_user(new_user("a@b.com")).await.unwrap();
        let bob = repo.create_user(new_user("c@d.com")).await.unwrap();
        repo.create_todo(alice.id, new_todo("one")).await.unwrap();
        repo.create_todo(alice.id, new_todo("two")).await.unwrap();
        repo.create_todo(bob.id, new_todo("three")).await.unwrap();

        assert_eq!(repo.delete_user(alice.id).await.unwrap(), 2);
        assert!(repo.find_user(alice.id).await.unwrap().is_none());
        assert!(repo.list_todos(alice.id).await.unwrap().is_empty());
        assert_eq!(repo.list_todos(bob.id).await.unwrap().len(), 1);
        assert_eq!(
            repo.delete_user(alice.id).await,
            Err(user_not_found(alice.id))
        );
    }

    #[tokio::test]
    async fn delete_todos_counts() {
        let repo = InMemoryRepository::new();
        repo.create_user(new_user("a@b.com")).await.unwrap();
        repo.create_user(new_user("c@d.com")).await.unwrap();
        repo.create_todo(1, new_todo("a")).await.unwrap();
        repo.create_todo(1, new_todo("b")).await.unwrap();
        repo.create_todo(2, new_todo("c")).await.unwrap();

        assert_eq!(repo.delete_todos(1).await.unwrap(), 2);
        assert_eq!(repo.delete_todos(1).await.unwrap(), 0);
        assert_eq!(repo.list_todos(2).await.unwrap().len(), 1);
    }
}
