use serde::{Deserialize, Serialize};

/// Anything with a numeric id that a list can be keyed on.
pub trait Identified {
    fn id(&self) -> u64;
}

/// Records that accept a partial update. Fields absent from the patch keep
/// their previous value.
pub trait Patchable: Identified {
    type Patch: Identified;

    fn merge(&mut self, patch: Self::Patch);
}

/// A locally registered account.
///
/// The demo account only carries the identity fields, so the rest are optional
/// to let either shape round-trip through storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl User {
    /// Name shown in greetings: first name, then username, then email.
    pub fn display_name(&self) -> &str {
        [&self.first_name, &self.username, &self.email]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("User")
    }
}

/// What the sign-up form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub age: Option<u32>,
}

/// An authenticated session. Only exists while logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub todo: String,
    pub completed: bool,
    #[serde(default)]
    pub user_id: u64,
}

impl Identified for Task {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Patchable for Task {
    type Patch = TaskPatch;

    fn merge(&mut self, patch: TaskPatch) {
        if let Some(todo) = patch.todo {
            self.todo = todo;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(user_id) = patch.user_id {
            self.user_id = user_id;
        }
    }
}

/// Partial task, as returned by the update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
}

impl Identified for TaskPatch {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Body of `POST /todos/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub todo: String,
    pub completed: bool,
    pub user_id: u64,
}

/// Body of `PUT /todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFields {
    pub todo: String,
    pub completed: bool,
}

/// Response of `DELETE /todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTask {
    pub id: u64,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub deleted_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u64,
}

/// Catalog entry. Read-only from our side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Identified for Product {
    fn id(&self) -> u64 {
        self.id
    }
}

/// One window of a remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_absent_fields() {
        let mut task = Task {
            id: 7,
            todo: "Water the plants".into(),
            completed: false,
            user_id: 3,
        };
        task.merge(TaskPatch {
            id: 7,
            completed: Some(true),
            ..Default::default()
        });

        assert_eq!(task.todo, "Water the plants");
        assert!(task.completed);
        assert_eq!(task.user_id, 3);
    }

    #[test]
    fn demo_user_shape_parses() {
        let raw = r#"{"id":1,"email":"emily@example.com","username":"emily","firstName":"Emily","lastName":"Johnson"}"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.display_name(), "Emily");
        assert!(user.password.is_none());
    }

    #[test]
    fn product_tolerates_missing_optional_fields() {
        let raw = r#"{"id":3,"title":"Mens Cotton Jacket","price":55.99,"rating":{"rate":4.7,"count":500}}"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.category, "");
        assert!(product.images.is_empty());
        assert_eq!(product.rating.map(|r| r.count), Some(500));
    }
}
