//! Single-task detail view and form.
//!
//! Mutations go through the task client first; only a confirmed result is
//! written into the list controller. Failures are notified and leave the
//! list as it was.

use crate::api::{ResourceClient, TaskMutations};
use crate::controller::ListController;
use crate::error::{Error, Result};
use crate::models::{NewTask, Patchable, Task, TaskFields};
use crate::notify::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Add,
    View(Task),
    Edit(Task),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// Work is done, the editor should be dismissed.
    Closed,
    /// Saved an edit and switched back to viewing this task.
    Saved(Task),
}

#[derive(Debug, Clone)]
pub struct TaskEditor {
    mode: EditorMode,
    todo: String,
    completed: bool,
    saving: bool,
    user_id: Option<u64>,
}

impl TaskEditor {
    /// Blank form for a new task owned by `user_id`.
    pub fn for_new(user_id: Option<u64>) -> Self {
        Self {
            mode: EditorMode::Add,
            todo: String::new(),
            completed: false,
            saving: false,
            user_id,
        }
    }

    /// Detail view of an already fetched task.
    pub fn for_task(task: Task) -> Self {
        Self {
            todo: task.todo.clone(),
            completed: task.completed,
            mode: EditorMode::View(task),
            saving: false,
            user_id: None,
        }
    }

    /// Fetches a task and opens it in view mode.
    pub async fn open<C>(list: &ListController<C>, id: &str) -> Result<Self>
    where
        C: ResourceClient<Item = Task>,
    {
        match list.client().get_by_id(id).await {
            Ok(task) => Ok(Self::for_task(task)),
            Err(e) => {
                log::warn!("fetching task {} failed: {}", id, e);
                list.notifier().error("Failed to load task details");
                Err(e)
            }
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn todo(&self) -> &str {
        &self.todo
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn set_todo(&mut self, todo: impl Into<String>) {
        self.todo = todo.into();
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// View → Edit, with the draft reset to the task's values.
    pub fn edit(&mut self) {
        if let EditorMode::View(task) = &self.mode {
            let task = task.clone();
            self.todo = task.todo.clone();
            self.completed = task.completed;
            self.mode = EditorMode::Edit(task);
        }
    }

    /// Edit → View, dropping the draft.
    pub fn cancel(&mut self) {
        if let EditorMode::Edit(task) = &self.mode {
            let task = task.clone();
            self.todo = task.todo.clone();
            self.completed = task.completed;
            self.mode = EditorMode::View(task);
        }
    }

    /// Creates or updates, depending on the mode.
    pub async fn save<C>(&mut self, list: &mut ListController<C>) -> Result<EditorOutcome>
    where
        C: ResourceClient<Item = Task> + TaskMutations,
    {
        let notifier = list.notifier().clone();

        if self.todo.trim().is_empty() {
            let e = Error::invalid("todo", "Please enter a task name");
            notifier.error(&e.to_string());
            return Err(e);
        }

        let result = match self.mode.clone() {
            EditorMode::Add => self.create(list).await,
            EditorMode::Edit(task) => self.update(list, task).await,
            EditorMode::View(_) => Err(Error::invalid("todo", "Task is not being edited")),
        };

        match result {
            Ok(outcome) => {
                notifier.success(match outcome {
                    EditorOutcome::Closed => "Task added successfully!",
                    EditorOutcome::Saved(_) => "Task updated!",
                });
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("saving task failed: {}", e);
                notifier.error("Failed to save task");
                Err(e)
            }
        }
    }

    async fn create<C>(&mut self, list: &mut ListController<C>) -> Result<EditorOutcome>
    where
        C: ResourceClient<Item = Task> + TaskMutations,
    {
        let payload = NewTask::pending(self.todo.trim(), self.user_id);

        self.saving = true;
        let created = list.client().create(payload).await;
        self.saving = false;

        list.optimistic_add(created?);
        Ok(EditorOutcome::Closed)
    }

    async fn update<C>(&mut self, list: &mut ListController<C>, task: Task) -> Result<EditorOutcome>
    where
        C: ResourceClient<Item = Task> + TaskMutations,
    {
        let fields = TaskFields {
            todo: self.todo.clone(),
            completed: self.completed,
        };

        self.saving = true;
        let updated = list.client().update(task.id, fields).await;
        self.saving = false;

        let mut patch = updated?;
        patch.id = task.id;
        list.optimistic_update(patch.clone());

        let mut shown = task;
        shown.merge(patch);
        self.todo = shown.todo.clone();
        self.completed = shown.completed;
        self.mode = EditorMode::View(shown.clone());
        Ok(EditorOutcome::Saved(shown))
    }

    /// Deletes the open task. The list is only touched when the server
    /// reports `isDeleted: true`.
    pub async fn delete<C>(&mut self, list: &mut ListController<C>) -> Result<EditorOutcome>
    where
        C: ResourceClient<Item = Task> + TaskMutations,
    {
        let notifier = list.notifier().clone();

        let id = match &self.mode {
            EditorMode::View(task) | EditorMode::Edit(task) => task.id,
            EditorMode::Add => {
                let e = Error::invalid("id", "Task ID not found");
                notifier.error(&e.to_string());
                return Err(e);
            }
        };

        self.saving = true;
        let result = list.client().delete(id).await;
        self.saving = false;

        let result = result.and_then(|deleted| {
            if deleted.is_deleted {
                Ok(())
            } else {
                Err(Error::DeleteRejected(id))
            }
        });

        match result {
            Ok(()) => {
                list.optimistic_remove(id);
                notifier.success("Task deleted successfully!");
                Ok(EditorOutcome::Closed)
            }
            Err(e) => {
                log::warn!("deleting task {} failed: {}", id, e);
                notifier.error("Failed to delete task");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::{FakeTasks, task};
    use crate::models::{DeletedTask, TaskPatch};
    use crate::notify::{Level, RecordingNotifier};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Delete answers `isDeleted` according to `confirm_delete`.
    #[derive(Default)]
    struct FakeBackend {
        pages: FakeTasks,
        confirm_delete: AtomicBool,
        reject_writes: AtomicBool,
    }

    #[async_trait]
    impl ResourceClient for FakeBackend {
        type Item = Task;

        async fn list(&self, limit: u32, page: u32) -> Result<crate::models::Page<Task>> {
            self.pages.list(limit, page).await
        }

        async fn get_by_id(&self, id: &str) -> Result<Task> {
            self.pages.get_by_id(id).await
        }
    }

    #[async_trait]
    impl TaskMutations for FakeBackend {
        async fn create(&self, new: NewTask) -> Result<Task> {
            if self.reject_writes.load(Ordering::SeqCst) {
                return Err(Error::Http {
                    status: 400,
                    message: "bad".into(),
                });
            }
            Ok(Task {
                id: 255,
                todo: new.todo,
                completed: new.completed,
                user_id: new.user_id,
            })
        }

        async fn update(&self, id: u64, fields: TaskFields) -> Result<TaskPatch> {
            if self.reject_writes.load(Ordering::SeqCst) {
                return Err(Error::Http {
                    status: 404,
                    message: format!("Todo with id '{id}' not found"),
                });
            }
            Ok(TaskPatch {
                id,
                todo: Some(fields.todo),
                completed: Some(fields.completed),
                user_id: None,
            })
        }

        async fn delete(&self, id: u64) -> Result<DeletedTask> {
            Ok(DeletedTask {
                id,
                is_deleted: self.confirm_delete.load(Ordering::SeqCst),
                deleted_on: None,
            })
        }
    }

    async fn loaded() -> (ListController<FakeBackend>, Arc<RecordingNotifier>) {
        let notes = Arc::new(RecordingNotifier::new());
        let backend = FakeBackend {
            pages: FakeTasks::with_total(25),
            confirm_delete: AtomicBool::new(true),
            ..Default::default()
        };
        let mut list = ListController::new(backend, 10, notes.clone());
        list.load_page(1).await;
        notes.take();
        (list, notes)
    }

    #[tokio::test]
    async fn add_prepends_and_closes() {
        let (mut list, notes) = loaded().await;
        let mut editor = TaskEditor::for_new(Some(5));
        editor.set_todo("  Call the plumber  ");

        let outcome = editor.save(&mut list).await.unwrap();
        assert_eq!(outcome, EditorOutcome::Closed);
        assert_eq!(list.items()[0].todo, "Call the plumber");
        assert_eq!(list.items()[0].user_id, 5);
        assert_eq!(list.total_count(), 26);
        assert_eq!(
            notes.take(),
            vec![(Level::Success, "Task added successfully!".to_string())]
        );
    }

    #[tokio::test]
    async fn blank_task_is_rejected_locally() {
        let (mut list, notes) = loaded().await;
        let mut editor = TaskEditor::for_new(None);
        editor.set_todo("   ");

        assert!(matches!(editor.save(&mut list).await, Err(Error::Validation(_))));
        assert_eq!(list.total_count(), 25);
        assert_eq!(
            notes.last(),
            Some((Level::Error, "Please enter a task name".to_string()))
        );
    }

    #[tokio::test]
    async fn edit_merges_and_returns_to_view() {
        let (mut list, notes) = loaded().await;
        let mut editor = TaskEditor::for_task(task(2));
        editor.edit();
        editor.set_todo("Task 2, revised");
        editor.set_completed(true);

        let outcome = editor.save(&mut list).await.unwrap();
        let EditorOutcome::Saved(saved) = outcome else {
            panic!("expected a saved task");
        };
        assert!(saved.completed);
        assert_eq!(editor.mode(), &EditorMode::View(saved.clone()));
        assert_eq!(list.items()[1], saved);
        assert_eq!(notes.last(), Some((Level::Success, "Task updated!".to_string())));
    }

    #[tokio::test]
    async fn failed_save_leaves_list_alone() {
        let (mut list, notes) = loaded().await;
        list.client().reject_writes.store(true, Ordering::SeqCst);
        let before = list.items().to_vec();

        let mut editor = TaskEditor::for_task(task(3));
        editor.edit();
        editor.set_completed(true);
        assert!(matches!(editor.save(&mut list).await, Err(Error::Http { status: 404, .. })));
        assert_eq!(list.items(), before.as_slice());
        assert!(matches!(editor.mode(), EditorMode::Edit(_)));
        assert_eq!(notes.last(), Some((Level::Error, "Failed to save task".to_string())));
    }

    #[tokio::test]
    async fn confirmed_delete_removes() {
        let (mut list, notes) = loaded().await;
        let mut editor = TaskEditor::for_task(task(4));

        assert_eq!(editor.delete(&mut list).await.unwrap(), EditorOutcome::Closed);
        assert!(list.items().iter().all(|t| t.id != 4));
        assert_eq!(list.total_count(), 24);
        assert_eq!(
            notes.last(),
            Some((Level::Success, "Task deleted successfully!".to_string()))
        );
    }

    #[tokio::test]
    async fn unconfirmed_delete_keeps_the_task() {
        let (mut list, notes) = loaded().await;
        list.client().confirm_delete.store(false, Ordering::SeqCst);
        let mut editor = TaskEditor::for_task(task(4));

        let err = editor.delete(&mut list).await.unwrap_err();
        assert!(matches!(err, Error::DeleteRejected(4)));
        assert!(list.items().iter().any(|t| t.id == 4));
        assert_eq!(list.total_count(), 25);
        assert_eq!(notes.last(), Some((Level::Error, "Failed to delete task".to_string())));
    }

    #[tokio::test]
    async fn delete_needs_an_existing_task() {
        let (mut list, _) = loaded().await;
        let mut editor = TaskEditor::for_new(None);
        assert!(matches!(editor.delete(&mut list).await, Err(Error::Validation(_))));
    }

    #[test]
    fn cancel_discards_the_draft() {
        let mut editor = TaskEditor::for_task(task(9));
        editor.edit();
        editor.set_todo("something else");
        editor.cancel();
        assert_eq!(editor.todo(), "Task 9");
        assert_eq!(editor.mode(), &EditorMode::View(task(9)));
    }

    #[tokio::test]
    async fn open_fetches_details() {
        let (list, _) = loaded().await;
        let editor = TaskEditor::open(&list, "7").await.unwrap();
        assert_eq!(editor.mode(), &EditorMode::View(task(7)));
        assert!(!editor.is_saving());
    }
}
