//! In-memory task board.
//!
//! Stand-in for the external project/task store; it holds just enough state
//! (company, creator, assignees, status) to drive the ownership guards.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use workforce_auth::ResourceFacts;
use workforce_core::{CompanyId, TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    InReview,
    Done,
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "in_review" => Ok(TaskStatus::InReview),
            "done" => Ok(TaskStatus::Done),
            _ => Err("status must be one of: todo, in_progress, in_review, done".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub company_id: Option<CompanyId>,
    pub created_by: UserId,
    pub assignee_ids: Vec<UserId>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The creator owns the task; assignees are listed separately.
    pub fn facts(&self) -> ResourceFacts {
        ResourceFacts {
            owner_id: Some(self.created_by),
            assignee_ids: self.assignee_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee_ids: Vec<UserId>,
}

#[derive(Debug, Default)]
struct BoardState {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct TaskBoard {
    inner: RwLock<BoardState>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskBoardError {
    #[error("task board lock poisoned")]
    Poisoned,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BoardState>, TaskBoardError> {
        self.inner.read().map_err(|_| TaskBoardError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BoardState>, TaskBoardError> {
        self.inner.write().map_err(|_| TaskBoardError::Poisoned)
    }

    pub fn create(
        &self,
        new: NewTask,
        created_by: UserId,
        company_id: Option<CompanyId>,
    ) -> Result<Task, TaskBoardError> {
        let mut state = self.write()?;
        state.next_id += 1;
        let id = TaskId::new(state.next_id);
        let now = Utc::now();

        let task = Task {
            id,
            title: new.title,
            description: new.description,
            company_id,
            created_by,
            assignee_ids: new.assignee_ids,
            status: TaskStatus::Todo,
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>, TaskBoardError> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Option<Task>, TaskBoardError> {
        let mut state = self.write()?;
        let Some(task) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.status = status;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn parses_known_statuses_only() {
        assert_eq!("in_review".parse::<TaskStatus>(), Ok(TaskStatus::InReview));
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn create_then_move_status() {
        let board = TaskBoard::new();
        let task = board
            .create(
                NewTask {
                    title: "Write payroll export".into(),
                    description: None,
                    assignee_ids: vec![UserId::new(3)],
                },
                UserId::new(1),
                Some(CompanyId::new(1)),
            )
            .unwrap();
        assert_eq!(task.id, TaskId::new(1));
        assert_eq!(task.status, TaskStatus::Todo);

        let moved = board.set_status(task.id, TaskStatus::Done).unwrap().unwrap();
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(board.get(task.id).unwrap().unwrap().status, TaskStatus::Done);
        assert_eq!(board.set_status(TaskId::new(99), TaskStatus::Done), Ok(None));

        let facts = moved.facts();
        assert_eq!(facts.owner_id, Some(UserId::new(1)));
        assert_eq!(facts.assignee_ids, vec![UserId::new(3)]);
    }

    #[test]
    fn poisoned_lock_is_an_error_not_a_missing_task() {
        let board = Arc::new(TaskBoard::new());

        let holder = Arc::clone(&board);
        let _ = std::thread::spawn(move || {
            let _guard = holder.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(board.get(TaskId::new(1)), Err(TaskBoardError::Poisoned));
        assert_eq!(
            board.set_status(TaskId::new(1), TaskStatus::Done),
            Err(TaskBoardError::Poisoned)
        );
    }
}
