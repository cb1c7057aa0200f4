use crate::error::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Opaque task identifier, a random UUID v4 rendered as a string.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.trim().to_string())
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    #[serde(alias = "in progress")]
    InProgress,
    Done,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Eq, PartialEq, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    #[serde(rename = "task", alias = "description")]
    description: String,
    status: Status,
    #[serde(with = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    updated_at: DateTime<Utc>,
}

impl Task {
    fn new(description: String) -> Self {
        let now = now();
        Self {
            id: TaskId::generate(),
            description,
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}  [{}]  {}", self.id, self.status, self.description)
    }
}

/// The ordered, in-memory task collection. Ids are unique and insertion order is kept.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tasks = Vec::<Task>::deserialize(deserializer)?;
        let duplicate = {
            let mut seen = HashSet::with_capacity(tasks.len());
            tasks
                .iter()
                .find(|task| !seen.insert(&task.id))
                .map(|task| task.id.to_string())
        };
        if let Some(id) = duplicate {
            return Err(serde::de::Error::custom(format!(
                "duplicate task id '{id}'"
            )));
        }
        Ok(Self { tasks })
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    /// Appends a new pending task and returns its id.
    pub fn add(&mut self, description: &str) -> Result<TaskId> {
        let description = validate_description(description)?;
        let task = Task::new(description);
        let id = task.id.clone();
        self.tasks.push(task);
        Ok(id)
    }

    /// Replaces the description of a task. Returns whether anything changed.
    pub fn update_description(&mut self, id: &TaskId, description: &str) -> Result<bool> {
        let description = validate_description(description)?;
        let task = self.find_mut(id)?;
        if task.description == description {
            return Ok(false);
        }
        task.description = description;
        task.updated_at = now();
        Ok(true)
    }

    /// Moves a task to `status`. Returns whether anything changed.
    pub fn set_status(&mut self, id: &TaskId, status: Status) -> Result<bool> {
        let task = self.find_mut(id)?;
        if task.status == status {
            return Ok(false);
        }
        task.status = status;
        task.updated_at = now();
        Ok(true)
    }

    pub fn remove(&mut self, id: &TaskId) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| &task.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(self.tasks.remove(index))
    }

    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |task| task.status == status)
    }

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

fn validate_description(description: &str) -> Result<String> {
    if description.trim().is_empty() {
        return Err(Error::InvalidInput(
            "Please provide a task description.".to_string(),
        ));
    }
    Ok(description.to_string())
}

// Persisted timestamps carry millisecond precision, so in-memory ones do too.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|value| value.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
