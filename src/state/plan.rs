use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl Plan {
    pub fn is_pro(self) -> bool {
        self == Plan::Pro
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Pro => write!(f, "pro"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            other => Err(PlanError::UnknownPlan(other.to_owned())),
        }
    }
}

#[derive(Debug)]
pub enum PlanError {
    InvalidUser(String),
    UnknownPlan(String),
    Io(std::io::Error, PathBuf),
    Corrupt(serde_json::Error, PathBuf),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::InvalidUser(user) => write!(f, "Invalid user id: {user:?}"),
            PlanError::UnknownPlan(plan) => write!(f, "Unknown plan: {plan:?}"),
            PlanError::Io(e, path) => write!(f, "I/O error for {}: {e}", path.display()),
            PlanError::Corrupt(e, path) => write!(f, "Corrupt plan document {}: {e}", path.display()),
        }
    }
}

impl std::error::Error for PlanError {}

/// Per-user plan documents, `{data_dir}/plans/{user}.json`, holding
/// `{"plan": "free" | "pro"}` alongside any other fields.
#[derive(Debug, Clone)]
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join("plans"),
        }
    }

    /// The user's plan; `Free` when no document exists.
    pub async fn plan(&self, user: &str) -> Result<Plan, PlanError> {
        let path = self.path_for(user)?;
        Ok(plan_in(&self.read(&path).await?))
    }

    /// Plan for an optional user; anonymous visitors and unreadable documents
    /// are free.
    pub async fn plan_or_free(&self, user: Option<&str>) -> Plan {
        let Some(user) = user else {
            return Plan::Free;
        };
        self.plan(user).await.unwrap_or_else(|e| {
            warn!("plan lookup for {user} failed, treating as free: {e}");
            Plan::Free
        })
    }

    /// One read-modify-write of the user's document. Returns the previous plan.
    pub async fn set_plan(&self, user: &str, plan: Plan) -> Result<Plan, PlanError> {
        let path = self.path_for(user)?;
        let mut doc = self.read(&path).await?;
        let previous = plan_in(&doc);

        doc.insert("plan".to_owned(), Value::String(plan.to_string()));
        let body = serde_json::to_vec_pretty(&doc).map_err(|e| PlanError::Corrupt(e, path.clone()))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PlanError::Io(e, self.dir.clone()))?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| PlanError::Io(e, path.clone()))?;

        debug!("plan for {user}: {previous} -> {plan}");
        Ok(previous)
    }

    fn path_for(&self, user: &str) -> Result<PathBuf, PlanError> {
        let valid = !user.is_empty()
            && user
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PlanError::InvalidUser(user.to_owned()));
        }
        Ok(self.dir.join(format!("{user}.json")))
    }

    async fn read(&self, path: &Path) -> Result<Map<String, Value>, PlanError> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(PlanError::Io(e, path.to_owned())),
        };
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Ok(Map::new()),
            Err(e) => Err(PlanError::Corrupt(e, path.to_owned())),
        }
    }
}

fn plan_in(doc: &Map<String, Value>) -> Plan {
    doc.get("plan")
        .and_then(|v| Plan::deserialize(v).ok())
        .unwrap_or_default()
}
