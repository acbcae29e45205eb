use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::serialization::{SaveData, SAVE_VERSION};
use crate::rules::efficiency::EfficiencySnapshot;
use crate::simulation::agents::{AgentState, HistoryEntry};
use crate::simulation::assignment::{Assignment, AssignmentStatus};
use crate::simulation::stats::DispatchStatistics;

const SAVE_SCHEMA_VERSION: i64 = 1;

const SAVE_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS save_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  save_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS agents (
  agent_id TEXT PRIMARY KEY,
  display_name TEXT NOT NULL,
  fatigue REAL NOT NULL,
  mood REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS agent_skills (
  agent_id TEXT NOT NULL,
  activity_type TEXT NOT NULL,
  level INTEGER NOT NULL,
  PRIMARY KEY (agent_id, activity_type)
);

CREATE TABLE IF NOT EXISTS agent_experience (
  agent_id TEXT NOT NULL,
  activity_type TEXT NOT NULL,
  experience REAL NOT NULL,
  PRIMARY KEY (agent_id, activity_type)
);

CREATE TABLE IF NOT EXISTS agent_history (
  agent_id TEXT NOT NULL,
  seq INTEGER NOT NULL,
  activity_type TEXT NOT NULL,
  completed_at INTEGER NOT NULL,
  success INTEGER NOT NULL,
  PRIMARY KEY (agent_id, seq)
);

CREATE TABLE IF NOT EXISTS assignments (
  agent_id TEXT PRIMARY KEY,
  assignment_id INTEGER NOT NULL,
  activity_type TEXT NOT NULL,
  started_at INTEGER NOT NULL,
  duration REAL NOT NULL,
  progress REAL NOT NULL,
  speed_multiplier REAL NOT NULL,
  quality_rating REAL NOT NULL,
  success_probability REAL NOT NULL,
  base_skill REAL NOT NULL,
  experience_bonus REAL NOT NULL,
  fatigue_penalty REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS statistics (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  total_tasks INTEGER NOT NULL,
  successful_tasks INTEGER NOT NULL,
  failed_tasks INTEGER NOT NULL,
  cancelled_tasks INTEGER NOT NULL,
  total_experience_gained REAL NOT NULL
);
"#;

#[derive(Debug)]
pub enum SaveDbError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl std::fmt::Display for SaveDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            SaveDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for SaveDbError {}

impl From<rusqlite::Error> for SaveDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

fn to_sql_count(value: u64, what: &str) -> Result<i64, SaveDbError> {
    i64::try_from(value)
        .map_err(|_| SaveDbError::InvalidData(format!("{} {} does not fit in SQLite", what, value)))
}

fn read_count(row: &rusqlite::Row<'_>, idx: usize, what: &str) -> Result<u64, SaveDbError> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value)
        .map_err(|_| SaveDbError::InvalidData(format!("{} {} is negative", what, value)))
}

/// Normalized SQLite store for engine save data.
pub struct SaveDb {
    conn: Connection,
}

impl SaveDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SaveDbError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SaveDbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, SaveDbError> {
        let db = Self { conn };
        db.conn.execute_batch(SAVE_DB_SCHEMA)?;
        db.ensure_meta()?;
        Ok(db)
    }

    fn ensure_meta(&self) -> Result<(), SaveDbError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT schema_version FROM save_meta WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            Some(version) if version > SAVE_SCHEMA_VERSION => Err(SaveDbError::InvalidData(
                format!("save schema {} is newer than supported {}", version, SAVE_SCHEMA_VERSION),
            )),
            Some(_) => Ok(()),
            None => {
                self.conn.execute(
                    "INSERT INTO save_meta (id, schema_version, save_version) VALUES (1, ?1, ?2)",
                    params![SAVE_SCHEMA_VERSION, i64::from(SAVE_VERSION)],
                )?;
                Ok(())
            }
        }
    }

    /// Replace everything stored with `data`.
    pub fn save_data(&mut self, data: &SaveData) -> Result<(), SaveDbError> {
        let tx = self.conn.transaction()?;

        for table in [
            "agents",
            "agent_skills",
            "agent_experience",
            "agent_history",
            "assignments",
            "statistics",
        ] {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        for (agent_id, agent) in &data.agents {
            tx.execute(
                "INSERT INTO agents (agent_id, display_name, fatigue, mood) VALUES (?1, ?2, ?3, ?4)",
                params![agent_id, agent.display_name, agent.fatigue, agent.mood],
            )?;
            for (activity_type, level) in &agent.skill_by_activity {
                tx.execute(
                    "INSERT INTO agent_skills (agent_id, activity_type, level) VALUES (?1, ?2, ?3)",
                    params![agent_id, activity_type, i64::from(*level)],
                )?;
            }
            for (activity_type, experience) in &agent.experience_by_activity {
                tx.execute(
                    "INSERT INTO agent_experience (agent_id, activity_type, experience) VALUES (?1, ?2, ?3)",
                    params![agent_id, activity_type, experience],
                )?;
            }
        }

        for (agent_id, entries) in &data.history {
            for (seq, entry) in entries.iter().enumerate() {
                tx.execute(
                    "INSERT INTO agent_history (agent_id, seq, activity_type, completed_at, success) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        agent_id,
                        seq as i64,
                        entry.activity_type,
                        to_sql_count(entry.completed_at, "completed_at")?,
                        if entry.success { 1 } else { 0 }
                    ],
                )?;
            }
        }

        for (agent_id, task) in &data.assignments {
            let e = &task.efficiency;
            tx.execute(
                "INSERT INTO assignments (agent_id, assignment_id, activity_type, started_at, duration, progress, speed_multiplier, quality_rating, success_probability, base_skill, experience_bonus, fatigue_penalty) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    agent_id,
                    to_sql_count(task.id, "assignment id")?,
                    task.activity_type,
                    to_sql_count(task.started_at, "started_at")?,
                    task.duration,
                    task.progress,
                    e.speed_multiplier,
                    e.quality_rating,
                    e.success_probability,
                    e.base_skill,
                    e.experience_bonus,
                    e.fatigue_penalty
                ],
            )?;
        }

        let stats = &data.statistics;
        tx.execute(
            "INSERT INTO statistics (id, total_tasks, successful_tasks, failed_tasks, cancelled_tasks, total_experience_gained) VALUES (1, ?1, ?2, ?3, ?4, ?5)",
            params![
                to_sql_count(stats.total_tasks, "total_tasks")?,
                to_sql_count(stats.successful_tasks, "successful_tasks")?,
                to_sql_count(stats.failed_tasks, "failed_tasks")?,
                to_sql_count(stats.cancelled_tasks, "cancelled_tasks")?,
                stats.total_experience_gained
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// `None` if nothing has been saved yet.
    pub fn load_data(&self) -> Result<Option<SaveData>, SaveDbError> {
        let Some(statistics) = self.load_statistics()? else {
            return Ok(None);
        };
        Ok(Some(SaveData {
            version: SAVE_VERSION,
            assignments: self.load_assignments()?,
            history: self.load_history()?,
            agents: self.load_agents()?,
            statistics,
        }))
    }

    fn load_statistics(&self) -> Result<Option<DispatchStatistics>, SaveDbError> {
        let mut stmt = self.conn.prepare(
            "SELECT total_tasks, successful_tasks, failed_tasks, cancelled_tasks, total_experience_gained FROM statistics WHERE id = 1",
        )?;
        let mut rows = stmt.query([])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(DispatchStatistics {
            total_tasks: read_count(row, 0, "total_tasks")?,
            successful_tasks: read_count(row, 1, "successful_tasks")?,
            failed_tasks: read_count(row, 2, "failed_tasks")?,
            cancelled_tasks: read_count(row, 3, "cancelled_tasks")?,
            total_experience_gained: row.get(4)?,
        }))
    }

    fn load_agents(&self) -> Result<BTreeMap<String, AgentState>, SaveDbError> {
        let mut agents = BTreeMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT agent_id, display_name, fatigue, mood FROM agents")?;
        let rows = stmt.query_map([], |row| {
            let mut agent = AgentState::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
            agent.fatigue = row.get(2)?;
            agent.mood = row.get(3)?;
            Ok(agent)
        })?;
        for row in rows {
            let agent = row?;
            agents.insert(agent.id.clone(), agent);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT agent_id, activity_type, level FROM agent_skills")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let agent_id: String = row.get(0)?;
            let level: i64 = row.get(2)?;
            let level = u8::try_from(level).map_err(|_| {
                SaveDbError::InvalidData(format!("skill level {} out of range", level))
            })?;
            let agent = agents.get_mut(&agent_id).ok_or_else(|| {
                SaveDbError::InvalidData(format!("skill row for unknown agent {}", agent_id))
            })?;
            agent.skill_by_activity.insert(row.get(1)?, level);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT agent_id, activity_type, experience FROM agent_experience")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let agent_id: String = row.get(0)?;
            let agent = agents.get_mut(&agent_id).ok_or_else(|| {
                SaveDbError::InvalidData(format!("experience row for unknown agent {}", agent_id))
            })?;
            agent.experience_by_activity.insert(row.get(1)?, row.get(2)?);
        }

        Ok(agents)
    }

    fn load_history(&self) -> Result<BTreeMap<String, Vec<HistoryEntry>>, SaveDbError> {
        let mut history: BTreeMap<String, Vec<HistoryEntry>> = BTreeMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT agent_id, activity_type, completed_at, success FROM agent_history ORDER BY agent_id, seq",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let agent_id: String = row.get(0)?;
            history.entry(agent_id).or_default().push(HistoryEntry {
                activity_type: row.get(1)?,
                completed_at: read_count(row, 2, "completed_at")?,
                success: row.get::<_, i64>(3)? != 0,
            });
        }
        Ok(history)
    }

    fn load_assignments(&self) -> Result<BTreeMap<String, Assignment>, SaveDbError> {
        let mut assignments = BTreeMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT agent_id, assignment_id, activity_type, started_at, duration, progress, speed_multiplier, quality_rating, success_probability, base_skill, experience_bonus, fatigue_penalty FROM assignments",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let assignment = Assignment {
                agent_id: row.get(0)?,
                id: read_count(row, 1, "assignment id")?,
                activity_type: row.get(2)?,
                started_at: read_count(row, 3, "started_at")?,
                duration: row.get(4)?,
                progress: row.get(5)?,
                efficiency: EfficiencySnapshot {
                    speed_multiplier: row.get(6)?,
                    quality_rating: row.get(7)?,
                    success_probability: row.get(8)?,
                    base_skill: row.get(9)?,
                    experience_bonus: row.get(10)?,
                    fatigue_penalty: row.get(11)?,
                },
                status: AssignmentStatus::InProgress,
            };
            assignments.insert(assignment.agent_id.clone(), assignment);
        }
        Ok(assignments)
    }
}
