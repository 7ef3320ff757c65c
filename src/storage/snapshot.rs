use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::schedule::{Absence, AbsenceError, AbsenceStatus, Appointment, AppointmentDraft, User, Vehicle};
use crate::storage::ScheduleStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Failed to prepare database location: {0}")]
    IoError(#[from] std::io::Error),
    #[error("No absence with id {0}")]
    AbsenceNotFound(String),
    #[error(transparent)]
    Absence(#[from] AbsenceError),
}

/// SQLite-backed store. Each record is kept as JSON next to the columns the
/// queries filter on.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self::new(Connection::open(path)?);
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS appointments (
                id TEXT PRIMARY KEY,
                day TEXT NOT NULL,
                multi_day_group_id TEXT,
                job_group_id TEXT,
                data TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS absences (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                status TEXT NOT NULL,
                data TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS vehicles (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }

    pub fn store_appointment(&self, appointment: &Appointment) -> Result<(), StoreError> {
        let data = serde_json::to_string(appointment)?;
        self.conn.execute(
            "INSERT INTO appointments (id, day, multi_day_group_id, job_group_id, data)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                day = excluded.day,
                multi_day_group_id = excluded.multi_day_group_id,
                job_group_id = excluded.job_group_id,
                data = excluded.data",
            rusqlite::params![
                &appointment.id,
                appointment.day().to_string(),
                &appointment.multi_day_group_id,
                &appointment.job_group_id,
                &data,
            ],
        )?;
        Ok(())
    }

    pub fn store_absence(&self, absence: &Absence) -> Result<(), StoreError> {
        let data = serde_json::to_string(absence)?;
        self.conn.execute(
            "INSERT INTO absences (id, user_id, status, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                status = excluded.status,
                data = excluded.data",
            rusqlite::params![&absence.id, &absence.user_id, absence.status.as_str(), &data],
        )?;
        Ok(())
    }

    pub fn load_absence(&self, id: &str) -> Result<Option<Absence>, StoreError> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM absences WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        data.map(|d| serde_json::from_str(&d)).transpose().map_err(StoreError::from)
    }

    /// Writes a whole snapshot in one transaction. Absences are validated
    /// first, so a bad record leaves the store untouched.
    pub fn import(
        &self,
        users: &[User],
        vehicles: &[Vehicle],
        appointments: &[Appointment],
        absences: &[Absence],
    ) -> Result<(), StoreError> {
        for absence in absences {
            absence.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        for user in users {
            self.upsert_user(user)?;
        }
        for vehicle in vehicles {
            self.upsert_vehicle(vehicle)?;
        }
        for appointment in appointments {
            self.store_appointment(appointment)?;
        }
        for absence in absences {
            self.store_absence(absence)?;
        }
        tx.commit()?;

        tracing::info!(
            "Imported {} users, {} vehicles, {} appointments, {} absences",
            users.len(),
            vehicles.len(),
            appointments.len(),
            absences.len()
        );
        Ok(())
    }

    fn load_all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT data FROM {} ORDER BY rowid", table))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for data in rows {
            records.push(serde_json::from_str(&data?)?);
        }
        Ok(records)
    }

    fn upsert_json<T: Serialize>(&self, table: &str, id: &str, record: &T) -> Result<(), StoreError> {
        let data = serde_json::to_string(record)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {} (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data",
                table
            ),
            rusqlite::params![id, &data],
        )?;
        Ok(())
    }
}

impl ScheduleStore for SnapshotStore {
    fn all_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        self.load_all("appointments")
    }

    fn all_absences(&self) -> Result<Vec<Absence>, StoreError> {
        self.load_all("absences")
    }

    fn all_users(&self) -> Result<Vec<User>, StoreError> {
        self.load_all("users")
    }

    fn all_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        self.load_all("vehicles")
    }

    fn create_appointments(&self, drafts: Vec<AppointmentDraft>) -> Result<Vec<Appointment>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let appointment = draft.into_appointment(Uuid::new_v4().to_string());
            self.store_appointment(&appointment)?;
            created.push(appointment);
        }
        tx.commit()?;

        tracing::info!("Created {} appointments", created.len());
        Ok(created)
    }

    fn delete_appointments(&self, ids: &[String]) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut removed = 0;
        for id in ids {
            removed += self.conn.execute("DELETE FROM appointments WHERE id = ?1", [id])?;
        }
        tx.commit()?;

        tracing::info!("Deleted {} appointments", removed);
        Ok(removed)
    }

    fn create_absence(&self, absence: Absence) -> Result<Absence, StoreError> {
        self.store_absence(&absence)?;
        tracing::info!("Stored absence {} as {:?}", absence.id, absence.status);
        Ok(absence)
    }

    fn set_absence_status(&self, id: &str, status: AbsenceStatus) -> Result<Absence, StoreError> {
        let mut absence = self
            .load_absence(id)?
            .ok_or_else(|| StoreError::AbsenceNotFound(id.to_string()))?;
        absence.decide(status)?;
        self.store_absence(&absence)?;

        tracing::info!("Absence {} is now {:?}", id, status);
        Ok(absence)
    }

    fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.upsert_json("users", &user.id, user)
    }

    fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.upsert_json("vehicles", &vehicle.id, vehicle)
    }
}
