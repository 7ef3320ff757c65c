pub mod config;
pub mod snapshot;

use crate::schedule::{Absence, AbsenceStatus, Appointment, AppointmentDraft, User, Vehicle};

pub use snapshot::{SnapshotStore, StoreError};

/// The persistence collaborator: full-collection reads plus the few writes the
/// scheduling core hands back. Collections come back in insertion order.
pub trait ScheduleStore {
    fn all_appointments(&self) -> Result<Vec<Appointment>, StoreError>;
    fn all_absences(&self) -> Result<Vec<Absence>, StoreError>;
    fn all_users(&self) -> Result<Vec<User>, StoreError>;
    fn all_vehicles(&self) -> Result<Vec<Vehicle>, StoreError>;

    fn create_appointments(&self, drafts: Vec<AppointmentDraft>) -> Result<Vec<Appointment>, StoreError>;
    fn delete_appointments(&self, ids: &[String]) -> Result<usize, StoreError>;

    fn create_absence(&self, absence: Absence) -> Result<Absence, StoreError>;
    fn set_absence_status(&self, id: &str, status: AbsenceStatus) -> Result<Absence, StoreError>;

    fn upsert_user(&self, user: &User) -> Result<(), StoreError>;
    fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError>;
}
