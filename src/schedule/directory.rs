use serde::{Deserialize, Serialize};

use crate::schedule::appointment::Appointment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Administrator,
    Worker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub color: String,
}

pub fn find_user<'a>(users: &'a [User], id: &str) -> Option<&'a User> {
    users.iter().find(|u| u.id == id)
}

pub fn find_vehicle<'a>(vehicles: &'a [Vehicle], id: &str) -> Option<&'a Vehicle> {
    vehicles.iter().find(|v| v.id == id)
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Administrator
    }
}

impl Vehicle {
    /// Rewrites the label and color an appointment carries from this vehicle.
    /// Renaming a vehicle does not touch existing appointments on its own; this
    /// is the explicit opt-in join for callers that want current data.
    pub fn refresh_appointment(&self, appointment: &mut Appointment) -> bool {
        if appointment.vehicle_id.as_deref() != Some(self.id.as_str()) {
            return false;
        }
        appointment.equipment = self.name.clone();
        appointment.color = self.color.clone();
        true
    }
}
