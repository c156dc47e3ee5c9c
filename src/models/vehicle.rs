use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{default_true, Entity, EntityKind, VehicleType};
use crate::validation::{check, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Vehicle {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[validate(length(max = 50))]
    pub registration_number: String,
    pub capacity: f64,
    #[validate(length(max = 255))]
    pub current_location: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(create: VehicleCreate) -> Result<Self, ValidationError> {
        let now = Utc::now();
        check(Self {
            id: Uuid::new_v4(),
            vehicle_type: create.vehicle_type,
            registration_number: create.registration_number,
            capacity: create.capacity,
            current_location: create.current_location,
            is_available: create.is_available,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Entity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleCreate {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    pub registration_number: String,
    pub capacity: f64,
    pub current_location: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Vehicle, VehicleCreate};
    use crate::models::VehicleType;

    #[test]
    fn type_field_uses_wire_name() {
        let create: VehicleCreate = serde_json::from_value(json!({
            "type": "truck",
            "registration_number": "HH-AB-1234",
            "capacity": 12000.0
        }))
        .unwrap();
        let vehicle = Vehicle::new(create).unwrap();

        assert_eq!(vehicle.vehicle_type, VehicleType::Truck);
        assert!(vehicle.is_available);

        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["type"], "truck");
    }

    #[test]
    fn registration_number_is_capped_at_50() {
        let err = Vehicle::new(VehicleCreate {
            vehicle_type: VehicleType::Ship,
            registration_number: "R".repeat(51),
            capacity: 1.0,
            current_location: Some("port".to_string()),
            is_available: false,
        })
        .unwrap_err();
        assert!(err.rule_for("registration_number").is_some());
    }

    #[test]
    fn current_location_is_capped_at_255() {
        let create = |location: String| VehicleCreate {
            vehicle_type: VehicleType::Bike,
            registration_number: "B-1".to_string(),
            capacity: 20.0,
            current_location: Some(location),
            is_available: true,
        };

        assert!(Vehicle::new(create("l".repeat(255))).is_ok());
        let err = Vehicle::new(create("l".repeat(256))).unwrap_err();
        assert!(err.rule_for("current_location").is_some());
    }
}
