//! Database models

use serde::{Deserialize, Serialize};

use crate::distance::Coordinates;

/// Client-supplied address fields (everything except the generated id)
///
/// Used as the body of both create and full-replacement update requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressFields {
    pub first_line: String,
    pub second_line: String,
    pub phone: String,
    pub pincode: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressFields {
    /// Attach a store-assigned id
    pub fn into_address(self, id: i64) -> Address {
        Address {
            id,
            first_line: self.first_line,
            second_line: self.second_line,
            phone: self.phone,
            pincode: self.pincode,
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A stored address row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub first_line: String,
    pub second_line: String,
    pub phone: String,
    pub pincode: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Address {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Overwrite every mutable field, keeping `id`
    pub fn apply(&mut self, fields: AddressFields) {
        self.first_line = fields.first_line;
        self.second_line = fields.second_line;
        self.phone = fields.phone;
        self.pincode = fields.pincode;
        self.latitude = fields.latitude;
        self.longitude = fields.longitude;
    }
}
