use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A way of travelling: flight, train, bus, car, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelMode {
    pub id: Uuid,
    pub name: String,
}

impl TravelMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
