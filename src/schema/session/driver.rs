//! Driver information structures

use serde::{Deserialize, Serialize};

/// Driver information data containing current driver info + drivers list
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct DriverInfoData {
    /// Car index of the car this client is attached to
    pub driver_car_idx: Option<i32>,
    /// User ID of the local user
    #[serde(rename = "DriverUserID")]
    pub driver_user_id: Option<i32>,
    /// Driver car fuel tank capacity (liters)
    pub driver_car_fuel_max_ltr: Option<f64>,
    /// Driver car maximum fuel percentage
    pub driver_car_max_fuel_pct: Option<f64>,
    /// Driver car estimated lap time (seconds)
    pub driver_car_est_lap_time: Option<f64>,
    /// List of all drivers in session
    pub drivers: Option<Vec<Driver>>,
}

impl DriverInfoData {
    /// Find the driver entry for a car.
    ///
    /// The table is normally indexed by car, but entries can be missing in
    /// replays, so the `CarIdx` field is authoritative.
    pub fn driver_for_car(&self, car_idx: i32) -> Option<&Driver> {
        let drivers = self.drivers.as_ref()?;
        drivers.iter().find(|d| d.car_idx == car_idx)
    }

    /// Usable fuel capacity in liters.
    pub fn max_fuel(&self) -> f64 {
        self.driver_car_fuel_max_ltr.unwrap_or(0.0) * self.driver_car_max_fuel_pct.unwrap_or(1.0)
    }
}

/// Individual driver data (from Drivers list)
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    /// Car index number
    pub car_idx: i32,
    /// Driver name
    pub user_name: String,
    /// User ID
    #[serde(rename = "UserID")]
    pub user_id: Option<i32>,
    /// Team ID, 0 outside team sessions
    #[serde(rename = "TeamID")]
    pub team_id: Option<i32>,
    /// Team name
    pub team_name: Option<String>,
    /// Car path (directory name)
    pub car_path: Option<String>,
    /// Car screen name
    pub car_screen_name: Option<String>,
    /// Car number (display)
    pub car_number: Option<String>,
}
