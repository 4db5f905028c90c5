use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

/// The values measured by the sensor, before the store assigns an id and
/// a timestamp.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct Measurement {
    pub temperature: f64, // Celsius
    pub humidity: f64,    // Percent
    pub pressure: f64,    // hPa
}

/// A persisted measurement. Rows are never updated or deleted.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Reading {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

impl Reading {
    /// Insert one row and return the id assigned to it.
    pub fn create(connection: &Connection, measurement: &Measurement) -> rusqlite::Result<i64> {
        connection.execute(
            "INSERT INTO weather (temperature, humidity, pressure) VALUES ((?1), (?2), (?3))",
            (
                measurement.temperature,
                measurement.humidity,
                measurement.pressure,
            ),
        )?;
        Ok(connection.last_insert_rowid())
    }

    /// Every stored reading in insertion order.
    pub fn fetch_all(connection: &Connection) -> rusqlite::Result<Vec<Reading>> {
        let mut statement = connection.prepare(
            "SELECT id, timestamp, temperature, humidity, pressure FROM weather ORDER BY id",
        )?;
        let readings = statement
            .query_map((), Reading::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(readings)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Reading> {
        Ok(Reading {
            id: row.get(0)?,
            timestamp: row.get(1)?,
            temperature: row.get(2)?,
            humidity: row.get(3)?,
            pressure: row.get(4)?,
        })
    }
}

impl From<&Reading> for Measurement {
    fn from(reading: &Reading) -> Measurement {
        Measurement {
            temperature: reading.temperature,
            humidity: reading.humidity,
            pressure: reading.pressure,
        }
    }
}
