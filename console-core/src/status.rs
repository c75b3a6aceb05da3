/// Status document handling
/// This module turns the device's `info.json` into display fields and the
/// battery-low guard, without doing any I/O itself.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StatusError;

/// Readings below this (centivolts, i.e. 3.60V) block firmware updates
pub const LOW_BATTERY_CENTIVOLTS: i32 = 360;

/// Placeholder rendered for any field the device did not report
pub const UNKNOWN: &str = "Unknown";

// How many readings are shown per display variant
const MODE_DISPLAY_COUNT: usize = 3;
const DEFAULT_DISPLAY_COUNT: usize = 5;

/// Status document served by the device at `info.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDocument {
    /// Display variant; the device sends `0`/`1`
    #[serde(deserialize_with = "deserialize_flag")]
    pub mode: bool,
    /// Voltage readings in centivolts
    pub batteries: Vec<i32>,
    /// Raw charging state code
    pub state: i64,
    /// Missed status updates on the device side
    pub missed: i64,
    pub version: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
    })
}

impl StatusDocument {
    /// Parse a response body. Missing or mistyped fields fail as a whole.
    pub fn parse(body: &[u8]) -> Result<Self, StatusError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Number of readings to show: 3 in mode, 5 otherwise, capped by what exists
    pub fn display_count(&self) -> usize {
        let limit = if self.mode {
            MODE_DISPLAY_COUNT
        } else {
            DEFAULT_DISPLAY_COUNT
        };
        limit.min(self.batteries.len())
    }

    /// True iff the first reading is under the threshold.
    ///
    /// No readings at all counts as not low.
    pub fn battery_low(&self) -> bool {
        self.batteries
            .first()
            .is_some_and(|&reading| reading < LOW_BATTERY_CENTIVOLTS)
    }

    pub fn voltage_lines(&self) -> Vec<VoltageLine> {
        let count = self.display_count();
        self.batteries
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, &centivolts)| VoltageLine {
                index: i + 1,
                centivolts,
                last: i + 1 == count,
            })
            .collect()
    }

    pub fn charging_state(&self) -> ChargingState {
        ChargingState::from_code(self.state)
    }

    /// Suffix appended to the charging line when the device missed updates
    pub fn missed_annotation(&self) -> Option<String> {
        (self.missed > 0).then(|| format!("   (errCnt={})", self.missed))
    }

    /// Derive every display field in one pass
    pub fn report(&self) -> StatusReport {
        let charging = self.charging_state();
        StatusReport {
            version: self.version.clone(),
            voltage_lines: self.voltage_lines(),
            charging,
            charging_label: charging.display_label(self.mode),
            missed: self.missed,
            missed_annotation: self.missed_annotation(),
            battery_low: self.battery_low(),
        }
    }
}

/// Charging state as reported by the charger controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargingState {
    NotCharging,
    Charging,
    ChargingAlt,
    Done,
    Unknown(i64),
}

impl ChargingState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => ChargingState::NotCharging,
            1 => ChargingState::Charging,
            2 => ChargingState::ChargingAlt,
            3 => ChargingState::Done,
            other => ChargingState::Unknown(other),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargingState::NotCharging => "Not charging",
            ChargingState::Charging => "Charging",
            ChargingState::ChargingAlt => "Charging (2)",
            ChargingState::Done => "Charging done",
            ChargingState::Unknown(_) => UNKNOWN,
        }
    }

    /// Label as rendered: plain charging outside mode gets a " (1)" tag so it
    /// can be told apart from the alternate charging state.
    pub fn display_label(&self, mode: bool) -> String {
        match self {
            ChargingState::Charging if !mode => format!("{} (1)", self.label()),
            _ => self.label().to_string(),
        }
    }
}

/// One displayed battery reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageLine {
    /// 1-based battery number
    pub index: usize,
    pub centivolts: i32,
    /// Final line of the list (drawn without a separator)
    pub last: bool,
}

impl VoltageLine {
    pub fn volts(&self) -> f64 {
        f64::from(self.centivolts) / 100.0
    }
}

impl fmt::Display for VoltageLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BAT{}: {}V", self.index, self.volts())
    }
}

/// Structured result of a successful status fetch
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub version: String,
    pub voltage_lines: Vec<VoltageLine>,
    pub charging: ChargingState,
    pub charging_label: String,
    pub missed: i64,
    pub missed_annotation: Option<String>,
    pub battery_low: bool,
}

/// Render-ready status. Always displayable, even when the fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub version: String,
    pub voltages: Vec<String>,
    pub charging: String,
    /// Set when the fields are placeholders rather than device data
    pub degraded: bool,
}

impl StatusView {
    pub fn unknown() -> Self {
        Self {
            version: UNKNOWN.to_string(),
            voltages: vec![UNKNOWN.to_string()],
            charging: UNKNOWN.to_string(),
            degraded: true,
        }
    }
}

impl Default for StatusView {
    fn default() -> Self {
        Self::unknown()
    }
}

impl From<&StatusReport> for StatusView {
    fn from(report: &StatusReport) -> Self {
        let voltages = if report.voltage_lines.is_empty() {
            vec![UNKNOWN.to_string()]
        } else {
            report.voltage_lines.iter().map(|line| line.to_string()).collect()
        };

        let mut charging = report.charging_label.clone();
        if let Some(annotation) = &report.missed_annotation {
            charging.push_str(annotation);
        }

        Self {
            version: report.version.clone(),
            voltages,
            charging,
            degraded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quickcheck_macros::quickcheck;

    fn doc(mode: bool, batteries: Vec<i32>) -> StatusDocument {
        StatusDocument {
            mode,
            batteries,
            state: 0,
            missed: 0,
            version: "1.0.3".to_string(),
        }
    }

    #[test]
    fn test_parse_device_document() {
        let body = br#"{"version":"1.0.3","mode":1,"batteries":[412,398,401,0,0],"state":1,"missed":0}"#;
        let doc = StatusDocument::parse(body).unwrap();
        assert!(doc.mode);
        assert_eq!(doc.batteries, vec![412, 398, 401, 0, 0]);
        assert_eq!(doc.charging_state(), ChargingState::Charging);
        assert_eq!(doc.version, "1.0.3");
    }

    #[test]
    fn test_parse_accepts_boolean_mode() {
        let body = br#"{"version":"x","mode":false,"batteries":[],"state":0,"missed":0}"#;
        assert!(!StatusDocument::parse(body).unwrap().mode);
    }

    #[test]
    fn test_parse_rejects_missing_and_mistyped_fields() {
        let missing = br#"{"mode":1,"batteries":[400],"state":0,"missed":0}"#;
        assert!(matches!(
            StatusDocument::parse(missing),
            Err(StatusError::Parse(_))
        ));

        let mistyped = br#"{"version":"1","mode":"yes","batteries":[400],"state":0,"missed":0}"#;
        assert!(StatusDocument::parse(mistyped).is_err());

        assert!(StatusDocument::parse(b"<html>404</html>").is_err());
    }

    #[test]
    fn test_display_count_per_mode() {
        assert_eq!(doc(true, vec![400; 5]).display_count(), 3);
        assert_eq!(doc(false, vec![400; 5]).display_count(), 5);
        assert_eq!(doc(false, vec![400; 2]).display_count(), 2);
        assert_eq!(doc(true, vec![]).display_count(), 0);
    }

    #[test]
    fn test_battery_low_threshold() {
        assert!(doc(false, vec![359, 420]).battery_low());
        assert!(!doc(false, vec![360, 100]).battery_low());
        assert!(!doc(false, vec![]).battery_low());
    }

    #[test]
    fn test_voltage_lines_format_and_last_marker() {
        let lines = doc(true, vec![412, 400, 365, 380]).voltage_lines();
        let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered, vec!["BAT1: 4.12V", "BAT2: 4V", "BAT3: 3.65V"]);
        assert!(!lines[0].last);
        assert!(!lines[1].last);
        assert!(lines[2].last);
    }

    #[test]
    fn test_charging_labels() {
        assert_eq!(ChargingState::from_code(0).label(), "Not charging");
        assert_eq!(ChargingState::from_code(1).label(), "Charging");
        assert_eq!(ChargingState::from_code(2).label(), "Charging (2)");
        assert_eq!(ChargingState::from_code(3).label(), "Charging done");
        assert_eq!(ChargingState::from_code(4).label(), "Unknown");
        assert_eq!(ChargingState::from_code(-1).label(), "Unknown");
    }

    #[test]
    fn test_charging_mode_nuance_only_adds_parenthetical() {
        assert_eq!(ChargingState::Charging.display_label(true), "Charging");
        assert_eq!(ChargingState::Charging.display_label(false), "Charging (1)");
        assert_eq!(ChargingState::Done.display_label(false), "Charging done");
    }

    #[test]
    fn test_missed_annotation() {
        let mut d = doc(false, vec![400]);
        assert_eq!(d.missed_annotation(), None);
        d.missed = 3;
        assert_eq!(d.missed_annotation().as_deref(), Some("   (errCnt=3)"));
    }

    #[test]
    fn test_view_from_report() {
        let mut d = doc(false, vec![371]);
        d.state = 3;
        d.missed = 99;
        let view = StatusView::from(&d.report());
        assert_eq!(view.version, "1.0.3");
        assert_eq!(view.voltages, vec!["BAT1: 3.71V"]);
        assert_eq!(view.charging, "Charging done   (errCnt=99)");
        assert!(!view.degraded);
    }

    #[test]
    fn test_view_without_readings_shows_unknown_voltages() {
        let view = StatusView::from(&doc(true, vec![]).report());
        assert_eq!(view.voltages, vec![UNKNOWN]);
        assert_eq!(view.version, "1.0.3");
    }

    #[test]
    fn test_unknown_view() {
        let view = StatusView::unknown();
        assert_eq!(view.version, "Unknown");
        assert_eq!(view.voltages, vec!["Unknown"]);
        assert_eq!(view.charging, "Unknown");
        assert!(view.degraded);
    }

    proptest! {
        #[test]
        fn prop_display_count_is_capped(mode in any::<bool>(), batteries in proptest::collection::vec(any::<i32>(), 0..10)) {
            let d = doc(mode, batteries.clone());
            let cap = if mode { 3 } else { 5 };
            prop_assert_eq!(d.display_count(), cap.min(batteries.len()));
            prop_assert_eq!(d.voltage_lines().len(), d.display_count());
        }

        #[test]
        fn prop_battery_low_follows_first_reading(first in -1000i32..1000, rest in proptest::collection::vec(any::<i32>(), 0..4)) {
            let mut batteries = vec![first];
            batteries.extend(rest);
            prop_assert_eq!(doc(false, batteries).battery_low(), first < 360);
        }
    }

    #[quickcheck]
    fn prop_out_of_range_state_is_unknown(code: i64) -> bool {
        let state = ChargingState::from_code(code);
        if (0..=3).contains(&code) {
            state.label() != UNKNOWN
        } else {
            state.label() == UNKNOWN
        }
    }
}
