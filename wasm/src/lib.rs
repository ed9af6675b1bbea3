//! WebAssembly module for the Compost Monitoring Platform
//!
//! Provides client-side computation for:
//! - Composter reports on readings already loaded in the browser
//! - Per-cell norm highlighting
//! - Odor scale ranking

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::report::*;
pub use shared::validation::*;

fn report_json(input_json: &str) -> Result<String, String> {
    let report = ReportInput::from_json(input_json)
        .and_then(|input| input.generate())
        .map_err(|e| e.to_string())?;

    serde_json::to_string(&report).map_err(|e| format!("Report serialization error: {}", e))
}

fn exceeds(reading_json: &str, norm_json: &str, parameter_key: &str) -> Result<bool, String> {
    let reading: Reading =
        serde_json::from_str(reading_json).map_err(|e| format!("Invalid reading JSON: {}", e))?;
    let norm: Norm =
        serde_json::from_str(norm_json).map_err(|e| format!("Invalid norm JSON: {}", e))?;
    let parameter = Parameter::from_key(parameter_key)
        .ok_or_else(|| format!("Unknown parameter: {}", parameter_key))?;

    Ok(norm.is_exceeded(&reading, parameter))
}

/// Generate a composter report from `{composter_name, readings, norm}` JSON
#[wasm_bindgen]
pub fn generate_report(input_json: &str) -> Result<String, JsValue> {
    report_json(input_json).map_err(|e| JsValue::from_str(&e))
}

/// Whether one parameter of a reading is out of its norm.
///
/// Malformed input is logged to the console and never highlighted.
#[wasm_bindgen]
pub fn is_exceeding_norm(reading_json: &str, norm_json: &str, parameter_key: &str) -> bool {
    match exceeds(reading_json, norm_json, parameter_key) {
        Ok(exceeded) => exceeded,
        Err(_message) => {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::warn_1(&JsValue::from_str(&_message));
            false
        }
    }
}

/// Rank of an odor label on the scale, `None` when off the scale
#[wasm_bindgen]
pub fn odor_rank(label: &str) -> Option<u8> {
    OdorLevel::from_label(label).map(OdorLevel::rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    const READING: &str = r#"{
        "id": "00000000-0000-0000-0000-000000000001",
        "composter_id": "00000000-0000-0000-0000-0000000000c1",
        "recorded_at": "2024-05-01T08:00:00Z",
        "recorded_by": null,
        "temperature": "70",
        "humidity": null,
        "odor_level": "Fort",
        "compost_mass": null,
        "oxygenation": "15",
        "wood_chips_added": null
    }"#;

    const NORM: &str = r#"{
        "id": "00000000-0000-0000-0000-0000000000a1",
        "composter_id": "00000000-0000-0000-0000-0000000000c1",
        "temperature_max": "65",
        "humidity_max": null,
        "compost_mass_max": null,
        "oxygenation_min": "12",
        "wood_chips_added_max": null,
        "odor_level_max": "Moyen",
        "updated_at": "2024-04-01T00:00:00Z"
    }"#;

    #[test]
    fn test_odor_rank() {
        assert_eq!(odor_rank("Faible"), Some(0));
        assert_eq!(odor_rank("Moyen"), Some(1));
        assert_eq!(odor_rank("Fort"), Some(2));
        assert_eq!(odor_rank("Très fort"), Some(3));
        assert_eq!(odor_rank("Nauséabond"), None);
        // Labels are compared exactly
        assert_eq!(odor_rank(" Fort "), None);
    }

    #[test]
    fn test_is_exceeding_norm() {
        assert!(is_exceeding_norm(READING, NORM, "temperature"));
        assert!(is_exceeding_norm(READING, NORM, "odor_level"));
        assert!(!is_exceeding_norm(READING, NORM, "oxygenation"));
        // No value recorded
        assert!(!is_exceeding_norm(READING, NORM, "humidity"));
    }

    #[test]
    fn test_malformed_input_is_never_highlighted() {
        assert!(exceeds("{}", NORM, "temperature").is_err());
        assert!(exceeds(READING, NORM, "ph").is_err());
        assert!(!is_exceeding_norm(READING, NORM, "ph"));
    }

    #[test]
    fn test_report_json() {
        let input = format!(
            r#"{{"composter_name": "C-01", "readings": [{}], "norm": {}}}"#,
            READING, NORM
        );
        let report: serde_json::Value = serde_json::from_str(&report_json(&input).unwrap()).unwrap();

        assert_eq!(report["composter_name"], "C-01");
        assert_eq!(report["total_records"], 1);
        assert_eq!(report["last_odor_level"], "Fort");
        assert_eq!(report["violations"].as_array().unwrap().len(), 1);
        assert_eq!(report["violations"][0]["recorded_by"], "Inconnu");
        assert_eq!(report["violations"][0]["details"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_report_json_requires_readings() {
        assert!(report_json(r#"{"composter_name": "C-01"}"#).is_err());
        assert!(report_json(r#"{"readings": []}"#).is_err());
        assert!(report_json("not json").is_err());
    }
}
