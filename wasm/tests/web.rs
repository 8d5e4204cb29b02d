//! Browser tests for the exported bindings
//!
//! Run with `wasm-pack test --headless --firefox wasm`.

#![cfg(target_arch = "wasm32")]

use agritrifusion_wasm::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const GREEN_FEATURES: &str =
    r#"{"hue":45.0,"saturation":180.0,"brightness":150.0,"sharpness":20.0,"a_channel":110.0}"#;

#[wasm_bindgen_test]
fn test_sub_stage_export() {
    let label = classify_sub_stage_label("tomato", "unripe", GREEN_FEATURES).unwrap();
    assert!(["early", "mid", "late"].contains(&label.as_str()));
    assert!(classify_sub_stage_label("kiwi", "unripe", GREEN_FEATURES).is_err());
}

#[wasm_bindgen_test]
fn test_window_uses_browser_clock() {
    let json = rule_based_harvest_window("papaya", "semiripe", GREEN_FEATURES).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let days = &value["harvest_window_days"];
    assert!(days["earliest"].as_f64() <= days["expected"].as_f64());
    assert!(days["expected"].as_f64() <= days["latest"].as_f64());
    assert!(value["harvest_window_dates"]["expected"].is_string());
}

#[wasm_bindgen_test]
fn test_yield_and_priority_exports() {
    assert!(estimate_crop_yield("banana", 1.0, 1200, 6.2, "high").is_ok());
    assert!(estimate_crop_yield("banana", -1.0, 1200, 6.2, "high").is_err());

    let priority = prioritize_nutrients(0.7, 0.2, 0.1).unwrap();
    assert!(priority.contains(r#""priority_nutrient":"N""#));
    assert!(default_fertilizer("ripe").is_ok());
    assert!(is_optimal_ph(6.8));
}
