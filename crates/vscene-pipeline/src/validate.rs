//! Scene repair and validation.
//!
//! Structuring output is model-generated JSON, so individual scenes are
//! repaired rather than rejected: missing fields get derived defaults,
//! times are clamped into the video, malformed physics blocks are reset.
//! Only a scene that cannot be repaired into minimal valid shape is
//! dropped, and only zero surviving scenes fails the run.

use serde_json::{json, Map, Value};
use tracing::warn;

use vscene_models::Scene;

use crate::error::{PipelineError, PipelineResult};

/// Repair the structured scenes and deserialize the survivors.
///
/// `duration` is the probed video duration; repaired times are clamped
/// into `[0, duration]` with `end >= start + 0.1` re-enforced after the
/// start clamp.
pub fn clean_scenes(structured: &Value, duration: f64) -> PipelineResult<Vec<Scene>> {
    let raw_scenes = structured
        .get("scenes")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut cleaned = Vec::with_capacity(raw_scenes.len());

    for (index, raw) in raw_scenes.into_iter().enumerate() {
        match repair_scene(raw, index, duration) {
            Some(value) => match serde_json::from_value::<Scene>(value) {
                Ok(scene) => cleaned.push(scene),
                Err(e) => warn!("Dropping scene {}: unrepairable shape: {}", index, e),
            },
            None => warn!("Dropping scene {}: not an object", index),
        }
    }

    if cleaned.is_empty() {
        return Err(PipelineError::Validation);
    }

    Ok(cleaned)
}

/// Read a numeric field, treating `null` and wrong types as absent.
fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

/// Repair one scene in place, returning `None` when it is not even an
/// object.
fn repair_scene(raw: Value, index: usize, duration: f64) -> Option<Value> {
    let mut scene = match raw {
        Value::Object(map) => map,
        _ => return None,
    };

    let mut start = number_field(&scene, "start_time").unwrap_or_else(|| {
        warn!("Scene {} missing start_time, defaulting by index", index);
        index as f64 * 2.0
    });

    let mut end = number_field(&scene, "end_time").unwrap_or_else(|| {
        warn!("Scene {} missing end_time, deriving from start_time", index);
        (start + 2.0).min(duration)
    });

    if end <= start {
        warn!(
            "Scene {} end_time {:.2} <= start_time {:.2}, extending",
            index, end, start
        );
        end = start + 1.0;
    }

    start = start.clamp(0.0, duration);
    // Lower bound re-derived from the clamped start.
    end = (start + 0.1).max(end.min(duration));

    scene.insert("start_time".to_string(), json!(start));
    scene.insert("end_time".to_string(), json!(end));

    let summary_missing = scene
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    if summary_missing {
        warn!("Scene {} missing summary, generating placeholder", index);
        scene.insert(
            "summary".to_string(),
            json!(format!(
                "Scene {} from {:.1}s to {:.1}s",
                index + 1,
                start,
                end
            )),
        );
    }

    let physics = repair_physics(scene.remove("physics"), index);
    scene.insert("physics".to_string(), physics);

    Some(Value::Object(scene))
}

fn repair_physics(raw: Option<Value>, index: usize) -> Value {
    let mut physics = match raw {
        Some(Value::Object(map)) => map,
        _ => {
            warn!("Scene {} missing physics block, resetting", index);
            Map::new()
        }
    };

    let objects = physics
        .remove("objects")
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default();

    let cleaned_objects: Vec<Value> = objects
        .into_iter()
        .filter_map(|obj| clean_physics_object(obj, index))
        .collect();

    let notes = match physics.remove("notes") {
        Some(Value::String(s)) => json!(s),
        _ => Value::Null,
    };

    json!({ "objects": cleaned_objects, "notes": notes })
}

/// Normalize one physics object to the five-field shape, or drop it when
/// it has no usable name.
fn clean_physics_object(obj: Value, scene_index: usize) -> Option<Value> {
    let obj = obj.as_object()?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let name = match name {
        Some(n) => n.to_string(),
        None => {
            warn!("Scene {}: dropping physics object without a name", scene_index);
            return None;
        }
    };

    let velocity = obj.get("approx_velocity_m_s").and_then(Value::as_f64);
    let direction = obj.get("direction").and_then(Value::as_str);
    let notes = obj.get("notes").and_then(Value::as_str);

    Some(json!({
        "name": name,
        "approx_velocity_m_s": velocity,
        "direction": direction,
        "collisions": coerce_bool(obj.get("collisions")),
        "notes": notes,
    }))
}

/// Coerce a loosely-typed collisions field to a boolean.
fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(scenes: Value) -> Value {
        json!({ "scenes": scenes })
    }

    #[test]
    fn missing_end_time_derived_from_start() {
        let input = wrap(json!([{"start_time": 4.0, "summary": "x", "physics": {}}]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes[0].start_time, 4.0);
        assert_eq!(scenes[0].end_time, 6.0);
    }

    #[test]
    fn null_times_treated_as_missing() {
        let input = wrap(json!([
            {"start_time": null, "end_time": null, "summary": "x", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes[0].start_time, 0.0);
        assert_eq!(scenes[0].end_time, 2.0);
    }

    #[test]
    fn missing_start_time_defaults_by_index() {
        let input = wrap(json!([
            {"end_time": 1.0, "summary": "a", "physics": {}},
            {"end_time": 5.0, "summary": "b", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes[0].start_time, 0.0);
        assert_eq!(scenes[1].start_time, 2.0);
    }

    #[test]
    fn equal_times_near_duration_clamp_correctly() {
        let input = wrap(json!([
            {"start_time": 9.5, "end_time": 9.5, "summary": "x", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes[0].end_time, 10.0);
        assert!(scenes[0].start_time <= 9.9);
        assert!(scenes[0].end_time > scenes[0].start_time);
    }

    #[test]
    fn times_clamped_into_video_bounds() {
        let input = wrap(json!([
            {"start_time": -3.0, "end_time": 50.0, "summary": "x", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes[0].start_time, 0.0);
        assert_eq!(scenes[0].end_time, 10.0);
    }

    #[test]
    fn missing_summary_gets_placeholder_naming_the_range() {
        let input = wrap(json!([{"start_time": 2.0, "end_time": 4.0, "physics": {}}]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert!(scenes[0].summary.contains("2.0s"));
        assert!(scenes[0].summary.contains("4.0s"));
    }

    #[test]
    fn malformed_physics_resets_to_empty() {
        let input = wrap(json!([
            {"start_time": 0.0, "end_time": 2.0, "summary": "x", "physics": "not an object"}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert!(scenes[0].physics.objects.is_empty());
        assert!(scenes[0].physics.notes.is_none());
    }

    #[test]
    fn nameless_objects_dropped_and_collisions_coerced() {
        let input = wrap(json!([{
            "start_time": 0.0, "end_time": 2.0, "summary": "x",
            "physics": {
                "objects": [
                    {"direction": "left"},
                    {"name": "", "collisions": true},
                    {"name": "ball", "collisions": "true"},
                    {"name": "cart", "collisions": "false", "approx_velocity_m_s": 1.5}
                ],
                "notes": "two objects"
            }
        }]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        let objects = &scenes[0].physics.objects;
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "ball");
        assert!(objects[0].collisions);
        assert_eq!(objects[1].name, "cart");
        assert!(!objects[1].collisions);
        assert_eq!(objects[1].approx_velocity_m_s, Some(1.5));
        assert_eq!(scenes[0].physics.notes.as_deref(), Some("two objects"));
    }

    #[test]
    fn non_object_scenes_are_dropped_not_fatal() {
        let input = wrap(json!([
            "garbage",
            {"start_time": 0.0, "end_time": 2.0, "summary": "ok", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].summary, "ok");
    }

    #[test]
    fn zero_survivors_is_validation_failure() {
        let input = wrap(json!(["garbage", 42]));
        let err = clean_scenes(&input, 10.0).unwrap_err();
        assert!(matches!(err, PipelineError::Validation));

        let empty = wrap(json!([]));
        assert!(matches!(
            clean_scenes(&empty, 10.0).unwrap_err(),
            PipelineError::Validation
        ));
    }

    #[test]
    fn cleaned_scenes_satisfy_time_invariants() {
        let input = wrap(json!([
            {"start_time": 0.0, "summary": "a", "physics": {}},
            {"start_time": 8.0, "end_time": 3.0, "summary": "b", "physics": {}},
            {"end_time": 12.0, "summary": "c", "physics": {}}
        ]));
        let scenes = clean_scenes(&input, 10.0).unwrap();
        for scene in &scenes {
            assert!(scene.end_time > scene.start_time);
            assert!(scene.start_time >= 0.0);
            assert!(scene.end_time <= 10.0 + 0.1);
        }
    }
}
