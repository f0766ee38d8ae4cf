//! Scene and physics annotation schemas.
//!
//! These are the structured output types of the analysis pipeline. The
//! structuring model is prompted to emit JSON matching exactly this shape;
//! the validator repairs near-misses before they are deserialized into
//! these types.

use serde::{Deserialize, Serialize};

/// Physics annotations for a single object observed in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsObject {
    /// Name of the object (required; objects without one are dropped)
    pub name: String,

    /// Approximate velocity in meters per second, when estimable
    #[serde(default)]
    pub approx_velocity_m_s: Option<f64>,

    /// Direction of movement (free text, e.g. "left to right")
    #[serde(default)]
    pub direction: Option<String>,

    /// Whether the object is involved in a collision
    #[serde(default)]
    pub collisions: bool,

    /// Additional physics notes for this object
    #[serde(default)]
    pub notes: Option<String>,
}

/// Physics annotations for a scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Physics {
    /// Objects observed in the scene, in order of appearance
    #[serde(default)]
    pub objects: Vec<PhysicsObject>,

    /// Scene-level physics notes
    #[serde(default)]
    pub notes: Option<String>,
}

/// A time-bounded video segment with a summary and physics annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene start time in seconds (>= 0)
    pub start_time: f64,

    /// Scene end time in seconds (> start_time after validation)
    pub end_time: f64,

    /// Natural-language summary of what happens in the scene
    pub summary: String,

    /// Physics annotations for the scene
    pub physics: Physics,
}

impl Scene {
    /// Duration of the scene in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Structured output of the analysis pipeline: an ordered list of scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    /// Analyzed scenes in chronological order
    pub scenes: Vec<Scene>,
}

/// Terminal response of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Cleaned, validated scenes in chronological order
    pub scenes: Vec<Scene>,

    /// Verbatim free-text frame analysis from the first model stage
    pub frame_analysis: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_roundtrips_through_json() {
        let scene = Scene {
            start_time: 0.0,
            end_time: 2.0,
            summary: "A ball rolls across the table".to_string(),
            physics: Physics {
                objects: vec![PhysicsObject {
                    name: "ball".to_string(),
                    approx_velocity_m_s: Some(0.5),
                    direction: Some("left to right".to_string()),
                    collisions: false,
                    notes: None,
                }],
                notes: Some("constant velocity, no visible friction".to_string()),
            },
        };

        let json = serde_json::to_string(&scene).unwrap();
        let back: Scene = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }

    #[test]
    fn physics_defaults_fill_missing_fields() {
        let obj: PhysicsObject = serde_json::from_str(r#"{"name": "cart"}"#).unwrap();
        assert_eq!(obj.name, "cart");
        assert!(obj.approx_velocity_m_s.is_none());
        assert!(!obj.collisions);

        let physics: Physics = serde_json::from_str("{}").unwrap();
        assert!(physics.objects.is_empty());
        assert!(physics.notes.is_none());
    }
}
