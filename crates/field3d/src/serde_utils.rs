//! Serde helpers for glam types, which are built without glam's `serde` feature.

/// `#[serde(with = "crate::serde_utils::vec3")]` for `Vec3` fields, stored as
/// `{"x": .., "y": .., "z": ..}`.
pub mod vec3 {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Components {
        x: f32,
        y: f32,
        z: f32,
    }

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        Components {
            x: v.x,
            y: v.y,
            z: v.z,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let c = Components::deserialize(d)?;
        Ok(Vec3::new(c.x, c.y, c.z))
    }
}
