//! Scene document: the ordered object list of one frame and its background.

use crate::objects::{InvalidMutation, ObjectId, ObjectPatch, SceneObject, SerializableColor};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by document loading and mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("failed to deserialize scene: {0}")]
    Deserialization(String),
    #[error("failed to serialize scene: {0}")]
    Serialization(String),
    #[error("invalid mutation: {0}")]
    InvalidMutation(#[from] InvalidMutation),
    #[error("object not found: {0}")]
    NotFound(ObjectId),
}

/// The vector scene of a single frame.
///
/// Object order is z-order: index 0 is drawn first (back), the last object is
/// drawn on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default = "SerializableColor::white")]
    pub background_color: SerializableColor,
    #[serde(default)]
    objects: Vec<SceneObject>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneDocument {
    /// Create an empty document with a white background.
    pub fn new() -> Self {
        Self::with_background(SerializableColor::white())
    }

    pub fn with_background(background_color: SerializableColor) -> Self {
        Self {
            background_color,
            objects: Vec::new(),
        }
    }

    /// Parse a serialized document and check its invariants.
    pub fn load(serialized: &str) -> Result<Self, SceneError> {
        let document: SceneDocument = serde_json::from_str(serialized)
            .map_err(|e| SceneError::Deserialization(e.to_string()))?;
        document
            .validate()
            .map_err(|e| SceneError::Deserialization(e.to_string()))?;
        Ok(document)
    }

    pub fn serialize(&self) -> Result<String, SceneError> {
        serde_json::to_string(self).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Check every object and the uniqueness of all ids, nested ones included.
    pub fn validate(&self) -> Result<(), InvalidMutation> {
        let mut seen = HashSet::new();
        for object in &self.objects {
            object.validate()?;
            let mut ids = Vec::new();
            object.collect_ids(&mut ids);
            for id in ids {
                if !seen.insert(id) {
                    return Err(InvalidMutation::DuplicateId(id));
                }
            }
        }
        Ok(())
    }

    /// Append an object on top of the z-order.
    pub fn add_object(&mut self, object: SceneObject) -> Result<ObjectId, SceneError> {
        object.validate()?;
        let mut ids = Vec::new();
        object.collect_ids(&mut ids);
        let mut fresh = HashSet::with_capacity(ids.len());
        for id in ids {
            if !fresh.insert(id) || self.contains_id(id) {
                return Err(InvalidMutation::DuplicateId(id).into());
            }
        }
        let id = object.id();
        self.objects.push(object);
        Ok(id)
    }

    /// Remove a top-level object. Later objects shift down one z-index.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<SceneObject, SceneError> {
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        Ok(self.objects.remove(index))
    }

    /// Apply a patch to a copy of a top-level object, validate it, then swap it in.
    pub fn update_object(&mut self, id: ObjectId, patch: ObjectPatch) -> Result<(), SceneError> {
        let index = self.index_of(id).ok_or(SceneError::NotFound(id))?;
        let mut updated = self.objects[index].clone();
        updated.apply_patch(patch)?;
        updated.validate()?;
        self.objects[index] = updated;
        Ok(())
    }

    /// Get a top-level object by id.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Find an object by id, searching inside groups.
    pub fn find(&self, id: ObjectId) -> Option<&SceneObject> {
        for object in &self.objects {
            if object.id() == id {
                return Some(object);
            }
            if let Some(found) = object.as_group().and_then(|g| g.find(id)) {
                return Some(found);
            }
        }
        None
    }

    /// Z-index of a top-level object.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Whether any object, nested or not, carries this id.
    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.find(id).is_some()
    }

    /// Objects back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SceneObject> {
        self.objects.iter()
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Union of all object bounds, `None` for an empty scene.
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.objects.iter();
        let first = iter.next()?.bounds();
        Some(iter.fold(first, |acc, o| acc.union(o.bounds())))
    }

    /// Remove every object, keeping the background.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background_color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Ellipse, Freehand, Group, Line, Rectangle, Text, Triangle};
    use kurbo::{Point, Vec2};

    fn rect_at(x: f64, y: f64) -> SceneObject {
        Rectangle::new(Point::new(x, y), 10.0, 10.0).into()
    }

    #[test]
    fn test_add_appends_on_top() {
        let mut doc = SceneDocument::new();
        let a = doc.add_object(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add_object(rect_at(5.0, 5.0)).unwrap();
        assert_eq!(doc.index_of(a), Some(0));
        assert_eq!(doc.index_of(b), Some(1));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut doc = SceneDocument::new();
        let rect = rect_at(0.0, 0.0);
        doc.add_object(rect.clone()).unwrap();
        let err = doc.add_object(rect.clone()).unwrap_err();
        assert_eq!(
            err,
            SceneError::InvalidMutation(InvalidMutation::DuplicateId(rect.id()))
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_duplicate_nested_id_rejected() {
        let mut doc = SceneDocument::new();
        let label = Text::new(Point::ZERO, "Note");
        doc.add_object(label.clone().into()).unwrap();
        let group = Group::new(vec![rect_at(0.0, 0.0), label.into()]);
        assert!(doc.add_object(group.into()).is_err());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut doc = SceneDocument::new();
        let bad = Rectangle::new(Point::new(f64::INFINITY, 0.0), 1.0, 1.0);
        assert!(matches!(
            doc.add_object(bad.into()),
            Err(SceneError::InvalidMutation(InvalidMutation::NonFinite(_)))
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_remove_shifts_z_order() {
        let mut doc = SceneDocument::new();
        let a = doc.add_object(rect_at(0.0, 0.0)).unwrap();
        let b = doc.add_object(rect_at(1.0, 1.0)).unwrap();
        let c = doc.add_object(rect_at(2.0, 2.0)).unwrap();
        let removed = doc.remove_object(b).unwrap();
        assert_eq!(removed.id(), b);
        assert_eq!(doc.index_of(a), Some(0));
        assert_eq!(doc.index_of(c), Some(1));
        assert_eq!(doc.remove_object(b), Err(SceneError::NotFound(b)));
    }

    #[test]
    fn test_update_is_atomic() {
        let mut doc = SceneDocument::new();
        let id = doc.add_object(rect_at(0.0, 0.0)).unwrap();
        let before = doc.clone();

        let err = doc.update_object(id, ObjectPatch::Opacity(2.0)).unwrap_err();
        assert_eq!(err, SceneError::InvalidMutation(InvalidMutation::Opacity(2.0)));
        assert_eq!(doc, before);

        doc.update_object(id, ObjectPatch::Translate(Vec2::new(3.0, 4.0)))
            .unwrap();
        assert_eq!(doc.get(id).unwrap().position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_round_trip_every_variant() {
        let mut doc = SceneDocument::with_background(SerializableColor::from_hex("#F0F0F0").unwrap());
        let mut path = Freehand::from_points(vec![Point::new(0.1, 0.2), Point::new(1.0 / 3.0, 7.25)]);
        path.style.stroke_color = SerializableColor::from_hex("#11223360").unwrap();
        doc.add_object(path.into()).unwrap();
        doc.add_object(Rectangle::new(Point::new(1.0, 2.0), 3.0, 4.0).with_corner_radius(4.0).into())
            .unwrap();
        doc.add_object(Ellipse::new(Point::new(5.0, 5.0), 2.5, 1.5).into())
            .unwrap();
        doc.add_object(Line::new(Point::ZERO, Point::new(9.0, 9.0)).into())
            .unwrap();
        doc.add_object(Triangle::new(Point::new(-4.0, 2.0), 8.0, 6.0).into())
            .unwrap();
        doc.add_object(
            Group::new(vec![rect_at(0.0, 0.0), Text::new(Point::ZERO, "Note").into()]).into(),
        )
        .unwrap();

        let json = doc.serialize().unwrap();
        let back = SceneDocument::load(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_load_rejects_malformed_and_invalid() {
        assert!(matches!(
            SceneDocument::load("{not json"),
            Err(SceneError::Deserialization(_))
        ));

        let mut doc = SceneDocument::new();
        let rect = rect_at(0.0, 0.0);
        doc.add_object(rect.clone()).unwrap();
        // bypass add_object to forge a duplicate
        doc.objects.push(rect);
        let json = serde_json::to_string(&doc).unwrap();
        assert!(matches!(
            SceneDocument::load(&json),
            Err(SceneError::Deserialization(_))
        ));
    }

    #[test]
    fn test_load_defaults_missing_fields() {
        let doc = SceneDocument::load("{}").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.background_color, SerializableColor::white());
    }

    #[test]
    fn test_bounds_union() {
        let mut doc = SceneDocument::new();
        assert!(doc.bounds().is_none());
        doc.add_object(rect_at(0.0, 0.0)).unwrap();
        doc.add_object(rect_at(90.0, 40.0)).unwrap();
        assert_eq!(doc.bounds(), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }
}
