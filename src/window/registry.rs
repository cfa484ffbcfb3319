use std::collections::BTreeMap;

use crate::error::{Result, WidgetError};
use crate::geometry::Rect;

use super::{WidgetId, WidgetInstance};

/// Every live widget, keyed by id and iterated in registration order.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: BTreeMap<WidgetId, WidgetInstance>,
    next_seq: u64,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mut instance: WidgetInstance) -> Result<&mut WidgetInstance> {
        if self.widgets.contains_key(&instance.id) {
            return Err(WidgetError::DuplicateId(instance.id));
        }
        instance.creation_order = self.next_seq;
        self.next_seq += 1;
        let id = instance.id.clone();
        tracing::debug!(widget_id = %id, kind = %instance.kind(), "registered widget");
        Ok(self.widgets.entry(id).or_insert(instance))
    }

    pub fn unregister(&mut self, id: &WidgetId) -> Option<WidgetInstance> {
        let removed = self.widgets.remove(id);
        if removed.is_some() {
            tracing::debug!(widget_id = %id, "unregistered widget");
        }
        removed
    }

    pub fn get(&self, id: &WidgetId) -> Option<&WidgetInstance> {
        self.widgets.get(id)
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Option<&mut WidgetInstance> {
        self.widgets.get_mut(id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// All instances in registration order.
    pub fn all(&self) -> Vec<&WidgetInstance> {
        let mut all: Vec<&WidgetInstance> = self.widgets.values().collect();
        all.sort_by_key(|w| w.creation_order);
        all
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.all().into_iter().map(|w| w.id.clone()).collect()
    }

    /// Visible instances other than `id`, in registration order.
    pub fn others_visible_to(&self, id: &WidgetId) -> Vec<&WidgetInstance> {
        self.all()
            .into_iter()
            .filter(|w| w.visible && &w.id != id)
            .collect()
    }

    /// Frames of the snap targets for `id`.
    pub fn sibling_frames(&self, id: &WidgetId) -> Vec<Rect> {
        self.others_visible_to(id)
            .into_iter()
            .map(WidgetInstance::frame)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::renderer::RendererState;
    use crate::window::{SizeClass, WidgetKind};

    fn widget(id: &str, x: i32) -> WidgetInstance {
        let mut w = WidgetInstance::new(
            WidgetId::from(id),
            RendererState::empty(WidgetKind::Notes),
            SizeClass::Medium,
            Point::new(x, 0),
        );
        w.visible = true;
        w
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut reg = WidgetRegistry::new();
        reg.register(widget("a", 0)).unwrap();
        let err = reg.register(widget("a", 10)).unwrap_err();
        assert!(matches!(err, WidgetError::DuplicateId(id) if id.as_str() == "a"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&WidgetId::from("a")).unwrap().frame().x, 0);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut reg = WidgetRegistry::new();
        for id in ["zz", "aa", "mm"] {
            reg.register(widget(id, 0)).unwrap();
        }
        let ids: Vec<_> = reg.ids().into_iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn siblings_exclude_self_and_hidden() {
        let mut reg = WidgetRegistry::new();
        reg.register(widget("a", 0)).unwrap();
        reg.register(widget("b", 300)).unwrap();
        reg.register(widget("c", 600)).unwrap().visible = false;

        let frames = reg.sibling_frames(&WidgetId::from("a"));
        assert_eq!(frames, vec![Rect::new(300, 0, 240, 240)]);
    }

    #[test]
    fn unregistered_widget_stops_being_a_sibling() {
        let mut reg = WidgetRegistry::new();
        reg.register(widget("a", 0)).unwrap();
        reg.register(widget("b", 300)).unwrap();
        assert!(reg.unregister(&WidgetId::from("b")).is_some());
        assert!(reg.sibling_frames(&WidgetId::from("a")).is_empty());
        assert!(reg.unregister(&WidgetId::from("b")).is_none());
    }
}
