use crate::window::WidgetId;

/// Terminal host bookkeeping that is not part of the widget layout.
#[derive(Debug, Default, Clone)]
pub struct HostState {
    focused: Option<WidgetId>,
    captured: Option<WidgetId>,
    hovered: Option<WidgetId>,
    status: String,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&WidgetId> {
        self.focused.as_ref()
    }

    pub fn set_focus(&mut self, id: Option<WidgetId>) {
        self.focused = id;
    }

    /// Move focus through `order`, wrapping at both ends.
    pub fn cycle_focus(&mut self, order: &[WidgetId], forward: bool) -> Option<&WidgetId> {
        if order.is_empty() {
            self.focused = None;
            return None;
        }
        let current = self
            .focused
            .as_ref()
            .and_then(|f| order.iter().position(|id| id == f));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => order.len() - 1,
            (Some(i), true) => (i + 1) % order.len(),
            (Some(i), false) => (i + order.len() - 1) % order.len(),
        };
        self.focused = Some(order[next].clone());
        self.focused.as_ref()
    }

    /// Widget holding the pointer between press and release.
    pub fn captured(&self) -> Option<&WidgetId> {
        self.captured.as_ref()
    }

    pub fn capture(&mut self, id: WidgetId) {
        self.captured = Some(id);
    }

    pub fn release(&mut self) -> Option<WidgetId> {
        self.captured.take()
    }

    /// Record the widget under a moving pointer. Returns the widget the
    /// pointer just left, if any.
    pub fn hover(&mut self, id: Option<WidgetId>) -> Option<WidgetId> {
        if self.hovered == id {
            return None;
        }
        std::mem::replace(&mut self.hovered, id)
    }

    /// Drop every reference to a closed widget.
    pub fn forget(&mut self, id: &WidgetId) {
        if self.focused.as_ref() == Some(id) {
            self.focused = None;
        }
        if self.captured.as_ref() == Some(id) {
            self.captured = None;
        }
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<WidgetId> {
        ["a", "b", "c"].into_iter().map(WidgetId::from).collect()
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let order = ids();
        let mut s = HostState::new();
        assert_eq!(s.cycle_focus(&order, true), Some(&order[0]));
        assert_eq!(s.cycle_focus(&order, false), Some(&order[2]));
        assert_eq!(s.cycle_focus(&order, true), Some(&order[0]));
        assert_eq!(s.cycle_focus(&[], true), None);
        assert!(s.focused().is_none());
    }

    #[test]
    fn forget_clears_focus_and_capture() {
        let mut s = HostState::new();
        let id = WidgetId::from("a");
        s.set_focus(Some(id.clone()));
        s.capture(id.clone());
        s.hover(Some(id.clone()));
        s.forget(&id);
        assert!(s.focused().is_none());
        assert!(s.release().is_none());
        assert_eq!(s.hover(None), None);
    }

    #[test]
    fn hover_reports_the_widget_left_behind() {
        let [a, b, _] = <[WidgetId; 3]>::try_from(ids()).unwrap();
        let mut s = HostState::new();
        assert_eq!(s.hover(Some(a.clone())), None);
        assert_eq!(s.hover(Some(a.clone())), None);
        assert_eq!(s.hover(Some(b.clone())), Some(a));
        assert_eq!(s.hover(None), Some(b));
        assert_eq!(s.hover(None), None);
    }
}
