use std::collections::HashMap;

use crate::view::ViewId;

/// The global stacking layers, bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Apps,
    Panels,
    Overlay,
}

impl LayerKind {
    /// Hit-testing order: topmost layer first.
    pub const TOP_DOWN: [LayerKind; 4] = [
        LayerKind::Overlay,
        LayerKind::Panels,
        LayerKind::Apps,
        LayerKind::Background,
    ];
}

#[derive(Clone, Copy, Default)]
struct Node {
    above: Option<ViewId>,
    below: Option<ViewId>,
}

/// An ordered stack of views. The front of the order is the topmost,
/// fully visible view.
///
/// The order is a doubly-linked chain keyed by view id, so raise/lower
/// are O(1) and never reshuffle unrelated views. Removing a view that is
/// not in the layer is a no-op; view destruction races with layer
/// teardown and both sides may try the removal.
#[derive(Default)]
pub struct Layer {
    nodes: HashMap<ViewId, Node>,
    front: Option<ViewId>,
    back: Option<ViewId>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.nodes.contains_key(&view)
    }

    pub fn top_view(&self) -> Option<ViewId> {
        self.front
    }

    /// Adds a view at the front of the order. Re-adding an already
    /// stacked view just raises it.
    pub fn add(&mut self, view: ViewId) {
        if self.contains(view) {
            self.raise_on_top(view);
            return;
        }
        self.link_front(view);
    }

    /// Removes a view from the order. Returns whether it was present.
    pub fn remove(&mut self, view: ViewId) -> bool {
        self.unlink(view)
    }

    pub fn raise_on_top(&mut self, view: ViewId) {
        if !self.unlink(view) {
            return;
        }
        self.link_front(view);
    }

    pub fn lower(&mut self, view: ViewId) {
        if !self.unlink(view) {
            return;
        }
        self.link_back(view);
    }

    /// Iterates the order front (topmost) to back.
    pub fn iter_front_to_back(&self) -> impl Iterator<Item = ViewId> + '_ {
        let mut cursor = self.front;
        std::iter::from_fn(move || {
            let current = cursor?;
            cursor = self.nodes.get(&current).and_then(|node| node.below);
            Some(current)
        })
    }

    fn link_front(&mut self, view: ViewId) {
        let old_front = self.front;
        self.nodes.insert(
            view,
            Node {
                above: None,
                below: old_front,
            },
        );
        if let Some(old) = old_front
            && let Some(node) = self.nodes.get_mut(&old)
        {
            node.above = Some(view);
        }
        self.front = Some(view);
        if self.back.is_none() {
            self.back = Some(view);
        }
    }

    fn link_back(&mut self, view: ViewId) {
        let old_back = self.back;
        self.nodes.insert(
            view,
            Node {
                above: old_back,
                below: None,
            },
        );
        if let Some(old) = old_back
            && let Some(node) = self.nodes.get_mut(&old)
        {
            node.below = Some(view);
        }
        self.back = Some(view);
        if self.front.is_none() {
            self.front = Some(view);
        }
    }

    fn unlink(&mut self, view: ViewId) -> bool {
        let Some(node) = self.nodes.remove(&view) else {
            return false;
        };
        match node.above {
            Some(above) => {
                if let Some(above_node) = self.nodes.get_mut(&above) {
                    above_node.below = node.below;
                }
            }
            None => self.front = node.below,
        }
        match node.below {
            Some(below) => {
                if let Some(below_node) = self.nodes.get_mut(&below) {
                    below_node.above = node.above;
                }
            }
            None => self.back = node.above,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn view(id: u32) -> ViewId {
        ViewId(id)
    }

    fn order(layer: &Layer) -> Vec<ViewId> {
        layer.iter_front_to_back().collect()
    }

    #[test]
    fn add_stacks_on_top() {
        let mut layer = Layer::new();
        layer.add(view(1));
        layer.add(view(2));
        layer.add(view(3));
        assert_eq!(layer.top_view(), Some(view(3)));
        assert_eq!(order(&layer), vec![view(3), view(2), view(1)]);
    }

    #[test]
    fn raise_moves_to_front_lower_to_back() {
        let mut layer = Layer::new();
        for id in 1..=3 {
            layer.add(view(id));
        }
        layer.raise_on_top(view(1));
        assert_eq!(order(&layer), vec![view(1), view(3), view(2)]);
        layer.lower(view(3));
        assert_eq!(order(&layer), vec![view(1), view(2), view(3)]);
        assert_eq!(layer.top_view(), Some(view(1)));
    }

    #[test]
    fn top_view_tracks_last_raise() {
        let mut layer = Layer::new();
        for id in 1..=4 {
            layer.add(view(id));
        }
        layer.raise_on_top(view(2));
        layer.raise_on_top(view(4));
        assert_eq!(layer.top_view(), Some(view(4)));
        // A lower on the raised view demotes it and exposes another view.
        layer.lower(view(4));
        assert_ne!(layer.top_view(), Some(view(4)));
        assert_eq!(layer.top_view(), Some(view(2)));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut layer = Layer::new();
        layer.add(view(1));
        layer.add(view(2));
        assert!(layer.remove(view(1)));
        assert!(!layer.remove(view(1)));
        assert!(!layer.remove(view(99)));
        assert_eq!(order(&layer), vec![view(2)]);
        // Raising or lowering a removed view is also a no-op.
        layer.raise_on_top(view(1));
        layer.lower(view(1));
        assert_eq!(order(&layer), vec![view(2)]);
    }

    #[test]
    fn singleton_layer_survives_raise_and_lower() {
        let mut layer = Layer::new();
        layer.add(view(7));
        layer.raise_on_top(view(7));
        layer.lower(view(7));
        assert_eq!(layer.top_view(), Some(view(7)));
        assert!(layer.remove(view(7)));
        assert_eq!(layer.top_view(), None);
        assert!(layer.is_empty());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Raise(u32),
        Lower(u32),
        Remove(u32),
        Add(u32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..8).prop_map(Op::Raise),
            (0u32..8).prop_map(Op::Lower),
            (0u32..8).prop_map(Op::Remove),
            (0u32..8).prop_map(Op::Add),
        ]
    }

    proptest! {
        /// The linked order agrees with a naive vector model under any
        /// sequence of stacking operations.
        #[test]
        fn matches_vec_model(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut layer = Layer::new();
            // Model: front of the Vec is the top of the stack.
            let mut model: Vec<ViewId> = Vec::new();

            for op in ops {
                match op {
                    Op::Add(id) => {
                        let id = view(id);
                        model.retain(|v| *v != id);
                        model.insert(0, id);
                        layer.add(id);
                    }
                    Op::Raise(id) => {
                        let id = view(id);
                        if model.contains(&id) {
                            model.retain(|v| *v != id);
                            model.insert(0, id);
                        }
                        layer.raise_on_top(id);
                    }
                    Op::Lower(id) => {
                        let id = view(id);
                        if model.contains(&id) {
                            model.retain(|v| *v != id);
                            model.push(id);
                        }
                        layer.lower(id);
                    }
                    Op::Remove(id) => {
                        let id = view(id);
                        model.retain(|v| *v != id);
                        layer.remove(id);
                    }
                }
                prop_assert_eq!(order(&layer), model.clone());
                prop_assert_eq!(layer.top_view(), model.first().copied());
            }
        }
    }
}
