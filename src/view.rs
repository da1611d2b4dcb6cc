use crate::geometry::Point;
use crate::layer::LayerKind;
use crate::output::OutputId;
use crate::surface::SurfaceId;
use crate::transform::Transform;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

/// The placement of one surface on one output.
///
/// A surface that spans several outputs has one view per output; stacking
/// and effects act on views, not surfaces. `layer` is `None` only
/// transiently while a view is re-parented between layers.
pub struct View {
    pub id: ViewId,
    pub surface: SurfaceId,
    pub output: OutputId,
    pub layer: Option<LayerKind>,
    pub pos: Point,
    /// Effect override applied on top of the plain position, identity
    /// when no effect is active.
    pub transform: Transform,
    /// Views of surfaces on a non-current workspace stay stacked but are
    /// neither drawn nor pickable.
    pub hidden: bool,
}

impl View {
    pub fn new(id: ViewId, surface: SurfaceId, output: OutputId, pos: Point) -> Self {
        Self {
            id,
            surface,
            output,
            layer: None,
            pos,
            transform: Transform::IDENTITY,
            hidden: false,
        }
    }
}
