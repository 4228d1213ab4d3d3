/// Denotes that the inner `T` is relative to the origin of its own sub-mesh, in raw map units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocalUnits<T>(pub T);

/// Denotes that the inner `T` is in world space: map units offset by the sub-mesh's grid position, then scaled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalUnits<T>(pub T);
