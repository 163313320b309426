use glam::Vec2;

/// The camera transform the engine drives.
///
/// Implement this for whatever the host uses as a camera; the engine only
/// ever touches the camera's local offset relative to its rig.
pub trait CameraSink {
    /// Set the camera's local position relative to its rig.
    fn set_local_offset(&mut self, offset: Vec2);

    /// The camera's current local position.
    fn local_offset(&self) -> Vec2;

    /// The camera's world position, used to aim Target bumps. Defaults to
    /// the local offset, i.e. a rig sitting at the world origin.
    fn world_position(&self) -> Vec2 {
        self.local_offset()
    }
}

/// A camera mounted on a rig at a fixed world position.
///
/// Used by the headless tester and in tests; counts writes so callers can
/// tell a held offset from a rewritten one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedCamera {
    pub rig_position: Vec2,
    pub offset: Vec2,
    pub writes: u64,
}

impl SimulatedCamera {
    pub fn at(rig_position: Vec2) -> Self {
        Self {
            rig_position,
            ..Self::default()
        }
    }
}

impl CameraSink for SimulatedCamera {
    fn set_local_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.writes += 1;
    }

    fn local_offset(&self) -> Vec2 {
        self.offset
    }

    fn world_position(&self) -> Vec2 {
        self.rig_position + self.offset
    }
}

impl<T: CameraSink + ?Sized> CameraSink for &mut T {
    fn set_local_offset(&mut self, offset: Vec2) {
        (**self).set_local_offset(offset);
    }

    fn local_offset(&self) -> Vec2 {
        (**self).local_offset()
    }

    fn world_position(&self) -> Vec2 {
        (**self).world_position()
    }
}
