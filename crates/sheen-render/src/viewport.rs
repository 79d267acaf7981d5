//! Readiness latch for deferred renderer construction.

/// Notify-once gate that arms when the host surface first reports a usable
/// (nonzero) size.
///
/// Replaces a retry-with-delay poll: the host calls [`ViewportGate::try_arm`]
/// from its resize/first-frame events, and constructs the renderers on the
/// single call that returns `true`.
#[derive(Debug, Default)]
pub struct ViewportGate {
    armed: bool,
}

impl ViewportGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the current surface size. Returns `true` exactly once: the
    /// first time both dimensions are nonzero.
    pub fn try_arm(&mut self, width: u32, height: u32) -> bool {
        if self.armed || width == 0 || height == 0 {
            return false;
        }
        self.armed = true;
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_never_arms() {
        let mut gate = ViewportGate::new();
        assert!(!gate.try_arm(0, 0));
        assert!(!gate.try_arm(0, 600));
        assert!(!gate.try_arm(800, 0));
        assert!(!gate.is_armed());
    }

    #[test]
    fn arms_exactly_once_on_first_usable_size() {
        let mut gate = ViewportGate::new();
        assert!(!gate.try_arm(0, 0));
        assert!(gate.try_arm(800, 600));
        assert!(gate.is_armed());

        // Later size reports never re-arm.
        assert!(!gate.try_arm(800, 600));
        assert!(!gate.try_arm(1920, 1080));
    }
}
