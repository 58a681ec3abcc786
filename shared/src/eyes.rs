/// Eye selection, e.g. which eye the tracker considers most accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Eyes {
    /// Both eyes.
    #[default]
    Both = 0,
    /// Only the left eye.
    Left = 1,
    /// Only the right eye.
    Right = 2,
}

impl Eyes {
    /// Translates a raw service value, falling back to [`Eyes::Both`].
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Self::Left,
            2 => Self::Right,
            _ => Self::Both,
        }
    }
}
