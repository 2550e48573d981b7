use serde::{Deserialize, Serialize};

/// Normalized easing law used to shape a slope profile.
///
/// Every law maps [0, 1] onto [0, 1] with `law(0) = 0` and `law(1) = 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    #[default]
    Line,
    Sine,
    Quad,
    Cubic,
}

impl Easing {
    /// All recognized laws, in declaration order.
    pub const ALL: [Easing; 4] = [Easing::Line, Easing::Sine, Easing::Quad, Easing::Cubic];

    /// The caller-facing name of the law.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Line => "line",
            Easing::Sine => "sine",
            Easing::Quad => "quad",
            Easing::Cubic => "cubic",
        }
    }

    /// Look up a law by its name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Easing> {
        Self::ALL.into_iter().find(|law| law.name() == name)
    }

    /// Names accepted by [`Easing::from_name`].
    pub fn names() -> [&'static str; 4] {
        Self::ALL.map(Easing::name)
    }
}

impl std::fmt::Display for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
