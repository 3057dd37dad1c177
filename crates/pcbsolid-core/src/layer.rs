use std::fmt;
use std::str::FromStr;

/// Index of the front copper layer.
pub const TOP_COPPER: u32 = 0;
/// Index of the back copper layer.
pub const BOTTOM_COPPER: u32 = 31;
/// Canonical name of the board outline layer.
pub const EDGE_CUTS: &str = "Edge.Cuts";

#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("layer {0} not found")]
    NotFound(String),
}

/// A layer as requested by a caller: a layer index or a canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerRef {
    Index(u32),
    Name(String),
}

impl FromStr for LayerRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().parse::<u32>() {
            Ok(id) => Self::Index(id),
            Err(_) => Self::Name(s.to_string()),
        })
    }
}

impl From<u32> for LayerRef {
    fn from(id: u32) -> Self {
        Self::Index(id)
    }
}

impl From<&str> for LayerRef {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl fmt::Display for LayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Front,
    Inner,
    Back,
}

/// A layer resolved against a board's layer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub index: u32,
    pub name: String,
}

impl Layer {
    #[must_use]
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn is_copper(&self) -> bool {
        self.index <= BOTTOM_COPPER
    }

    #[must_use]
    pub fn is_bottom(&self) -> bool {
        self.index == BOTTOM_COPPER
    }

    #[must_use]
    pub fn side(&self) -> Side {
        match self.index {
            TOP_COPPER => Side::Front,
            BOTTOM_COPPER => Side::Back,
            _ => Side::Inner,
        }
    }

    /// The `*.<suffix>` wildcard that selects this layer's kind on any side.
    #[must_use]
    pub fn wildcard(&self) -> String {
        let suffix = self.name.rsplit('.').next().unwrap_or(&self.name);
        format!("*.{suffix}")
    }

    /// Whether a pad listing `pad_layers` sits on this layer.
    ///
    /// A pad matches on its exact layer name, on the `*.<suffix>` wildcard for
    /// this layer, or on the universal `*` wildcard.
    #[must_use]
    pub fn holds_pad(&self, pad_layers: &[String]) -> bool {
        let wildcard = self.wildcard();
        pad_layers
            .iter()
            .any(|l| l == &self.name || l == &wildcard || l == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_layer_refs() {
        assert_eq!("31".parse::<LayerRef>().unwrap(), LayerRef::Index(31));
        assert_eq!(
            "F.Cu".parse::<LayerRef>().unwrap(),
            LayerRef::Name("F.Cu".into())
        );
    }

    #[test]
    fn exact_name_matches() {
        let front = Layer::new(0, "F.Cu");
        assert!(front.holds_pad(&layers(&["F.Cu", "F.Mask"])));
    }

    #[test]
    fn side_wildcard_needs_the_pad_to_list_it() {
        let back = Layer::new(31, "B.Cu");
        assert_eq!(back.wildcard(), "*.Cu");
        assert!(!back.holds_pad(&layers(&["F.Cu", "F.Mask"])));
        assert!(back.holds_pad(&layers(&["F.Cu", "B.Cu"])));
        assert!(back.holds_pad(&layers(&["*.Cu", "*.Mask"])));
    }

    #[test]
    fn universal_wildcard_always_matches() {
        assert!(Layer::new(2, "In2.Cu").holds_pad(&layers(&["*"])));
        assert!(Layer::new(44, "Edge.Cuts").holds_pad(&layers(&["*"])));
    }

    #[test]
    fn sides_follow_the_stack() {
        assert_eq!(Layer::new(0, "F.Cu").side(), Side::Front);
        assert_eq!(Layer::new(3, "In3.Cu").side(), Side::Inner);
        assert!(Layer::new(31, "B.Cu").is_bottom());
        assert!(!Layer::new(44, "Edge.Cuts").is_copper());
    }
}
