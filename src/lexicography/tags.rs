//! Exposition tags: the closed set of semantic markers recognised in text.

use std::fmt;
use std::str::FromStr;

/// Semantic role of a bound text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpoTag {
    /// Foreign facets used within their own metaphor (typically imports).
    Continuum,
    /// How a module's metaphor relates to the world at large.
    Throughline,
    Figuration,
    Affordance,
    /// Important datum or data classes.
    Knowledge,
    /// A small package of sequenced actions.
    Behaviour,
    /// A single action, e.g. getters/setters.
    Mechanism,
    /// An ability, e.g. inspect an entity, filter a list.
    Skill,
    /// Indication or detection of state.
    Disposition,
    /// Story woven around code sections.
    Prose,
    /// An exception or sentinel.
    Flaw,
}

impl ExpoTag {
    pub const ALL: [ExpoTag; 11] = [
        ExpoTag::Continuum,
        ExpoTag::Throughline,
        ExpoTag::Figuration,
        ExpoTag::Affordance,
        ExpoTag::Knowledge,
        ExpoTag::Behaviour,
        ExpoTag::Mechanism,
        ExpoTag::Skill,
        ExpoTag::Disposition,
        ExpoTag::Prose,
        ExpoTag::Flaw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpoTag::Continuum => "CONTINUUM",
            ExpoTag::Throughline => "THROUGHLINE",
            ExpoTag::Figuration => "FIGURATION",
            ExpoTag::Affordance => "AFFORDANCE",
            ExpoTag::Knowledge => "KNOWLEDGE",
            ExpoTag::Behaviour => "BEHAVIOUR",
            ExpoTag::Mechanism => "MECHANISM",
            ExpoTag::Skill => "SKILL",
            ExpoTag::Disposition => "DISPOSITION",
            ExpoTag::Prose => "PROSE",
            ExpoTag::Flaw => "FLAW",
        }
    }

    /// The tag `text` opens with, as `TAG:` in any case.
    pub fn leading(text: &str) -> Option<ExpoTag> {
        let upper = text.to_uppercase();
        Self::ALL.into_iter().find(|tag| {
            upper
                .strip_prefix(tag.as_str())
                .is_some_and(|rest| rest.starts_with(':'))
        })
    }
}

impl fmt::Display for ExpoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpoTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| format!("unknown exposition tag: {}", s))
    }
}
