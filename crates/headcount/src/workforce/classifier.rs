//! Department ("pôle") classification.
//!
//! A single ordered rule table maps free-text department labels onto a closed
//! set of categories. The first rule with a matching keyword wins; anything
//! unmatched, missing or blank lands in [`Category::Other`].

use serde::{Deserialize, Serialize};

/// Bumped whenever [`RULES`] changes so reports can state which mapping they used.
pub const CLASSIFIER_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Tech,
    Ops,
    GeneralAndAdmin,
    Sales,
    Marketing,
    Codir,
    Uk,
    Other,
}

impl Category {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Tech,
            Self::Ops,
            Self::GeneralAndAdmin,
            Self::Sales,
            Self::Marketing,
            Self::Codir,
            Self::Uk,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Tech => "Tech",
            Self::Ops => "Ops",
            Self::GeneralAndAdmin => "G&A",
            Self::Sales => "Sales",
            Self::Marketing => "Marketing",
            Self::Codir => "CODIR",
            Self::Uk => "UK",
            Self::Other => "Autres",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// Matches anywhere in the lower-cased label.
    Substring(&'static str),
    /// Matches a whole alphanumeric token only.
    Word(&'static str),
}

impl Keyword {
    fn matches(self, lowered: &str) -> bool {
        match self {
            Self::Substring(needle) => lowered.contains(needle),
            Self::Word(needle) => lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == needle),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: Category,
    pub keywords: &'static [Keyword],
}

pub const RULES: &[Rule] = &[
    Rule {
        category: Category::Tech,
        keywords: &[Keyword::Substring("tech")],
    },
    Rule {
        category: Category::Ops,
        keywords: &[Keyword::Substring("ops")],
    },
    Rule {
        category: Category::GeneralAndAdmin,
        keywords: &[
            Keyword::Substring("g&a"),
            Keyword::Substring("finance"),
            Keyword::Substring("admin"),
            Keyword::Substring("legal"),
            Keyword::Word("rh"),
            Keyword::Word("ga"),
        ],
    },
    Rule {
        category: Category::Sales,
        keywords: &[Keyword::Substring("sales")],
    },
    Rule {
        category: Category::Marketing,
        keywords: &[Keyword::Substring("market")],
    },
    Rule {
        category: Category::Codir,
        keywords: &[
            Keyword::Substring("codir"),
            Keyword::Substring("comité"),
            Keyword::Substring("comite"),
        ],
    },
    Rule {
        category: Category::Uk,
        keywords: &[Keyword::Substring("uk")],
    },
];

pub fn classify(label: Option<&str>) -> Category {
    let Some(label) = label else {
        return Category::Other;
    };
    let lowered = label.trim().to_lowercase();
    if lowered.is_empty() {
        return Category::Other;
    }

    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|keyword| keyword.matches(&lowered)))
        .map_or(Category::Other, |rule| rule.category)
}
