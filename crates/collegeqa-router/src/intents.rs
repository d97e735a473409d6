//! Ordered rule table for general (not college-specific) questions.
//!
//! Rules are evaluated in order and the first match wins, so the table is
//! plain data that can be checked without the router.

use regex::Regex;

use collegeqa_core::error::{Error, Result};
use collegeqa_core::types::Intent;

/// Built-in patterns. All are matched case-insensitively.
pub const STANDARD_RULES: &[(&str, Intent)] = &[
    (r"\b(what|how)\b.*\badmissions?\b.*\b(process|procedure|criteria|requirements?)\b", Intent::Admission),
    (r"\bwhat is the (admission|application) process\b", Intent::Admission),
    (r"\bhow (do|can|to) (i )?(get (an )?admission|get admitted|apply|take admission)\b", Intent::Admission),
    (r"\b(which|what) entrance exams?\b", Intent::Admission),
    (r"\bwhat (is|are) the (total |annual |yearly |tuition |course |hostel )?fees?\b", Intent::Fees),
    (r"\bfees? structure\b", Intent::Fees),
    (r"\bhow much (does it|will it|do i have to|do i need to) (cost|pay)\b", Intent::Fees),
    (r"\b(what|how) (is|are) the (average |highest |median |overall )?(placements?|packages?|salary|ctc)\b", Intent::Placement),
    (r"\bplacement (record|records|statistics|stats|percentage|rate)\b", Intent::Placement),
    (r"\b(which|what) companies (visit|come|recruit|hire)\b", Intent::Placement),
    (r"\btop recruiters\b", Intent::Placement),
    (r"\b(which|what) (is|are) the (best|top|good) (colleges?|institutes?|universities?)\b", Intent::Clarification),
    (r"\b(list|suggest|recommend)\b.*\bcolleges?\b", Intent::Clarification),
    (r"^\s*(hi|hello|hey|help)\b", Intent::Clarification),
];

pub struct IntentRules {
    rules: Vec<(Regex, Intent)>,
}

impl IntentRules {
    /// Compile `(pattern, intent)` pairs, keeping their order.
    pub fn new<'a, I>(rules: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Intent)>,
    {
        let rules = rules
            .into_iter()
            .map(|(pattern, intent)| {
                Regex::new(&format!("(?i){pattern}"))
                    .map(|re| (re, intent))
                    .map_err(|e| Error::InvalidConfig(format!("intent pattern {pattern:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn standard() -> Result<Self> { Self::new(STANDARD_RULES.iter().copied()) }

    /// First matching intent.
    pub fn detect(&self, query: &str) -> Option<Intent> {
        self.rules.iter().find(|(re, _)| re.is_match(query)).map(|(_, intent)| *intent)
    }

    pub fn len(&self) -> usize { self.rules.len() }

    pub fn is_empty(&self) -> bool { self.rules.is_empty() }
}
