//! Evaluation criteria catalog
//!
//! Every indicator evaluation answers the same four criteria categories, each
//! with a fixed list of sub-questions. The catalog is static: adding a
//! question means adding a variant here and a field in the matching group.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::status::ParseEnumError;

/// Criteria category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaCategory {
    Relevance,
    Effectiveness,
    Efficiency,
    Sustainability,
}

impl CriteriaCategory {
    /// Categories in form order
    pub const ALL: [CriteriaCategory; 4] = [
        CriteriaCategory::Relevance,
        CriteriaCategory::Effectiveness,
        CriteriaCategory::Efficiency,
        CriteriaCategory::Sustainability,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            CriteriaCategory::Relevance => "relevance",
            CriteriaCategory::Effectiveness => "effectiveness",
            CriteriaCategory::Efficiency => "efficiency",
            CriteriaCategory::Sustainability => "sustainability",
        }
    }

    /// Section heading for the reporting layer
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CriteriaCategory::Relevance => "Relevance",
            CriteriaCategory::Effectiveness => "Effectiveness",
            CriteriaCategory::Efficiency => "Efficiency",
            CriteriaCategory::Sustainability => "Sustainability",
        }
    }

    /// Sub-questions of this category, in form order
    #[must_use]
    pub fn questions(self) -> &'static [CriterionQuestion] {
        use CriterionQuestion::*;
        match self {
            CriteriaCategory::Relevance => {
                &[EnvironmentChanges, NeedsChange, TargetChangeNeeded]
            }
            CriteriaCategory::Effectiveness => {
                &[TargetAchieved, OutputsDelivered, ShortfallReasons]
            }
            CriteriaCategory::Efficiency => &[
                ResourceUtilization,
                CostEffectiveness,
                ProcessImprovements,
            ],
            CriteriaCategory::Sustainability => {
                &[ContinuationPlan, Risks, InstitutionalCapacity]
            }
        }
    }
}

impl fmt::Display for CriteriaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single free-text question inside a criteria category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionQuestion {
    // relevance
    EnvironmentChanges,
    NeedsChange,
    TargetChangeNeeded,
    // effectiveness
    TargetAchieved,
    OutputsDelivered,
    ShortfallReasons,
    // efficiency
    ResourceUtilization,
    CostEffectiveness,
    ProcessImprovements,
    // sustainability
    ContinuationPlan,
    Risks,
    InstitutionalCapacity,
}

impl CriterionQuestion {
    /// Every question, category by category
    pub fn all() -> impl Iterator<Item = CriterionQuestion> {
        CriteriaCategory::ALL
            .into_iter()
            .flat_map(|category| category.questions().iter().copied())
    }

    #[must_use]
    pub fn category(self) -> CriteriaCategory {
        use CriterionQuestion::*;
        match self {
            EnvironmentChanges | NeedsChange | TargetChangeNeeded => CriteriaCategory::Relevance,
            TargetAchieved | OutputsDelivered | ShortfallReasons => {
                CriteriaCategory::Effectiveness
            }
            ResourceUtilization | CostEffectiveness | ProcessImprovements => {
                CriteriaCategory::Efficiency
            }
            ContinuationPlan | Risks | InstitutionalCapacity => CriteriaCategory::Sustainability,
        }
    }

    /// Stable machine key
    #[must_use]
    pub fn key(self) -> &'static str {
        use CriterionQuestion::*;
        match self {
            EnvironmentChanges => "environment_changes",
            NeedsChange => "needs_change",
            TargetChangeNeeded => "target_change_needed",
            TargetAchieved => "target_achieved",
            OutputsDelivered => "outputs_delivered",
            ShortfallReasons => "shortfall_reasons",
            ResourceUtilization => "resource_utilization",
            CostEffectiveness => "cost_effectiveness",
            ProcessImprovements => "process_improvements",
            ContinuationPlan => "continuation_plan",
            Risks => "risks",
            InstitutionalCapacity => "institutional_capacity",
        }
    }

    /// Question text shown on the form
    #[must_use]
    pub fn label(self) -> &'static str {
        use CriterionQuestion::*;
        match self {
            EnvironmentChanges => "Have there been changes in the operating environment?",
            NeedsChange => "Have the needs of the target group changed?",
            TargetChangeNeeded => "Does the indicator target need to change?",
            TargetAchieved => "Was the target achieved?",
            OutputsDelivered => "Which outputs were delivered?",
            ShortfallReasons => "What explains any shortfall?",
            ResourceUtilization => "How were budget and staff used?",
            CostEffectiveness => "Were results achieved at reasonable cost?",
            ProcessImprovements => "Which process improvements are possible?",
            ContinuationPlan => "How will results be sustained next year?",
            Risks => "What risks threaten the results?",
            InstitutionalCapacity => "Does the department have the capacity to continue?",
        }
    }
}

impl fmt::Display for CriterionQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CriterionQuestion {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriterionQuestion::all()
            .find(|q| q.key() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "question",
                value: s.to_string(),
            })
    }
}

/// Relevance answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceAnswers {
    pub environment_changes: String,
    pub needs_change: String,
    pub target_change_needed: String,
}

/// Effectiveness answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivenessAnswers {
    pub target_achieved: String,
    pub outputs_delivered: String,
    pub shortfall_reasons: String,
}

/// Efficiency answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EfficiencyAnswers {
    pub resource_utilization: String,
    pub cost_effectiveness: String,
    pub process_improvements: String,
}

/// Sustainability answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SustainabilityAnswers {
    pub continuation_plan: String,
    pub risks: String,
    pub institutional_capacity: String,
}

/// All four criteria groups for one indicator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaAnswers {
    pub relevance: RelevanceAnswers,
    pub effectiveness: EffectivenessAnswers,
    pub efficiency: EfficiencyAnswers,
    pub sustainability: SustainabilityAnswers,
}

impl CriteriaAnswers {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, question: CriterionQuestion, text: impl Into<String>) -> Self {
        self.set(question, text);
        self
    }

    #[must_use]
    pub fn get(&self, question: CriterionQuestion) -> &str {
        use CriterionQuestion::*;
        match question {
            EnvironmentChanges => &self.relevance.environment_changes,
            NeedsChange => &self.relevance.needs_change,
            TargetChangeNeeded => &self.relevance.target_change_needed,
            TargetAchieved => &self.effectiveness.target_achieved,
            OutputsDelivered => &self.effectiveness.outputs_delivered,
            ShortfallReasons => &self.effectiveness.shortfall_reasons,
            ResourceUtilization => &self.efficiency.resource_utilization,
            CostEffectiveness => &self.efficiency.cost_effectiveness,
            ProcessImprovements => &self.efficiency.process_improvements,
            ContinuationPlan => &self.sustainability.continuation_plan,
            Risks => &self.sustainability.risks,
            InstitutionalCapacity => &self.sustainability.institutional_capacity,
        }
    }

    pub fn set(&mut self, question: CriterionQuestion, text: impl Into<String>) {
        *self.slot(question) = text.into();
    }

    fn slot(&mut self, question: CriterionQuestion) -> &mut String {
        use CriterionQuestion::*;
        match question {
            EnvironmentChanges => &mut self.relevance.environment_changes,
            NeedsChange => &mut self.relevance.needs_change,
            TargetChangeNeeded => &mut self.relevance.target_change_needed,
            TargetAchieved => &mut self.effectiveness.target_achieved,
            OutputsDelivered => &mut self.effectiveness.outputs_delivered,
            ShortfallReasons => &mut self.effectiveness.shortfall_reasons,
            ResourceUtilization => &mut self.efficiency.resource_utilization,
            CostEffectiveness => &mut self.efficiency.cost_effectiveness,
            ProcessImprovements => &mut self.efficiency.process_improvements,
            ContinuationPlan => &mut self.sustainability.continuation_plan,
            Risks => &mut self.sustainability.risks,
            InstitutionalCapacity => &mut self.sustainability.institutional_capacity,
        }
    }

    /// Number of answers containing more than whitespace
    #[must_use]
    pub fn answered_count(&self) -> usize {
        CriterionQuestion::all()
            .filter(|q| !self.get(*q).trim().is_empty())
            .count()
    }

    /// No question has a non-blank answer
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.answered_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_question_belongs_to_its_category() {
        for category in CriteriaCategory::ALL {
            for question in category.questions() {
                assert_eq!(question.category(), category);
            }
        }
        assert_eq!(CriterionQuestion::all().count(), 12);
    }

    #[test]
    fn keys_round_trip_through_from_str() {
        for question in CriterionQuestion::all() {
            assert_eq!(question.key().parse::<CriterionQuestion>().unwrap(), question);
        }
        assert!("favourite_colour".parse::<CriterionQuestion>().is_err());
    }

    #[test]
    fn set_and_get_address_the_same_field() {
        let answers = CriteriaAnswers::new()
            .with(CriterionQuestion::NeedsChange, "yes")
            .with(CriterionQuestion::Risks, "staff turnover");

        assert_eq!(answers.relevance.needs_change, "yes");
        assert_eq!(answers.sustainability.risks, "staff turnover");
        assert_eq!(answers.get(CriterionQuestion::Risks), "staff turnover");
        assert_eq!(answers.answered_count(), 2);
    }

    #[test]
    fn whitespace_answers_count_as_blank() {
        let answers = CriteriaAnswers::new().with(CriterionQuestion::TargetAchieved, "   ");
        assert!(answers.is_blank());
    }
}
