//! Core data model types for selquest.
//!
//! These are the types shared by every rule component: SEL dimensions,
//! badge identifiers, the per-child progress record, and assessment
//! questions, answers, and results.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// One of the five social-emotional-learning competency categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[serde(alias = "self-awareness")]
    SelfAwareness,
    #[serde(alias = "self-management")]
    SelfManagement,
    #[serde(alias = "social-awareness")]
    SocialAwareness,
    #[serde(alias = "relationship-skills")]
    RelationshipSkills,
    #[serde(alias = "responsible-decision-making")]
    ResponsibleDecisionMaking,
}

impl Dimension {
    /// All dimensions in canonical order.
    pub const ALL: [Dimension; 5] = [
        Dimension::SelfAwareness,
        Dimension::SelfManagement,
        Dimension::SocialAwareness,
        Dimension::RelationshipSkills,
        Dimension::ResponsibleDecisionMaking,
    ];

    /// Human-readable label (e.g. "Self-Awareness").
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::SelfAwareness => "Self-Awareness",
            Dimension::SelfManagement => "Self-Management",
            Dimension::SocialAwareness => "Social Awareness",
            Dimension::RelationshipSkills => "Relationship Skills",
            Dimension::ResponsibleDecisionMaking => "Responsible Decision-Making",
        }
    }

    /// The milestone badge unlocked by a strong score in this dimension.
    pub fn milestone_badge(&self) -> BadgeId {
        match self {
            Dimension::SelfAwareness => BadgeId::SelfAwarenessStar,
            Dimension::SelfManagement => BadgeId::SelfManagementStar,
            Dimension::SocialAwareness => BadgeId::SocialAwarenessStar,
            Dimension::RelationshipSkills => BadgeId::RelationshipSkillsStar,
            Dimension::ResponsibleDecisionMaking => BadgeId::DecisionMakingStar,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::SelfAwareness => write!(f, "self_awareness"),
            Dimension::SelfManagement => write!(f, "self_management"),
            Dimension::SocialAwareness => write!(f, "social_awareness"),
            Dimension::RelationshipSkills => write!(f, "relationship_skills"),
            Dimension::ResponsibleDecisionMaking => write!(f, "responsible_decision_making"),
        }
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "self_awareness" => Ok(Dimension::SelfAwareness),
            "self_management" => Ok(Dimension::SelfManagement),
            "social_awareness" => Ok(Dimension::SocialAwareness),
            "relationship_skills" => Ok(Dimension::RelationshipSkills),
            "responsible_decision_making" | "decision_making" => {
                Ok(Dimension::ResponsibleDecisionMaking)
            }
            _ => Err(ValidationError::UnknownDimension(s.to_string())),
        }
    }
}

/// Identifier of an achievement badge.
///
/// Badges have no lifecycle of their own; they exist only as membership in
/// [`ChildProgress::badges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeId {
    FirstLogin,
    ProfileCreator,
    DailyHero,
    JournalStarter,
    TrioChamp,
    ThreeDayStreak,
    WeekStreak,
    HalfMonthStreak,
    ConsistencyChamp,
    #[serde(rename = "xp_collector_50")]
    XpCollector50,
    LevelUp,
    SelfAwarenessStar,
    SelfManagementStar,
    SocialAwarenessStar,
    RelationshipSkillsStar,
    DecisionMakingStar,
    SelGrowthChampion,
}

impl BadgeId {
    pub const ALL: [BadgeId; 17] = [
        BadgeId::FirstLogin,
        BadgeId::ProfileCreator,
        BadgeId::DailyHero,
        BadgeId::JournalStarter,
        BadgeId::TrioChamp,
        BadgeId::ThreeDayStreak,
        BadgeId::WeekStreak,
        BadgeId::HalfMonthStreak,
        BadgeId::ConsistencyChamp,
        BadgeId::XpCollector50,
        BadgeId::LevelUp,
        BadgeId::SelfAwarenessStar,
        BadgeId::SelfManagementStar,
        BadgeId::SocialAwarenessStar,
        BadgeId::RelationshipSkillsStar,
        BadgeId::DecisionMakingStar,
        BadgeId::SelGrowthChampion,
    ];

    /// The stable string identifier (e.g. `three_day_streak`).
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeId::FirstLogin => "first_login",
            BadgeId::ProfileCreator => "profile_creator",
            BadgeId::DailyHero => "daily_hero",
            BadgeId::JournalStarter => "journal_starter",
            BadgeId::TrioChamp => "trio_champ",
            BadgeId::ThreeDayStreak => "three_day_streak",
            BadgeId::WeekStreak => "week_streak",
            BadgeId::HalfMonthStreak => "half_month_streak",
            BadgeId::ConsistencyChamp => "consistency_champ",
            BadgeId::XpCollector50 => "xp_collector_50",
            BadgeId::LevelUp => "level_up",
            BadgeId::SelfAwarenessStar => "self_awareness_star",
            BadgeId::SelfManagementStar => "self_management_star",
            BadgeId::SocialAwarenessStar => "social_awareness_star",
            BadgeId::RelationshipSkillsStar => "relationship_skills_star",
            BadgeId::DecisionMakingStar => "decision_making_star",
            BadgeId::SelGrowthChampion => "sel_growth_champion",
        }
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A daily activity a child can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    CheckIn,
    Journal,
    Mindfulness,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::CheckIn => write!(f, "check-in"),
            Activity::Journal => write!(f, "journal"),
            Activity::Mindfulness => write!(f, "mindfulness"),
        }
    }
}

/// Persisted gamification state for one child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildProgress {
    /// Consecutive calendar days with a completed check-in.
    #[serde(default)]
    pub streak_count: u32,
    /// Cumulative experience points.
    #[serde(default)]
    pub xp_points: u32,
    /// Unlocked badges.
    #[serde(default)]
    pub badges: BTreeSet<BadgeId>,
    /// Timestamp of the most recent daily check-in.
    #[serde(default)]
    pub last_check_in: Option<DateTime<Utc>>,
    /// Whether today's check-in is recorded. Only meaningful for the day
    /// of `last_check_in`.
    #[serde(default)]
    pub daily_check_in_completed: bool,
    /// Whether the child finished creating their profile.
    #[serde(default)]
    pub profile_completed: bool,
    /// Local calendar day that `activities_today` refers to.
    #[serde(default)]
    pub activity_day: Option<NaiveDate>,
    /// Activities completed on `activity_day`.
    #[serde(default)]
    pub activities_today: BTreeSet<Activity>,
    /// Optimistic concurrency token, bumped by the store on every save.
    #[serde(default)]
    pub version: u64,
}

impl ChildProgress {
    /// Activities completed on `day`; empty when the record refers to an
    /// earlier day.
    pub fn activities_on(&self, day: NaiveDate) -> BTreeSet<Activity> {
        if self.activity_day == Some(day) {
            self.activities_today.clone()
        } else {
            BTreeSet::new()
        }
    }
}

/// A Likert-scale answer value, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Likert(u8);

impl Likert {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Likert(value))
        } else {
            Err(ValidationError::LikertOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Likert {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Likert::new(value)
    }
}

impl From<Likert> for u8 {
    fn from(value: Likert) -> Self {
        value.0
    }
}

/// A single assessment question. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    /// Unique question code (e.g. "SA1").
    pub code: String,
    /// The competency this question measures.
    pub dimension: Dimension,
    /// Question text shown to the child.
    pub text: String,
    /// Position in the questionnaire.
    pub display_order: i32,
}

/// A child's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentAnswer {
    pub question_code: String,
    pub value: Likert,
}

impl AssessmentAnswer {
    pub fn new(question_code: impl Into<String>, value: u8) -> Result<Self, ValidationError> {
        Ok(Self {
            question_code: question_code.into(),
            value: Likert::new(value)?,
        })
    }
}

/// Baseline or follow-up questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentType {
    #[serde(alias = "pre")]
    Pre,
    #[serde(alias = "post")]
    Post,
}

impl fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentType::Pre => write!(f, "PRE"),
            AssessmentType::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pre" => Ok(AssessmentType::Pre),
            "post" => Ok(AssessmentType::Post),
            other => Err(format!("unknown assessment type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotStarted,
    Completed,
}

/// Per-dimension competency scores, 0–100.
pub type DimensionScores = BTreeMap<Dimension, u8>;

/// A stored assessment outcome. At most one per `(child_id, assessment_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub child_id: String,
    pub assessment_type: AssessmentType,
    pub status: AssessmentStatus,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scores: DimensionScores,
}

impl AssessmentResult {
    pub fn is_completed(&self) -> bool {
        self.status == AssessmentStatus::Completed
    }
}
