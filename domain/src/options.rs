use std::fmt;
use std::str::FromStr;

pub const GRADES: &[&str] = &[
    "1st Grade",
    "2nd Grade",
    "3rd Grade",
    "4th Grade",
    "5th Grade",
    "6th Grade",
    "7th Grade",
    "8th Grade",
    "9th Grade",
    "10th Grade",
    "Masters/PhD",
];

pub const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Science",
    "Language",
    "History",
    "Art",
    "Music",
    "Physical Education",
    "Deep Learning",
];

pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Hindi",
    "Chinese (Simplified)",
    "Japanese",
    "Korean",
];

/// Longest topic accepted from the input box.
pub const MAX_TOPIC_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeachingMode {
    LearnConcept,
    PracticeQuestions,
    GetExplanation,
    GenerateCurriculum,
    /// Persona id as configured.
    Persona(String),
}

impl TeachingMode {
    pub const BUILT_IN: [TeachingMode; 4] = [
        TeachingMode::LearnConcept,
        TeachingMode::PracticeQuestions,
        TeachingMode::GetExplanation,
        TeachingMode::GenerateCurriculum,
    ];

    pub fn label(&self) -> &str {
        match self {
            TeachingMode::LearnConcept => "Learn Concept",
            TeachingMode::PracticeQuestions => "Practice Questions",
            TeachingMode::GetExplanation => "Get Explanation",
            TeachingMode::GenerateCurriculum => "Generate Curriculum",
            TeachingMode::Persona(id) => id,
        }
    }

    pub fn is_curriculum(&self) -> bool {
        matches!(self, TeachingMode::GenerateCurriculum)
    }
}

impl fmt::Display for TeachingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TeachingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', '_'], " ");
        match key.as_str() {
            "learn" | "learn concept" => Ok(TeachingMode::LearnConcept),
            "practice" | "practice questions" => Ok(TeachingMode::PracticeQuestions),
            "explain" | "get explanation" => Ok(TeachingMode::GetExplanation),
            "curriculum" | "generate curriculum" => Ok(TeachingMode::GenerateCurriculum),
            _ => match s.trim().strip_prefix("persona:") {
                Some(id) if !id.is_empty() => Ok(TeachingMode::Persona(id.to_string())),
                _ => Err(format!(
                    "unknown mode '{s}' (expected learn, practice, explain, curriculum or persona:<id>)"
                )),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Basic,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Basic => "Basic",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeachingStyle {
    Visual,
    Auditory,
    Kinesthetic,
    ReadingWriting,
}

impl TeachingStyle {
    pub const ALL: [TeachingStyle; 4] = [
        TeachingStyle::Visual,
        TeachingStyle::Auditory,
        TeachingStyle::Kinesthetic,
        TeachingStyle::ReadingWriting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeachingStyle::Visual => "Visual",
            TeachingStyle::Auditory => "Auditory",
            TeachingStyle::Kinesthetic => "Kinesthetic",
            TeachingStyle::ReadingWriting => "Reading/Writing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationUnit {
    #[default]
    Weeks,
    Months,
    Semesters,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 3] = [
        DurationUnit::Weeks,
        DurationUnit::Months,
        DurationUnit::Semesters,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DurationUnit::Weeks => "Weeks",
            DurationUnit::Months => "Months",
            DurationUnit::Semesters => "Semesters",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "weeks" => Ok(DurationUnit::Weeks),
            "month" | "months" => Ok(DurationUnit::Months),
            "semester" | "semesters" => Ok(DurationUnit::Semesters),
            other => Err(format!("unknown duration unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseDuration {
    pub value: u32,
    pub unit: DurationUnit,
}

impl Default for CourseDuration {
    fn default() -> Self {
        Self {
            value: 4,
            unit: DurationUnit::Weeks,
        }
    }
}

impl fmt::Display for CourseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.label())
    }
}

/// Everything the form collects for one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningRequest {
    pub grade: String,
    pub subject: String,
    pub language: String,
    pub mode: TeachingMode,
    pub difficulty: Option<Difficulty>,
    pub styles: Vec<TeachingStyle>,
    pub objectives: String,
    pub topic: String,
    pub duration: CourseDuration,
}

impl LearningRequest {
    pub fn new(
        grade: &str,
        subject: &str,
        language: &str,
        mode: TeachingMode,
        topic: &str,
    ) -> Self {
        Self {
            grade: grade.to_string(),
            subject: subject.to_string(),
            language: language.to_string(),
            mode,
            difficulty: Some(Difficulty::default()),
            styles: Vec::new(),
            objectives: String::new(),
            topic: topic.to_string(),
            duration: CourseDuration::default(),
        }
    }
}
