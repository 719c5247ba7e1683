use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type GroupId = String;
pub type SubjectName = String;
pub type TeacherName = String;
pub type Day = u32;
pub type Hour = u32;

/// A class section, e.g. `1-A`. Optionally belongs to a course.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>) -> Self {
        Group {
            id: id.into(),
            course: None,
        }
    }

    pub fn in_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }
}

/// A subject with its weekly load and daily cap.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: SubjectName,
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: u32,
    #[serde(default = "default_max_hours_per_day")]
    pub max_hours_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl Subject {
    pub fn new(name: impl Into<SubjectName>, weekly_hours: u32, max_hours_per_day: u32) -> Self {
        Subject {
            name: name.into(),
            weekly_hours,
            max_hours_per_day,
            course: None,
        }
    }

    pub fn in_course(mut self, course: impl Into<String>) -> Self {
        self.course = Some(course.into());
        self
    }

    /// A course-less subject is taught to every group; otherwise only to
    /// groups of the same course.
    pub fn applies_to(&self, group: &Group) -> bool {
        match &self.course {
            None => true,
            Some(course) => group.course.as_deref() == Some(course.as_str()),
        }
    }
}

/// A teacher with a weekly cap and the subjects they are qualified for.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub name: TeacherName,
    #[serde(default = "default_max_hours_week")]
    pub max_hours_week: u32,
    #[serde(default)]
    pub subjects: Vec<SubjectName>,
}

impl Teacher {
    pub fn new(name: impl Into<TeacherName>, max_hours_week: u32, subjects: &[&str]) -> Self {
        Teacher {
            name: name.into(),
            max_hours_week,
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_qualified_for(&self, subject: &Subject) -> bool {
        self.subjects.iter().any(|s| *s == subject.name)
    }
}

fn default_weekly_hours() -> u32 {
    5
}

fn default_max_hours_per_day() -> u32 {
    1
}

fn default_max_hours_week() -> u32 {
    20
}

/// A (day, hour) cell of the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Slot {
    pub day: Day,
    pub hour: Hour,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {} hour {}", self.day, self.hour)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Objective {
    /// Any assignment satisfying the hard constraints.
    #[default]
    Feasibility,
    /// Pack lessons toward the first hours of each day.
    PreferEarlyHours,
}

/// Knobs handed to HiGHS. Nothing here is left to solver defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
    pub random_seed: i32,
    pub threads: i32,
    pub log_to_console: bool,
    pub contiguous_blocks: bool,
    pub objective: Objective,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            time_limit_secs: None,
            random_seed: 1234,
            threads: 1,
            log_to_console: false,
            contiguous_blocks: true,
            objective: Objective::Feasibility,
        }
    }
}

/// The complete input for the timetabling problem.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableInput {
    pub num_days: u32,
    pub num_hours: u32,
    pub groups: Vec<Group>,
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub solver: SolverOptions,
}

impl TimetableInput {
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.num_days).flat_map(move |day| (0..self.num_hours).map(move |hour| Slot { day, hour }))
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn teacher(&self, name: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.name == name)
    }
}

/// One scheduled lesson: `(group, slot) -> (subject, teacher)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Lesson {
    pub group: GroupId,
    pub day: Day,
    pub hour: Hour,
    pub subject: SubjectName,
    pub teacher: TeacherName,
}

impl Lesson {
    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            hour: self.hour,
        }
    }
}

/// A solved week, lessons sorted by group, day and hour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timetable {
    pub lessons: Vec<Lesson>,
}

impl Timetable {
    pub fn new(mut lessons: Vec<Lesson>) -> Self {
        lessons.sort();
        Timetable { lessons }
    }

    pub fn lesson_at(&self, group: &str, slot: Slot) -> Option<&Lesson> {
        self.lessons
            .iter()
            .find(|l| l.group == group && l.slot() == slot)
    }

    pub fn lessons_of_teacher<'a>(&'a self, teacher: &'a str) -> impl Iterator<Item = &'a Lesson> + 'a {
        self.lessons.iter().filter(move |l| l.teacher == teacher)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }
}

/// Outcome of a single solve. Infeasible and unknown are results, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveOutcome {
    Feasible(Timetable),
    Infeasible,
    Unknown { reason: String },
}

impl SolveOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, SolveOutcome::Feasible(_))
    }
}

/// Describes a hard constraint that a timetable breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub constraint_type: String,
    pub description: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.constraint_type, self.description)
    }
}
